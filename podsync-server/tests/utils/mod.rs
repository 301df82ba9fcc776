
pub use mock_sink::*;
pub use test_connection::*;
