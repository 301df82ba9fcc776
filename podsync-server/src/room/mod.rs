mod room;
mod room_reaper;
mod room_store;

pub use room::*;
pub use room_reaper::*;
pub use room_store::*;
