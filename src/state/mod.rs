// Per-room merged state and the concurrent store behind the status query

mod room;
mod store;

pub use room::RoomState;
pub use store::StateStore;
