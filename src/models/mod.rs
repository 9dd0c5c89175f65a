pub mod performance;
pub mod player;

pub use performance::{PerformanceEntry, PerformanceEntryPatch};
pub use player::{CreatePlayerRequest, Player, UpdatePlayerRequest};
