#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod slot;
pub mod state;

pub use controller::{PlaybackController, PlaybackSnapshot};
pub use slot::ControllerSlot;
pub use state::PlaybackStatus;
