//! Application model: exposes the UI state used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds screen, selection, filter
//! and the persisted collections the screens list. Playback state is not
//! here; it is read from the coordinator.

mod model;
mod scrub;

pub use model::*;
pub use scrub::Scrub;

#[cfg(test)]
mod tests;
