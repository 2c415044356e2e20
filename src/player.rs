//! Playback coordinator: the single source of truth for what plays.
//!
//! The presentation layer reads `PlayerState` and calls coordinator methods;
//! it never talks to the audio backend directly.

mod coordinator;
mod state;

pub use coordinator::Coordinator;
pub use state::*;
