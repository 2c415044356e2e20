//! Audio resource wrapper.
//!
//! A dedicated thread owns the `rodio` output stream and at most one sink.
//! It accepts `AudioCmd`s over a channel and reports `AudioEvent`s on
//! another; nothing else touches the sink.

mod player;
mod source;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
