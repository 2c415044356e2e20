//! Library types shared by the catalog, the player and the store.
//!
//! A `Track` is the unit of playback; a `Playlist` is the ordered,
//! duplicate-free queue the player walks with next/prev.

mod model;
mod naming;

pub use model::*;
pub use naming::*;
