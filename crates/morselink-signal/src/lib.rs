//! Morse → timed flash sequence.
//!
//! [`build_timeline`] expands wire-format Morse text into a fully
//! materialised list of on/off steps; [`Playback`] is the cursor a driver
//! walks over that list, one pending timer at a time. How a level is
//! rendered belongs to the [`SignalSink`] supplied from outside.

pub mod playback;
pub mod timeline;
pub mod timing;

pub use playback::{play, Playback, SignalSink};
pub use timeline::build_timeline;
pub use timing::FlashTiming;
