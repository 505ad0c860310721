//! Text→Morse transcoding.
//!
//! The fixed table path is total and deterministic: every input produces a
//! wire-format Morse string, unmapped characters included. An optional chain
//! of external translation providers can run first; any provider failure is
//! swallowed and the table takes over, so encoding never fails.

pub mod table;
pub mod transcoder;

pub use table::{encode_with_table, morse_glyph};
pub use transcoder::{Transcoder, TranslateError, TranslateProvider};
