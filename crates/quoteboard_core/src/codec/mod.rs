//! Text codecs for the file-backed store and the build artifact.
//!
//! # Responsibility
//! - Encode/decode one quote to the fixed record block (`record`).
//! - Join record blocks into the consolidated array document (`aggregate`).
//!
//! # Invariants
//! - No general JSON parser is involved; the record schema is closed.
//! - Both storage backends share these functions, so artifacts are identical
//!   for identical data.

pub mod aggregate;
pub mod record;
