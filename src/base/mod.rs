//! Foundation types for the locus engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Location`], [`LineCol`] - Declaration positions
//! - [`TextRange`], [`TextSize`] - Byte offsets
//! - [`IdentPath`] - Dotted identifiers
//! - [`ContentHash`] - Whole-file digests
//! - [`FileKind`] - Implementation vs. interface
//!
//! This module has NO dependencies on other locus modules.

mod digest;
mod kind;
mod path;
mod span;

pub use digest::ContentHash;
pub use kind::FileKind;
pub use path::{IdentPath, PathError};
pub use span::{LineCol, Location, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
