//! # locus-base
//!
//! Definition-location engine: given an identifier in the program being
//! edited, find where it was declared, following aliases, re-exports and
//! functor applications into other compilation units through their compiled
//! artifacts.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide      → locate / documentation entry points, per-call session
//!   ↓
//! project  → configuration, artifact + source file lookup
//!   ↓
//! hir      → identities, shapes + reduction, environment lookup, artifacts
//!   ↓
//! base     → Primitives (Location, LineCol, identifier paths, digests)
//! ```

/// Foundation types: locations, identifier paths, digests
pub mod base;

/// High-level IR: identities, shapes, environments, compiled artifacts
pub mod hir;

/// Definition location and documentation
pub mod ide;

/// Project configuration and file lookup
pub mod project;

// Re-export the entry points
pub use base::{ContentHash, FileKind, IdentPath, LineCol, Location, TextRange, TextSize};
pub use ide::{Documentation, Engine, LocateError, Located, Mode, Query};
pub use project::ProjectConfig;
