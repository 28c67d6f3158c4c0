//! High-level IR: identities, shapes and compiled artifacts.
//!
//! Everything the locator needs to turn a name into a declaration identity:
//! - [`Uid`] - Declaration identities, scoped to their unit
//! - [`Shape`] and [`Reducer`] - Structural indirections and their reduction
//! - [`Environment`] and [`lookup_ident`] - The live environment and
//!   namespace-aware lookup in it
//! - [`CompiledUnit`] and [`ArtifactCache`] - On-disk artifacts of other units

mod artifact;
mod cache;
mod env;
mod ids;
mod lookup;
mod reduce;
mod shape;

pub use artifact::{
    ARTIFACT_FORMAT, ARTIFACT_VERSION, ArtifactError, ArtifactReader, Comment,
    CompiledUnit, JsonArtifactReader,
};
pub use cache::ArtifactCache;
pub use env::{EnvEntry, Environment, LiveEnvironment, Namespace, SyntacticContext};
pub use ids::{LocalDefId, Uid};
pub use lookup::{LookupOutcome, lookup_ident};
pub use reduce::{
    DEFAULT_FUEL, NoUnits, ReduceError, Reduced, Reducer, ReductionOutcome, UnitShapes,
};
pub use shape::{ItemKey, Shape};
