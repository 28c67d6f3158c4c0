//! Per-call resolution state.
//!
//! A [`Session`] is created at the start of every locate or documentation
//! call and dropped when it returns. Nothing here outlives the call, so
//! consecutive calls cannot observe each other's state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::base::{ContentHash, Location};
use crate::hir::CompiledUnit;
use crate::project::ProjectConfig;

/// The compiled unit most recently visited during a call.
#[derive(Clone, Debug)]
pub struct Visited {
    path: PathBuf,
    unit: Arc<CompiledUnit>,
}

impl Visited {
    /// Artifact file the unit was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn unit(&self) -> &Arc<CompiledUnit> {
        &self.unit
    }

    /// Digest of the source the unit was compiled from, if recorded.
    pub fn source_digest(&self) -> Option<&ContentHash> {
        self.unit.source_digest()
    }
}

/// One-shot fallback slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Fallback {
    #[default]
    Empty,
    Armed(Location),
    Spent,
}

/// State scoped to a single resolution call.
#[derive(Clone, Debug)]
pub struct Session {
    source_path: Vec<PathBuf>,
    visited: Option<Visited>,
    fallback: Fallback,
}

impl Session {
    /// Fresh session over the configured source path.
    pub fn begin(config: &ProjectConfig) -> Self {
        Self {
            source_path: config.source_path().to_vec(),
            visited: None,
            fallback: Fallback::Empty,
        }
    }

    /// Search `path` for sources instead of the configured path, for this
    /// call only.
    pub fn override_source_path(mut self, path: Vec<PathBuf>) -> Self {
        self.source_path = path;
        self
    }

    pub fn source_path(&self) -> &[PathBuf] {
        &self.source_path
    }

    /// Record `unit`, read from `path`, as the last visited artifact.
    pub fn visit(&mut self, path: impl Into<PathBuf>, unit: Arc<CompiledUnit>) {
        let path = path.into();
        trace!(path = %path.display(), unit = unit.name(), "visiting artifact");
        self.visited = Some(Visited { path, unit });
    }

    pub fn visited(&self) -> Option<&Visited> {
        self.visited.as_ref()
    }

    /// Set the fallback location. Only the first call in a session has any
    /// effect; returns whether this one did.
    pub fn arm_fallback(&mut self, location: Location) -> bool {
        match self.fallback {
            Fallback::Empty => {
                self.fallback = Fallback::Armed(location);
                true
            }
            Fallback::Armed(_) | Fallback::Spent => false,
        }
    }

    /// Consume the fallback location. Yields it at most once per session.
    pub fn take_fallback(&mut self) -> Option<Location> {
        match std::mem::replace(&mut self.fallback, Fallback::Spent) {
            Fallback::Armed(location) => Some(location),
            Fallback::Empty => {
                self.fallback = Fallback::Empty;
                None
            }
            Fallback::Spent => None,
        }
    }
}
