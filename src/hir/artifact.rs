//! Compiled-unit artifacts.
//!
//! An artifact is what the compiler leaves behind for one unit: its shape,
//! the location of every declaration, the name and digest of the source it
//! was compiled from, and the documentation comments found in that source.
//!
//! # File Format
//!
//! Artifacts are JSON documents:
//!
//! ```text
//! {
//!   "format": "locus-artifact",
//!   "version": 1,
//!   "unit": "Foo",
//!   "kind": "implementation" | "interface",
//!   "shape": <Shape>?,
//!   "source_file": "lib/foo.ml"?,
//!   "source_digest": "<64 hex digits>"?,
//!   "declarations": [{ "id": 0, "location": <Location> }, ...],
//!   "comments": [{ "text": "...", "location": <Location> }, ...]
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use super::ids::{LocalDefId, Uid};
use super::shape::Shape;
use crate::base::{ContentHash, FileKind, Location};

/// Value of the `format` field.
pub const ARTIFACT_FORMAT: &str = "locus-artifact";

/// Current schema version. Bump on any breaking change to the format.
pub const ARTIFACT_VERSION: u32 = 1;

/// Why an artifact could not be used.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("artifact {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} is not an artifact (format `{found}`)", .path.display())]
    UnknownFormat { path: PathBuf, found: String },
    #[error("artifact {} has version {found}, expected {expected}", .path.display())]
    VersionMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("artifact {} records declaration {} twice", .path.display(), .id.index())]
    DuplicateEntry { path: PathBuf, id: LocalDefId },
    #[error("artifact {} belongs to unit {found}, expected {expected}", .path.display())]
    UnitMismatch {
        path: PathBuf,
        expected: SmolStr,
        found: SmolStr,
    },
}

impl ArtifactError {
    /// The artifact file the error is about.
    pub fn path(&self) -> &Path {
        match self {
            ArtifactError::Io { path, .. }
            | ArtifactError::Corrupt { path, .. }
            | ArtifactError::UnknownFormat { path, .. }
            | ArtifactError::VersionMismatch { path, .. }
            | ArtifactError::DuplicateEntry { path, .. }
            | ArtifactError::UnitMismatch { path, .. } => path,
        }
    }
}

/// A documentation comment and where it sits in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub location: Location,
}

impl Comment {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

// ============================================================================
// COMPILED UNIT
// ============================================================================

/// A loaded artifact. Read-only once built.
#[derive(Clone, Debug)]
pub struct CompiledUnit {
    name: SmolStr,
    kind: FileKind,
    shape: Option<Shape>,
    source_file: Option<PathBuf>,
    source_digest: Option<ContentHash>,
    /// Declaration → location. Unique-keyed.
    locations: FxHashMap<LocalDefId, Location>,
    comments: Vec<Comment>,
}

impl CompiledUnit {
    pub fn new(name: impl Into<SmolStr>, kind: FileKind) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: None,
            source_file: None,
            source_digest: None,
            locations: FxHashMap::default(),
            comments: Vec::new(),
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_source(mut self, file: impl Into<PathBuf>, digest: Option<ContentHash>) -> Self {
        self.source_file = Some(file.into());
        self.source_digest = digest;
        self
    }

    /// Record a declaration location, replacing any previous entry.
    pub fn with_location(mut self, id: LocalDefId, location: Location) -> Self {
        self.locations.insert(id, location);
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// The source file this unit was compiled from, as the compiler saw it.
    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    pub fn source_digest(&self) -> Option<&ContentHash> {
        self.source_digest.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Location of a declaration owned by this unit.
    ///
    /// Identities of other units are never answered, even if their local id
    /// happens to be in the table.
    pub fn location(&self, uid: &Uid) -> Option<&Location> {
        match uid {
            Uid::Item { unit, id } if *unit == self.name => self.locations.get(id),
            _ => None,
        }
    }

    pub fn declaration_count(&self) -> usize {
        self.locations.len()
    }

    /// Serialise to the on-disk JSON form.
    ///
    /// Fails only when a recorded path is not valid UTF-8.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut declarations: Vec<Declaration> = self
            .locations
            .iter()
            .map(|(&id, location)| Declaration {
                id,
                location: location.clone(),
            })
            .collect();
        declarations.sort_by_key(|d| d.id);

        let file = ArtifactFile {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            unit: self.name.clone(),
            kind: self.kind,
            shape: self.shape.clone(),
            source_file: self.source_file.clone(),
            source_digest: self.source_digest,
            declarations,
            comments: self.comments.clone(),
        };

        serde_json::to_string_pretty(&file)
    }

    /// Write the artifact to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_error = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = self.to_json().map_err(|e| io_error(io::Error::other(e)))?;
        fs::write(path, json).map_err(io_error)
    }

    fn from_file(path: &Path, file: ArtifactFile) -> Result<Self, ArtifactError> {
        if file.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::UnknownFormat {
                path: path.to_path_buf(),
                found: file.format,
            });
        }
        if file.version != ARTIFACT_VERSION {
            return Err(ArtifactError::VersionMismatch {
                path: path.to_path_buf(),
                expected: ARTIFACT_VERSION,
                found: file.version,
            });
        }

        let mut locations = FxHashMap::default();
        for Declaration { id, location } in file.declarations {
            if locations.insert(id, location).is_some() {
                return Err(ArtifactError::DuplicateEntry {
                    path: path.to_path_buf(),
                    id,
                });
            }
        }

        Ok(Self {
            name: file.unit,
            kind: file.kind,
            shape: file.shape,
            source_file: file.source_file,
            source_digest: file.source_digest,
            locations,
            comments: file.comments,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct ArtifactFile {
    format: String,
    version: u32,
    unit: SmolStr,
    kind: FileKind,
    #[serde(default)]
    shape: Option<Shape>,
    #[serde(default)]
    source_file: Option<PathBuf>,
    #[serde(default)]
    source_digest: Option<ContentHash>,
    #[serde(default)]
    declarations: Vec<Declaration>,
    #[serde(default)]
    comments: Vec<Comment>,
}

#[derive(Serialize, Deserialize)]
struct Declaration {
    id: LocalDefId,
    location: Location,
}

// ============================================================================
// READERS
// ============================================================================

/// Reads an artifact from disk.
pub trait ArtifactReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<CompiledUnit, ArtifactError>;
}

/// Reader for the JSON artifact format.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonArtifactReader;

impl ArtifactReader for JsonArtifactReader {
    fn read(&self, path: &Path) -> Result<CompiledUnit, ArtifactError> {
        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ArtifactFile =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        CompiledUnit::from_file(path, file)
    }
}
