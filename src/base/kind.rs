//! Implementation vs. interface halves of a compilation unit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which half of a unit a file (source or artifact) belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Implementation,
    Interface,
}

impl FileKind {
    /// The opposite half.
    pub fn other(self) -> Self {
        match self {
            FileKind::Implementation => FileKind::Interface,
            FileKind::Interface => FileKind::Implementation,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileKind::Implementation => "implementation",
            FileKind::Interface => "interface",
        })
    }
}
