//! Dotted identifier paths such as `List.map` or `Stdlib.Option.t`.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Why a dotted identifier could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty identifier")]
    Empty,
    #[error("empty segment in `{0}`")]
    EmptySegment(String),
    #[error("invalid identifier segment `{segment}` in `{path}`")]
    InvalidSegment { path: String, segment: String },
}

/// A non-empty sequence of identifier segments.
///
/// All segments but the last name modules; the last one names the item
/// being referred to, in whatever namespace the lookup decides.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentPath {
    segments: Vec<SmolStr>,
}

impl IdentPath {
    /// Parse a dotted identifier, validating each segment.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for segment in text.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(text.to_string()));
            }
            if !is_identifier(segment) {
                return Err(PathError::InvalidSegment {
                    path: text.to_string(),
                    segment: segment.to_string(),
                });
            }
            segments.push(SmolStr::new(segment));
        }

        Ok(Self { segments })
    }

    /// Build a path from already-validated segments.
    ///
    /// Returns `None` when `segments` is empty.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let segments: Vec<SmolStr> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// The last segment, i.e. the item name.
    pub fn last(&self) -> &str {
        // Non-empty by construction.
        self.segments.last().map(SmolStr::as_str).unwrap_or_default()
    }

    /// The leading module segments (everything except the last).
    pub fn qualifier(&self) -> &[SmolStr] {
        match self.segments.split_last() {
            Some((_, qualifier)) => qualifier,
            None => &[],
        }
    }

    /// First segment; for a qualified path this is the outermost module.
    pub fn head(&self) -> &str {
        self.segments.first().map(SmolStr::as_str).unwrap_or_default()
    }

    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }

    /// Whether the last segment starts with an uppercase letter, i.e. reads
    /// as a module or constructor name.
    pub fn is_capitalized(&self) -> bool {
        self.last().chars().next().is_some_and(char::is_uppercase)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_ident::is_xid_start(first))
        && chars.all(|c| c == '\'' || unicode_ident::is_xid_continue(c))
}

impl fmt::Display for IdentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for IdentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentPath({self})")
    }
}

impl std::str::FromStr for IdentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
