//! Declaration identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A globally unique identifier for a declaration.
///
/// Scoped to the compilation unit that owns the declaration, so two units can
/// both number their items from zero without colliding.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Uid {
    /// A specific declaration inside `unit`.
    Item { unit: SmolStr, id: LocalDefId },
    /// The compilation unit itself (what a module alias points at).
    WholeUnit(SmolStr),
    /// A predefined symbol; there is no source behind it.
    Builtin(SmolStr),
}

impl Uid {
    #[inline]
    pub fn item(unit: impl Into<SmolStr>, id: u32) -> Self {
        Uid::Item {
            unit: unit.into(),
            id: LocalDefId(id),
        }
    }

    #[inline]
    pub fn whole_unit(unit: impl Into<SmolStr>) -> Self {
        Uid::WholeUnit(unit.into())
    }

    #[inline]
    pub fn builtin(name: impl Into<SmolStr>) -> Self {
        Uid::Builtin(name.into())
    }

    /// The owning compilation unit, if any.
    pub fn unit(&self) -> Option<&str> {
        match self {
            Uid::Item { unit, .. } | Uid::WholeUnit(unit) => Some(unit),
            Uid::Builtin(_) => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Uid::Builtin(_))
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({self})")
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uid::Item { unit, id } => write!(f, "{unit}.{}", id.0),
            Uid::WholeUnit(unit) => write!(f, "{unit}"),
            Uid::Builtin(name) => write!(f, "<predef:{name}>"),
        }
    }
}

/// A unit-local declaration identifier.
///
/// Assigned sequentially by the compiler as declarations are met in a unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalDefId(pub u32);

impl LocalDefId {
    /// Create a new LocalDefId.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LocalDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalDefId({})", self.0)
    }
}

impl From<u32> for LocalDefId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}
