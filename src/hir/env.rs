//! The live program environment: what the editor currently knows.
//!
//! The engine never type-checks anything itself. It consumes an
//! [`Environment`] that answers "what does this path denote in this
//! namespace" for the unit currently open, plus the shapes and local
//! locations that unit already has in memory.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::artifact::Comment;
use super::ids::{LocalDefId, Uid};
use super::shape::Shape;
use crate::base::{IdentPath, Location};

// ============================================================================
// NAMESPACES
// ============================================================================

/// Category of a symbol; decides which table a name is looked up in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Value,
    Type,
    Module,
    ModuleType,
    Label,
    Constructor,
}

impl Namespace {
    pub const ALL: [Namespace; 6] = [
        Namespace::Value,
        Namespace::Type,
        Namespace::Module,
        Namespace::ModuleType,
        Namespace::Label,
        Namespace::Constructor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Value => "value",
            Namespace::Type => "type",
            Namespace::Module => "module",
            Namespace::ModuleType => "module type",
            Namespace::Label => "label",
            Namespace::Constructor => "constructor",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic position the identifier was found in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum SyntacticContext {
    Expression,
    Pattern,
    TypeExpr,
    ModuleExpr,
    ModuleTypeExpr,
    Label,
    #[default]
    Unknown,
}

// ============================================================================
// ENVIRONMENT CAPABILITY
// ============================================================================

/// What the environment knows about a bound name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvEntry {
    /// Declaration identity the name is bound to.
    pub uid: Uid,
    /// Approximate location: where the environment itself saw the binding.
    pub location: Location,
    /// Structural description of the binding, when it is an indirection
    /// (alias, re-export, functor application) that needs reducing.
    pub shape: Option<Shape>,
}

impl EnvEntry {
    pub fn new(uid: Uid, location: Location) -> Self {
        Self {
            uid,
            location,
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// The shape to start reduction from.
    pub fn initial_shape(&self) -> Shape {
        self.shape
            .clone()
            .unwrap_or_else(|| Shape::leaf(self.uid.clone()))
    }
}

/// Live environment query capability.
pub trait Environment {
    /// Name of the compilation unit currently open in the editor.
    fn current_unit(&self) -> &str;

    /// Resolve `path` in `namespace`.
    fn lookup(&self, path: &IdentPath, namespace: Namespace) -> Option<EnvEntry>;

    /// Precise location of a declaration of the current unit.
    fn lookup_local(&self, uid: &Uid) -> Option<Location>;

    /// Shape bound to `uid` in the environment, used to dereference
    /// identifiers during reduction.
    fn find_shape(&self, uid: &Uid) -> Option<Shape>;

    /// Documentation comments of the current unit.
    fn comments(&self) -> &[Comment] {
        &[]
    }
}

// ============================================================================
// IN-MEMORY ENVIRONMENT
// ============================================================================

/// A table-backed [`Environment`].
///
/// Front ends that already hold their typing environment in memory fill one
/// of these after each check; it is also what the test-suite drives the
/// engine with.
#[derive(Clone, Debug, Default)]
pub struct LiveEnvironment {
    unit: SmolStr,
    /// (path, namespace) → binding, in insertion order.
    bindings: IndexMap<(IdentPath, Namespace), EnvEntry>,
    /// Precise locations of the current unit's own declarations.
    locals: FxHashMap<LocalDefId, Location>,
    shapes: FxHashMap<Uid, Shape>,
    comments: Vec<Comment>,
}

impl LiveEnvironment {
    /// Create an empty environment for `unit`.
    pub fn new(unit: impl Into<SmolStr>) -> Self {
        Self {
            unit: unit.into(),
            ..Self::default()
        }
    }

    /// Bind `path` in `namespace`. A later binding of the same key shadows
    /// the earlier one.
    pub fn bind(&mut self, path: IdentPath, namespace: Namespace, entry: EnvEntry) -> &mut Self {
        self.bindings.insert((path, namespace), entry);
        self
    }

    /// Record the precise location of a declaration of the current unit.
    pub fn record_local(&mut self, id: LocalDefId, location: Location) -> &mut Self {
        self.locals.insert(id, location);
        self
    }

    /// Associate a shape with an identity (for `Var` dereferencing).
    pub fn bind_shape(&mut self, uid: Uid, shape: Shape) -> &mut Self {
        self.shapes.insert(uid, shape);
        self
    }

    pub fn add_comment(&mut self, comment: Comment) -> &mut Self {
        self.comments.push(comment);
        self
    }

    /// Iterate over all bindings, in insertion order.
    pub fn bindings(&self) -> impl Iterator<Item = (&IdentPath, Namespace, &EnvEntry)> + '_ {
        self.bindings
            .iter()
            .map(|((path, namespace), entry)| (path, *namespace, entry))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Environment for LiveEnvironment {
    fn current_unit(&self) -> &str {
        &self.unit
    }

    fn lookup(&self, path: &IdentPath, namespace: Namespace) -> Option<EnvEntry> {
        self.bindings.get(&(path.clone(), namespace)).cloned()
    }

    fn lookup_local(&self, uid: &Uid) -> Option<Location> {
        match uid {
            Uid::Item { unit, id } if *unit == self.unit => self.locals.get(id).cloned(),
            _ => None,
        }
    }

    fn find_shape(&self, uid: &Uid) -> Option<Shape> {
        self.shapes.get(uid).cloned()
    }

    fn comments(&self) -> &[Comment] {
        &self.comments
    }
}
