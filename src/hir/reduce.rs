//! Shape reduction: following indirections down to a declaration.
//!
//! Reduction is a bounded rewrite to weak head normal form:
//!
//! | shape               | rewrite                                            |
//! |---------------------|----------------------------------------------------|
//! | `Alias(s)`          | `s`                                                |
//! | `Var(uid)`          | functor argument bound to `uid`, else env shape    |
//! | `Proj(s, item)`     | member `item` of `reduce(s)` if it is a structure  |
//! | `App(f, a)`         | body of `reduce(f)` with its parameter bound to `a`|
//! | `CompUnit(name)`    | top-level shape from `name`'s artifact             |
//!
//! `Var`, `App` and `CompUnit` steps cost one unit of fuel each. When the
//! fuel runs out the shape reached so far is returned as is; a partial
//! result is still a valid answer, it just carries a less precise identity.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, trace};

use super::artifact::ArtifactError;
use super::env::Environment;
use super::ids::Uid;
use super::shape::Shape;

/// Fuel given to a reduction unless configured otherwise.
pub const DEFAULT_FUEL: u32 = 10;

/// Read-only access to the top-level shapes of other units.
///
/// Implemented over the artifact cache by the locator; the reducer itself
/// never touches the file system.
pub trait UnitShapes {
    /// Shape of `unit`, `Ok(None)` if no artifact for it exists.
    fn unit_shape(&self, unit: &str) -> Result<Option<Shape>, ArtifactError>;
}

/// A `UnitShapes` that knows no units.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUnits;

impl UnitShapes for NoUnits {
    fn unit_shape(&self, _unit: &str) -> Result<Option<Shape>, ArtifactError> {
        Ok(None)
    }
}

/// Internal failure during reduction.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("cannot load the shape of unit {unit}: {source}")]
    Artifact {
        unit: SmolStr,
        #[source]
        source: ArtifactError,
    },
}

/// What a reduction produced, in terms of identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReductionOutcome {
    /// Reached a node carrying its own identity.
    Resolved(Uid),
    /// Got stuck; this is the closest identity known.
    Approximated(Option<Uid>),
    /// Nothing identifiable was reached.
    Unresolved,
}

impl ReductionOutcome {
    /// The identity, exact or approximate.
    pub fn uid(&self) -> Option<&Uid> {
        match self {
            ReductionOutcome::Resolved(uid) => Some(uid),
            ReductionOutcome::Approximated(uid) => uid.as_ref(),
            ReductionOutcome::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ReductionOutcome::Resolved(_))
    }
}

/// Result of a reduction.
#[derive(Clone, Debug)]
pub struct Reduced {
    pub shape: Shape,
    pub outcome: ReductionOutcome,
    pub fuel_left: u32,
}

/// Bounded shape rewriter.
pub struct Reducer<'a> {
    env: &'a dyn Environment,
    units: &'a dyn UnitShapes,
    fuel: u32,
    /// Functor parameters bound so far. Members of an applied functor's
    /// body are projected after the application returns, so a binding
    /// stays for the rest of the reduction; parameter identities are unique.
    bindings: FxHashMap<Uid, Shape>,
}

impl<'a> Reducer<'a> {
    pub fn new(env: &'a dyn Environment, units: &'a dyn UnitShapes) -> Self {
        Self {
            env,
            units,
            fuel: DEFAULT_FUEL,
            bindings: FxHashMap::default(),
        }
    }

    pub fn with_fuel(mut self, fuel: u32) -> Self {
        self.fuel = fuel;
        self
    }

    /// Reduce `shape` and classify the result.
    pub fn reduce(mut self, shape: &Shape) -> Result<Reduced, ReduceError> {
        let shape = self.reduce_shape(shape)?;
        let outcome = classify(&shape);
        debug!(?outcome, fuel_left = self.fuel, "shape reduced");
        Ok(Reduced {
            shape,
            outcome,
            fuel_left: self.fuel,
        })
    }

    fn consume_fuel(&mut self) -> bool {
        if self.fuel == 0 {
            trace!("reduction out of fuel");
            return false;
        }
        self.fuel -= 1;
        true
    }

    fn reduce_shape(&mut self, shape: &Shape) -> Result<Shape, ReduceError> {
        match shape {
            Shape::Leaf { .. } | Shape::Struct { .. } | Shape::Abs { .. } | Shape::Error(_) => {
                Ok(shape.clone())
            }
            Shape::Alias(target) => self.reduce_shape(target),
            Shape::Var { uid } => {
                if !self.consume_fuel() {
                    return Ok(shape.clone());
                }
                let bound = self
                    .bindings
                    .get(uid)
                    .cloned()
                    .or_else(|| self.env.find_shape(uid));
                match bound {
                    Some(bound) => {
                        trace!(%uid, "dereferenced variable");
                        self.reduce_shape(&bound)
                    }
                    None => Ok(shape.clone()),
                }
            }
            Shape::Proj { of, item } => {
                let head = self.reduce_shape(of)?;
                match head.member(item) {
                    Some(member) => {
                        let member = member.clone();
                        self.reduce_shape(&member)
                    }
                    None => Ok(Shape::Proj {
                        of: Box::new(head),
                        item: item.clone(),
                    }),
                }
            }
            Shape::App { func, arg } => {
                let head = self.reduce_shape(func)?;
                match head {
                    Shape::Abs { param, body, .. } if self.consume_fuel() => {
                        trace!(%param, "applying functor");
                        self.bindings.insert(param, (**arg).clone());
                        self.reduce_shape(&body)
                    }
                    head => Ok(Shape::App {
                        func: Box::new(head),
                        arg: arg.clone(),
                    }),
                }
            }
            Shape::CompUnit(unit) => {
                if !self.consume_fuel() {
                    return Ok(shape.clone());
                }
                let loaded = self
                    .units
                    .unit_shape(unit)
                    .map_err(|source| ReduceError::Artifact {
                        unit: unit.clone(),
                        source,
                    })?;
                match loaded {
                    Some(unit_shape) => {
                        trace!(%unit, "loaded unit shape");
                        self.reduce_shape(&unit_shape)
                    }
                    None => Ok(shape.clone()),
                }
            }
        }
    }
}

/// Identity reached by a (possibly stuck) shape.
fn classify(shape: &Shape) -> ReductionOutcome {
    match shape {
        Shape::Leaf { uid: Some(uid) }
        | Shape::Struct { uid: Some(uid), .. }
        | Shape::Abs { uid: Some(uid), .. } => ReductionOutcome::Resolved(uid.clone()),
        Shape::Var { uid } => ReductionOutcome::Approximated(Some(uid.clone())),
        Shape::CompUnit(unit) => {
            ReductionOutcome::Approximated(Some(Uid::whole_unit(unit.clone())))
        }
        Shape::Alias(inner) => classify(inner),
        Shape::Proj { of: head, .. } | Shape::App { func: head, .. } => {
            ReductionOutcome::Approximated(classify(head).uid().cloned())
        }
        Shape::Leaf { uid: None }
        | Shape::Struct { uid: None, .. }
        | Shape::Abs { uid: None, .. }
        | Shape::Error(_) => ReductionOutcome::Unresolved,
    }
}
