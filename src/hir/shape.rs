//! Shapes: how a reference is structurally built.
//!
//! A shape is the compiler's record of what a module-level name *is* before
//! any indirection is followed: an alias of another unit, a projection out
//! of a structure, the application of a functor to an argument, and so on.
//! [`super::reduce`] rewrites shapes until a declaration identity appears.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::env::Namespace;
use super::ids::Uid;

/// Key of a structure member: a name in a namespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub name: SmolStr,
    pub namespace: Namespace,
}

impl ItemKey {
    pub fn new(name: impl Into<SmolStr>, namespace: Namespace) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    pub fn value(name: impl Into<SmolStr>) -> Self {
        Self::new(name, Namespace::Value)
    }

    pub fn module(name: impl Into<SmolStr>) -> Self {
        Self::new(name, Namespace::Module)
    }
}

impl fmt::Debug for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.namespace, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// An opaque declaration.
    Leaf { uid: Option<Uid> },
    /// An identifier whose shape is bound elsewhere (environment or functor
    /// parameter).
    Var { uid: Uid },
    /// A module alias; reduces to what it points at.
    Alias(Box<Shape>),
    /// A structure with named members.
    Struct {
        uid: Option<Uid>,
        #[serde(with = "indexmap::map::serde_seq")]
        items: IndexMap<ItemKey, Shape>,
    },
    /// Selection of a member out of a structure.
    Proj { of: Box<Shape>, item: ItemKey },
    /// A functor: `param` is bound to the argument inside `body`.
    Abs {
        uid: Option<Uid>,
        param: Uid,
        body: Box<Shape>,
    },
    /// A functor application.
    App { func: Box<Shape>, arg: Box<Shape> },
    /// The top-level shape of another compilation unit, to be fetched from
    /// its artifact.
    CompUnit(SmolStr),
    /// The compiler could not describe this reference.
    Error(SmolStr),
}

impl Shape {
    pub fn leaf(uid: Uid) -> Self {
        Shape::Leaf { uid: Some(uid) }
    }

    pub fn var(uid: Uid) -> Self {
        Shape::Var { uid }
    }

    pub fn alias(target: Shape) -> Self {
        Shape::Alias(Box::new(target))
    }

    pub fn structure<I>(uid: Option<Uid>, items: I) -> Self
    where
        I: IntoIterator<Item = (ItemKey, Shape)>,
    {
        Shape::Struct {
            uid,
            items: items.into_iter().collect(),
        }
    }

    pub fn proj(of: Shape, item: ItemKey) -> Self {
        Shape::Proj {
            of: Box::new(of),
            item,
        }
    }

    pub fn abs(uid: Option<Uid>, param: Uid, body: Shape) -> Self {
        Shape::Abs {
            uid,
            param,
            body: Box::new(body),
        }
    }

    pub fn app(func: Shape, arg: Shape) -> Self {
        Shape::App {
            func: Box::new(func),
            arg: Box::new(arg),
        }
    }

    pub fn comp_unit(name: impl Into<SmolStr>) -> Self {
        Shape::CompUnit(name.into())
    }

    /// Identity carried directly by this node, without reducing anything.
    pub fn uid(&self) -> Option<&Uid> {
        match self {
            Shape::Leaf { uid } | Shape::Struct { uid, .. } | Shape::Abs { uid, .. } => {
                uid.as_ref()
            }
            Shape::Var { uid } => Some(uid),
            _ => None,
        }
    }

    /// Member `item` of a structure node.
    pub fn member(&self, item: &ItemKey) -> Option<&Shape> {
        match self {
            Shape::Struct { items, .. } => items.get(item),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup_respects_namespace() {
        let shape = Shape::structure(
            Some(Uid::whole_unit("Foo")),
            [
                (ItemKey::value("t"), Shape::leaf(Uid::item("Foo", 0))),
                (ItemKey::new("t", Namespace::Type), Shape::leaf(Uid::item("Foo", 1))),
            ],
        );

        assert_eq!(
            shape.member(&ItemKey::new("t", Namespace::Type)),
            Some(&Shape::leaf(Uid::item("Foo", 1)))
        );
        assert!(shape.member(&ItemKey::module("t")).is_none());
        assert_eq!(shape.uid(), Some(&Uid::whole_unit("Foo")));
    }

    #[test]
    fn test_json_keeps_item_order() {
        let shape = Shape::structure(
            None,
            [
                (ItemKey::value("b"), Shape::leaf(Uid::item("M", 1))),
                (ItemKey::value("a"), Shape::leaf(Uid::item("M", 0))),
            ],
        );

        let json = serde_json::to_string(&shape).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();

        let Shape::Struct { items, .. } = back else {
            panic!("expected a struct shape");
        };
        let names: Vec<&str> = items.keys().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
