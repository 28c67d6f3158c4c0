//! Property-based tests for shape reduction and source disambiguation.
//!
//! - Reducing an already reduced shape changes neither the shape nor the
//!   identity it denotes.
//! - Picking a source file among candidates depends only on the candidates
//!   and the recorded digest, never on call history.
#![cfg(feature = "proptest")]

use std::fs;
use std::path::{Path, PathBuf};

use locus::base::{ContentHash, FileKind};
use locus::hir::{ItemKey, LiveEnvironment, NoUnits, Reducer, Shape, Uid};
use locus::project::{SourceRequest, SourceResolver, SuffixPair};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

fn arb_uid() -> impl Strategy<Value = Uid> {
    prop_oneof![
        (0u32..5).prop_map(|id| Uid::item("Foo", id)),
        Just(Uid::whole_unit("Bar")),
    ]
}

fn arb_key() -> impl Strategy<Value = ItemKey> {
    prop_oneof![
        Just(ItemKey::value("x")),
        Just(ItemKey::value("y")),
        Just(ItemKey::module("M")),
    ]
}

/// Shapes without functors: with no unit shapes and an empty environment,
/// nothing in them can be unlocked by extra fuel.
fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        proptest::option::of(arb_uid()).prop_map(|uid| Shape::Leaf { uid }),
        arb_uid().prop_map(Shape::var),
        Just(Shape::comp_unit("Missing")),
        Just(Shape::Error("opaque".into())),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Shape::alias),
            (inner.clone(), arb_key()).prop_map(|(of, item)| Shape::proj(of, item)),
            (
                proptest::option::of(arb_uid()),
                proptest::collection::vec((arb_key(), inner), 0..3),
            )
                .prop_map(|(uid, items)| Shape::structure(uid, items)),
        ]
    })
}

/// Candidate directories, in search-path order.
fn arb_dirs() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(vec!["a", "b", "c/d", "e"], 1..=4)
}

fn arb_target() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(vec!["foo.ml", "a/foo.ml", "d/foo.ml", "c/d/foo.ml", "x/foo.ml"])
}

fn layout(root: &Path, dirs: &[&str]) -> Vec<PathBuf> {
    dirs.iter()
        .map(|dir| {
            let dir = root.join(dir);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("foo.ml"), format!("(* {} *)", dir.display())).unwrap();
            dir
        })
        .collect()
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_reduction_is_idempotent(shape in arb_shape()) {
        let env = LiveEnvironment::new("Main");

        let once = Reducer::new(&env, &NoUnits).reduce(&shape).unwrap();
        let twice = Reducer::new(&env, &NoUnits).reduce(&once.shape).unwrap();

        prop_assert_eq!(&once.shape, &twice.shape);
        prop_assert_eq!(once.outcome, twice.outcome);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_source_choice_is_deterministic(dirs in arb_dirs(), target in arb_target()) {
        let root = tempfile::tempdir().unwrap();
        let search_path = layout(root.path(), &dirs);
        let suffixes = vec![SuffixPair::new(".ml", ".mli")];
        let resolver = SourceResolver::new(&search_path, &suffixes);
        let request = SourceRequest {
            module: "Foo",
            kind: FileKind::Implementation,
            with_fallback: false,
            target: Path::new(target),
            trigger_dir: None,
        };

        let first = resolver.resolve(&request, None);
        let second = resolver.resolve(&request, None);
        prop_assert_eq!(&first, &second);

        if search_path.len() == 1 {
            prop_assert_eq!(first, Ok(search_path[0].join("foo.ml")));
        }
    }

    #[test]
    fn prop_matching_digest_always_wins(
        dirs in arb_dirs(),
        target in arb_target(),
        pick in any::<prop::sample::Index>(),
    ) {
        let root = tempfile::tempdir().unwrap();
        let search_path = layout(root.path(), &dirs);
        let suffixes = vec![SuffixPair::new(".ml", ".mli")];
        let resolver = SourceResolver::new(&search_path, &suffixes);
        let request = SourceRequest {
            module: "Foo",
            kind: FileKind::Implementation,
            with_fallback: false,
            target: Path::new(target),
            trigger_dir: None,
        };
        let expected = pick.get(&search_path).join("foo.ml");
        let recorded = ContentHash::of_file(&expected).unwrap();

        prop_assert_eq!(resolver.resolve(&request, Some(&recorded)), Ok(expected));
    }
}
