//! End-to-end locate scenarios
//!
//! Each test lays out a small project in a temporary directory: sources
//! under `src/` (or several source dirs), compiled artifacts under `_build/`,
//! and an in-memory environment for the unit being edited, `Main`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use locus::base::{ContentHash, FileKind, IdentPath, LineCol, Location, TextRange, TextSize};
use locus::hir::{
    ArtifactCache, ArtifactError, ArtifactReader, Comment, CompiledUnit, EnvEntry, ItemKey,
    JsonArtifactReader, LiveEnvironment, LocalDefId, Namespace, Shape, SyntacticContext, Uid,
};
use locus::ide::{Documentation, Engine, LocateError, Located, Mode, NamespaceHint, Query};
use locus::project::ProjectConfig;

// ============================================================================
// FIXTURE
// ============================================================================

struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("_build")).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    fn source(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn artifact(&self, file: &str, unit: CompiledUnit) -> PathBuf {
        let path = self.path("_build").join(file);
        unit.write_json(&path).unwrap();
        path
    }

    fn config(&self) -> ProjectConfig {
        ProjectConfig::new(self.path("src/main.ml"))
            .with_source_dir(self.path("src"))
            .with_artifact_dir(self.path("_build"))
    }
}

fn at(file: &str, line: u32) -> Location {
    Location::new(
        file,
        TextRange::new(TextSize::from(line * 10), TextSize::from(line * 10 + 5)),
        LineCol::new(line, 4),
        LineCol::new(line, 9),
    )
}

fn ident(text: &str) -> IdentPath {
    IdentPath::parse(text).unwrap()
}

fn query(text: &str) -> Query {
    Query::ident(ident(text), SyntacticContext::Expression)
}

/// Environment of `Main` with `name` bound as a value.
fn env_with(name: &str, entry: EnvEntry) -> LiveEnvironment {
    let mut env = LiveEnvironment::new("Main");
    env.bind(ident(name), Namespace::Value, entry);
    env
}

fn foo_unit() -> CompiledUnit {
    CompiledUnit::new("Foo", FileKind::Implementation)
        .with_source("foo.ml", None)
        .with_location(LocalDefId::new(2), at("foo.ml", 5))
}

/// Counts artifact reads.
struct CountingReader(Arc<AtomicUsize>);

impl ArtifactReader for CountingReader {
    fn read(&self, path: &Path) -> Result<CompiledUnit, ArtifactError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        JsonArtifactReader.read(path)
    }
}

// ============================================================================
// CROSS-UNIT
// ============================================================================

#[test]
fn test_foreign_item_exact_location() {
    let project = Project::new();
    let foo_ml = project.source("src/foo.ml", "let bar = 42\n");
    project.artifact("foo.cmt", foo_unit());
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let located = Engine::new(project.config())
        .locate(&env, &query("Foo.bar"), Mode::ImplementationPriority)
        .unwrap();

    assert_eq!(
        located,
        Located::Found {
            location: at("foo.ml", 5).with_file(foo_ml),
            owner: Some("Foo".into()),
        }
    );
}

#[test]
fn test_relative_dirs_resolve_against_working_dir() {
    let project = Project::new();
    let foo_ml = project.source("src/foo.ml", "let bar = 42\n");
    project.artifact("foo.cmt", foo_unit());
    let config = ProjectConfig::new(project.path("src/main.ml"))
        .with_working_dir(project.root())
        .with_source_dir("src")
        .with_artifact_dir("_build");
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let engine = Engine::new(config);
    let located = engine
        .locate(&env, &query("Foo.bar"), Mode::ImplementationPriority)
        .unwrap();
    assert_eq!(located.location().unwrap().file(), foo_ml);

    let session = engine.session().override_source_path(vec!["src".into()]);
    let located = engine
        .locate_in(session, &env, &query("Foo.bar"), Mode::ImplementationPriority)
        .unwrap();
    assert_eq!(located.location().unwrap().file(), foo_ml);
}

#[test]
fn test_reexport_through_unit_shape() {
    let project = Project::new();
    let foo_ml = project.source("src/foo.ml", "let bar = 42\n");
    project.artifact(
        "foo.cmt",
        foo_unit().with_shape(Shape::structure(
            Some(Uid::whole_unit("Foo")),
            [(ItemKey::value("bar"), Shape::leaf(Uid::item("Foo", 2)))],
        )),
    );
    let entry = EnvEntry::new(Uid::item("Main", 7), at("main.ml", 3))
        .with_shape(Shape::proj(Shape::comp_unit("Foo"), ItemKey::value("bar")));
    let env = env_with("bar", entry);

    let located = Engine::new(project.config())
        .locate(&env, &query("bar"), Mode::default())
        .unwrap();

    assert_eq!(located.location(), Some(&at("foo.ml", 5).with_file(foo_ml)));
}

#[test]
fn test_interface_only_unit_retries_other_mode() {
    let project = Project::new();
    let bar_mli = project.source("src/bar.mli", "val baz : int\n");
    project.artifact(
        "bar.cmti",
        CompiledUnit::new("Bar", FileKind::Interface)
            .with_source("bar.mli", None)
            .with_location(LocalDefId::new(0), at("bar.mli", 1)),
    );
    let env = env_with("Bar.baz", EnvEntry::new(Uid::item("Bar", 0), at("main.ml", 0)));

    let located = Engine::new(project.config())
        .locate(&env, &query("Bar.baz"), Mode::ImplementationPriority)
        .unwrap();

    assert_eq!(
        located,
        Located::Found {
            location: at("bar.mli", 1).with_file(bar_mli),
            owner: Some("Bar".into()),
        }
    );
}

#[test]
fn test_stale_artifact_reports_owner() {
    let project = Project::new();
    project.source("src/foo.ml", "");
    project.artifact("foo.cmt", foo_unit());
    let env = env_with("Foo.gone", EnvEntry::new(Uid::item("Foo", 9), at("main.ml", 0)));

    let err = Engine::new(project.config())
        .locate(&env, &query("Foo.gone"), Mode::default())
        .unwrap_err();

    match err {
        LocateError::NotFound {
            ident,
            owner,
            cause,
        } => {
            assert_eq!(ident, "Foo.gone");
            assert_eq!(owner.as_deref(), Some("Foo"));
            assert!(cause.unwrap().contains("Foo.9"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_missing_artifact_is_file_not_found() {
    let project = Project::new();
    let env = env_with("Gone.x", EnvEntry::new(Uid::item("Gone", 0), at("main.ml", 0)));

    let err = Engine::new(project.config())
        .locate(&env, &query("Gone.x"), Mode::default())
        .unwrap_err();

    assert!(matches!(err, LocateError::FileNotFound { ref ident, .. } if ident == "Gone.x"));
    assert!(err.to_string().contains("Gone"));
}

#[test]
fn test_artifact_of_another_unit_is_rejected() {
    let project = Project::new();
    project.artifact(
        "foo.cmt",
        CompiledUnit::new("Bar", FileKind::Implementation)
            .with_location(LocalDefId::new(2), at("bar.ml", 5)),
    );
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let err = Engine::new(project.config())
        .locate(&env, &query("Foo.bar"), Mode::default())
        .unwrap_err();

    assert!(matches!(err, LocateError::FileNotFound { .. }));
    assert!(err.to_string().contains("belongs to unit Bar"));
}

#[test]
fn test_module_alias_gives_ghost_location() {
    let project = Project::new();
    let foo_ml = project.source("src/foo.ml", "");
    project.artifact(
        "foo.cmt",
        foo_unit().with_shape(Shape::structure(Some(Uid::whole_unit("Foo")), [])),
    );
    let mut env = LiveEnvironment::new("Main");
    env.bind(
        ident("M"),
        Namespace::Module,
        EnvEntry::new(Uid::item("Main", 1), at("main.ml", 0))
            .with_shape(Shape::alias(Shape::comp_unit("Foo"))),
    );

    let located = Engine::new(project.config())
        .locate(&env, &query("M"), Mode::default())
        .unwrap();

    let location = located.location().unwrap();
    assert!(location.is_ghost());
    assert_eq!(location.file(), foo_ml);
    assert_eq!(location.start, LineCol::new(0, 0));
    assert!(location.range.is_empty());
}

// ============================================================================
// DEGRADATION
// ============================================================================

#[test]
fn test_unresolvable_shape_uses_approximate_location() {
    let project = Project::new();
    let main_ml = project.path("src/main.ml");
    let entry = EnvEntry::new(Uid::item("Main", 1), at("main.ml", 2))
        .with_shape(Shape::Error("unsupported".into()));
    let env = env_with("x", entry);

    let located = Engine::new(project.config())
        .locate(&env, &query("x"), Mode::default())
        .unwrap();

    assert_eq!(located.location(), Some(&at("main.ml", 2).with_file(main_ml)));
}

#[test]
fn test_broken_artifact_mid_reduction_uses_fallback() {
    let project = Project::new();
    let main_ml = project.path("src/main.ml");
    fs::write(project.path("_build/broken.cmt"), "{").unwrap();
    let entry = EnvEntry::new(Uid::item("Main", 1), at("main.ml", 6))
        .with_shape(Shape::proj(Shape::comp_unit("Broken"), ItemKey::value("f")));
    let env = env_with("f", entry);

    let located = Engine::new(project.config())
        .locate(&env, &query("f"), Mode::default())
        .unwrap();

    assert_eq!(located.location(), Some(&at("main.ml", 6).with_file(main_ml)));
}

#[test]
fn test_resolved_query_uses_given_location_as_approximation() {
    let project = Project::new();
    let main_ml = project.path("src/main.ml");
    let entry = EnvEntry::new(Uid::item("Main", 1), at("main.ml", 2))
        .with_shape(Shape::Error("opaque".into()));
    let env = env_with("x", entry);
    let query = Query::Resolved {
        path: ident("x"),
        namespace: Namespace::Value,
        location: at("main.ml", 12),
    };

    let located = Engine::new(project.config())
        .locate(&env, &query, Mode::default())
        .unwrap();

    assert_eq!(located.location(), Some(&at("main.ml", 12).with_file(main_ml)));
}

// ============================================================================
// ENVIRONMENT OUTCOMES
// ============================================================================

#[test]
fn test_unbound_identifier() {
    let project = Project::new();
    let env = LiveEnvironment::new("Main");

    let err = Engine::new(project.config())
        .locate(&env, &query("List.mapp"), Mode::default())
        .unwrap_err();

    assert_eq!(err, LocateError::NotInEnvironment("List.mapp".to_string()));
}

#[test]
fn test_builtin_reads_nothing() {
    let project = Project::new();
    project.artifact("foo.cmt", foo_unit());
    let reads = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(ArtifactCache::with_reader(CountingReader(Arc::clone(&reads))));
    let mut env = LiveEnvironment::new("Main");
    env.bind(
        ident("int"),
        Namespace::Type,
        EnvEntry::new(Uid::builtin("int"), at("main.ml", 0)),
    );
    let query = Query::Ident {
        path: ident("int"),
        namespaces: NamespaceHint::Explicit(vec![Namespace::Type]),
    };

    let located = Engine::with_cache(project.config(), Arc::clone(&cache))
        .locate(&env, &query, Mode::default())
        .unwrap();

    assert_eq!(located, Located::Builtin("int".to_string()));
    assert_eq!(reads.load(Ordering::SeqCst), 0);
    assert!(cache.is_empty());
}

// ============================================================================
// SOURCE DISAMBIGUATION
// ============================================================================

fn two_foos(
    project: &Project,
    recorded_source: &str,
    digest: Option<ContentHash>,
) -> ProjectConfig {
    project.source("a/Foo.ml", "let bar = 1\n");
    project.source("b/Foo.ml", "let bar = 2\n");
    project.artifact(
        "Foo.cmt",
        CompiledUnit::new("Foo", FileKind::Implementation)
            .with_source(recorded_source, digest)
            .with_location(LocalDefId::new(2), at(recorded_source, 0)),
    );
    ProjectConfig::new(project.path("src/main.ml"))
        .with_source_dir(project.path("a"))
        .with_source_dir(project.path("b"))
        .with_artifact_dir(project.path("_build"))
}

#[test]
fn test_equal_candidates_are_ambiguous() {
    let project = Project::new();
    let config = two_foos(&project, "Foo.ml", None);
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let err = Engine::new(config)
        .locate(&env, &query("Foo.bar"), Mode::default())
        .unwrap_err();

    assert_eq!(
        err,
        LocateError::AmbiguousMatch {
            ident: "Foo.bar".to_string(),
            candidates: vec![project.path("a/Foo.ml"), project.path("b/Foo.ml")],
        }
    );
}

#[test]
fn test_recorded_digest_beats_path_similarity() {
    let project = Project::new();
    let digest = ContentHash::of_bytes(b"let bar = 2\n");
    let config = two_foos(&project, "a/Foo.ml", Some(digest));
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let located = Engine::new(config)
        .locate(&env, &query("Foo.bar"), Mode::default())
        .unwrap();

    assert_eq!(located.location().unwrap().file(), project.path("b/Foo.ml"));
}

#[test]
fn test_disambiguation_is_deterministic() {
    let project = Project::new();
    let config = two_foos(&project, "b/Foo.ml", None);
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));
    let engine = Engine::new(config);

    let first = engine.locate(&env, &query("Foo.bar"), Mode::default());
    for _ in 0..5 {
        assert_eq!(engine.locate(&env, &query("Foo.bar"), Mode::default()), first);
    }
    assert_eq!(
        first.unwrap().location().unwrap().file(),
        project.path("b/Foo.ml")
    );
}

#[test]
fn test_source_path_override_is_per_call() {
    let project = Project::new();
    project.artifact("foo.cmt", foo_unit());
    let alt = project.source("alt/foo.ml", "");
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));
    let engine = Engine::new(project.config());

    let session = engine.session().override_source_path(vec![project.path("alt")]);
    let located = engine
        .locate_in(session, &env, &query("Foo.bar"), Mode::default())
        .unwrap();
    assert_eq!(located.location().unwrap().file(), alt);

    // Next call searches src/ again, which has no foo.ml.
    let err = engine
        .locate(&env, &query("Foo.bar"), Mode::default())
        .unwrap_err();
    assert!(matches!(err, LocateError::FileNotFound { .. }));
}

// ============================================================================
// SHARED CACHE
// ============================================================================

#[test]
fn test_cache_shared_between_engines() {
    let project = Project::new();
    project.source("src/foo.ml", "");
    project.artifact("foo.cmt", foo_unit());
    let reads = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(ArtifactCache::with_reader(CountingReader(Arc::clone(&reads))));
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    for _ in 0..2 {
        Engine::with_cache(project.config(), Arc::clone(&cache))
            .locate(&env, &query("Foo.bar"), Mode::default())
            .unwrap();
    }

    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

// ============================================================================
// DOCUMENTATION
// ============================================================================

#[test]
fn test_foreign_documentation() {
    let project = Project::new();
    project.source("src/foo.ml", "");
    project.artifact(
        "foo.cmt",
        foo_unit().with_comment(Comment::new("Returns the bar.", at("foo.ml", 4))),
    );
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let docs = Engine::new(project.config())
        .documentation(&env, &query("Foo.bar"), Mode::default())
        .unwrap();

    assert_eq!(docs, Documentation::Found("Returns the bar.".to_string()));
}

#[test]
fn test_documentation_errors_match_locate() {
    let project = Project::new();
    let env = LiveEnvironment::new("Main");

    let err = Engine::new(project.config())
        .documentation(&env, &query("nope"), Mode::default())
        .unwrap_err();

    assert_eq!(err, LocateError::NotInEnvironment("nope".to_string()));
}

#[test]
fn test_loaded_project_file() {
    let project = Project::new();
    let foo_ml = project.source("src/foo.ml", "");
    project.artifact("foo.cmt", foo_unit());
    let dot = project.path(".locus");
    fs::write(&dot, "S src\nB _build\n").unwrap();
    let config = ProjectConfig::load(&dot, project.path("src/main.ml")).unwrap();
    let env = env_with("Foo.bar", EnvEntry::new(Uid::item("Foo", 2), at("main.ml", 0)));

    let located = Engine::new(config)
        .locate(&env, &query("Foo.bar"), Mode::default())
        .unwrap();

    assert_eq!(located.location().unwrap().file(), foo_ml);
}
