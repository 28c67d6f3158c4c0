//! Cross-unit definition location.
//!
//! ```text
//! query ─► lookup ─► reduce ─► identity ─┬─ Item of current unit ─► live table
//!                                        ├─ Item of other unit   ─► artifact table
//!                                        ├─ WholeUnit            ─► ghost at source start
//!                                        ├─ Builtin              ─► Builtin
//!                                        └─ nothing              ─► approximate location
//!                                                      │
//!                                                      ▼
//!                                             source file resolution
//! ```
//!
//! Every step reports a tagged outcome. Reduction shortfalls never surface
//! as errors: they fall back to the approximate location the environment
//! gave for the name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, warn};

use super::session::Session;
use crate::base::{FileKind, IdentPath, Location};
use crate::hir::{
    ArtifactCache, ArtifactError, CompiledUnit, EnvEntry, Environment, LookupOutcome, Namespace,
    ReduceError, Reducer, Shape, SyntacticContext, Uid, UnitShapes, lookup_ident,
};
use crate::project::source::DisplayPaths;
use crate::project::{
    ProjectConfig, SourceError, SourceRequest, SourceResolver, find_artifact, module_of_file,
};

/// Which half of a unit to prefer when both exist.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    ImplementationPriority,
    InterfacePriority,
}

impl Mode {
    /// The file kind this mode looks at first.
    pub fn preferred_kind(self) -> FileKind {
        match self {
            Mode::ImplementationPriority => FileKind::Implementation,
            Mode::InterfacePriority => FileKind::Interface,
        }
    }

    pub fn other(self) -> Mode {
        match self {
            Mode::ImplementationPriority => Mode::InterfacePriority,
            Mode::InterfacePriority => Mode::ImplementationPriority,
        }
    }
}

/// How to pick the namespaces an identifier is looked up in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespaceHint {
    /// Infer from where the identifier appears.
    Context(SyntacticContext),
    /// Try exactly these, in order.
    Explicit(Vec<Namespace>),
}

/// What to locate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// A dotted identifier as typed by the user.
    Ident {
        path: IdentPath,
        namespaces: NamespaceHint,
    },
    /// A path already classified by the caller, with the location of the
    /// syntax node it came from.
    Resolved {
        path: IdentPath,
        namespace: Namespace,
        location: Location,
    },
}

impl Query {
    /// Identifier in the given syntactic context.
    pub fn ident(path: IdentPath, context: SyntacticContext) -> Self {
        Query::Ident {
            path,
            namespaces: NamespaceHint::Context(context),
        }
    }

    pub fn path(&self) -> &IdentPath {
        match self {
            Query::Ident { path, .. } | Query::Resolved { path, .. } => path,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.path(), f)
    }
}

/// Successful outcome of a locate call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Located {
    /// Declaration location, and the unit owning it when known.
    Found {
        location: Location,
        owner: Option<SmolStr>,
    },
    /// Predefined identifier; no source exists.
    Builtin(String),
}

impl Located {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Located::Found { location, .. } => Some(location),
            Located::Builtin(_) => None,
        }
    }
}

/// Why a locate call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// The identity was resolved but its unit has no location for it.
    #[error("{ident}: not found{}", DisplayOwner(.owner.as_deref()))]
    NotFound {
        ident: String,
        owner: Option<SmolStr>,
        cause: Option<String>,
    },

    #[error("{0}: not in environment")]
    NotInEnvironment(String),

    /// A compiled artifact or source file is missing or unreadable.
    #[error("{ident}: {explanation}")]
    FileNotFound { ident: String, explanation: String },

    #[error("{ident}: ambiguous source, candidates: {}", DisplayPaths(.candidates))]
    AmbiguousMatch {
        ident: String,
        candidates: Vec<PathBuf>,
    },
}

struct DisplayOwner<'a>(Option<&'a str>);

impl fmt::Display for DisplayOwner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(owner) => write!(f, " in unit {owner}"),
            None => Ok(()),
        }
    }
}

// ============================================================================
// UNIT SHAPES OVER THE CACHE
// ============================================================================

/// Loads the artifact of `unit`, preferring the kind `mode` asks for and
/// falling back to the other one. `Ok(None)` when neither exists.
pub(crate) fn load_unit(
    config: &ProjectConfig,
    cache: &ArtifactCache,
    unit: &str,
    mode: Mode,
) -> Result<Option<(PathBuf, Arc<CompiledUnit>)>, ArtifactError> {
    let preferred = mode.preferred_kind();
    for kind in [preferred, preferred.other()] {
        let Some(path) = find_artifact(config, unit, kind) else {
            continue;
        };
        if kind != preferred {
            debug!(
                unit,
                mode = ?mode.other(),
                "no {preferred} artifact, retrying in the other mode"
            );
        }

        let loaded = cache.get(&path)?;
        if loaded.name() != unit {
            return Err(ArtifactError::UnitMismatch {
                path,
                expected: SmolStr::new(unit),
                found: SmolStr::new(loaded.name()),
            });
        }
        return Ok(Some((path, loaded)));
    }
    Ok(None)
}

/// Unit shapes served from the artifact cache.
struct CachedUnits<'a> {
    config: &'a ProjectConfig,
    cache: &'a ArtifactCache,
    mode: Mode,
}

impl UnitShapes for CachedUnits<'_> {
    fn unit_shape(&self, unit: &str) -> Result<Option<Shape>, ArtifactError> {
        let loaded = load_unit(self.config, self.cache, unit, self.mode)?;
        Ok(loaded.and_then(|(_, unit)| unit.shape().cloned()))
    }
}

// ============================================================================
// LOCATOR
// ============================================================================

/// One locate call in progress.
pub(crate) struct Locator<'a> {
    pub config: &'a ProjectConfig,
    pub cache: &'a ArtifactCache,
    pub env: &'a dyn Environment,
    pub fuel: u32,
    pub mode: Mode,
}

impl Locator<'_> {
    pub fn run(&self, session: &mut Session, query: &Query) -> Result<Located, LocateError> {
        let ident = query.path().to_string();

        let entry = match self.lookup(query) {
            LookupOutcome::Found { entry, .. } => entry,
            LookupOutcome::Builtin(text) => return Ok(Located::Builtin(text)),
            LookupOutcome::NotInEnvironment(text) => {
                return Err(LocateError::NotInEnvironment(text));
            }
        };
        let approximate = match query {
            Query::Resolved { location, .. } => location.clone(),
            Query::Ident { .. } => entry.location.clone(),
        };

        session.arm_fallback(approximate.clone());
        let uid = match self.reduce(&entry) {
            Ok(uid) => uid,
            Err(err) => {
                warn!(%ident, error = %err, "shape reduction failed");
                return match session.take_fallback() {
                    Some(fallback) => self.finish(session, &ident, fallback, None, None),
                    None => Err(LocateError::NotFound {
                        ident,
                        owner: None,
                        cause: Some(err.to_string()),
                    }),
                };
            }
        };

        match uid {
            None => {
                debug!(%ident, "no identity reached, using the approximate location");
                self.finish(session, &ident, approximate, None, None)
            }
            Some(Uid::Builtin(_)) => Ok(Located::Builtin(ident)),
            Some(Uid::Item { unit, id }) if unit.as_str() == self.env.current_unit() => {
                let local = Uid::Item {
                    unit: unit.clone(),
                    id,
                };
                let location = match self.env.lookup_local(&local) {
                    Some(location) => location,
                    None => {
                        debug!(%ident, "not in the live table, using the approximate location");
                        approximate
                    }
                };
                self.finish(session, &ident, location, Some(unit), None)
            }
            Some(uid @ Uid::Item { .. }) => self.locate_foreign(session, &ident, &uid),
            Some(Uid::WholeUnit(unit)) => self.locate_unit(session, &ident, unit),
        }
    }

    fn lookup(&self, query: &Query) -> LookupOutcome {
        match query {
            Query::Ident { path, namespaces } => {
                let candidates = match namespaces {
                    NamespaceHint::Context(context) => Namespace::candidates(path, *context),
                    NamespaceHint::Explicit(namespaces) => namespaces.clone(),
                };
                lookup_ident(self.env, path, &candidates)
            }
            Query::Resolved {
                path, namespace, ..
            } => lookup_ident(self.env, path, std::slice::from_ref(namespace)),
        }
    }

    /// Reduce the entry's shape to the identity it denotes.
    fn reduce(&self, entry: &EnvEntry) -> Result<Option<Uid>, ReduceError> {
        let units = CachedUnits {
            config: self.config,
            cache: self.cache,
            mode: self.mode,
        };
        let reduced = Reducer::new(self.env, &units)
            .with_fuel(self.fuel)
            .reduce(&entry.initial_shape())?;
        if !reduced.outcome.is_resolved() {
            debug!(outcome = ?reduced.outcome, "reduction approximated");
        }
        Ok(reduced.outcome.uid().cloned())
    }

    fn locate_foreign(
        &self,
        session: &mut Session,
        ident: &str,
        uid: &Uid,
    ) -> Result<Located, LocateError> {
        let Some(unit) = uid.unit() else {
            return Err(LocateError::NotFound {
                ident: ident.to_string(),
                owner: None,
                cause: None,
            });
        };
        let (path, loaded) = self.load(ident, unit)?;
        session.visit(path.clone(), Arc::clone(&loaded));

        match loaded.location(uid) {
            Some(location) => {
                let location = location.clone();
                self.finish(session, ident, location, Some(SmolStr::new(unit)), Some(loaded.kind()))
            }
            None => Err(LocateError::NotFound {
                ident: ident.to_string(),
                owner: Some(SmolStr::new(unit)),
                cause: Some(format!("{uid} is not recorded in {}", path.display())),
            }),
        }
    }

    fn locate_unit(
        &self,
        session: &mut Session,
        ident: &str,
        unit: SmolStr,
    ) -> Result<Located, LocateError> {
        if unit == self.env.current_unit() {
            return Ok(Located::Found {
                location: Location::ghost_at_start(self.config.current_file()),
                owner: Some(unit),
            });
        }

        let (path, loaded) = self.load(ident, &unit)?;
        session.visit(path, Arc::clone(&loaded));

        let source = match loaded.source_file() {
            Some(source) => source.to_path_buf(),
            None => {
                let suffix = self
                    .config
                    .suffixes()
                    .first()
                    .map(|pair| pair.suffix(loaded.kind()).to_string())
                    .unwrap_or_default();
                PathBuf::from(format!("{unit}{suffix}"))
            }
        };
        self.finish(
            session,
            ident,
            Location::ghost_at_start(source),
            Some(unit),
            Some(loaded.kind()),
        )
    }

    fn load(&self, ident: &str, unit: &str) -> Result<(PathBuf, Arc<CompiledUnit>), LocateError> {
        match load_unit(self.config, self.cache, unit, self.mode) {
            Ok(Some(loaded)) => Ok(loaded),
            Ok(None) => Err(LocateError::FileNotFound {
                ident: ident.to_string(),
                explanation: format!("no compiled artifact for unit {unit} on the artifact path"),
            }),
            Err(err) => Err(LocateError::FileNotFound {
                ident: ident.to_string(),
                explanation: err.to_string(),
            }),
        }
    }

    /// Turn the file recorded in `location` into a real path.
    fn finish(
        &self,
        session: &Session,
        ident: &str,
        location: Location,
        owner: Option<SmolStr>,
        kind: Option<FileKind>,
    ) -> Result<Located, LocateError> {
        let is_local = owner.as_deref() == Some(self.env.current_unit());
        if is_local || self.is_current_file(location.file()) {
            return Ok(Located::Found {
                location: location.with_file(self.config.current_file()),
                owner,
            });
        }

        let file_name = location
            .file()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let module = match &owner {
            Some(owner) => owner.clone(),
            None => match module_of_file(location.file(), self.config.suffixes()) {
                Some((module, _)) => module,
                None => {
                    debug!(file = %location.file().display(), "not a source file, keeping as is");
                    return Ok(Located::Found { location, owner });
                }
            },
        };
        let kind = self
            .config
            .kind_of(file_name)
            .or(kind)
            .unwrap_or_else(|| self.mode.preferred_kind());

        let trigger_dir = self
            .config
            .resolve(location.file().parent().unwrap_or(Path::new("")));
        let request = SourceRequest {
            module: &module,
            kind,
            with_fallback: location.is_ghost(),
            target: location.file(),
            trigger_dir: Some(&trigger_dir),
        };
        let recorded = session
            .visited()
            .filter(|visited| visited.unit().name() == module)
            .and_then(|visited| visited.source_digest());

        let search_path: Vec<PathBuf> = session
            .source_path()
            .iter()
            .map(|dir| self.config.resolve(dir))
            .collect();
        let resolver = SourceResolver::new(&search_path, self.config.suffixes());
        match resolver.resolve(&request, recorded) {
            Ok(path) => Ok(Located::Found {
                location: location.with_file(path),
                owner,
            }),
            Err(err @ SourceError::NotFound { .. }) => Err(LocateError::FileNotFound {
                ident: ident.to_string(),
                explanation: err.to_string(),
            }),
            Err(SourceError::Ambiguous { candidates, .. }) => Err(LocateError::AmbiguousMatch {
                ident: ident.to_string(),
                candidates,
            }),
        }
    }

    fn is_current_file(&self, file: &Path) -> bool {
        let file = self.config.resolve(file);
        let current = self.config.resolve(self.config.current_file());
        if file == current {
            return true;
        }
        matches!(
            (file.canonicalize(), current.canonicalize()),
            (Ok(a), Ok(b)) if a == b
        )
    }
}
