//! Maps a module name to its source file and disambiguates duplicates.
//!
//! Candidates are gathered from every search directory, every name variant
//! and every suffix pair. When several distinct files survive, the one whose
//! content matches the digest recorded in the compiled artifact wins;
//! otherwise the one whose path shares the longest tail with the recorded
//! file name. A tie is reported, never guessed.

use std::fmt;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, trace};

use super::config::SuffixPair;
use super::search::name_variants;
use crate::base::{ContentHash, FileKind};

/// Failure to resolve a module to a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("no {kind} source for module {module} (looked for {})", .looked_for.join(", "))]
    NotFound {
        module: SmolStr,
        kind: FileKind,
        looked_for: Vec<String>,
    },

    #[error("several sources match module {module}: {}", DisplayPaths(.candidates))]
    Ambiguous {
        module: SmolStr,
        candidates: Vec<PathBuf>,
    },
}

pub(crate) struct DisplayPaths<'a>(pub &'a [PathBuf]);

impl fmt::Display for DisplayPaths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

/// What to look for.
#[derive(Clone, Copy, Debug)]
pub struct SourceRequest<'a> {
    /// Unit name, e.g. `Foo`.
    pub module: &'a str,
    /// Preferred file kind.
    pub kind: FileKind,
    /// Accept the opposite kind too. Set for ghost locations.
    pub with_fallback: bool,
    /// File name recorded in the location being resolved. Scored against
    /// candidates by common trailing characters.
    pub target: &'a Path,
    /// Directory of the location that triggered the search, tried when the
    /// search path has no match.
    pub trigger_dir: Option<&'a Path>,
}

/// Searches source directories according to the configured suffixes.
#[derive(Clone, Debug)]
pub struct SourceResolver<'a> {
    search_path: &'a [PathBuf],
    suffixes: &'a [SuffixPair],
}

#[derive(Clone, Debug)]
struct Candidate {
    path: PathBuf,
    kind: FileKind,
}

impl<'a> SourceResolver<'a> {
    pub fn new(search_path: &'a [PathBuf], suffixes: &'a [SuffixPair]) -> Self {
        Self {
            search_path,
            suffixes,
        }
    }

    /// Resolve `request` to one file.
    ///
    /// `recorded` is the source digest stored in the artifact being visited,
    /// if any.
    pub fn resolve(
        &self,
        request: &SourceRequest<'_>,
        recorded: Option<&ContentHash>,
    ) -> Result<PathBuf, SourceError> {
        let names = self.file_names(request);

        let mut candidates = self.collect(self.search_path.iter().map(PathBuf::as_path), &names);
        if candidates.is_empty() {
            if let Some(dir) = request.trigger_dir {
                trace!(dir = %dir.display(), "retrying in the triggering directory");
                candidates = self.collect(std::iter::once(dir), &names);
            }
        }

        debug!(
            module = request.module,
            kind = %request.kind,
            candidates = candidates.len(),
            "source candidates"
        );

        match candidates.len() {
            0 => Err(SourceError::NotFound {
                module: SmolStr::new(request.module),
                kind: request.kind,
                looked_for: names.into_iter().map(|(name, _)| name).collect(),
            }),
            1 => Ok(candidates.remove(0).path),
            _ => pick(request, candidates, recorded),
        }
    }

    /// File names to probe, in priority order, with the kind each denotes.
    fn file_names(&self, request: &SourceRequest<'_>) -> Vec<(String, FileKind)> {
        let mut kinds = vec![request.kind];
        if request.with_fallback {
            kinds.push(request.kind.other());
        }

        let variants = name_variants(request.module);
        let mut names = Vec::new();
        for pair in self.suffixes {
            for &kind in &kinds {
                for stem in &variants {
                    let name = format!("{stem}{}", pair.suffix(kind));
                    if !names.iter().any(|(seen, _)| *seen == name) {
                        names.push((name, kind));
                    }
                }
            }
        }
        names
    }

    /// Existing files named one of `names` in `dirs`, one per underlying file.
    fn collect<'d>(
        &self,
        dirs: impl Iterator<Item = &'d Path>,
        names: &[(String, FileKind)],
    ) -> Vec<Candidate> {
        let mut seen = Vec::new();
        let mut found = Vec::new();

        for dir in dirs {
            for (name, kind) in names {
                let path = dir.join(name);
                if !path.is_file() {
                    continue;
                }
                let Some(identity) = FileIdentity::of(&path) else {
                    continue;
                };
                if seen.contains(&identity) {
                    trace!(path = %path.display(), "same file as an earlier candidate");
                    continue;
                }
                seen.push(identity);
                found.push(Candidate { path, kind: *kind });
            }
        }
        found
    }
}

fn pick(
    request: &SourceRequest<'_>,
    candidates: Vec<Candidate>,
    recorded: Option<&ContentHash>,
) -> Result<PathBuf, SourceError> {
    let mut pool = candidates;

    if let Some(recorded) = recorded {
        let mut matching: Vec<Candidate> = pool
            .iter()
            .filter(|candidate| {
                ContentHash::of_file(&candidate.path).is_ok_and(|digest| digest == *recorded)
            })
            .cloned()
            .collect();
        match matching.len() {
            0 => {}
            1 => {
                debug!(path = %matching[0].path.display(), "picked by content digest");
                return Ok(matching.remove(0).path);
            }
            _ => pool = matching,
        }
    }

    let target = request.target.to_string_lossy();
    let scored: Vec<(usize, PathBuf)> = pool
        .into_iter()
        .map(|candidate| {
            let score = suffix_score(
                &target,
                &candidate.path.to_string_lossy(),
                candidate.kind == request.kind,
            );
            trace!(path = %candidate.path.display(), score, "scored candidate");
            (score, candidate.path)
        })
        .collect();

    let best = scored.iter().map(|(score, _)| *score).max().unwrap_or(0);
    let mut winners: Vec<PathBuf> = scored
        .into_iter()
        .filter(|(score, _)| *score == best)
        .map(|(_, path)| path)
        .collect();

    if winners.len() == 1 {
        Ok(winners.remove(0))
    } else {
        debug!(module = request.module, tied = winners.len(), "ambiguous source");
        Err(SourceError::Ambiguous {
            module: SmolStr::new(request.module),
            candidates: winners,
        })
    }
}

/// Path-similarity score: twice the number of trailing characters shared by
/// `target` and `candidate`, plus one if the candidate has the preferred kind.
pub fn suffix_score(target: &str, candidate: &str, kind_matches: bool) -> usize {
    let common = target
        .chars()
        .rev()
        .zip(candidate.chars().rev())
        .take_while(|(a, b)| a == b)
        .count();
    2 * common + usize::from(kind_matches)
}

/// Identity of the file a path points to, independent of spelling.
#[derive(Debug, PartialEq, Eq)]
enum FileIdentity {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(path: &Path) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(path).ok()?;
        Some(FileIdentity::Inode {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(path: &Path) -> Option<Self> {
        path.canonicalize().ok().map(FileIdentity::Canonical)
    }
}
