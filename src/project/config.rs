//! Project configuration: search paths and file-name conventions.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::base::FileKind;

/// An (implementation, interface) file-suffix pair such as `.ml` / `.mli`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SuffixPair {
    pub implementation: SmolStr,
    pub interface: SmolStr,
}

impl SuffixPair {
    pub fn new(implementation: impl Into<SmolStr>, interface: impl Into<SmolStr>) -> Self {
        Self {
            implementation: implementation.into(),
            interface: interface.into(),
        }
    }

    /// Suffix used for files of `kind`.
    pub fn suffix(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Implementation => &self.implementation,
            FileKind::Interface => &self.interface,
        }
    }

    /// Kind of `file_name` according to this pair, if it carries one of its
    /// suffixes.
    pub fn kind_of(&self, file_name: &str) -> Option<FileKind> {
        // Check the longer suffix first so `.mli` is not taken for `.ml`.
        let mut kinds = [FileKind::Implementation, FileKind::Interface];
        kinds.sort_by_key(|&kind| std::cmp::Reverse(self.suffix(kind).len()));
        kinds
            .into_iter()
            .find(|&kind| file_name.ends_with(self.suffix(kind)))
    }
}

/// Everything the engine needs to know about the project layout.
///
/// Read-only for the duration of a resolution call. Build one with the
/// `with_*` methods or load it from a project file with [`ProjectConfig::load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Ordered source directories.
    source_path: Vec<PathBuf>,
    /// Ordered compiled-artifact directories.
    artifact_path: Vec<PathBuf>,
    /// Source suffix pairs, in priority order.
    suffixes: Vec<SuffixPair>,
    /// Suffixes of implementation and interface artifacts.
    artifact_suffixes: SuffixPair,
    /// The file currently open in the editor.
    current_file: PathBuf,
    /// Directory relative paths are resolved against.
    working_dir: PathBuf,
}

impl ProjectConfig {
    /// Configuration for editing `current_file`, with default suffixes and
    /// empty search paths.
    pub fn new(current_file: impl Into<PathBuf>) -> Self {
        let current_file = current_file.into();
        let working_dir = current_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            source_path: Vec::new(),
            artifact_path: Vec::new(),
            suffixes: vec![SuffixPair::new(".ml", ".mli"), SuffixPair::new(".re", ".rei")],
            artifact_suffixes: SuffixPair::new(".cmt", ".cmti"),
            current_file,
            working_dir,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Append a directory to the source search path.
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.push_unique_source(dir.into());
        self
    }

    /// Append a directory to the artifact search path.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.push_unique_artifact(dir.into());
        self
    }

    /// Append a suffix pair (lowest priority so far).
    pub fn with_suffix_pair(mut self, pair: SuffixPair) -> Self {
        self.push_unique_suffix(pair);
        self
    }

    /// Replace all suffix pairs.
    pub fn with_suffixes(mut self, suffixes: Vec<SuffixPair>) -> Self {
        self.suffixes = suffixes;
        self
    }

    pub fn with_artifact_suffixes(mut self, suffixes: SuffixPair) -> Self {
        self.artifact_suffixes = suffixes;
        self
    }

    pub(crate) fn push_unique_source(&mut self, dir: PathBuf) {
        if !self.source_path.contains(&dir) {
            self.source_path.push(dir);
        }
    }

    pub(crate) fn push_unique_artifact(&mut self, dir: PathBuf) {
        if !self.artifact_path.contains(&dir) {
            self.artifact_path.push(dir);
        }
    }

    pub(crate) fn push_unique_suffix(&mut self, pair: SuffixPair) {
        if !self.suffixes.contains(&pair) {
            self.suffixes.push(pair);
        }
    }

    pub fn source_path(&self) -> &[PathBuf] {
        &self.source_path
    }

    pub fn artifact_path(&self) -> &[PathBuf] {
        &self.artifact_path
    }

    pub fn suffixes(&self) -> &[SuffixPair] {
        &self.suffixes
    }

    pub fn artifact_suffixes(&self) -> &SuffixPair {
        &self.artifact_suffixes
    }

    pub fn current_file(&self) -> &Path {
        &self.current_file
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve `path` against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Kind of `file_name` under any configured suffix pair.
    pub fn kind_of(&self, file_name: &str) -> Option<FileKind> {
        self.suffixes.iter().find_map(|pair| pair.kind_of(file_name))
    }
}
