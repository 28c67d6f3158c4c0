//! File-name conventions linking unit names to files on disk.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use tracing::trace;

use super::config::{ProjectConfig, SuffixPair};
use crate::base::FileKind;

/// File-name stems under which `module` may be stored: the literal name
/// first, then the uncapitalised one. Never contains duplicates.
pub fn name_variants(module: &str) -> Vec<String> {
    let mut variants = vec![module.to_string()];
    let uncapitalized = uncapitalize(module);
    if uncapitalized != module {
        variants.push(uncapitalized);
    }
    variants
}

/// Unit name and kind of a source file, e.g. `src/foo_bar.mli` gives
/// `("Foo_bar", Interface)`. `None` when no suffix pair applies.
pub fn module_of_file(file: &Path, suffixes: &[SuffixPair]) -> Option<(SmolStr, FileKind)> {
    let name = file.file_name()?.to_str()?;
    let kind = suffixes.iter().find_map(|pair| pair.kind_of(name))?;
    // Stop at the first dot so `parser.pp.ml` still names `Parser`.
    let stem = name.split('.').next().filter(|stem| !stem.is_empty())?;
    Some((SmolStr::new(capitalize(stem)), kind))
}

/// Locate the artifact of `unit` for `kind` on the artifact search path.
///
/// Directories are tried in order, and within a directory the literal name
/// before the uncapitalised one.
pub fn find_artifact(config: &ProjectConfig, unit: &str, kind: FileKind) -> Option<PathBuf> {
    let suffix = config.artifact_suffixes().suffix(kind);
    let variants = name_variants(unit);

    config.artifact_path().iter().find_map(|dir| {
        let dir = config.resolve(dir);
        variants.iter().find_map(|stem| {
            let candidate = dir.join(format!("{stem}{suffix}"));
            trace!(path = %candidate.display(), "probing artifact");
            candidate.is_file().then_some(candidate)
        })
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    #[rstest]
    #[case("Foo", &["Foo", "foo"])]
    #[case("foo", &["foo"])]
    #[case("Élan", &["Élan", "élan"])]
    fn test_name_variants(#[case] module: &str, #[case] expected: &[&str]) {
        assert_eq!(name_variants(module), expected);
    }

    #[rstest]
    #[case("src/foo.ml", Some(("Foo", FileKind::Implementation)))]
    #[case("foo_bar.mli", Some(("Foo_bar", FileKind::Interface)))]
    #[case("lib/parser.pp.re", Some(("Parser", FileKind::Implementation)))]
    #[case("README.md", None)]
    #[case(".mli", None)]
    fn test_module_of_file(#[case] file: &str, #[case] expected: Option<(&str, FileKind)>) {
        let suffixes = [SuffixPair::new(".ml", ".mli"), SuffixPair::new(".re", ".rei")];

        let actual = module_of_file(Path::new(file), &suffixes);
        let actual = actual.as_ref().map(|(name, kind)| (name.as_str(), *kind));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_find_artifact_search_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(second.join("Foo.cmt"), "").unwrap();
        fs::write(first.join("foo.cmt"), "").unwrap();
        fs::write(second.join("foo.cmti"), "").unwrap();

        let config = ProjectConfig::new(dir.path().join("main.ml"))
            .with_artifact_dir(&first)
            .with_artifact_dir(&second);

        assert_eq!(
            find_artifact(&config, "Foo", FileKind::Implementation),
            Some(first.join("foo.cmt"))
        );
        assert_eq!(
            find_artifact(&config, "Foo", FileKind::Interface),
            Some(second.join("foo.cmti"))
        );
        assert_eq!(find_artifact(&config, "Bar", FileKind::Implementation), None);
    }
}
