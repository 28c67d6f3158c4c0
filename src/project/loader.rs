//! Loads a [`ProjectConfig`] from a line-oriented project file.
//!
//! ```text
//! # comment
//! S src
//! B _build/default/src/.main.objs/byte
//! SUFFIX .mly .mli
//! ```
//!
//! Relative directories are resolved against the project file's directory.
//! A directory argument runs to the end of the line, so it may contain spaces.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::config::{ProjectConfig, SuffixPair};

/// Failure to load a project file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read project file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: unknown directive `{directive}`", .path.display())]
    UnknownDirective {
        path: PathBuf,
        line: usize,
        directive: String,
    },

    #[error("{}:{line}: `{directive}` expects {expected} argument(s)", .path.display())]
    BadArguments {
        path: PathBuf,
        line: usize,
        directive: String,
        expected: usize,
    },
}

impl ProjectConfig {
    /// Read the project file at `dot_file` for editing `current_file`.
    ///
    /// Directories and suffix pairs are appended after the defaults, in file
    /// order, skipping duplicates.
    pub fn load(dot_file: &Path, current_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: dot_file.to_path_buf(),
            source,
        };
        let base = std::path::absolute(dot_file)
            .map_err(io_error)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let text = fs::read_to_string(dot_file).map_err(io_error)?;

        let mut config = ProjectConfig::new(current_file);
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (directive, rest) = line
                .split_once(char::is_whitespace)
                .map_or((line, ""), |(directive, rest)| (directive, rest.trim()));
            let bad_arguments = |expected| ConfigError::BadArguments {
                path: dot_file.to_path_buf(),
                line: index + 1,
                directive: directive.to_string(),
                expected,
            };

            match directive {
                "S" | "B" => {
                    if rest.is_empty() {
                        return Err(bad_arguments(1));
                    }
                    let dir = base.join(rest);
                    if directive == "S" {
                        config.push_unique_source(dir);
                    } else {
                        config.push_unique_artifact(dir);
                    }
                }
                "SUFFIX" => {
                    let args: Vec<&str> = rest.split_whitespace().collect();
                    let [implementation, interface] = args.as_slice() else {
                        return Err(bad_arguments(2));
                    };
                    config.push_unique_suffix(SuffixPair::new(*implementation, *interface));
                }
                _ => {
                    return Err(ConfigError::UnknownDirective {
                        path: dot_file.to_path_buf(),
                        line: index + 1,
                        directive: directive.to_string(),
                    });
                }
            }
        }

        debug!(
            file = %dot_file.display(),
            sources = config.source_path().len(),
            artifacts = config.artifact_path().len(),
            "loaded project file"
        );
        Ok(config)
    }
}
