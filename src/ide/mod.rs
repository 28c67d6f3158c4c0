//! IDE features: definition location and documentation.
//!
//! This module turns what the editor knows (an identifier under the cursor
//! and the live environment around it) into declaration positions.
//!
//! ## Design Principles
//!
//! 1. **Per-call state**: Everything mutable lives in a [`Session`] created
//!    for one call and dropped when it returns
//! 2. **Tagged outcomes**: Every stage reports what it found; only unbound
//!    names, missing files and ties reach the caller as errors
//! 3. **No editor types**: Callers convert [`Located`] at their boundary
//!
//! ## Usage
//!
//! ```ignore
//! use locus::ide::{Engine, Mode, Query};
//! use locus::project::ProjectConfig;
//!
//! let engine = Engine::new(ProjectConfig::load(".locus".as_ref(), "src/main.ml")?);
//! let located = engine.locate(&env, &Query::ident(path, context), Mode::default())?;
//! ```

mod documentation;
mod engine;
mod locate;
mod session;

pub use documentation::{Documentation, find_doc_comment};
pub use engine::Engine;
pub use locate::{LocateError, Located, Mode, NamespaceHint, Query};
pub use session::{Session, Visited};
