//! Entry points: locate a declaration, fetch its documentation.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::documentation::{Documentation, find_doc_comment};
use super::locate::{LocateError, Located, Locator, Mode, Query};
use super::session::Session;
use crate::hir::{ArtifactCache, Comment, DEFAULT_FUEL, Environment};
use crate::project::ProjectConfig;

/// Definition-location engine for one project.
///
/// Holds the configuration and the artifact cache. The cache can be shared
/// between engines (and threads); everything else a call needs lives in a
/// [`Session`] created for that call.
#[derive(Debug)]
pub struct Engine {
    config: ProjectConfig,
    cache: Arc<ArtifactCache>,
    fuel: u32,
}

impl Engine {
    /// Engine with a fresh, private artifact cache.
    pub fn new(config: ProjectConfig) -> Self {
        Self::with_cache(config, Arc::new(ArtifactCache::new()))
    }

    /// Engine reading artifacts through a shared cache.
    pub fn with_cache(config: ProjectConfig, cache: Arc<ArtifactCache>) -> Self {
        Self {
            config,
            cache,
            fuel: DEFAULT_FUEL,
        }
    }

    /// Reduction fuel per call.
    pub fn with_fuel(mut self, fuel: u32) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    /// A fresh session for one call.
    pub fn session(&self) -> Session {
        Session::begin(&self.config)
    }

    /// Locate the declaration `query` refers to.
    #[instrument(level = "debug", skip_all, fields(ident = %query, mode = ?mode))]
    pub fn locate(
        &self,
        env: &dyn Environment,
        query: &Query,
        mode: Mode,
    ) -> Result<Located, LocateError> {
        self.locate_in(self.session(), env, query, mode)
    }

    /// Like [`Engine::locate`], within a caller-prepared session (for
    /// example one with an overridden source path). The session is consumed.
    pub fn locate_in(
        &self,
        mut session: Session,
        env: &dyn Environment,
        query: &Query,
        mode: Mode,
    ) -> Result<Located, LocateError> {
        let result = self.locator(env, mode).run(&mut session, query);
        match &result {
            Ok(located) => debug!(?located, "located"),
            Err(err) => debug!(error = %err, "locate failed"),
        }
        result
    }

    /// Documentation comment of the declaration `query` refers to.
    #[instrument(level = "debug", skip_all, fields(ident = %query, mode = ?mode))]
    pub fn documentation(
        &self,
        env: &dyn Environment,
        query: &Query,
        mode: Mode,
    ) -> Result<Documentation, LocateError> {
        let mut session = self.session();
        let (location, owner) = match self.locator(env, mode).run(&mut session, query)? {
            Located::Builtin(text) => return Ok(Documentation::Builtin(text)),
            Located::Found { location, owner } => (location, owner),
        };

        let comments: &[Comment] = match owner.as_deref() {
            Some(owner) if owner != env.current_unit() => session
                .visited()
                .filter(|visited| visited.unit().name() == owner)
                .map(|visited| visited.unit().comments())
                .unwrap_or_default(),
            Some(_) => env.comments(),
            None if location.file() == self.config.current_file() => env.comments(),
            None => &[],
        };

        Ok(match find_doc_comment(comments, &location) {
            Some(comment) => Documentation::Found(comment.text.trim().to_string()),
            None => {
                debug!(%location, "no documentation comment");
                Documentation::NoDocumentation
            }
        })
    }

    fn locator<'a>(&'a self, env: &'a dyn Environment, mode: Mode) -> Locator<'a> {
        Locator {
            config: &self.config,
            cache: &self.cache,
            env,
            fuel: self.fuel,
            mode,
        }
    }
}
