//! Namespace-aware lookup of dotted identifiers.
//!
//! The same text can denote different things depending on where it
//! appears: `Some` is a constructor in an expression but could be a module
//! in a path, `t` is a type after a colon but a value elsewhere. Lookup
//! tries an ordered list of namespaces and stops at the first hit.

use tracing::trace;

use super::env::{EnvEntry, Environment, Namespace, SyntacticContext};
use super::ids::Uid;
use crate::base::IdentPath;

impl Namespace {
    /// Ordered namespaces to try for `path` seen in `context`.
    pub fn candidates(path: &IdentPath, context: SyntacticContext) -> Vec<Namespace> {
        use Namespace::*;

        let capitalized = path.is_capitalized();
        match context {
            SyntacticContext::Expression if capitalized => vec![Constructor, Module],
            SyntacticContext::Expression => vec![Value, Label],
            SyntacticContext::Pattern if capitalized => vec![Constructor, Module],
            SyntacticContext::Pattern => vec![Value],
            SyntacticContext::TypeExpr if capitalized => vec![Module, ModuleType],
            SyntacticContext::TypeExpr => vec![Type],
            SyntacticContext::ModuleExpr => vec![Module, ModuleType],
            SyntacticContext::ModuleTypeExpr => vec![ModuleType, Module],
            SyntacticContext::Label => vec![Label, Value],
            SyntacticContext::Unknown if capitalized => vec![Constructor, Module, ModuleType],
            SyntacticContext::Unknown => vec![Value, Type, Label],
        }
    }
}

// ============================================================================
// LOOKUP RESULT
// ============================================================================

/// Result of looking up an identifier in the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Bound to a real declaration.
    Found { entry: EnvEntry, namespace: Namespace },
    /// Bound to a predefined symbol. Carries the identifier text.
    Builtin(String),
    /// No namespace had a binding. Carries the identifier text.
    NotInEnvironment(String),
}

impl LookupOutcome {
    /// Get the entry if found.
    pub fn entry(&self) -> Option<&EnvEntry> {
        match self {
            LookupOutcome::Found { entry, .. } => Some(entry),
            _ => None,
        }
    }

    /// Check if lookup was successful.
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found { .. })
    }
}

/// Look `path` up in each namespace of `candidates`, in order.
///
/// The first hit wins. A hit on a predefined identity is reported as
/// [`LookupOutcome::Builtin`] straight away.
pub fn lookup_ident(
    env: &dyn Environment,
    path: &IdentPath,
    candidates: &[Namespace],
) -> LookupOutcome {
    let hit = candidates
        .iter()
        .find_map(|&namespace| env.lookup(path, namespace).map(|entry| (entry, namespace)));

    match hit {
        Some((entry, _)) if matches!(entry.uid, Uid::Builtin(_)) => {
            trace!(%path, "predefined identifier");
            LookupOutcome::Builtin(path.to_string())
        }
        Some((entry, namespace)) => {
            trace!(%path, %namespace, uid = %entry.uid, "identifier found");
            LookupOutcome::Found { entry, namespace }
        }
        None => {
            trace!(%path, ?candidates, "identifier not in environment");
            LookupOutcome::NotInEnvironment(path.to_string())
        }
    }
}
