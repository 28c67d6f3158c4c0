//! Documentation comments attached to declarations.

use crate::base::Location;
use crate::hir::Comment;

/// Outcome of a documentation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Documentation {
    /// The comment attached to the declaration.
    Found(String),
    /// The declaration was located but carries no comment.
    NoDocumentation,
    /// Predefined identifier; there is no source to read comments from.
    Builtin(String),
}

/// The comment documenting a declaration at `decl`.
///
/// A comment ending on the declaration's first line, or the line above, and
/// not after its start, is preferred; the closest one wins. Otherwise a
/// comment starting on the declaration's last line, or the line below, and
/// not before its end.
pub fn find_doc_comment<'c>(comments: &'c [Comment], decl: &Location) -> Option<&'c Comment> {
    let before = comments
        .iter()
        .filter(|c| {
            let end = c.location.end;
            end <= decl.start && end.line + 1 >= decl.start.line
        })
        .max_by_key(|c| c.location.end);

    before.or_else(|| {
        comments
            .iter()
            .filter(|c| {
                let start = c.location.start;
                start >= decl.end && start.line <= decl.end.line + 1
            })
            .min_by_key(|c| c.location.start)
    })
}
