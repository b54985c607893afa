//! Compilation of the scope tree into output fragments
//!
//! A depth-first walk over a scope's processed statements, in document
//! order. Sibling suppression implements branch chains: once a scope with a
//! non-empty skip set is emitted, subsequent sibling scopes whose opener
//! kind is in that set are passed over. Emitting any other sibling replaces
//! the active set, so each chain suppresses only its own tail.

use crate::{
    parser::{ScopeId, ScopeNode, Statement},
    tag::TagKind,
};

/// Compile a scope subtree into its ordered output fragments
pub(crate) fn compile(arena: &[ScopeNode], scope: ScopeId) -> Vec<String> {
    let mut fragments = Vec::new();
    compile_into(arena, scope, &mut fragments);
    fragments
}

/// Compile a scope subtree and concatenate it (used by `capture`)
pub(crate) fn compile_to_string(arena: &[ScopeNode], scope: ScopeId) -> String {
    compile(arena, scope).concat()
}

fn compile_into(
    arena: &[ScopeNode],
    scope: ScopeId,
    fragments: &mut Vec<String>,
) {
    let mut active_skip: &[TagKind] = &[];
    for statement in &arena[scope].statements {
        match statement {
            Statement::Output(text) => fragments.push(text.clone()),
            Statement::Scope(child) => {
                let kind =
                    arena[*child].opener.as_ref().map(|tag| tag.spec.kind);
                if arena[*child].suppressed
                    || kind.is_some_and(|kind| active_skip.contains(&kind))
                {
                    // Suppressed by an earlier sibling; keep the set active
                    // for the rest of the chain
                    continue;
                }
                compile_into(arena, *child, fragments);
                active_skip = arena[*child].skip_kinds;
            }
        }
    }
}
