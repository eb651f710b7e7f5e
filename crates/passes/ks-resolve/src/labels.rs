//! Break/continue resolution against loop markers

use crate::error::ResolveError;
use ks_ast::{Ast, GotoKind, GotoTarget, NodeId, NodeKind, SymbolId, SymbolKind};
use ks_intern::Interner;
use ks_span::FileSpan;

/// Bind a break/continue to its target marker
///
/// Implicit gotos bind to the nearest enclosing loop: continue to its pre
/// marker, break to its post marker; no enclosing loop is fatal. Labeled
/// gotos search every label declared within the enclosing routine — a full
/// subtree scan, not lexical lookup — and bind to the first match; a miss
/// is left for the later undeclared-name check. Returns whether the goto
/// was bound.
pub fn resolve_goto(
    ast: &mut Ast,
    interner: &Interner,
    node: NodeId,
) -> Result<bool, ResolveError> {
    let NodeKind::Goto { kind, target } = ast.nodes[node].kind else {
        return Ok(false);
    };

    match target {
        GotoTarget::Resolved(_) => Ok(false),
        GotoTarget::Implicit => {
            let site = ast.nodes[node].span;
            let Some(enclosing) = find_outer_loop(ast, node) else {
                return Err(ResolveError::GotoOutsideLoop { site });
            };
            let NodeKind::Loop { pre, post, .. } = ast.nodes[enclosing].kind else {
                return Err(ResolveError::GotoOutsideLoop { site });
            };
            let marker = marker_for(kind, pre, post, site)?;
            ast.nodes[node].kind = NodeKind::Goto {
                kind,
                target: GotoTarget::Resolved(marker),
            };
            Ok(true)
        }
        GotoTarget::Named(label) => {
            // Break targets live under a synthesized name.
            let wanted = match kind {
                GotoKind::Break => {
                    let text = interner.resolve(&label);
                    interner.intern(&format!("post_{text}"))
                }
                GotoKind::Continue | GotoKind::Jump => label,
            };
            let routine = enclosing_routine(ast, node);
            match find_label(ast, routine, wanted) {
                Some(target_sym) => {
                    ast.nodes[node].kind = NodeKind::Goto {
                        kind,
                        target: GotoTarget::Resolved(target_sym),
                    };
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}

/// Nearest enclosing loop, walking parent links upward from `from`
fn find_outer_loop(ast: &Ast, from: NodeId) -> Option<NodeId> {
    let mut current = Some(from);
    while let Some(id) = current {
        if matches!(ast.nodes[id].kind, NodeKind::Loop { .. }) {
            return Some(id);
        }
        current = ast.nodes[id].parent;
    }
    None
}

fn marker_for(
    kind: GotoKind,
    pre: SymbolId,
    post: SymbolId,
    site: FileSpan,
) -> Result<SymbolId, ResolveError> {
    match kind {
        GotoKind::Break => Ok(post),
        GotoKind::Continue => Ok(pre),
        // Direct jumps are emitted by later lowering stages only.
        GotoKind::Jump => Err(ResolveError::UnexpectedGotoKind { site }),
    }
}

/// Nearest enclosing routine: the first function on the owner chain, or
/// the owning module for module-level code
fn enclosing_routine(ast: &Ast, node: NodeId) -> Option<SymbolId> {
    let mut current = ast.nodes[node].owner;
    let mut module = None;
    while let Some(s) = current {
        match ast.symbols[s].kind {
            SymbolKind::Function(_) => return Some(s),
            SymbolKind::Module { .. } => module = module.or(Some(s)),
            _ => {}
        }
        current = ast.symbols[s].defined_in;
    }
    module
}

/// Scan the routine's entire subtree for a label named `wanted`
///
/// Both loop markers and standalone label declarations count. Nodes are
/// visited in creation order, so the first match is the first declaration.
fn find_label(ast: &Ast, routine: Option<SymbolId>, wanted: ks_intern::Symbol) -> Option<SymbolId> {
    for (id, node) in ast.nodes.iter() {
        if let Some(r) = routine {
            if !owned_by(ast, id, r) {
                continue;
            }
        }
        match node.kind {
            NodeKind::Loop { pre, post, .. } => {
                if ast.symbols[pre].name == wanted {
                    return Some(pre);
                }
                if ast.symbols[post].name == wanted {
                    return Some(post);
                }
            }
            NodeKind::Decl { symbol, .. } => {
                if matches!(ast.symbols[symbol].kind, SymbolKind::Label)
                    && ast.symbols[symbol].name == wanted
                {
                    return Some(symbol);
                }
            }
            _ => {}
        }
    }
    None
}

fn owned_by(ast: &Ast, node: NodeId, routine: SymbolId) -> bool {
    let mut current = ast.nodes[node].owner;
    while let Some(s) = current {
        if s == routine {
            return true;
        }
        current = ast.symbols[s].defined_in;
    }
    false
}
