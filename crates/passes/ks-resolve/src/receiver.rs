//! Implicit receiver resolution inside methods
//!
//! A bare name used inside a method may denote a field or method reachable
//! through the receiver, or through a chain of enclosing receivers when the
//! method's class is nested inside another. This module decides which, and
//! synthesizes the access chain in place of the bare reference.

use ks_ast::{
    Ast, NameRef, NodeId, NodeKind, ScopeKind, SymbolId, SymbolKind, TypeId,
};
use ks_intern::{Interner, Symbol};

/// Whether `name` matches a method reachable from `ty`
///
/// True if the name matches a method declared directly on the type, on any
/// dispatch parent (depth-first over the inheritance graph), or on a
/// lexically enclosing type. The type's own name never matches — that
/// would collide with constructor-style naming.
pub fn name_matches_method(ast: &Ast, name: Symbol, ty: TypeId) -> bool {
    if ast.types[ty].name() == Some(name) {
        return false;
    }
    let Some(shape) = ast.types[ty].structural() else {
        return false;
    };
    if shape.methods.iter().any(|&m| ast.symbols[m].name == name) {
        return true;
    }
    if shape
        .dispatch_parents
        .iter()
        .any(|&parent| name_matches_method(ast, name, parent))
    {
        return true;
    }
    match shape.outer {
        Some(outer) => name_matches_method(ast, name, outer),
        None => false,
    }
}

/// The local variant of [`name_matches_method`]
///
/// Ignores lexically enclosing types; only the type itself and its
/// dispatch parents are considered. The parent recursion still uses the
/// full test. This variant measures nesting depth precisely: an inherited
/// match at any dispatch depth counts as depth zero.
pub fn name_matches_method_local(ast: &Ast, name: Symbol, ty: TypeId) -> bool {
    if ast.types[ty].name() == Some(name) {
        return false;
    }
    let Some(shape) = ast.types[ty].structural() else {
        return false;
    };
    if shape.methods.iter().any(|&m| ast.symbols[m].name == name) {
        return true;
    }
    shape
        .dispatch_parents
        .iter()
        .any(|&parent| name_matches_method(ast, name, parent))
}

/// Apply implicit `this`/`outer` receivers to a bare reference where needed
///
/// Climbs the reference's owner chain looking for an enclosing method,
/// stopping at the nearest module boundary. The climb also stops early
/// when the plain-lookup `candidate` was declared inside the function
/// currently under examination — a method must not shadow a closer-scoped
/// local. Returns the synthesized chain when one was spliced in.
pub fn apply_implicit_receiver(
    ast: &mut Ast,
    interner: &Interner,
    node: NodeId,
    name: Symbol,
    candidate: Option<SymbolId>,
) -> Option<NodeId> {
    let mut parent = ast.nodes[node].owner;

    while let Some(enclosing) = parent {
        match ast.symbols[enclosing].kind.clone() {
            SymbolKind::Module { .. } => break,
            SymbolKind::Function(function) => {
                if let Some(c) = candidate {
                    if enclosing_function(ast, c) == Some(enclosing) {
                        break;
                    }
                }
                if let Some(receiver) = function.receiver {
                    if is_reference_to(ast, node, receiver) {
                        break;
                    }
                    if let Some(receiver_ty) = ast.symbols[receiver].ty {
                        let field_candidate = candidate.is_some_and(|c| {
                            ast.scopes.get(ast.symbols[c].scope).kind == ScopeKind::Type
                        });
                        if field_candidate || name_matches_method(ast, name, receiver_ty) {
                            if is_marked_method_call(ast, node) {
                                // The call already supplies an explicit
                                // receiver; fall back to ordinary lookup.
                                ast.nodes[node].kind = NodeKind::Name(NameRef::Unresolved(name));
                                return None;
                            }
                            let chain = synthesize_chain(
                                ast,
                                interner,
                                node,
                                name,
                                candidate,
                                receiver,
                                receiver_ty,
                            );
                            return Some(chain);
                        }
                    }
                    break;
                }
                // Non-method enclosing function; keep climbing.
            }
            _ => {}
        }
        parent = ast.symbols[enclosing].defined_in;
    }

    None
}

/// How many lexical-nesting hops separate the receiver's type from the
/// type that first declares `name`
///
/// Inheritance never contributes: the local tests follow dispatch parents
/// themselves, so an ancestor match at any dispatch depth is depth zero.
fn nest_depth(ast: &Ast, name: Symbol, receiver_ty: TypeId) -> usize {
    let mut depth = 0;
    let mut current = Some(receiver_ty);

    if name_matches_method(ast, name, receiver_ty) {
        while let Some(ty) = current {
            if ast.types[ty].structural().is_none() || name_matches_method_local(ast, name, ty) {
                break;
            }
            depth += 1;
            current = ast.types[ty].structural().and_then(|s| s.outer);
        }
    } else {
        while let Some(ty) = current {
            let Some(shape) = ast.types[ty].structural() else {
                break;
            };
            if !ast.scopes.lookup_local(shape.members, name).is_empty() {
                break;
            }
            depth += 1;
            current = shape.outer;
        }
    }

    depth
}

/// Build the `receiver.outer. ... .name` chain and splice it over `node`
fn synthesize_chain(
    ast: &mut Ast,
    interner: &Interner,
    node: NodeId,
    name: Symbol,
    candidate: Option<SymbolId>,
    receiver: SymbolId,
    receiver_ty: TypeId,
) -> NodeId {
    let depth = nest_depth(ast, name, receiver_ty);
    let (scope, owner, span) = {
        let site = &ast.nodes[node];
        (site.scope, site.owner, site.span)
    };
    let outer_name = interner.intern("outer");

    let mut chain = ast.resolved_ref(receiver, scope, owner, span);
    for hop in 0..=depth {
        let rhs = if hop < depth {
            ast.alloc(NodeKind::Member(outer_name), scope, owner, span)
        } else {
            match candidate {
                Some(c) if ast.symbols[c].denoted_type().is_some() => {
                    ast.resolved_ref(c, scope, owner, span)
                }
                _ => ast.alloc(NodeKind::Member(name), scope, owner, span),
            }
        };
        chain = ast.alloc(NodeKind::Dot { lhs: chain, rhs }, scope, owner, span);
    }

    ast.replace(node, chain)
}

/// Nearest function symbol lexically enclosing `sym`
fn enclosing_function(ast: &Ast, sym: SymbolId) -> Option<SymbolId> {
    let mut current = ast.symbols[sym].defined_in;
    while let Some(s) = current {
        if matches!(ast.symbols[s].kind, SymbolKind::Function(_)) {
            return Some(s);
        }
        current = ast.symbols[s].defined_in;
    }
    None
}

fn is_reference_to(ast: &Ast, node: NodeId, sym: SymbolId) -> bool {
    matches!(ast.nodes[node].kind, NodeKind::Name(NameRef::Resolved(s)) if s == sym)
}

/// Whether `node` is the callee of a call whose second actual is the
/// reserved method-invocation marker
fn is_marked_method_call(ast: &Ast, node: NodeId) -> bool {
    let Some(parent) = ast.nodes[node].parent else {
        return false;
    };
    let NodeKind::Call { callee, args } = &ast.nodes[parent].kind else {
        return false;
    };
    *callee == node
        && args.len() >= 2
        && matches!(
            &ast.nodes[args[1]].kind,
            NodeKind::Name(NameRef::Resolved(s)) if *s == ast.method_token
        )
}
