//! Module- and enum-qualified dot rewriting

use crate::error::ResolveError;
use ks_ast::{Ast, NameRef, NodeId, NodeKind, SymbolId, SymbolKind, TypeId};

/// Rewrite `module.member` into a direct reference to the member
///
/// Applies when the dot's left operand has already resolved to a module
/// symbol. The member is looked up local-only in the module's flat
/// top-level scope; a miss leaves the dot untouched for the later
/// undeclared-name check. Returns the replacement reference when a
/// rewrite happened.
pub fn rewrite_module_dot(ast: &mut Ast, node: NodeId) -> Option<NodeId> {
    let NodeKind::Dot { lhs, rhs } = ast.nodes[node].kind else {
        return None;
    };
    let NodeKind::Name(NameRef::Resolved(module)) = ast.nodes[lhs].kind else {
        return None;
    };
    let SymbolKind::Module { scope } = ast.symbols[module].kind else {
        return None;
    };
    let NodeKind::Member(member) = ast.nodes[rhs].kind else {
        return None;
    };

    let target = ast.scopes.lookup_local(scope, member).first().copied()?;
    let (site_scope, owner, span) = {
        let site = &ast.nodes[node];
        (site.scope, site.owner, site.span)
    };
    let reference = ast.resolved_ref(target, site_scope, owner, span);
    Some(ast.replace(node, reference))
}

/// Resolve `enumValue.member` across the whole tree
///
/// Runs as a dedicated sweep after the main pass so that left operands
/// already carry their resolved symbols. Constants are scanned in
/// declaration order; the first name match wins. A member no constant
/// declares is fatal.
pub fn resolve_enum_dots(ast: &mut Ast) -> Result<usize, ResolveError> {
    let mut rewritten = 0;

    for id in ast.node_ids() {
        let NodeKind::Dot { lhs, rhs } = ast.nodes[id].kind else {
            continue;
        };
        let NodeKind::Name(NameRef::Resolved(base)) = ast.nodes[lhs].kind else {
            continue;
        };
        let Some(ty) = static_type(ast, base) else {
            continue;
        };
        let Some(constants) = ast.types[ty].as_enum().map(|e| e.constants.clone()) else {
            continue;
        };
        let NodeKind::Member(member) = ast.nodes[rhs].kind else {
            continue;
        };

        let Some(constant) = constants
            .iter()
            .copied()
            .find(|&c| ast.symbols[c].name == member)
        else {
            return Err(ResolveError::UnresolvedEnumMember {
                member,
                site: ast.nodes[id].span,
            });
        };

        let (site_scope, owner, span) = {
            let site = &ast.nodes[id];
            (site.scope, site.owner, site.span)
        };
        let reference = ast.resolved_ref(constant, site_scope, owner, span);
        ast.replace(id, reference);
        rewritten += 1;
    }

    Ok(rewritten)
}

/// The static type a resolved symbol contributes to dot resolution:
/// the denoted type for type symbols, the declared type otherwise
fn static_type(ast: &Ast, sym: SymbolId) -> Option<TypeId> {
    ast.symbols[sym].denoted_type().or(ast.symbols[sym].ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ks_intern::Interner;
    use ks_span::FileSpan;

    fn span() -> FileSpan {
        FileSpan::synthetic()
    }

    #[test]
    fn test_module_dot_becomes_direct_reference() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let root = ast.scopes.root();

        let module = ast.new_module(interner.intern("M"), span());
        let SymbolKind::Module { scope } = ast.symbols[module].kind else {
            unreachable!("new_module builds a module symbol");
        };
        let member_sym = ast.new_symbol(
            interner.intern("x"),
            SymbolKind::Variable { is_type: false },
            scope,
            Some(module),
            span(),
        );

        let lhs = ast.resolved_ref(module, root, None, span());
        let rhs = ast.alloc(NodeKind::Member(interner.intern("x")), root, None, span());
        let dot = ast.alloc(NodeKind::Dot { lhs, rhs }, root, None, span());
        let holder = ast.alloc(NodeKind::Block { body: vec![dot] }, root, None, span());

        let replacement = rewrite_module_dot(&mut ast, dot).unwrap();

        assert_eq!(ast.children(holder), vec![replacement]);
        assert!(matches!(
            ast.nodes[replacement].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == member_sym
        ));
    }

    #[test]
    fn test_unknown_module_member_is_left_alone() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let root = ast.scopes.root();

        let module = ast.new_module(interner.intern("M"), span());
        let lhs = ast.resolved_ref(module, root, None, span());
        let rhs = ast.alloc(NodeKind::Member(interner.intern("ghost")), root, None, span());
        let dot = ast.alloc(NodeKind::Dot { lhs, rhs }, root, None, span());

        assert!(rewrite_module_dot(&mut ast, dot).is_none());
        assert!(matches!(ast.nodes[dot].kind, NodeKind::Dot { .. }));
    }

    #[test]
    fn test_enum_member_resolves_in_declaration_order() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let root = ast.scopes.root();

        let constants = [
            interner.intern("Red"),
            interner.intern("Green"),
            interner.intern("Blue"),
        ];
        let (enum_sym, enum_ty) =
            ast.new_enum(interner.intern("Color"), &constants, root, None, span());

        let lhs = ast.resolved_ref(enum_sym, root, None, span());
        let rhs = ast.alloc(NodeKind::Member(constants[1]), root, None, span());
        let dot = ast.alloc(NodeKind::Dot { lhs, rhs }, root, None, span());
        let holder = ast.alloc(NodeKind::Block { body: vec![dot] }, root, None, span());

        assert_eq!(resolve_enum_dots(&mut ast).unwrap(), 1);

        let expected = ast.types[enum_ty].as_enum().unwrap().constants[1];
        let rewritten = ast.children(holder)[0];
        assert!(matches!(
            ast.nodes[rewritten].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == expected
        ));
    }

    #[test]
    fn test_unknown_enum_member_is_fatal() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let root = ast.scopes.root();

        let constants = [
            interner.intern("Red"),
            interner.intern("Green"),
            interner.intern("Blue"),
        ];
        let (enum_sym, _) =
            ast.new_enum(interner.intern("Color"), &constants, root, None, span());

        let purple = interner.intern("Purple");
        let lhs = ast.resolved_ref(enum_sym, root, None, span());
        let rhs = ast.alloc(NodeKind::Member(purple), root, None, span());
        ast.alloc(NodeKind::Dot { lhs, rhs }, root, None, span());

        let error = resolve_enum_dots(&mut ast).unwrap_err();
        assert_eq!(
            error,
            ResolveError::UnresolvedEnumMember {
                member: purple,
                site: span(),
            }
        );
    }
}
