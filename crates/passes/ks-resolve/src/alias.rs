//! Function-local type alias inlining

use crate::error::ResolveError;
use ks_ast::{Ast, NameRef, NodeId, NodeKind, SymbolId, SymbolKind};

/// Whether a symbol is a function-local type alias
///
/// A symbol qualifies iff it is a type-valued variable whose enclosing
/// symbol is a function — type-valued declarations at class or module
/// level are ordinary type fields, not aliases.
pub fn is_type_alias(ast: &Ast, sym: SymbolId) -> bool {
    if !matches!(ast.symbols[sym].kind, SymbolKind::Variable { is_type: true }) {
        return false;
    }
    ast.symbols[sym]
        .defined_in
        .is_some_and(|parent| matches!(ast.symbols[parent].kind, SymbolKind::Function(_)))
}

/// Splice a deep copy of the alias's initializer over a reference to it
///
/// The copy's internal node references are remapped consistently, then
/// exactly the freshly created nodes are scanned for references already
/// resolved to another alias. Any hit is a fatal recursive-alias
/// diagnostic. This is a one-hop check: mutual aliases are only caught
/// when the substituted copy itself still carries a resolved alias
/// reference.
pub fn inline_alias(ast: &mut Ast, site: NodeId, alias: SymbolId) -> Result<NodeId, ResolveError> {
    let Some(decl) = ast.symbols[alias].decl else {
        return Ok(site);
    };
    let NodeKind::Decl { init: Some(init), .. } = ast.nodes[decl].kind else {
        return Ok(site);
    };

    let (copy, map) = ast.deep_copy(init);

    for &fresh in map.values() {
        if let NodeKind::Name(NameRef::Resolved(inner)) = ast.nodes[fresh].kind {
            if is_type_alias(ast, inner) {
                return Err(ResolveError::RecursiveAlias {
                    name: ast.symbols[inner].name,
                    site: ast.nodes[fresh].span,
                });
            }
        }
    }

    Ok(ast.replace(site, copy))
}

/// Delete every remaining alias declaration after the main sweep
///
/// No alias symbol survives scope resolution; every reference has been
/// inlined by now, so the declarations themselves are dead.
pub fn purge_alias_decls(ast: &mut Ast) -> usize {
    let mut removed = 0;
    for id in ast.node_ids() {
        if let NodeKind::Decl { symbol, .. } = ast.nodes[id].kind {
            if is_type_alias(ast, symbol) {
                ast.remove(id);
                removed += 1;
            }
        }
    }
    removed
}
