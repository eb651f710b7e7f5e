//! Scope lookup with the method-shadowing guard

use ks_ast::{Ast, ScopeId, SymbolId};
use ks_intern::Symbol;

/// Look a name up from a scope, returning the full overload set
///
/// Searches the scope's local table; with `transitive` set, climbs
/// enclosing scopes until the name is found or the root is reached. The
/// result is cloned out so callers can keep mutating the tree while they
/// hold it.
pub fn lookup(ast: &Ast, scope: ScopeId, name: Symbol, transitive: bool) -> Vec<SymbolId> {
    ast.scopes.lookup(scope, name, transitive).to_vec()
}

/// Filter an overload set down to the single symbol a bare name denotes
///
/// Methods must not shadow a same-named free variable or free function
/// visible through the same lookup, so method-kind heads are skipped in
/// favor of the first non-method candidate. When every candidate is a
/// method, the head is still returned — it remains the right answer for
/// method-name matching downstream.
pub fn first_non_method(ast: &Ast, candidates: &[SymbolId]) -> Option<SymbolId> {
    candidates
        .iter()
        .copied()
        .find(|&c| !ast.symbols[c].is_method())
        .or_else(|| candidates.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ks_ast::{FunctionSym, SymbolKind};
    use ks_intern::Interner;
    use ks_span::FileSpan;

    #[test]
    fn test_method_head_skipped_for_free_variable() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let root = ast.scopes.root();
        let name = interner.intern("v");

        let this = ast.alloc_symbol(
            interner.intern("this"),
            SymbolKind::Variable { is_type: false },
            root,
            None,
            FileSpan::synthetic(),
        );
        let method = ast.new_symbol(
            name,
            SymbolKind::Function(FunctionSym::method(this)),
            root,
            None,
            FileSpan::synthetic(),
        );
        let variable = ast.new_symbol(
            name,
            SymbolKind::Variable { is_type: false },
            root,
            None,
            FileSpan::synthetic(),
        );

        let hits = lookup(&ast, root, name, true);
        assert_eq!(hits, vec![method, variable]);
        assert_eq!(first_non_method(&ast, &hits), Some(variable));
    }

    #[test]
    fn test_all_method_candidates_fall_back_to_head() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let root = ast.scopes.root();
        let name = interner.intern("m");

        let this = ast.alloc_symbol(
            interner.intern("this"),
            SymbolKind::Variable { is_type: false },
            root,
            None,
            FileSpan::synthetic(),
        );
        let first = ast.new_symbol(
            name,
            SymbolKind::Function(FunctionSym::method(this)),
            root,
            None,
            FileSpan::synthetic(),
        );
        let second = ast.new_symbol(
            name,
            SymbolKind::Function(FunctionSym::method(this)),
            root,
            None,
            FileSpan::synthetic(),
        );

        let hits = lookup(&ast, root, name, true);
        assert_eq!(hits, vec![first, second]);
        assert_eq!(first_non_method(&ast, &hits), Some(first));
    }

    #[test]
    fn test_missing_name_yields_no_candidates() {
        let interner = Interner::new();
        let ast = Ast::new(&interner);
        let hits = lookup(&ast, ast.scopes.root(), interner.intern("ghost"), true);
        assert!(hits.is_empty());
        assert_eq!(first_non_method(&ast, &hits), None);
    }
}
