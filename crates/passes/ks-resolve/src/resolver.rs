//! Pass driver: orders the individual rewrites over one tree

use crate::alias::{inline_alias, is_type_alias, purge_alias_decls};
use crate::error::ResolveError;
use crate::labels::resolve_goto;
use crate::lookup::{first_non_method, lookup};
use crate::qualified::{resolve_enum_dots, rewrite_module_dot};
use crate::receiver::apply_implicit_receiver;
use ks_ast::{Ast, NameRef, NodeId, NodeKind, SymbolId, SymbolKind};
use ks_intern::{Interner, Symbol};

/// Counters reported once the pass finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Bare names linked to a declaration
    pub names_resolved: usize,
    /// Alias uses replaced by a copy of the aliased expression
    pub aliases_inlined: usize,
    /// Alias declarations deleted after inlining
    pub alias_decls_removed: usize,
    /// `Module.name` dots collapsed to direct references
    pub module_dots_rewritten: usize,
    /// Bare names turned into explicit receiver chains
    pub receiver_chains: usize,
    /// Break/continue constructs bound to loop markers
    pub gotos_bound: usize,
    /// `EnumType.constant` dots collapsed to constant references
    pub enum_members_resolved: usize,
}

/// Runs scope resolution over a whole tree
///
/// The pass registers method receivers first, then sweeps every node,
/// then resolves enum member access, and finally deletes consumed alias
/// declarations. The ordering matters: module-prefixed dots must collapse
/// before the enum sweep can see a resolved type on the left of a dot,
/// and aliases must all be inlined before their declarations go away.
pub struct ScopeResolver<'a> {
    ast: &'a mut Ast,
    interner: &'a Interner,
    stats: ResolveStats,
}

impl<'a> ScopeResolver<'a> {
    /// Resolve every name, goto, and qualified access in `ast`
    ///
    /// Stops at the first fatal diagnostic; the tree may be partially
    /// rewritten when an error is returned.
    pub fn resolve(ast: &'a mut Ast, interner: &'a Interner) -> Result<ResolveStats, ResolveError> {
        let mut resolver = Self {
            ast,
            interner,
            stats: ResolveStats::default(),
        };
        resolver.run()?;
        Ok(resolver.stats)
    }

    fn run(&mut self) -> Result<(), ResolveError> {
        self.register_method_receivers();

        // Snapshot up front; rewrites allocate replacement nodes that must
        // not be revisited by this sweep.
        for id in self.ast.node_ids() {
            match self.ast.nodes[id].kind {
                NodeKind::Removed => {}
                NodeKind::Dot { .. } => {
                    if rewrite_module_dot(self.ast, id).is_some() {
                        self.stats.module_dots_rewritten += 1;
                    }
                }
                NodeKind::Name(NameRef::Unresolved(name)) => {
                    if self.ast.nodes[id].owner.is_some() {
                        self.resolve_name(id, name)?;
                    }
                }
                NodeKind::Goto { .. } => {
                    if resolve_goto(self.ast, self.interner, id)? {
                        self.stats.gotos_bound += 1;
                    }
                }
                _ => {}
            }
        }

        self.stats.enum_members_resolved = resolve_enum_dots(self.ast)?;
        self.stats.alias_decls_removed = purge_alias_decls(self.ast);

        tracing::debug!(
            names = self.stats.names_resolved,
            aliases = self.stats.aliases_inlined,
            module_dots = self.stats.module_dots_rewritten,
            receiver_chains = self.stats.receiver_chains,
            gotos = self.stats.gotos_bound,
            enum_members = self.stats.enum_members_resolved,
            "scope resolution finished"
        );
        Ok(())
    }

    /// Link each method's receiver to its type and register the method
    /// on that type
    ///
    /// The receiver's declared type expression is consumed here; later
    /// sweeps never see it as an unresolved name.
    fn register_method_receivers(&mut self) {
        for method in self.ast.symbol_ids() {
            let Some(receiver) = self.ast.symbols[method].as_function().and_then(|f| f.receiver)
            else {
                continue;
            };
            if self.ast.symbols[receiver].ty.is_some() {
                continue;
            }
            let Some(decl) = self.ast.symbols[receiver].decl else {
                continue;
            };
            let NodeKind::Decl {
                ty_expr: Some(ty_expr),
                ..
            } = self.ast.nodes[decl].kind
            else {
                continue;
            };
            let NodeKind::Name(name_ref) = self.ast.nodes[ty_expr].kind else {
                continue;
            };

            let type_sym = match name_ref {
                NameRef::Resolved(sym) => Some(sym),
                NameRef::Unresolved(name) => {
                    let scope = self.ast.nodes[ty_expr].scope;
                    lookup(self.ast, scope, name, true)
                        .into_iter()
                        .find(|&c| self.ast.symbols[c].denoted_type().is_some())
                }
            };
            let Some(ty) = type_sym.and_then(|sym| self.ast.symbols[sym].denoted_type()) else {
                continue;
            };

            self.ast.symbols[receiver].ty = Some(ty);
            self.ast.add_method(ty, method);
            self.ast.remove(ty_expr);
        }
    }

    /// Resolve one bare unresolved name
    fn resolve_name(&mut self, node: NodeId, name: Symbol) -> Result<(), ResolveError> {
        let scope = self.ast.nodes[node].scope;
        let candidates = lookup(self.ast, scope, name, true);

        // A paren-less function anywhere in the overload set turns the
        // bare mention into a zero-argument call.
        let paren_less = candidates.iter().copied().find(|&c| {
            self.ast.symbols[c]
                .as_function()
                .is_some_and(|f| f.no_parens && !f.is_method)
        });
        if let Some(target) = paren_less {
            let owner = self.ast.nodes[node].owner;
            let span = self.ast.nodes[node].span;
            let callee = self.ast.resolved_ref(target, scope, owner, span);
            let call = self.ast.alloc(
                NodeKind::Call {
                    callee,
                    args: Vec::new(),
                },
                scope,
                owner,
                span,
            );
            self.ast.replace(node, call);
            self.stats.names_resolved += 1;
            return Ok(());
        }

        let candidate = first_non_method(self.ast, &candidates);

        if let Some(sym) = candidate {
            if !matches!(self.ast.symbols[sym].kind, SymbolKind::Function(_)) {
                if is_type_alias(self.ast, sym) {
                    // An alias with no initializer cannot be inlined;
                    // the mention stays textual rather than binding the
                    // alias symbol itself, which never survives the pass.
                    let site = inline_alias(self.ast, node, sym)?;
                    if site != node {
                        self.stats.aliases_inlined += 1;
                    }
                    return Ok(());
                }
                self.ast.nodes[node].kind = NodeKind::Name(NameRef::Resolved(sym));
                self.stats.names_resolved += 1;
                // A field mention inside a method still needs its
                // receiver chain even though the name itself resolved.
                if apply_implicit_receiver(self.ast, self.interner, node, name, candidate).is_some()
                {
                    self.stats.receiver_chains += 1;
                }
                return Ok(());
            }
        }

        if apply_implicit_receiver(self.ast, self.interner, node, name, candidate).is_some() {
            self.stats.receiver_chains += 1;
            self.stats.names_resolved += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ks_ast::{FunctionSym, GotoKind, GotoTarget};
    use ks_span::FileSpan;

    fn span() -> FileSpan {
        FileSpan::synthetic()
    }

    fn module_scope(ast: &Ast, module: SymbolId) -> ks_ast::ScopeId {
        let SymbolKind::Module { scope } = ast.symbols[module].kind else {
            panic!("not a module symbol");
        };
        scope
    }

    #[test]
    fn test_bare_variable_resolves_in_place() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);

        let x = ast.new_symbol(
            interner.intern("x"),
            SymbolKind::Variable { is_type: false },
            scope,
            Some(module),
            span(),
        );
        let use_x = ast.name_ref(interner.intern("x"), scope, Some(module), span());

        let stats = ScopeResolver::resolve(&mut ast, &interner).unwrap();

        assert_eq!(stats.names_resolved, 1);
        assert!(matches!(
            ast.nodes[use_x].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == x
        ));
    }

    #[test]
    fn test_unknown_name_is_left_unresolved() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);

        let name = interner.intern("ghost");
        let use_ghost = ast.name_ref(name, scope, Some(module), span());

        let stats = ScopeResolver::resolve(&mut ast, &interner).unwrap();

        assert_eq!(stats.names_resolved, 0);
        assert!(matches!(
            ast.nodes[use_ghost].kind,
            NodeKind::Name(NameRef::Unresolved(n)) if n == name
        ));
    }

    #[test]
    fn test_paren_less_function_becomes_zero_arg_call() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);

        let attrs = FunctionSym {
            no_parens: true,
            ..FunctionSym::free()
        };
        let (getter, _) =
            ast.new_function(interner.intern("total"), attrs, scope, Some(module), span());
        let use_total = ast.name_ref(interner.intern("total"), scope, Some(module), span());
        let block = ast.alloc(
            NodeKind::Block {
                body: vec![use_total],
            },
            scope,
            Some(module),
            span(),
        );

        ScopeResolver::resolve(&mut ast, &interner).unwrap();

        let &[call] = ast.children(block).as_slice() else {
            panic!("block should hold exactly the rewritten call");
        };
        let NodeKind::Call { callee, ref args } = ast.nodes[call].kind else {
            panic!("paren-less use should become a call");
        };
        assert!(args.is_empty());
        assert!(matches!(
            ast.nodes[callee].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == getter
        ));
    }

    #[test]
    fn test_paren_less_overload_behind_head_becomes_call() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);
        let name = interner.intern("total");

        // The paren-less overload sits behind a plain function head.
        ast.new_function(name, FunctionSym::free(), scope, Some(module), span());
        let attrs = FunctionSym {
            no_parens: true,
            ..FunctionSym::free()
        };
        let (getter, _) = ast.new_function(name, attrs, scope, Some(module), span());

        let use_total = ast.name_ref(name, scope, Some(module), span());
        let block = ast.alloc(
            NodeKind::Block {
                body: vec![use_total],
            },
            scope,
            Some(module),
            span(),
        );

        ScopeResolver::resolve(&mut ast, &interner).unwrap();

        let &[call] = ast.children(block).as_slice() else {
            panic!("bare mention should be rewritten to a call");
        };
        let NodeKind::Call { callee, ref args } = ast.nodes[call].kind else {
            panic!("expected a zero-argument call");
        };
        assert!(args.is_empty());
        assert!(matches!(
            ast.nodes[callee].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == getter
        ));
    }

    #[test]
    fn test_alias_without_initializer_stays_textual() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);
        let (function, fn_scope) = ast.new_function(
            interner.intern("f"),
            FunctionSym::free(),
            scope,
            Some(module),
            span(),
        );

        // Alias symbol with no declaration node at all
        let name = interner.intern("t");
        ast.new_symbol(
            name,
            SymbolKind::Variable { is_type: true },
            fn_scope,
            Some(function),
            span(),
        );
        let use_t = ast.name_ref(name, fn_scope, Some(function), span());

        let stats = ScopeResolver::resolve(&mut ast, &interner).unwrap();

        assert_eq!(stats.names_resolved, 0);
        assert_eq!(stats.aliases_inlined, 0);
        assert!(matches!(
            ast.nodes[use_t].kind,
            NodeKind::Name(NameRef::Unresolved(n)) if n == name
        ));
    }

    #[test]
    fn test_receiver_registration_consumes_type_expr() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);

        let (_, class_ty) = ast.new_structural(
            interner.intern("C"),
            false,
            scope,
            Some(module),
            None,
            span(),
        );
        let (method, fn_scope) = ast.new_function(
            interner.intern("describe"),
            FunctionSym {
                is_method: true,
                receiver: None,
                no_parens: false,
            },
            scope,
            Some(module),
            span(),
        );
        let receiver = ast.new_symbol(
            interner.intern("this"),
            SymbolKind::Variable { is_type: false },
            fn_scope,
            Some(method),
            span(),
        );
        if let SymbolKind::Function(ref mut attrs) = ast.symbols[method].kind {
            attrs.receiver = Some(receiver);
        }
        let ty_expr = ast.name_ref(interner.intern("C"), fn_scope, Some(method), span());
        let decl = ast.alloc(
            NodeKind::Decl {
                symbol: receiver,
                ty_expr: Some(ty_expr),
                init: None,
            },
            fn_scope,
            Some(method),
            span(),
        );
        ast.symbols[receiver].decl = Some(decl);

        ScopeResolver::resolve(&mut ast, &interner).unwrap();

        assert_eq!(ast.symbols[receiver].ty, Some(class_ty));
        assert!(ast.types[class_ty]
            .structural()
            .is_some_and(|shape| shape.methods.contains(&method)));
        assert!(matches!(ast.nodes[ty_expr].kind, NodeKind::Removed));
        assert!(matches!(
            ast.nodes[decl].kind,
            NodeKind::Decl { ty_expr: None, .. }
        ));
    }

    #[test]
    fn test_goto_outside_loop_aborts_the_pass() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);

        ast.alloc(
            NodeKind::Goto {
                kind: GotoKind::Break,
                target: GotoTarget::Implicit,
            },
            scope,
            Some(module),
            span(),
        );

        let error = ScopeResolver::resolve(&mut ast, &interner).unwrap_err();
        assert!(matches!(error, ResolveError::GotoOutsideLoop { .. }));
    }

    #[test]
    fn test_alias_declarations_are_purged_after_inlining() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let module = ast.new_module(interner.intern("M"), span());
        let scope = module_scope(&ast, module);

        let (function, fn_scope) = ast.new_function(
            interner.intern("f"),
            FunctionSym::free(),
            scope,
            Some(module),
            span(),
        );
        let (int_sym, _) = ast.new_structural(
            interner.intern("int"),
            true,
            scope,
            Some(module),
            None,
            span(),
        );

        let alias = ast.new_symbol(
            interner.intern("t"),
            SymbolKind::Variable { is_type: true },
            fn_scope,
            Some(function),
            span(),
        );
        let init = ast.resolved_ref(int_sym, fn_scope, Some(function), span());
        let decl = ast.alloc(
            NodeKind::Decl {
                symbol: alias,
                ty_expr: None,
                init: Some(init),
            },
            fn_scope,
            Some(function),
            span(),
        );
        ast.symbols[alias].decl = Some(decl);

        let use_t = ast.name_ref(interner.intern("t"), fn_scope, Some(function), span());
        let body = ast.alloc(
            NodeKind::Block {
                body: vec![decl, use_t],
            },
            fn_scope,
            Some(function),
            span(),
        );

        let stats = ScopeResolver::resolve(&mut ast, &interner).unwrap();

        assert_eq!(stats.aliases_inlined, 1);
        assert_eq!(stats.alias_decls_removed, 1);
        assert!(matches!(ast.nodes[decl].kind, NodeKind::Removed));
        let &[inlined] = ast.children(body).as_slice() else {
            panic!("only the inlined use should remain in the body");
        };
        assert!(matches!(
            ast.nodes[inlined].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == int_sym
        ));
    }

    #[test]
    fn test_module_dot_collapses_before_plain_names() {
        let interner = Interner::new();
        let mut ast = Ast::new(&interner);
        let outer = ast.new_module(interner.intern("Main"), span());
        let library = ast.new_module(interner.intern("Lib"), span());
        let lib_scope = module_scope(&ast, library);
        let main_scope = module_scope(&ast, outer);

        let item = ast.new_symbol(
            interner.intern("item"),
            SymbolKind::Variable { is_type: false },
            lib_scope,
            Some(library),
            span(),
        );

        let lhs = ast.resolved_ref(library, main_scope, Some(outer), span());
        let rhs = ast.alloc(
            NodeKind::Member(interner.intern("item")),
            main_scope,
            Some(outer),
            span(),
        );
        let dot = ast.alloc(NodeKind::Dot { lhs, rhs }, main_scope, Some(outer), span());
        let block = ast.alloc(
            NodeKind::Block { body: vec![dot] },
            main_scope,
            Some(outer),
            span(),
        );

        let stats = ScopeResolver::resolve(&mut ast, &interner).unwrap();

        assert_eq!(stats.module_dots_rewritten, 1);
        let &[resolved] = ast.children(block).as_slice() else {
            panic!("dot should collapse to a single reference");
        };
        assert!(matches!(
            ast.nodes[resolved].kind,
            NodeKind::Name(NameRef::Resolved(s)) if s == item
        ));
    }
}
