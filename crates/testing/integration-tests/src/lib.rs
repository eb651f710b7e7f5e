//! Integration test utilities for the Kestrel scope resolver

use ks_ast::{Ast, FunctionSym, NodeId, NodeKind, ScopeId, SymbolId, SymbolKind, TypeId};
use ks_intern::Interner;
use ks_span::FileSpan;

/// Test fixture wrapping a tree under construction
pub struct TestFixture {
    /// Interner shared by every name in the fixture
    pub interner: Interner,
    /// The tree being assembled
    pub ast: Ast,
}

impl TestFixture {
    /// Creates a new fixture with an empty tree
    #[must_use]
    pub fn new() -> Self {
        let interner = Interner::new();
        let ast = Ast::new(&interner);
        Self { interner, ast }
    }

    /// Adds a module and returns its symbol with its top-level scope
    pub fn module(&mut self, name: &str) -> (SymbolId, ScopeId) {
        let sym = self.ast.new_module(self.interner.intern(name), self.span());
        let SymbolKind::Module { scope } = self.ast.symbols[sym].kind else {
            unreachable!("new_module builds a module symbol");
        };
        (sym, scope)
    }

    /// Adds a free function to `scope` and returns its symbol and body scope
    pub fn function(
        &mut self,
        name: &str,
        scope: ScopeId,
        owner: SymbolId,
    ) -> (SymbolId, ScopeId) {
        self.ast.new_function(
            self.interner.intern(name),
            FunctionSym::free(),
            scope,
            Some(owner),
            self.span(),
        )
    }

    /// Adds a method on `ty`, wiring up a typed receiver named `this`
    ///
    /// The receiver type is set directly rather than through a declared
    /// type expression, matching a tree where receiver registration has
    /// already run.
    pub fn method(&mut self, name: &str, ty: TypeId, scope: ScopeId) -> (SymbolId, ScopeId) {
        let fn_scope = self
            .ast
            .scopes
            .create_child(scope, ks_ast::ScopeKind::Function);
        let receiver = self.ast.alloc_symbol(
            self.interner.intern("this"),
            SymbolKind::Variable { is_type: false },
            fn_scope,
            None,
            self.span(),
        );
        let method = self.ast.new_symbol(
            self.interner.intern(name),
            SymbolKind::Function(FunctionSym::method(receiver)),
            scope,
            None,
            self.span(),
        );
        self.ast.symbols[receiver].defined_in = Some(method);
        self.ast.symbols[receiver].ty = Some(ty);
        self.ast.add_method(ty, method);
        (method, fn_scope)
    }

    /// Adds a variable symbol to `scope`
    pub fn variable(&mut self, name: &str, scope: ScopeId, owner: SymbolId) -> SymbolId {
        self.ast.new_symbol(
            self.interner.intern(name),
            SymbolKind::Variable { is_type: false },
            scope,
            Some(owner),
            self.span(),
        )
    }

    /// Adds an unresolved name reference
    pub fn name(&mut self, name: &str, scope: ScopeId, owner: SymbolId) -> NodeId {
        self.ast
            .name_ref(self.interner.intern(name), scope, Some(owner), self.span())
    }

    /// Adds a member selector node
    pub fn member(&mut self, name: &str, scope: ScopeId, owner: SymbolId) -> NodeId {
        self.ast.alloc(
            NodeKind::Member(self.interner.intern(name)),
            scope,
            Some(owner),
            self.span(),
        )
    }

    /// A synthetic span for fixture nodes
    #[must_use]
    pub fn span(&self) -> FileSpan {
        FileSpan::synthetic()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
