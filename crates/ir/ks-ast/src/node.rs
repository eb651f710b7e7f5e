//! Tree nodes and the `Ast` container

use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::symbol::{FunctionSym, SymbolData, SymbolId, SymbolKind};
use crate::types::{EnumType, StructuralType, TypeData, TypeId, TypeKind};
use ks_intern::{Interner, Symbol};
use ks_span::FileSpan;
use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;

/// Unique identifier for a tree node
pub type NodeId = Idx<Node>;

/// A node in the tree
#[derive(Debug, Clone)]
pub struct Node {
    /// The variant payload
    pub kind: NodeKind,
    /// Parent node; a non-owning back-reference for upward walks
    pub parent: Option<NodeId>,
    /// Enclosing function or module symbol
    pub owner: Option<SymbolId>,
    /// Enclosing lexical scope
    pub scope: ScopeId,
    /// Source location
    pub span: FileSpan,
}

/// Node kinds
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A name reference, textual until resolution links it to a symbol
    Name(NameRef),
    /// A member-name selector, the right operand of a dot
    Member(Symbol),
    /// Binary dot expression `lhs.rhs`
    Dot {
        /// Left operand
        lhs: NodeId,
        /// Right operand
        rhs: NodeId,
    },
    /// Call expression
    Call {
        /// Callee expression
        callee: NodeId,
        /// Actual arguments
        args: Vec<NodeId>,
    },
    /// Statement block
    Block {
        /// Statements in order
        body: Vec<NodeId>,
    },
    /// Loop construct with synthetic jump markers
    Loop {
        /// User label, if the loop is labeled
        label: Option<Symbol>,
        /// Continue target (condition re-check point)
        pre: SymbolId,
        /// Break target (exit point)
        post: SymbolId,
        /// Loop body
        body: NodeId,
    },
    /// Break/continue construct
    Goto {
        /// Which control transfer this is
        kind: GotoKind,
        /// Jump target, textual or resolved
        target: GotoTarget,
    },
    /// Declaration of a symbol, with optional type expression and initializer
    Decl {
        /// The declared symbol
        symbol: SymbolId,
        /// Declared type expression, consumed when resolved
        ty_expr: Option<NodeId>,
        /// Initializer expression
        init: Option<NodeId>,
    },
    /// Tombstone left behind by a splice or delete
    Removed,
}

/// State of a name reference; resolution is a one-way transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRef {
    /// Textual name, not yet linked
    Unresolved(Symbol),
    /// Direct link to the denoted declaration
    Resolved(SymbolId),
}

/// Kind of control transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoKind {
    /// `break`, targeting a loop's post marker
    Break,
    /// `continue`, targeting a loop's pre marker
    Continue,
    /// Direct jump emitted by later lowering stages; must not reach
    /// scope resolution
    Jump,
}

/// Target of a goto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoTarget {
    /// No label; binds to the nearest enclosing loop
    Implicit,
    /// Labeled; binds to a matching label in the enclosing routine
    Named(Symbol),
    /// Bound to a marker or label symbol
    Resolved(SymbolId),
}

/// The tree for one compilation unit, together with its symbols, types,
/// and scopes
///
/// Upstream construction tags every node with scope and owner; the
/// builder methods here maintain parent links as nodes are assembled.
#[derive(Debug)]
pub struct Ast {
    /// All nodes
    pub nodes: Arena<Node>,
    /// All declarations
    pub symbols: Arena<SymbolData>,
    /// All types
    pub types: Arena<TypeData>,
    /// The scope tree
    pub scopes: ScopeTree,
    /// Reserved marker symbol signaling an explicit-receiver call
    pub method_token: SymbolId,
}

impl Ast {
    /// Create an empty tree with a root scope and the reserved marker symbol
    pub fn new(interner: &Interner) -> Self {
        let scopes = ScopeTree::new();
        let root = scopes.root();
        let mut symbols = Arena::new();
        let method_token = symbols.alloc(SymbolData {
            name: interner.intern("_method_token"),
            kind: SymbolKind::Variable { is_type: false },
            scope: root,
            defined_in: None,
            ty: None,
            decl: None,
            span: FileSpan::synthetic(),
        });

        Self {
            nodes: Arena::new(),
            symbols,
            types: Arena::new(),
            scopes,
            method_token,
        }
    }

    // ---- symbol and type construction -----------------------------------

    /// Allocate a symbol without declaring it in any scope table
    pub fn alloc_symbol(
        &mut self,
        name: Symbol,
        kind: SymbolKind,
        scope: ScopeId,
        defined_in: Option<SymbolId>,
        span: FileSpan,
    ) -> SymbolId {
        self.symbols.alloc(SymbolData {
            name,
            kind,
            scope,
            defined_in,
            ty: None,
            decl: None,
            span,
        })
    }

    /// Allocate a symbol and declare it in its scope's name table
    pub fn new_symbol(
        &mut self,
        name: Symbol,
        kind: SymbolKind,
        scope: ScopeId,
        defined_in: Option<SymbolId>,
        span: FileSpan,
    ) -> SymbolId {
        let id = self.alloc_symbol(name, kind, scope, defined_in, span);
        self.scopes.define(scope, name, id);
        id
    }

    /// Create a module with its own top-level scope under the root
    pub fn new_module(&mut self, name: Symbol, span: FileSpan) -> SymbolId {
        let root = self.scopes.root();
        let scope = self.scopes.create_child(root, ScopeKind::Module);
        self.new_symbol(name, SymbolKind::Module { scope }, root, None, span)
    }

    /// Create a function symbol with a fresh function scope
    ///
    /// Returns the symbol and the new scope for the function's parameters
    /// and locals.
    pub fn new_function(
        &mut self,
        name: Symbol,
        attrs: FunctionSym,
        scope: ScopeId,
        defined_in: Option<SymbolId>,
        span: FileSpan,
    ) -> (SymbolId, ScopeId) {
        let fn_scope = self.scopes.create_child(scope, ScopeKind::Function);
        let id = self.new_symbol(name, SymbolKind::Function(attrs), scope, defined_in, span);
        (id, fn_scope)
    }

    /// Create a class or record together with its member scope
    pub fn new_structural(
        &mut self,
        name: Symbol,
        record: bool,
        scope: ScopeId,
        defined_in: Option<SymbolId>,
        outer: Option<TypeId>,
        span: FileSpan,
    ) -> (SymbolId, TypeId) {
        let members = self.scopes.create_child(scope, ScopeKind::Type);
        let shape = StructuralType {
            name,
            methods: Vec::new(),
            dispatch_parents: Vec::new(),
            outer,
            members,
        };
        let kind = if record {
            TypeKind::Record(shape)
        } else {
            TypeKind::Class(shape)
        };
        let ty = self.types.alloc(TypeData { kind });
        let sym = self.new_symbol(name, SymbolKind::Type(ty), scope, defined_in, span);
        (sym, ty)
    }

    /// Create an enumerated type and its constants
    pub fn new_enum(
        &mut self,
        name: Symbol,
        constant_names: &[Symbol],
        scope: ScopeId,
        defined_in: Option<SymbolId>,
        span: FileSpan,
    ) -> (SymbolId, TypeId) {
        let ty = self.types.alloc(TypeData {
            kind: TypeKind::Enum(EnumType {
                name,
                constants: Vec::new(),
            }),
        });
        let sym = self.new_symbol(name, SymbolKind::Type(ty), scope, defined_in, span);
        for &constant in constant_names {
            let id = self.new_symbol(
                constant,
                SymbolKind::EnumConstant { owner: ty },
                scope,
                Some(sym),
                span,
            );
            self.symbols[id].ty = Some(ty);
            if let TypeKind::Enum(e) = &mut self.types[ty].kind {
                e.constants.push(id);
            }
        }
        (sym, ty)
    }

    /// Register a dispatch parent on a class or record
    pub fn add_dispatch_parent(&mut self, ty: TypeId, parent: TypeId) {
        if let Some(shape) = self.types[ty].structural_mut() {
            shape.dispatch_parents.push(parent);
        }
    }

    /// Append a method to a structural type's method list
    pub fn add_method(&mut self, ty: TypeId, method: SymbolId) {
        if let Some(shape) = self.types[ty].structural_mut() {
            shape.methods.push(method);
        }
    }

    // ---- node construction ----------------------------------------------

    /// Allocate a node and claim its children
    pub fn alloc(
        &mut self,
        kind: NodeKind,
        scope: ScopeId,
        owner: Option<SymbolId>,
        span: FileSpan,
    ) -> NodeId {
        let id = self.nodes.alloc(Node {
            kind,
            parent: None,
            owner,
            scope,
            span,
        });
        for child in self.children(id) {
            self.nodes[child].parent = Some(id);
        }
        id
    }

    /// An unresolved name reference
    pub fn name_ref(
        &mut self,
        name: Symbol,
        scope: ScopeId,
        owner: Option<SymbolId>,
        span: FileSpan,
    ) -> NodeId {
        self.alloc(NodeKind::Name(NameRef::Unresolved(name)), scope, owner, span)
    }

    /// A reference already linked to a symbol
    pub fn resolved_ref(
        &mut self,
        symbol: SymbolId,
        scope: ScopeId,
        owner: Option<SymbolId>,
        span: FileSpan,
    ) -> NodeId {
        self.alloc(NodeKind::Name(NameRef::Resolved(symbol)), scope, owner, span)
    }

    /// Create loop marker symbols named for the given label
    ///
    /// An unlabeled loop gets placeholder marker names; a loop labeled `l`
    /// gets a pre marker named `l` and a post marker named `post_l`, which
    /// is what labeled break/continue resolution searches for.
    pub fn loop_markers(
        &mut self,
        interner: &Interner,
        label: Option<Symbol>,
        scope: ScopeId,
        defined_in: Option<SymbolId>,
        span: FileSpan,
    ) -> (SymbolId, SymbolId) {
        let (pre_name, post_name) = match label {
            Some(l) => {
                let text = interner.resolve(&l);
                (l, interner.intern(&format!("post_{text}")))
            }
            None => (interner.intern("_pre_loop"), interner.intern("_post_loop")),
        };
        let pre = self.alloc_symbol(pre_name, SymbolKind::Label, scope, defined_in, span);
        let post = self.alloc_symbol(post_name, SymbolKind::Label, scope, defined_in, span);
        (pre, post)
    }

    // ---- structural queries ---------------------------------------------

    /// Child nodes, in structural order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes[id].kind {
            NodeKind::Dot { lhs, rhs } => vec![*lhs, *rhs],
            NodeKind::Call { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args.iter().copied());
                out
            }
            NodeKind::Block { body } => body.clone(),
            NodeKind::Loop { body, .. } => vec![*body],
            NodeKind::Decl { ty_expr, init, .. } => {
                ty_expr.iter().chain(init.iter()).copied().collect()
            }
            NodeKind::Name(_) | NodeKind::Member(_) | NodeKind::Goto { .. } | NodeKind::Removed => {
                Vec::new()
            }
        }
    }

    // ---- structural rewrites --------------------------------------------

    /// Replace `old` with `new` in the tree
    ///
    /// `new` takes over `old`'s slot in the parent and `old`'s subtree is
    /// tombstoned. The replacement is returned for follow-up processing.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> NodeId {
        let parent = self.nodes[old].parent;
        if let Some(p) = parent {
            self.swap_child(p, old, new);
        }
        self.nodes[new].parent = parent;
        self.mark_removed(old);
        new
    }

    /// Detach a node from its parent and tombstone its subtree
    pub fn remove(&mut self, id: NodeId) {
        if let Some(p) = self.nodes[id].parent {
            match &mut self.nodes[p].kind {
                NodeKind::Block { body } => body.retain(|&child| child != id),
                NodeKind::Call { args, .. } => args.retain(|&child| child != id),
                NodeKind::Decl { ty_expr, init, .. } => {
                    if *ty_expr == Some(id) {
                        *ty_expr = None;
                    }
                    if *init == Some(id) {
                        *init = None;
                    }
                }
                _ => {}
            }
        }
        self.mark_removed(id);
    }

    /// Deep-copy a subtree, remapping internal node references
    ///
    /// Returns the copied root and the old-to-new node map, which callers
    /// use to scan exactly the freshly created nodes.
    pub fn deep_copy(&mut self, root: NodeId) -> (NodeId, FxHashMap<NodeId, NodeId>) {
        let mut map = FxHashMap::default();
        let new_root = self.copy_node(root, &mut map);
        (new_root, map)
    }

    fn copy_node(&mut self, id: NodeId, map: &mut FxHashMap<NodeId, NodeId>) -> NodeId {
        let Node {
            kind, scope, owner, span, ..
        } = self.nodes[id].clone();

        let new_kind = match kind {
            NodeKind::Dot { lhs, rhs } => NodeKind::Dot {
                lhs: self.copy_node(lhs, map),
                rhs: self.copy_node(rhs, map),
            },
            NodeKind::Call { callee, args } => NodeKind::Call {
                callee: self.copy_node(callee, map),
                args: args.into_iter().map(|a| self.copy_node(a, map)).collect(),
            },
            NodeKind::Block { body } => NodeKind::Block {
                body: body.into_iter().map(|s| self.copy_node(s, map)).collect(),
            },
            NodeKind::Loop {
                label, pre, post, body,
            } => NodeKind::Loop {
                label,
                pre,
                post,
                body: self.copy_node(body, map),
            },
            NodeKind::Decl { symbol, ty_expr, init } => NodeKind::Decl {
                symbol,
                ty_expr: ty_expr.map(|t| self.copy_node(t, map)),
                init: init.map(|i| self.copy_node(i, map)),
            },
            leaf @ (NodeKind::Name(_)
            | NodeKind::Member(_)
            | NodeKind::Goto { .. }
            | NodeKind::Removed) => leaf,
        };

        let new_id = self.alloc(new_kind, scope, owner, span);
        map.insert(id, new_id);
        new_id
    }

    fn swap_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let replace_in = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
            }
        };
        match &mut self.nodes[parent].kind {
            NodeKind::Dot { lhs, rhs } => {
                replace_in(lhs);
                replace_in(rhs);
            }
            NodeKind::Call { callee, args } => {
                replace_in(callee);
                args.iter_mut().for_each(replace_in);
            }
            NodeKind::Block { body } => body.iter_mut().for_each(replace_in),
            NodeKind::Loop { body, .. } => replace_in(body),
            NodeKind::Decl { ty_expr, init, .. } => {
                if let Some(t) = ty_expr {
                    replace_in(t);
                }
                if let Some(i) = init {
                    replace_in(i);
                }
            }
            NodeKind::Name(_) | NodeKind::Member(_) | NodeKind::Goto { .. } | NodeKind::Removed => {}
        }
    }

    fn mark_removed(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.mark_removed(child);
        }
        self.nodes[id].kind = NodeKind::Removed;
    }

    /// Snapshot of all node ids, taken before a mutating sweep
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|(id, _)| id).collect()
    }

    /// Snapshot of all symbol ids
    pub fn symbol_ids(&self) -> Vec<SymbolId> {
        self.symbols.iter().map(|(id, _)| id).collect()
    }
}
