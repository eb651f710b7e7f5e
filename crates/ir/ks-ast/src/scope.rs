//! Lexical scope tree with per-scope overload sets

use crate::symbol::SymbolId;
use ks_intern::Symbol;
use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;

/// Unique identifier for a scope
pub type ScopeId = Idx<ScopeData>;

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Module-level scope
    Module,
    /// Member table of a class or record
    Type,
    /// Function scope (parameters and top-level locals)
    Function,
    /// Block scope (inside { })
    Block,
}

/// A single scope in the tree
#[derive(Debug, Clone)]
pub struct ScopeData {
    /// Enclosing scope (None for the root scope)
    pub parent: Option<ScopeId>,
    /// Kind of scope
    pub kind: ScopeKind,
    /// Name table; same-named declarations form an ordered overload set
    pub names: FxHashMap<Symbol, Vec<SymbolId>>,
}

impl ScopeData {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            names: FxHashMap::default(),
        }
    }
}

/// Tree of all scopes for a compilation unit
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Arena<ScopeData>,
    root: ScopeId,
}

impl ScopeTree {
    /// Create a scope tree with a root module scope
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let root = scopes.alloc(ScopeData::new(None, ScopeKind::Module));
        Self { scopes, root }
    }

    /// The root scope
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Create a new child scope
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.scopes.alloc(ScopeData::new(Some(parent), kind))
    }

    /// Get scope data
    pub fn get(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id]
    }

    /// Declare a symbol under a name, appending to the overload set
    pub fn define(&mut self, scope: ScopeId, name: Symbol, symbol: SymbolId) {
        self.scopes[scope].names.entry(name).or_default().push(symbol);
    }

    /// Look a name up in a single scope's local table
    pub fn lookup_local(&self, scope: ScopeId, name: Symbol) -> &[SymbolId] {
        self.scopes[scope]
            .names
            .get(&name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look a name up, optionally climbing enclosing scopes
    ///
    /// Returns the full overload set of the nearest scope that declares the
    /// name, or an empty slice if no visible scope does.
    pub fn lookup(&self, scope: ScopeId, name: Symbol, transitive: bool) -> &[SymbolId] {
        let mut current = Some(scope);
        while let Some(id) = current {
            let found = self.lookup_local(id, name);
            if !found.is_empty() {
                return found;
            }
            if !transitive {
                break;
            }
            current = self.scopes[id].parent;
        }
        &[]
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
