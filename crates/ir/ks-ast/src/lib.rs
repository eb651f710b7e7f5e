//! Tree, symbol, type, and scope structures for the Kestrel front end
//!
//! Upstream stages (parsing, scope-table construction) produce an [`Ast`]
//! where every node is tagged with its enclosing lexical scope and its
//! owning function or module symbol. The scope-resolution pass mutates the
//! tree in place, turning textual name references into direct symbol links.
//!
//! Ownership flows strictly parent to child; the `parent` field on a node is
//! a non-owning arena index used only for upward walks (loop and label
//! search).

pub mod node;
pub mod scope;
pub mod symbol;
pub mod types;

pub use node::{Ast, GotoKind, GotoTarget, NameRef, Node, NodeId, NodeKind};
pub use scope::{ScopeData, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{FunctionSym, SymbolData, SymbolId, SymbolKind};
pub use types::{EnumType, StructuralType, TypeData, TypeId, TypeKind};
