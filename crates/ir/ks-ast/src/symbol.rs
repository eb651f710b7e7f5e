//! Declaration symbols

use crate::node::NodeId;
use crate::scope::ScopeId;
use crate::types::TypeId;
use ks_intern::Symbol;
use ks_span::FileSpan;
use la_arena::Idx;

/// Unique identifier for a declaration
pub type SymbolId = Idx<SymbolData>;

/// A named declaration
#[derive(Debug, Clone)]
pub struct SymbolData {
    /// Declared name
    pub name: Symbol,
    /// What kind of declaration this is
    pub kind: SymbolKind,
    /// Scope the declaration lives in
    pub scope: ScopeId,
    /// Lexically enclosing symbol (function, type, or module)
    pub defined_in: Option<SymbolId>,
    /// Resolved type, unknown until later phases fill it in
    pub ty: Option<TypeId>,
    /// Declaration node in the tree, when one exists
    pub decl: Option<NodeId>,
    /// Source location of the declaration
    pub span: FileSpan,
}

/// Kind of declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Variable binding; `is_type` marks type-valued variables, which are
    /// alias candidates when declared inside a function
    Variable {
        /// Whether the variable holds a type rather than a value
        is_type: bool,
    },
    /// Function or method
    Function(FunctionSym),
    /// Type declaration, denoting the given type
    Type(TypeId),
    /// Module, owning its top-level scope
    Module {
        /// The module's flat top-level scope
        scope: ScopeId,
    },
    /// Constant of an enumerated type
    EnumConstant {
        /// The enum the constant belongs to
        owner: TypeId,
    },
    /// Jump target (loop markers, user labels)
    Label,
}

/// Function-specific attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSym {
    /// Whether the function is a method
    pub is_method: bool,
    /// The receiver parameter symbol, for methods
    pub receiver: Option<SymbolId>,
    /// Callable by bare name, without an argument list
    pub no_parens: bool,
}

impl FunctionSym {
    /// A plain free function
    pub fn free() -> Self {
        Self {
            is_method: false,
            receiver: None,
            no_parens: false,
        }
    }

    /// A method with the given receiver symbol
    pub fn method(receiver: SymbolId) -> Self {
        Self {
            is_method: true,
            receiver: Some(receiver),
            no_parens: false,
        }
    }
}

impl SymbolData {
    /// Function attributes, if this is a function symbol
    pub fn as_function(&self) -> Option<&FunctionSym> {
        match &self.kind {
            SymbolKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The type this symbol denotes, if it is a type declaration
    pub fn denoted_type(&self) -> Option<TypeId> {
        match self.kind {
            SymbolKind::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Whether this symbol is a method-kind function
    pub fn is_method(&self) -> bool {
        self.as_function().is_some_and(|f| f.is_method)
    }
}
