//! Type representations

use crate::scope::ScopeId;
use crate::symbol::SymbolId;
use ks_intern::Symbol;
use la_arena::Idx;

/// Unique identifier for a type
pub type TypeId = Idx<TypeData>;

/// A type known to the front end
#[derive(Debug, Clone)]
pub struct TypeData {
    /// The variant payload
    pub kind: TypeKind,
}

/// Kind of type
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Class with reference semantics
    Class(StructuralType),
    /// Record with value semantics
    Record(StructuralType),
    /// Enumerated type
    Enum(EnumType),
    /// Built-in scalar type
    Primitive {
        /// Type name
        name: Symbol,
    },
    /// Function-local type alias; never survives scope resolution
    Alias,
}

/// Shared shape of classes and records
#[derive(Debug, Clone)]
pub struct StructuralType {
    /// Type name
    pub name: Symbol,
    /// Methods declared on this type, in declaration order
    ///
    /// Populated by the receiver-registration step of scope resolution;
    /// upstream stages may pre-register methods of parent types.
    pub methods: Vec<SymbolId>,
    /// Supertypes contributing inherited methods
    ///
    /// Forms a directed graph, validated acyclic upstream.
    pub dispatch_parents: Vec<TypeId>,
    /// Lexically enclosing type, for nested classes
    pub outer: Option<TypeId>,
    /// Member table holding the type's fields
    pub members: ScopeId,
}

/// An enumerated type
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Type name
    pub name: Symbol,
    /// Constants in declaration order
    pub constants: Vec<SymbolId>,
}

impl TypeData {
    /// Structural payload of a class or record
    pub fn structural(&self) -> Option<&StructuralType> {
        match &self.kind {
            TypeKind::Class(s) | TypeKind::Record(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable structural payload of a class or record
    pub fn structural_mut(&mut self) -> Option<&mut StructuralType> {
        match &mut self.kind {
            TypeKind::Class(s) | TypeKind::Record(s) => Some(s),
            _ => None,
        }
    }

    /// Enum payload
    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The type's declared name, when it has one
    pub fn name(&self) -> Option<Symbol> {
        match &self.kind {
            TypeKind::Class(s) | TypeKind::Record(s) => Some(s.name),
            TypeKind::Enum(e) => Some(e.name),
            TypeKind::Primitive { name } => Some(*name),
            TypeKind::Alias => None,
        }
    }
}
