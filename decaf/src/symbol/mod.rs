//! Symbols: classes, functions and variables
//!
//! Symbols and scopes live in a [`SymbolTable`] arena and refer to each
//! other through copyable ids, so the parent links between scopes and
//! between classes never own what they point at.

mod table;

pub use table::SymbolTable;

use crate::ast::Span;
use crate::types::Type;
use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub usize);
    };
}

arena_id!(
    /// Index of a [`Class`] in the symbol table
    ClassId
);
arena_id!(
    /// Index of a [`Function`] in the symbol table
    FuncId
);
arena_id!(
    /// Index of a [`Variable`] in the symbol table
    VarId
);
arena_id!(
    /// Index of a [`crate::scope::Scope`] in the symbol table
    ScopeId
);

/// A symbol bound to a name in some scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Class(ClassId),
    Function(FuncId),
    Variable(VarId),
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub parent: Option<ClassId>,
    pub sealed: bool,
    /// Members declared directly in this class
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub owner: ClassId,
    pub is_static: bool,
    pub ret: Type,
    /// Parameter types; an instance method's receiver is parameter 0.
    pub params: Vec<Type>,
    /// Formal scope holding the parameters
    pub scope: ScopeId,
    pub span: Span,
}

impl Function {
    pub fn ty(&self) -> Type {
        Type::function(self.params.clone(), self.ret.clone())
    }

    /// Number of arguments a caller writes, not counting the receiver.
    pub fn declared_arity(&self) -> usize {
        if self.is_static {
            self.params.len()
        } else {
            self.params.len().saturating_sub(1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Local,
    Param,
    Member,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    /// Fixed at declaration, except `var` locals which start as `Unknown`
    pub ty: Type,
    pub kind: VarKind,
    pub span: Span,
    /// Declared with `var`; the checker fixes the type at the first assignment
    pub inferred: bool,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type, kind: VarKind, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            span,
            inferred: false,
        }
    }
}
