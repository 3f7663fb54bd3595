//! Type AST nodes

use serde::{Deserialize, Serialize};

/// A type as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeLit {
    Int,
    Bool,
    String,
    Void,
    /// `var`: the type is inferred from the first assignment
    Var,
    /// A class name, resolved against the global scope
    Class(String),
    /// `T[]`
    Array(Box<TypeLit>),
}

impl TypeLit {
    pub fn class(name: impl Into<String>) -> Self {
        TypeLit::Class(name.into())
    }

    pub fn array(element: TypeLit) -> Self {
        TypeLit::Array(Box::new(element))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, TypeLit::Var)
    }
}

impl std::fmt::Display for TypeLit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeLit::Int => write!(f, "int"),
            TypeLit::Bool => write!(f, "bool"),
            TypeLit::String => write!(f, "string"),
            TypeLit::Void => write!(f, "void"),
            TypeLit::Var => write!(f, "var"),
            TypeLit::Class(name) => write!(f, "class {name}"),
            TypeLit::Array(element) => write!(f, "{element}[]"),
        }
    }
}
