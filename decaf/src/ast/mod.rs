//! Abstract Syntax Tree definitions
//!
//! Nodes are produced by the parser and annotated in place: the declaration
//! pass writes scope and symbol ids, the checker writes types and
//! resolutions. Annotation fields deserialize as empty when absent.

pub mod build;
mod expr;
mod span;
mod stmt;
mod types;

pub use expr::*;
pub use span::*;
pub use stmt::*;
pub use types::*;

use crate::symbol::{ClassId, FuncId, ScopeId};
use serde::{Deserialize, Serialize};

/// A program is a sequence of class definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub classes: Vec<ClassDef>,
    pub span: Span,
    #[serde(default)]
    pub scope: Option<ScopeId>,
}

/// Class definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: Spanned<String>,
    pub parent: Option<Spanned<String>>,
    #[serde(default)]
    pub sealed: bool,
    pub members: Vec<Member>,
    pub span: Span,
    #[serde(default)]
    pub symbol: Option<ClassId>,
}

/// Class member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Field(VarDef),
    Method(MethodDef),
}

/// Method definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: Spanned<String>,
    #[serde(default)]
    pub is_static: bool,
    pub ret_ty: Spanned<TypeLit>,
    pub params: Vec<VarDef>,
    pub body: Block,
    pub span: Span,
    #[serde(default)]
    pub symbol: Option<FuncId>,
}
