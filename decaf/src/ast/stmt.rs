//! Statement AST nodes

use super::{Expr, Span, Spanned, TypeLit};
use crate::symbol::{ScopeId, VarId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Local variable declaration: `int x;`
    VarDef(VarDef),
    Block(Block),
    /// Expression evaluated for its effect: `f(x);`
    Expr(Expr),
    Assign {
        lhs: Expr,
        rhs: Expr,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For(Box<ForLoop>),
    Break,
    Return(Option<Expr>),
    /// `Print(e1, e2, ...)`
    Print(Vec<Expr>),
    Scopy(Scopy),
    Guard(Guard),
    Foreach(Box<Foreach>),
}

/// A variable declaration: local, parameter or field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeLit>,
    #[serde(default)]
    pub symbol: Option<VarId>,
}

/// `{ ... }` with its own local scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
    #[serde(default)]
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoop {
    pub init: Option<Stmt>,
    pub cond: Expr,
    pub update: Option<Stmt>,
    pub body: Stmt,
}

/// `scopy(dst, src)`: field-wise copy of `src` into the object held by `dst`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scopy {
    pub dst: Spanned<String>,
    pub src: Expr,
    #[serde(default)]
    pub symbol: Option<VarId>,
}

/// Guarded command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    pub kind: GuardKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardKind {
    /// `if { }`
    Empty,
    /// `cond : stmt`
    Clause { cond: Expr, body: Box<Stmt> },
    /// A single alternative wrapping another guard
    Nested(Box<Guard>),
    /// `g1 ||| g2 ||| ... ||| last`
    Sequence { clauses: Vec<Guard>, last: Box<Guard> },
}

/// `foreach (T x in source while guard) { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Foreach {
    /// `var` asks for the element type of `source`
    pub var_ty: Spanned<TypeLit>,
    pub var_name: Spanned<String>,
    pub source: Expr,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
    /// Local scope holding the loop variable and the body's declarations
    #[serde(default)]
    pub scope: Option<ScopeId>,
    #[serde(default)]
    pub symbol: Option<VarId>,
}
