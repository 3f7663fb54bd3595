//! Expression AST nodes

use super::{Span, Spanned, TypeLit};
use crate::symbol::{ClassId, FuncId, VarId};
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// Expression
///
/// `ty` is empty after parsing and filled in by the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    #[serde(default)]
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    /// The type computed by the last checker run, `Error` if never checked.
    pub fn ty(&self) -> Type {
        self.ty.clone().unwrap_or(Type::Error)
    }

    /// True if this expression names a class rather than a value, as in the
    /// receiver of `Main.run()`.
    pub fn is_class_ref(&self) -> bool {
        matches!(&self.kind, ExprKind::Ident(ident) if ident.is_class)
    }

    /// Lvalue classification of an assignable expression.
    pub fn lvalue_kind(&self) -> Option<LValueKind> {
        match &self.kind {
            ExprKind::Ident(ident) => ident.lvalue,
            ExprKind::VarDecl(_) => Some(LValueKind::Local),
            ExprKind::Index { .. } => Some(LValueKind::ArrayElement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Null,
    /// `ReadInteger()`
    ReadInteger,
    /// `ReadLine()`
    ReadLine,
    This,

    /// Variable or field reference, optionally qualified: `owner.name`
    Ident(Ident),

    /// `var name`, only valid as the target of an assignment
    VarDecl(VarDecl),

    /// `array[index]`
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },

    /// Method call, optionally through a receiver
    Call(Call),

    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },

    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `new Name()`
    NewClass {
        class: Spanned<String>,
        #[serde(default)]
        symbol: Option<ClassId>,
    },

    /// `new T[length]`
    NewArray {
        element: Spanned<TypeLit>,
        length: Box<Expr>,
    },

    /// `instanceof(expr, Name)`
    TypeTest {
        expr: Box<Expr>,
        class: Spanned<String>,
        #[serde(default)]
        symbol: Option<ClassId>,
    },

    /// `(class Name) expr`
    Cast {
        class: Spanned<String>,
        expr: Box<Expr>,
        #[serde(default)]
        symbol: Option<ClassId>,
    },

    /// `element %% count`: an array of `count` copies of `element`
    ArrayRepeat {
        element: Box<Expr>,
        count: Box<Expr>,
    },

    /// `array[index] default fallback`
    DynamicAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        default: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    String(String),
}

/// Identifier reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub owner: Option<Box<Expr>>,
    pub name: String,
    /// Resolved variable
    #[serde(default)]
    pub symbol: Option<VarId>,
    #[serde(default)]
    pub lvalue: Option<LValueKind>,
    /// How the object holding a member is obtained
    #[serde(default)]
    pub receiver: Option<Receiver>,
    /// Set when the name resolves to a class used as a qualifier
    #[serde(default)]
    pub is_class: bool,
}

impl Ident {
    pub fn new(owner: Option<Box<Expr>>, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            symbol: None,
            lvalue: None,
            receiver: None,
            is_class: false,
        }
    }

    /// Drops annotations from an earlier run.
    pub(crate) fn reset(&mut self) {
        self.symbol = None;
        self.lvalue = None;
        self.receiver = None;
        self.is_class = false;
    }
}

/// `var name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    /// Written by the declaration pass
    #[serde(default)]
    pub symbol: Option<VarId>,
}

/// Method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub receiver: Option<Box<Expr>>,
    pub method: Spanned<String>,
    pub args: Vec<Expr>,
    #[serde(default)]
    pub target: Option<CallTarget>,
}

/// What a call resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallTarget {
    /// The built-in `length()` of an array receiver
    ArrayLength,
    Method { func: FuncId, receiver: Receiver },
}

/// How the receiver object of a member access or call is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Receiver {
    /// Written in the source
    Explicit,
    /// Not written; the current `this` of the given class
    ImplicitThis(ClassId),
    /// Written, but ignored because the callee is static
    Discarded,
    /// Not written and not needed
    Absent,
}

/// Classification of an assignable expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LValueKind {
    Local,
    Param,
    Member,
    ArrayElement,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
            BinOp::And => write!(f, "&&"),
            BinOp::Or => write!(f, "||"),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}
