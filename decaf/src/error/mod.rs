//! Semantic diagnostics and reporting
//!
//! Semantic errors are values, not control flow: passes push them into a
//! [`Diagnostics`] sink and keep going.

use crate::ast::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ErrorKind {
    #[error("undeclared variable '{name}'")]
    UndeclaredVar { name: String },

    #[error("class '{name}' not found")]
    ClassNotFound { name: String },

    #[error("{ty} is not a class type")]
    NotClass { ty: String },

    #[error("[] can only be applied to arrays")]
    NotArray,

    #[error("array subscript must be an integer")]
    SubscriptNotInt,

    #[error("field '{field}' not found in '{owner}'")]
    FieldNotFound { field: String, owner: String },

    #[error("field '{field}' of '{owner}' not accessible here")]
    FieldNotAccessible { field: String, owner: String },

    #[error("'{name}' is not a method in class '{owner}'")]
    NotClassMethod { name: String, owner: String },

    #[error("cannot access field '{name}' from '{owner}'")]
    NotClassField { name: String, owner: String },

    #[error("can not reference a non-static field '{name}' from static method '{from}'")]
    RefNonStatic { from: String, name: String },

    #[error("can not use this in static function")]
    ThisInStatic,

    #[error("function '{method}' expects {expected} argument(s) but {given} given")]
    BadArgCount {
        method: String,
        expected: usize,
        given: usize,
    },

    #[error("incompatible argument {index}: {given} given, {expected} expected")]
    BadArgType {
        index: usize,
        given: String,
        expected: String,
    },

    #[error("'length' can only be applied to arrays")]
    BadLength,

    #[error("function 'length' expects 0 argument(s) but {given} given")]
    BadLengthArg { given: usize },

    #[error("incompatible operands: {left} {op} {right}")]
    IncompatibleBinary {
        left: String,
        op: String,
        right: String,
    },

    #[error("incompatible operand: {op} {operand}")]
    IncompatibleUnary { op: String, operand: String },

    #[error("incompatible assignment: {left} = {right}")]
    IncompatibleAssign { left: String, right: String },

    #[error("test expression must have bool type")]
    BadTestExpr,

    #[error("incompatible return: {given} given, {expected} expected")]
    BadReturnType { expected: String, given: String },

    #[error("'break' is only allowed inside a loop")]
    BreakOutsideLoop,

    #[error("array element type must be non-void known type")]
    BadArrayElement,

    #[error("new array's length must be an integer")]
    BadArrayLength,

    #[error("array repeat count must be an integer")]
    BadRepeatCount,

    #[error("array operation on non-array type")]
    BadArrayOperand,

    #[error("array index must be an integer")]
    BadArrayIndex,

    #[error("incompatible default value: {given} given, {expected} expected")]
    BadDefaultValue { expected: String, given: String },

    #[error("illegal class inheritance (should not inherit a sealed class)")]
    SealedInheritance,

    #[error("incompatible argument {index}: {ty} given, int/bool/string expected")]
    BadPrintArg { index: usize, ty: String },

    #[error("incompatible argument '{which}': {ty} given, class expected")]
    BadScopyArg { which: String, ty: String },

    #[error("incompatible scopy source: {given} given, {expected} expected")]
    BadScopySource { expected: String, given: String },

    #[error("declaration of '{name}' here conflicts with earlier declaration at {previous}")]
    DeclConflict { name: String, previous: Span },

    #[error("illegal class inheritance (should be acyclic)")]
    BadInheritance,

    #[error("cannot declare identifier '{name}' as void type")]
    BadVarType { name: String },
}

impl ErrorKind {
    /// Stable kebab-case name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UndeclaredVar { .. } => "undeclared-name",
            ErrorKind::ClassNotFound { .. } => "unresolved-class",
            ErrorKind::NotClass { .. } => "not-a-class-type",
            ErrorKind::NotArray => "not-an-array-type",
            ErrorKind::SubscriptNotInt => "subscript-not-int",
            ErrorKind::FieldNotFound { .. } => "field-not-found",
            ErrorKind::FieldNotAccessible { .. } => "field-not-accessible",
            ErrorKind::NotClassMethod { .. } => "not-a-method",
            ErrorKind::NotClassField { .. } => "not-a-class-field",
            ErrorKind::RefNonStatic { .. } | ErrorKind::ThisInStatic => "wrong-static-context",
            ErrorKind::BadArgCount { .. } => "argument-count-mismatch",
            ErrorKind::BadArgType { .. } => "argument-type-mismatch",
            ErrorKind::BadLength => "bad-length",
            ErrorKind::BadLengthArg { .. } => "bad-length-argument",
            ErrorKind::IncompatibleBinary { .. } => "incompatible-binary-operand",
            ErrorKind::IncompatibleUnary { .. } => "incompatible-unary-operand",
            ErrorKind::IncompatibleAssign { .. } => "incompatible-assignment",
            ErrorKind::BadTestExpr => "bad-test-expression-type",
            ErrorKind::BadReturnType { .. } => "bad-return-type",
            ErrorKind::BreakOutsideLoop => "break-outside-loop",
            ErrorKind::BadArrayElement => "bad-array-element-type",
            ErrorKind::BadArrayLength => "bad-array-length-type",
            ErrorKind::BadRepeatCount => "bad-repeat-count",
            ErrorKind::BadArrayOperand => "not-an-array-type",
            ErrorKind::BadArrayIndex => "bad-array-index",
            ErrorKind::BadDefaultValue { .. } => "bad-default-value",
            ErrorKind::SealedInheritance => "sealed-class-inheritance-violation",
            ErrorKind::BadPrintArg { .. } => "bad-print-argument-type",
            ErrorKind::BadScopyArg { .. } => "bad-struct-copy-argument",
            ErrorKind::BadScopySource { .. } => "bad-struct-copy-source",
            ErrorKind::DeclConflict { .. } => "declaration-conflict",
            ErrorKind::BadInheritance => "bad-inheritance",
            ErrorKind::BadVarType { .. } => "bad-variable-type",
        }
    }
}

/// A semantic error at a source location
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("*** Error at {span}: {kind}")]
pub struct SemanticError {
    pub span: Span,
    pub kind: ErrorKind,
    /// Optional "did you mean" suggestion
    #[serde(default)]
    pub hint: Option<String>,
}

impl SemanticError {
    pub fn new(span: Span, kind: ErrorKind) -> Self {
        Self {
            span,
            kind,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Append-only sink of semantic errors, in issue order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, error: SemanticError) {
        tracing::debug!(code = error.code(), span = %error.span, "{}", error.kind);
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SemanticError> {
        self.errors.iter()
    }

    /// Appends everything issued into `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
    }

    /// Errors ordered by source position; ties keep issue order.
    pub fn sorted(&self) -> Vec<&SemanticError> {
        let mut errors: Vec<_> = self.errors.iter().collect();
        errors.sort_by_key(|e| (e.span.start, e.span.end));
        errors
    }

    /// Consumes the sink, reordering it like [`Diagnostics::sorted`].
    pub fn into_sorted(mut self) -> Self {
        self.errors.sort_by_key(|e| (e.span.start, e.span.end));
        self
    }

    pub fn count(&self, code: &str) -> usize {
        self.errors.iter().filter(|e| e.code() == code).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a SemanticError;
    type IntoIter = std::slice::Iter<'a, SemanticError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &SemanticError) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let range: std::ops::Range<usize> = error.span.into();
    let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
        .with_code(error.code())
        .with_message("semantic error")
        .with_label(
            Label::new((filename, range))
                .with_message(error.kind.to_string())
                .with_color(Color::Red),
        );
    if let Some(hint) = &error.hint {
        report = report.with_help(hint);
    }
    report.finish().eprint((filename, Source::from(source)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_span_and_message() {
        let error = SemanticError::new(
            Span::new(4, 9),
            ErrorKind::BadArgCount {
                method: "f".to_string(),
                expected: 0,
                given: 1,
            },
        );
        assert_eq!(
            error.to_string(),
            "*** Error at 4..9: function 'f' expects 0 argument(s) but 1 given"
        );
        assert_eq!(error.code(), "argument-count-mismatch");
    }

    #[test]
    fn test_sorted_is_stable_by_position() {
        let mut diags = Diagnostics::new();
        diags.issue(SemanticError::new(Span::new(9, 10), ErrorKind::BadTestExpr));
        diags.issue(SemanticError::new(Span::new(1, 2), ErrorKind::BreakOutsideLoop));
        diags.issue(SemanticError::new(Span::new(1, 2), ErrorKind::NotArray));
        let codes: Vec<_> = diags.sorted().iter().map(|e| e.code()).collect();
        assert_eq!(
            codes,
            vec!["break-outside-loop", "not-an-array-type", "bad-test-expression-type"]
        );
    }

    #[test]
    fn test_extend_and_count() {
        let mut a = Diagnostics::new();
        a.issue(SemanticError::new(Span::default(), ErrorKind::BadTestExpr));
        let mut b = Diagnostics::new();
        b.issue(SemanticError::new(Span::default(), ErrorKind::BadTestExpr));
        b.issue(SemanticError::new(Span::default(), ErrorKind::ThisInStatic));
        a.extend(b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.count("bad-test-expression-type"), 2);
        assert_eq!(a.count("wrong-static-context"), 1);
    }

    #[test]
    fn test_static_context_kinds_share_a_code() {
        let refs = ErrorKind::RefNonStatic {
            from: "main".to_string(),
            name: "x".to_string(),
        };
        assert_eq!(refs.code(), ErrorKind::ThisInStatic.code());
    }
}
