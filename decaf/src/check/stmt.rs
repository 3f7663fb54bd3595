//! Statements

use super::TypeChecker;
use crate::ast::{Expr, ExprKind, Guard, GuardKind, Span, Stmt, StmtKind};
use crate::error::ErrorKind;
use crate::types::Type;

impl TypeChecker<'_> {
    pub(crate) fn check_stmt(&mut self, stmt: &mut Stmt) {
        let span = stmt.span;
        match &mut stmt.kind {
            // Declared by the declaration pass.
            StmtKind::VarDef(_) => {}
            StmtKind::Block(block) => self.check_block(block),
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Assign { lhs, rhs } => self.check_assign(lhs, rhs, span),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_test_expr(cond);
                self.check_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_test_expr(cond);
                self.with_breakable(span, |c| c.check_stmt(body));
            }
            StmtKind::For(for_loop) => {
                if let Some(init) = &mut for_loop.init {
                    self.check_stmt(init);
                }
                self.check_test_expr(&mut for_loop.cond);
                if let Some(update) = &mut for_loop.update {
                    self.check_stmt(update);
                }
                self.with_breakable(span, |c| c.check_stmt(&mut for_loop.body));
            }
            StmtKind::Break => {
                if self.breakables.is_empty() {
                    self.issue(span, ErrorKind::BreakOutsideLoop);
                }
            }
            StmtKind::Return(value) => self.check_return(value.as_mut(), span),
            StmtKind::Print(args) => self.check_print(args),
            StmtKind::Scopy(scopy) => self.check_scopy(scopy),
            StmtKind::Guard(guard) => self.check_guard(guard),
            StmtKind::Foreach(foreach) => self.check_foreach(foreach),
        }
    }

    /// Conditions must be `bool`.
    pub(super) fn check_test_expr(&mut self, expr: &mut Expr) {
        let ty = self.check_expr(expr);
        if !ty.is_error() && !matches!(ty, Type::Bool) {
            self.issue(expr.span, ErrorKind::BadTestExpr);
        }
    }

    fn check_assign(&mut self, lhs: &mut Expr, rhs: &mut Expr, span: Span) {
        let left = self.check_expr(lhs);
        let right = self.check_expr(rhs);

        if matches!(left, Type::Unknown) {
            let target = match &lhs.kind {
                ExprKind::VarDecl(decl) => decl.symbol,
                ExprKind::Ident(ident) => ident.symbol,
                _ => None,
            };
            match target {
                Some(var) => {
                    tracing::trace!(name = %self.table.variable(var).name, ty = ?right, "inferred variable type");
                    self.table.variable_mut(var).ty = right.clone();
                }
                None => tracing::warn!(span = %lhs.span, "inferred variable has no symbol"),
            }
            lhs.ty = Some(right);
            return;
        }

        if !left.is_error() && (left.is_function() || !self.compatible(&right, &left)) {
            let kind = ErrorKind::IncompatibleAssign {
                left: self.type_name(&left),
                right: self.type_name(&right),
            };
            self.issue(span, kind);
        }
    }

    fn check_return(&mut self, value: Option<&mut Expr>, span: Span) {
        let given = value.map(|expr| self.check_expr(expr));
        let Some(func) = self.scopes.enclosing_function(self.table) else {
            tracing::warn!(%span, "return outside a method");
            return;
        };
        let expected = self.table.function(func).ret.clone();
        let mismatch = match (&expected, &given) {
            (Type::Void, None) => None,
            (Type::Void, Some(given)) => Some(self.type_name(given)),
            (_, None) => Some("void".to_string()),
            (expected, Some(given)) if !given.is_error() && !self.compatible(given, expected) => {
                Some(self.type_name(given))
            }
            _ => None,
        };
        if let Some(given) = mismatch {
            let kind = ErrorKind::BadReturnType {
                expected: self.type_name(&expected),
                given,
            };
            self.issue(span, kind);
        }
    }

    fn check_print(&mut self, args: &mut [Expr]) {
        for (i, arg) in args.iter_mut().enumerate() {
            let ty = self.check_expr(arg);
            if !matches!(ty, Type::Error | Type::Bool | Type::Int | Type::String) {
                let kind = ErrorKind::BadPrintArg {
                    index: i + 1,
                    ty: self.type_name(&ty),
                };
                self.issue(arg.span, kind);
            }
        }
    }

    /// Every clause condition is checked where the clause itself sits, so
    /// nested and sequenced guards need no second pass over their conditions.
    pub(super) fn check_guard(&mut self, guard: &mut Guard) {
        match &mut guard.kind {
            GuardKind::Empty => {}
            GuardKind::Clause { cond, body } => {
                self.check_test_expr(cond);
                self.check_stmt(body);
            }
            GuardKind::Nested(inner) => self.check_guard(inner),
            GuardKind::Sequence { clauses, last } => {
                for clause in clauses {
                    self.check_guard(clause);
                }
                self.check_guard(last);
            }
        }
    }
}
