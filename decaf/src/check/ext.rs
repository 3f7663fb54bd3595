//! Language extensions: `foreach`, `scopy`, array repeat and dynamic access

use super::TypeChecker;
use crate::ast::{Expr, Foreach, Scopy};
use crate::error::ErrorKind;
use crate::symbol::{Symbol, VarKind, Variable};
use crate::types::Type;

impl TypeChecker<'_> {
    pub(super) fn check_foreach(&mut self, foreach: &mut Foreach) {
        let Some(scope) = foreach.scope else {
            tracing::warn!(span = %foreach.span, "foreach has no scope");
            return;
        };
        self.with_scope(scope, |c| {
            let source_ty = c.check_expr(&mut foreach.source);
            if foreach.var_ty.node.is_var() {
                let ty = match &source_ty {
                    Type::Array(element) => (**element).clone(),
                    Type::Error => Type::Error,
                    _ => {
                        c.issue(foreach.source.span, ErrorKind::BadArrayOperand);
                        Type::Error
                    }
                };
                c.bind_loop_variable(foreach, ty);
            } else if !source_ty.is_array() && !source_ty.is_error() {
                c.issue(foreach.source.span, ErrorKind::BadArrayOperand);
            }

            if let Some(guard) = &mut foreach.guard {
                c.check_test_expr(guard);
            }
            c.with_breakable(foreach.span, |c| {
                for stmt in &mut foreach.body {
                    c.check_stmt(stmt);
                }
            });
        });
    }

    /// Declares an inferred loop variable in the loop scope. A rerun finds
    /// the variable bound by the previous run and only retypes it.
    fn bind_loop_variable(&mut self, foreach: &mut Foreach, ty: Type) {
        let name = &foreach.var_name;
        if let Some(var) = foreach.symbol {
            if self.scopes.lookup(self.table, &name.node, true) == Some(Symbol::Variable(var)) {
                self.table.variable_mut(var).ty = ty;
                return;
            }
        }
        let var = self
            .table
            .add_variable(Variable::new(&name.node, ty, VarKind::Local, name.span));
        if let Err(previous) = self.scopes.declare(self.table, &name.node, Symbol::Variable(var)) {
            let kind = ErrorKind::DeclConflict {
                name: name.node.clone(),
                previous: self.table.symbol_span(previous),
            };
            self.issue(name.span, kind);
        }
        foreach.symbol = Some(var);
    }

    /// `scopy(dst, src)` copies into an object of exactly the source's class.
    pub(super) fn check_scopy(&mut self, scopy: &mut Scopy) {
        scopy.symbol = None;
        let dst = &scopy.dst;
        let found = self.scopes.lookup_before_location(self.table, &dst.node, dst.span);
        let src_ty = self.check_expr(&mut scopy.src);
        let Some(symbol) = found else {
            let hint = self.name_hint(&dst.node);
            let kind = ErrorKind::UndeclaredVar { name: dst.node.clone() };
            self.issue_with_hint(dst.span, kind, hint);
            return;
        };

        if let Symbol::Variable(var) = symbol {
            if self.table.variable(var).kind == VarKind::Member && self.in_static() {
                let kind = ErrorKind::RefNonStatic {
                    from: self.current_function_name(),
                    name: dst.node.clone(),
                };
                self.issue(dst.span, kind);
            }
        }

        let dst_ty = self.table.symbol_type(symbol);
        let dst_var = match symbol {
            Symbol::Variable(var) if dst_ty.is_class() => Some(var),
            _ => None,
        };
        if dst_var.is_none() {
            let kind = ErrorKind::BadScopyArg {
                which: "dst".to_string(),
                ty: self.type_name(&dst_ty),
            };
            self.issue(dst.span, kind);
            if !src_ty.is_class() && !src_ty.is_error() {
                let kind = ErrorKind::BadScopyArg {
                    which: "src".to_string(),
                    ty: self.type_name(&src_ty),
                };
                self.issue(scopy.src.span, kind);
            }
            return;
        }
        if !src_ty.is_error() && !src_ty.equal(&dst_ty) {
            let kind = ErrorKind::BadScopySource {
                expected: self.type_name(&dst_ty),
                given: self.type_name(&src_ty),
            };
            self.issue(scopy.src.span, kind);
        }
        scopy.symbol = dst_var;
    }

    /// `element %% count`
    pub(super) fn check_array_repeat(&mut self, element: &mut Expr, count: &mut Expr) -> Type {
        let element_ty = self.check_expr(element);
        let count_ty = self.check_expr(count);
        let mut ok = true;
        if matches!(element_ty, Type::Error | Type::Void | Type::Unknown) {
            self.issue(element.span, ErrorKind::BadArrayElement);
            ok = false;
        }
        if !matches!(count_ty, Type::Int) {
            self.issue(count.span, ErrorKind::BadRepeatCount);
            ok = false;
        }
        if ok { Type::array(element_ty) } else { Type::Error }
    }

    /// `array[index] default fallback`
    ///
    /// The array and index checks are independent and may both fire. A
    /// broken access takes the fallback's type, and a fallback of the wrong
    /// type keeps the element type.
    pub(super) fn check_dynamic_access(&mut self, array: &mut Expr, index: &mut Expr, default: &mut Expr) -> Type {
        let array_ty = self.check_expr(array);
        let index_ty = self.check_expr(index);
        let default_ty = self.check_expr(default);
        let index_ok = matches!(index_ty, Type::Int);
        let bad_index = !index_ok && !index_ty.is_error();

        let Some(element) = array_ty.element_type().cloned() else {
            if !array_ty.is_error() {
                self.issue(array.span, ErrorKind::BadArrayOperand);
            }
            if bad_index {
                self.issue(index.span, ErrorKind::BadArrayIndex);
            }
            let usable = !matches!(default_ty, Type::Error | Type::Unknown | Type::Void);
            return if usable { default_ty } else { Type::Error };
        };

        let default_ok = default_ty.equal(&element);
        if bad_index {
            self.issue(index.span, ErrorKind::BadArrayIndex);
        }
        if !default_ok && !default_ty.is_error() {
            let kind = ErrorKind::BadDefaultValue {
                expected: self.type_name(&element),
                given: self.type_name(&default_ty),
            };
            self.issue(default.span, kind);
        }
        if index_ok { element } else { default_ty }
    }
}
