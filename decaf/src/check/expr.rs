//! Expressions

use super::TypeChecker;
use crate::ast::{BinOp, Expr, ExprKind, Ident, LValueKind, Literal, Receiver, Span, Spanned, TypeLit, UnOp};
use crate::declare::resolve_type;
use crate::error::ErrorKind;
use crate::symbol::{ClassId, Symbol, VarKind};
use crate::types::Type;

impl TypeChecker<'_> {
    /// Checks `expr` as a value and records its type on the node.
    pub(crate) fn check_expr(&mut self, expr: &mut Expr) -> Type {
        self.check_expr_as(expr, false)
    }

    /// Checks the owner of a member access or call, which may name a class.
    pub(super) fn check_receiver(&mut self, expr: &mut Expr) -> Type {
        self.check_expr_as(expr, true)
    }

    fn check_expr_as(&mut self, expr: &mut Expr, used_for_ref: bool) -> Type {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Literal(Literal::Int(_)) => Type::Int,
            ExprKind::Literal(Literal::Bool(_)) => Type::Bool,
            ExprKind::Literal(Literal::String(_)) => Type::String,
            ExprKind::Null => Type::Null,
            ExprKind::ReadInteger => Type::Int,
            ExprKind::ReadLine => Type::String,
            ExprKind::This => self.check_this(span),
            ExprKind::Ident(ident) => self.check_ident(ident, span, used_for_ref),
            ExprKind::VarDecl(_) => Type::Unknown,
            ExprKind::Index { array, index } => self.check_index(array, index, span),
            ExprKind::Call(call) => self.check_call(call, span),
            ExprKind::Unary { op, expr: operand } => self.check_unary(*op, operand, span),
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, span),
            ExprKind::NewClass { class, symbol } => {
                *symbol = self.lookup_class_or_report(class);
                symbol.map_or(Type::Error, Type::Class)
            }
            ExprKind::NewArray { element, length } => self.check_new_array(element, length),
            ExprKind::TypeTest {
                expr: operand,
                class,
                symbol,
            } => {
                self.check_class_operand(operand, span);
                *symbol = self.lookup_class_or_report(class);
                Type::Bool
            }
            ExprKind::Cast {
                class,
                expr: operand,
                symbol,
            } => {
                self.check_class_operand(operand, span);
                *symbol = self.lookup_class_or_report(class);
                symbol.map_or(Type::Error, Type::Class)
            }
            ExprKind::ArrayRepeat { element, count } => self.check_array_repeat(element, count),
            ExprKind::DynamicAccess { array, index, default } => self.check_dynamic_access(array, index, default),
        };
        expr.ty = Some(ty.clone());
        ty
    }

    fn check_this(&mut self, span: Span) -> Type {
        if self.in_static() {
            self.issue(span, ErrorKind::ThisInStatic);
            return Type::Error;
        }
        match self.this_class() {
            Some(class) => Type::Class(class),
            None => {
                tracing::warn!(%span, "`this` outside a class");
                Type::Error
            }
        }
    }

    fn check_ident(&mut self, ident: &mut Ident, span: Span, used_for_ref: bool) -> Type {
        ident.reset();
        if let Some(owner) = ident.owner.as_deref_mut() {
            let owner_ty = self.check_receiver(owner);
            let owner_is_class = owner.is_class_ref();
            return self.check_member(ident, span, owner_ty, owner_is_class);
        }

        let Some(symbol) = self.scopes.lookup_before_location(self.table, &ident.name, span) else {
            let hint = self.name_hint(&ident.name);
            let kind = ErrorKind::UndeclaredVar {
                name: ident.name.clone(),
            };
            self.issue_with_hint(span, kind, hint);
            return Type::Error;
        };

        match symbol {
            Symbol::Variable(var) => {
                let (ty, kind) = {
                    let variable = self.table.variable(var);
                    (variable.ty.clone(), variable.kind)
                };
                ident.symbol = Some(var);
                ident.lvalue = Some(match kind {
                    VarKind::Local => LValueKind::Local,
                    VarKind::Param => LValueKind::Param,
                    VarKind::Member => {
                        if self.in_static() {
                            let kind = ErrorKind::RefNonStatic {
                                from: self.current_function_name(),
                                name: ident.name.clone(),
                            };
                            self.issue(span, kind);
                        }
                        ident.receiver = Some(self.resolve_implicit_receiver());
                        LValueKind::Member
                    }
                });
                ty
            }
            Symbol::Class(class) if used_for_ref => {
                ident.is_class = true;
                Type::Class(class)
            }
            // Classes are not values.
            Symbol::Class(_) => {
                let kind = ErrorKind::UndeclaredVar {
                    name: ident.name.clone(),
                };
                self.issue(span, kind);
                Type::Error
            }
            Symbol::Function(func) => self.table.function(func).ty(),
        }
    }

    /// `owner.name`, where `owner` is already checked.
    fn check_member(&mut self, ident: &mut Ident, span: Span, owner_ty: Type, owner_is_class: bool) -> Type {
        ident.receiver = Some(Receiver::Explicit);
        if owner_ty.is_error() {
            return Type::Error;
        }
        let owner = match owner_ty.class_id() {
            Some(class) if !owner_is_class => class,
            _ => {
                let kind = ErrorKind::NotClassField {
                    name: ident.name.clone(),
                    owner: self.type_name(&owner_ty),
                };
                self.issue(span, kind);
                return Type::Error;
            }
        };

        let Some(symbol) = self.table.lookup_visible(owner, &ident.name) else {
            let hint = self.member_hint(owner, &ident.name);
            let kind = ErrorKind::FieldNotFound {
                field: ident.name.clone(),
                owner: self.type_name(&owner_ty),
            };
            self.issue_with_hint(span, kind, hint);
            return Type::Error;
        };

        match symbol {
            Symbol::Variable(var) => {
                // Fields are reachable from the declaring class and its subclasses.
                let accessible = self
                    .this_class()
                    .is_some_and(|this| self.compatible(&Type::Class(this), &owner_ty));
                if accessible {
                    ident.symbol = Some(var);
                    ident.lvalue = Some(LValueKind::Member);
                } else {
                    let kind = ErrorKind::FieldNotAccessible {
                        field: ident.name.clone(),
                        owner: self.type_name(&owner_ty),
                    };
                    self.issue(span, kind);
                }
                self.table.variable(var).ty.clone()
            }
            other => self.table.symbol_type(other),
        }
    }

    fn check_index(&mut self, array: &mut Expr, index: &mut Expr, span: Span) -> Type {
        let ty = match self.check_expr(array) {
            Type::Array(element) => *element,
            Type::Error => Type::Error,
            _ => {
                self.issue(array.span, ErrorKind::NotArray);
                Type::Error
            }
        };
        let index_ty = self.check_expr(index);
        if !index_ty.is_error() && !matches!(index_ty, Type::Int) {
            self.issue(span, ErrorKind::SubscriptNotInt);
        }
        ty
    }

    fn check_binary(&mut self, op: BinOp, left: &mut Expr, right: &mut Expr, span: Span) -> Type {
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);

        if left_ty.is_error() || right_ty.is_error() {
            return match op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => left_ty,
                BinOp::Mod => Type::Int,
                _ => Type::Bool,
            };
        }

        let both = |ty: Type| left_ty.equal(&ty) && right_ty.equal(&ty);
        let (ok, result) = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => (both(Type::Int), left_ty.clone()),
            BinOp::Mod => (both(Type::Int), Type::Int),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => (both(Type::Int), Type::Bool),
            BinOp::Eq | BinOp::Ne => (
                self.compatible(&left_ty, &right_ty) || self.compatible(&right_ty, &left_ty),
                Type::Bool,
            ),
            BinOp::And | BinOp::Or => (both(Type::Bool), Type::Bool),
        };
        if !ok {
            let kind = ErrorKind::IncompatibleBinary {
                left: self.type_name(&left_ty),
                op: op.to_string(),
                right: self.type_name(&right_ty),
            };
            self.issue(span, kind);
        }
        result
    }

    fn check_unary(&mut self, op: UnOp, operand: &mut Expr, span: Span) -> Type {
        let ty = self.check_expr(operand);
        let (ok, result) = match op {
            UnOp::Neg => {
                let ok = matches!(ty, Type::Int | Type::Error);
                (ok, if ok { ty.clone() } else { Type::Error })
            }
            UnOp::Not => (matches!(ty, Type::Bool | Type::Error), Type::Bool),
        };
        if !ok {
            let kind = ErrorKind::IncompatibleUnary {
                op: op.to_string(),
                operand: self.type_name(&ty),
            };
            self.issue(span, kind);
        }
        result
    }

    fn check_new_array(&mut self, element: &Spanned<TypeLit>, length: &mut Expr) -> Type {
        let ty = match resolve_type(self.table, element, &mut self.diagnostics, self.options.hints) {
            Type::Error => Type::Error,
            Type::Void | Type::Unknown => {
                self.issue(element.span, ErrorKind::BadArrayElement);
                Type::Error
            }
            element => Type::array(element),
        };
        let length_ty = self.check_expr(length);
        if !length_ty.is_error() && !matches!(length_ty, Type::Int) {
            self.issue(length.span, ErrorKind::BadArrayLength);
        }
        ty
    }

    /// Operand of `instanceof` or a cast, which must be an object.
    fn check_class_operand(&mut self, operand: &mut Expr, span: Span) {
        let ty = self.check_expr(operand);
        if !ty.is_class() && !ty.is_error() {
            let kind = ErrorKind::NotClass { ty: self.type_name(&ty) };
            self.issue(span, kind);
        }
    }

    fn lookup_class_or_report(&mut self, name: &Spanned<String>) -> Option<ClassId> {
        let class = self.scopes.lookup_class(self.table, &name.node);
        if class.is_none() {
            let hint = self.class_hint(&name.node);
            let kind = ErrorKind::ClassNotFound {
                name: name.node.clone(),
            };
            self.issue_with_hint(name.span, kind, hint);
        }
        class
    }
}
