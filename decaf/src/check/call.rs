//! Method calls

use super::TypeChecker;
use crate::ast::{Call, CallTarget, Expr, Receiver, Span};
use crate::error::ErrorKind;
use crate::symbol::{ClassId, Symbol};
use crate::types::Type;

impl TypeChecker<'_> {
    pub(super) fn check_call(&mut self, call: &mut Call, span: Span) -> Type {
        call.target = None;
        let class = match call.receiver.as_deref_mut() {
            None => match self.this_class() {
                Some(class) => class,
                None => {
                    tracing::warn!(%span, "call outside a class");
                    self.check_args(&mut call.args);
                    return Type::Error;
                }
            },
            Some(receiver) => {
                let receiver_ty = self.check_receiver(receiver);
                match self.receiver_class(call, &receiver_ty, span) {
                    Ok(class) => class,
                    Err(ty) => {
                        self.check_args(&mut call.args);
                        return ty;
                    }
                }
            }
        };
        self.check_method_call(call, class, span)
    }

    /// Class whose methods an explicit receiver offers. Arrays answer
    /// `length()` themselves; the `Err` carries the call's type then.
    fn receiver_class(&mut self, call: &mut Call, receiver_ty: &Type, span: Span) -> Result<ClassId, Type> {
        if receiver_ty.is_error() {
            return Err(Type::Error);
        }
        if call.method.node == "length" {
            if receiver_ty.is_array() {
                if !call.args.is_empty() {
                    self.issue(span, ErrorKind::BadLengthArg { given: call.args.len() });
                }
                call.target = Some(CallTarget::ArrayLength);
                return Err(Type::Int);
            }
            if !receiver_ty.is_class() {
                self.issue(span, ErrorKind::BadLength);
                return Err(Type::Error);
            }
        }
        receiver_ty.class_id().ok_or_else(|| {
            let kind = ErrorKind::NotClassField {
                name: call.method.node.clone(),
                owner: self.type_name(receiver_ty),
            };
            self.issue(span, kind);
            Type::Error
        })
    }

    fn check_method_call(&mut self, call: &mut Call, class: ClassId, span: Span) -> Type {
        let name = call.method.node.clone();
        let explicit = call.receiver.is_some();
        let class_ref = call.receiver.as_deref().is_some_and(Expr::is_class_ref);
        let owner = || Type::Class(class);

        let func = match self.table.lookup_visible(class, &name) {
            Some(Symbol::Function(func)) => func,
            found => {
                match found {
                    None => {
                        let hint = self.member_hint(class, &name);
                        let kind = ErrorKind::FieldNotFound {
                            field: name,
                            owner: self.type_name(&owner()),
                        };
                        self.issue_with_hint(span, kind, hint);
                    }
                    Some(_) => {
                        let kind = ErrorKind::NotClassMethod {
                            name,
                            owner: self.type_name(&owner()),
                        };
                        self.issue(span, kind);
                    }
                }
                self.check_args(&mut call.args);
                return Type::Error;
            }
        };

        let (is_static, ret, arity, params) = {
            let function = self.table.function(func);
            (
                function.is_static,
                function.ret.clone(),
                function.declared_arity(),
                function.params.clone(),
            )
        };
        if !explicit && !is_static && self.in_static() {
            let kind = ErrorKind::RefNonStatic {
                from: self.current_function_name(),
                name: name.clone(),
            };
            self.issue(span, kind);
        }
        if class_ref && !is_static {
            let kind = ErrorKind::NotClassField {
                name: name.clone(),
                owner: self.type_name(&owner()),
            };
            self.issue(span, kind);
        }
        let receiver = match (is_static, explicit) {
            (true, true) => Receiver::Discarded,
            (true, false) => Receiver::Absent,
            (false, true) => Receiver::Explicit,
            (false, false) => self.resolve_implicit_receiver(),
        };
        call.target = Some(CallTarget::Method { func, receiver });

        self.check_args(&mut call.args);
        // An instance method's receiver leads its parameter list.
        let declared = &params[params.len() - arity..];
        if declared.len() != call.args.len() {
            let kind = ErrorKind::BadArgCount {
                method: name,
                expected: declared.len(),
                given: call.args.len(),
            };
            self.issue(span, kind);
            return ret;
        }
        for (i, (arg, expected)) in call.args.iter().zip(declared).enumerate() {
            let given = arg.ty();
            if !given.is_error() && !self.compatible(&given, expected) {
                let kind = ErrorKind::BadArgType {
                    index: i + 1,
                    given: self.type_name(&given),
                    expected: self.type_name(expected),
                };
                self.issue(arg.span, kind);
            }
        }
        ret
    }

    fn check_args(&mut self, args: &mut [Expr]) {
        for arg in args {
            self.check_expr(arg);
        }
    }
}
