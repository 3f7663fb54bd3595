//! Programmatic AST construction
//!
//! The parser is not part of this crate, so tools and tests build trees by
//! hand. Every node gets a fresh one-byte span from a running cursor: nodes
//! built earlier sit earlier in the "source". Arguments are evaluated before
//! the node that receives them, so a parent's own span follows its children.
//! Constructs that bind a name for later children (`foreach`) take the
//! children as a closure.

use super::*;
use std::cell::Cell;

#[derive(Debug, Default)]
pub struct AstBuilder {
    cursor: Cell<usize>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next span.
    pub fn sp(&self) -> Span {
        let start = self.cursor.get();
        self.cursor.set(start + 1);
        Span::new(start, start + 1)
    }

    pub fn name(&self, name: &str) -> Spanned<String> {
        Spanned::new(name.to_string(), self.sp())
    }

    pub fn ty(&self, ty: TypeLit) -> Spanned<TypeLit> {
        Spanned::new(ty, self.sp())
    }

    // ---- declarations ----

    pub fn program(&self, classes: Vec<ClassDef>) -> Program {
        Program {
            classes,
            span: self.sp(),
            scope: None,
        }
    }

    pub fn class(&self, name: &str, parent: Option<&str>, members: Vec<Member>) -> ClassDef {
        ClassDef {
            name: self.name(name),
            parent: parent.map(|p| self.name(p)),
            sealed: false,
            members,
            span: self.sp(),
            symbol: None,
        }
    }

    pub fn sealed_class(&self, name: &str, parent: Option<&str>, members: Vec<Member>) -> ClassDef {
        ClassDef {
            sealed: true,
            ..self.class(name, parent, members)
        }
    }

    pub fn field(&self, ty: TypeLit, name: &str) -> Member {
        Member::Field(self.param(ty, name))
    }

    pub fn param(&self, ty: TypeLit, name: &str) -> VarDef {
        VarDef {
            ty: self.ty(ty),
            name: self.name(name),
            symbol: None,
        }
    }

    pub fn method(&self, ret: TypeLit, name: &str, params: Vec<VarDef>, body: Vec<Stmt>) -> Member {
        Member::Method(self.method_def(false, ret, name, params, body))
    }

    pub fn static_method(&self, ret: TypeLit, name: &str, params: Vec<VarDef>, body: Vec<Stmt>) -> Member {
        Member::Method(self.method_def(true, ret, name, params, body))
    }

    fn method_def(&self, is_static: bool, ret: TypeLit, name: &str, params: Vec<VarDef>, body: Vec<Stmt>) -> MethodDef {
        MethodDef {
            name: self.name(name),
            is_static,
            ret_ty: self.ty(ret),
            params,
            body: self.block_of(body),
            span: self.sp(),
            symbol: None,
        }
    }

    // ---- statements ----

    fn stmt(&self, kind: StmtKind) -> Stmt {
        Stmt::new(kind, self.sp())
    }

    fn block_of(&self, stmts: Vec<Stmt>) -> Block {
        Block {
            stmts,
            span: self.sp(),
            scope: None,
        }
    }

    /// `T name;`
    pub fn var_def(&self, ty: TypeLit, name: &str) -> Stmt {
        let def = self.param(ty, name);
        self.stmt(StmtKind::VarDef(def))
    }

    pub fn block(&self, stmts: Vec<Stmt>) -> Stmt {
        let block = self.block_of(stmts);
        self.stmt(StmtKind::Block(block))
    }

    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn assign(&self, lhs: Expr, rhs: Expr) -> Stmt {
        self.stmt(StmtKind::Assign { lhs, rhs })
    }

    /// `var name = rhs;`
    pub fn var_assign(&self, name: &str, rhs: Expr) -> Stmt {
        let lhs = self.var_decl(name);
        self.assign(lhs, rhs)
    }

    pub fn if_stmt(&self, cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_stmt(&self, cond: Expr, body: Stmt) -> Stmt {
        self.stmt(StmtKind::While {
            cond,
            body: Box::new(body),
        })
    }

    pub fn for_stmt(&self, init: Option<Stmt>, cond: Expr, update: Option<Stmt>, body: Stmt) -> Stmt {
        self.stmt(StmtKind::For(Box::new(ForLoop {
            init,
            cond,
            update,
            body,
        })))
    }

    pub fn break_stmt(&self) -> Stmt {
        self.stmt(StmtKind::Break)
    }

    pub fn return_stmt(&self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn print(&self, args: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Print(args))
    }

    /// `scopy(dst, src);`
    pub fn scopy(&self, dst: &str, src: Expr) -> Stmt {
        let dst = self.name(dst);
        self.stmt(StmtKind::Scopy(Scopy {
            dst,
            src,
            symbol: None,
        }))
    }

    pub fn guard(&self, guard: Guard) -> Stmt {
        self.stmt(StmtKind::Guard(guard))
    }

    fn guard_of(&self, kind: GuardKind) -> Guard {
        Guard { kind, span: self.sp() }
    }

    pub fn empty_guard(&self) -> Guard {
        self.guard_of(GuardKind::Empty)
    }

    pub fn clause(&self, cond: Expr, body: Stmt) -> Guard {
        self.guard_of(GuardKind::Clause {
            cond,
            body: Box::new(body),
        })
    }

    pub fn nested_guard(&self, inner: Guard) -> Guard {
        self.guard_of(GuardKind::Nested(Box::new(inner)))
    }

    pub fn guard_sequence(&self, clauses: Vec<Guard>, last: Guard) -> Guard {
        self.guard_of(GuardKind::Sequence {
            clauses,
            last: Box::new(last),
        })
    }

    /// `foreach (ty name in source) { body }`
    pub fn foreach(&self, ty: TypeLit, name: &str, source: Expr, body: impl FnOnce(&Self) -> Vec<Stmt>) -> Stmt {
        self.foreach_while(ty, name, source, |b| (None, body(b)))
    }

    /// `foreach (ty name in source while guard) { body }`; the closure sees
    /// the loop variable already declared.
    pub fn foreach_while(
        &self,
        ty: TypeLit,
        name: &str,
        source: Expr,
        guard_and_body: impl FnOnce(&Self) -> (Option<Expr>, Vec<Stmt>),
    ) -> Stmt {
        let var_ty = self.ty(ty);
        let var_name = self.name(name);
        let (guard, body) = guard_and_body(self);
        let foreach = Foreach {
            var_ty,
            var_name,
            source,
            guard,
            body,
            span: self.sp(),
            scope: None,
            symbol: None,
        };
        self.stmt(StmtKind::Foreach(Box::new(foreach)))
    }

    // ---- expressions ----

    fn expr(&self, kind: ExprKind) -> Expr {
        Expr::new(kind, self.sp())
    }

    pub fn int(&self, value: i64) -> Expr {
        self.expr(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn bool(&self, value: bool) -> Expr {
        self.expr(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.expr(ExprKind::Literal(Literal::String(value.to_string())))
    }

    pub fn null(&self) -> Expr {
        self.expr(ExprKind::Null)
    }

    pub fn this(&self) -> Expr {
        self.expr(ExprKind::This)
    }

    pub fn read_int(&self) -> Expr {
        self.expr(ExprKind::ReadInteger)
    }

    pub fn read_line(&self) -> Expr {
        self.expr(ExprKind::ReadLine)
    }

    pub fn ident(&self, name: &str) -> Expr {
        self.expr(ExprKind::Ident(Ident::new(None, name)))
    }

    /// `owner.name`
    pub fn member(&self, owner: Expr, name: &str) -> Expr {
        self.expr(ExprKind::Ident(Ident::new(Some(Box::new(owner)), name)))
    }

    /// `var name`
    pub fn var_decl(&self, name: &str) -> Expr {
        self.expr(ExprKind::VarDecl(VarDecl {
            name: name.to_string(),
            symbol: None,
        }))
    }

    pub fn index(&self, array: Expr, index: Expr) -> Expr {
        self.expr(ExprKind::Index {
            array: Box::new(array),
            index: Box::new(index),
        })
    }

    /// Call without a written receiver: `name(args)`
    pub fn call(&self, method: &str, args: Vec<Expr>) -> Expr {
        self.call_on(None, method, args)
    }

    /// `receiver.name(args)`
    pub fn method_call(&self, receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
        self.call_on(Some(receiver), method, args)
    }

    fn call_on(&self, receiver: Option<Expr>, method: &str, args: Vec<Expr>) -> Expr {
        let method = self.name(method);
        self.expr(ExprKind::Call(Call {
            receiver: receiver.map(Box::new),
            method,
            args,
            target: None,
        }))
    }

    pub fn binary(&self, op: BinOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(&self, op: UnOp, expr: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    pub fn new_class(&self, name: &str) -> Expr {
        let class = self.name(name);
        self.expr(ExprKind::NewClass { class, symbol: None })
    }

    pub fn new_array(&self, element: TypeLit, length: Expr) -> Expr {
        let element = self.ty(element);
        self.expr(ExprKind::NewArray {
            element,
            length: Box::new(length),
        })
    }

    pub fn instance_of(&self, expr: Expr, class: &str) -> Expr {
        let class = self.name(class);
        self.expr(ExprKind::TypeTest {
            expr: Box::new(expr),
            class,
            symbol: None,
        })
    }

    pub fn cast(&self, class: &str, expr: Expr) -> Expr {
        let class = self.name(class);
        self.expr(ExprKind::Cast {
            class,
            expr: Box::new(expr),
            symbol: None,
        })
    }

    /// `element %% count`
    pub fn repeat(&self, element: Expr, count: Expr) -> Expr {
        self.expr(ExprKind::ArrayRepeat {
            element: Box::new(element),
            count: Box::new(count),
        })
    }

    /// `array[index] default fallback`
    pub fn dynamic(&self, array: Expr, index: Expr, default: Expr) -> Expr {
        self.expr(ExprKind::DynamicAccess {
            array: Box::new(array),
            index: Box::new(index),
            default: Box::new(default),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_follow_construction_order() {
        let b = AstBuilder::new();
        let first = b.int(1);
        let second = b.int(2);
        assert!(second.span.starts_after(first.span));
        let sum = b.binary(BinOp::Add, first, second);
        assert_eq!(sum.span, Span::new(2, 3));
    }

    #[test]
    fn test_foreach_body_follows_loop_variable() {
        let b = AstBuilder::new();
        let stmt = b.foreach(TypeLit::Var, "e", b.ident("xs"), |b| vec![b.print(vec![b.ident("e")])]);
        let StmtKind::Foreach(foreach) = stmt.kind else {
            panic!("expected foreach");
        };
        let StmtKind::Print(args) = &foreach.body[0].kind else {
            panic!("expected print");
        };
        assert!(args[0].span.starts_after(foreach.var_name.span));
    }
}
