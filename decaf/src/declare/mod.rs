//! Declaration pass
//!
//! Builds the scope tree and symbol table the checker runs against: the
//! global scope with every class, class scopes with fields and methods,
//! formal scopes with parameters and a local scope per block and `foreach`.
//! Scope and symbol ids are written back into the AST. Running the pass on
//! an already declared tree rebuilds everything from scratch.

use crate::ast::{
    Block, ClassDef, Expr, ExprKind, Foreach, Guard, GuardKind, Member, MethodDef, Program, Span, Spanned, Stmt,
    StmtKind, TypeLit,
};
use crate::check::CheckOptions;
use crate::error::{Diagnostics, ErrorKind, SemanticError};
use crate::scope::ScopeKind;
use crate::symbol::{ClassId, ScopeId, Symbol, SymbolTable, VarId, VarKind, Variable};
use crate::types::Type;
use crate::util;

/// Declares every class, member, parameter and local of `program`.
pub fn declare_program(program: &mut Program) -> (SymbolTable, Diagnostics) {
    declare_program_with(program, &CheckOptions::default())
}

#[tracing::instrument(skip_all, fields(classes = program.classes.len()))]
pub fn declare_program_with(program: &mut Program, options: &CheckOptions) -> (SymbolTable, Diagnostics) {
    let mut declarer = Declarer {
        table: SymbolTable::new(),
        diagnostics: Diagnostics::new(),
        hints: options.hints,
    };
    declarer.program(program);
    tracing::debug!(errors = declarer.diagnostics.len(), "declaration pass complete");
    (declarer.table, declarer.diagnostics)
}

/// Resolves a written type against the classes of `table`.
///
/// Unknown classes and `void` array elements are reported and yield `Error`.
/// `var` yields `Unknown`.
pub fn resolve_type(table: &SymbolTable, ty: &Spanned<TypeLit>, diagnostics: &mut Diagnostics, hints: bool) -> Type {
    resolve(table, &ty.node, ty.span, diagnostics, hints)
}

fn resolve(table: &SymbolTable, ty: &TypeLit, span: Span, diagnostics: &mut Diagnostics, hints: bool) -> Type {
    match ty {
        TypeLit::Int => Type::Int,
        TypeLit::Bool => Type::Bool,
        TypeLit::String => Type::String,
        TypeLit::Void => Type::Void,
        TypeLit::Var => Type::Unknown,
        TypeLit::Class(name) => match table.lookup_class(name) {
            Some(class) => Type::Class(class),
            None => {
                diagnostics.issue(
                    SemanticError::new(span, ErrorKind::ClassNotFound { name: name.clone() })
                        .with_hint(class_hint(table, name, hints)),
                );
                Type::Error
            }
        },
        TypeLit::Array(element) => match resolve(table, element, span, diagnostics, hints) {
            Type::Error => Type::Error,
            Type::Void => {
                diagnostics.issue(SemanticError::new(span, ErrorKind::BadArrayElement));
                Type::Error
            }
            element => Type::array(element),
        },
    }
}

/// "did you mean" hint for an unknown class name.
pub fn class_hint(table: &SymbolTable, name: &str, hints: bool) -> Option<String> {
    if !hints {
        return None;
    }
    util::suggest(name, &table.class_names())
}

struct Declarer {
    table: SymbolTable,
    diagnostics: Diagnostics,
    hints: bool,
}

impl Declarer {
    fn issue(&mut self, span: Span, kind: ErrorKind) {
        self.diagnostics.issue(SemanticError::new(span, kind));
    }

    /// Binds `name` in `scope`, reporting a clash with an earlier binding.
    fn bind(&mut self, scope: ScopeId, name: &str, span: Span, symbol: Symbol) {
        if let Err(previous) = self.table.declare(scope, name, symbol) {
            self.conflict(name, span, previous);
        }
    }

    fn conflict(&mut self, name: &str, span: Span, previous: Symbol) {
        let previous = self.table.symbol_span(previous);
        self.issue(
            span,
            ErrorKind::DeclConflict {
                name: name.to_string(),
                previous,
            },
        );
    }

    fn program(&mut self, program: &mut Program) {
        let global = self.table.global();
        program.scope = Some(global);

        for class in &mut program.classes {
            let id = self.table.add_class(&class.name.node, class.sealed, class.name.span);
            self.bind(global, &class.name.node, class.name.span, Symbol::Class(id));
            class.symbol = Some(id);
        }
        for class in &program.classes {
            self.link_parent(class);
        }
        for class in &program.classes {
            self.break_cycle(class);
        }
        for class in &mut program.classes {
            self.members(class);
        }
    }

    fn link_parent(&mut self, class: &ClassDef) {
        let (Some(id), Some(parent)) = (class.symbol, &class.parent) else {
            return;
        };
        match self.table.lookup_class(&parent.node) {
            Some(parent_id) => self.table.class_mut(id).parent = Some(parent_id),
            None => {
                let hint = class_hint(&self.table, &parent.node, self.hints);
                self.diagnostics.issue(
                    SemanticError::new(
                        parent.span,
                        ErrorKind::ClassNotFound {
                            name: parent.node.clone(),
                        },
                    )
                    .with_hint(hint),
                );
            }
        }
    }

    /// Cuts the parent link of a class that inherits from itself.
    fn break_cycle(&mut self, class: &ClassDef) {
        let Some(id) = class.symbol else {
            return;
        };
        let mut current = self.table.class(id).parent;
        for _ in 0..self.table.classes().count() {
            match current {
                Some(ancestor) if ancestor == id => {
                    self.issue(class.span, ErrorKind::BadInheritance);
                    self.table.class_mut(id).parent = None;
                    return;
                }
                Some(ancestor) => current = self.table.class(ancestor).parent,
                None => return,
            }
        }
    }

    fn members(&mut self, class: &mut ClassDef) {
        let Some(owner) = class.symbol else {
            return;
        };
        let scope = self.table.class(owner).scope;
        for member in &mut class.members {
            match member {
                Member::Field(def) => {
                    let ty = self.variable_type(&def.ty, &def.name);
                    let var = self.add_variable(&def.name, ty, VarKind::Member);
                    self.bind(scope, &def.name.node, def.name.span, Symbol::Variable(var));
                    def.symbol = Some(var);
                }
                Member::Method(method) => self.method(owner, scope, method),
            }
        }
    }

    fn method(&mut self, owner: ClassId, class_scope: ScopeId, method: &mut MethodDef) {
        let ret = resolve_type(&self.table, &method.ret_ty, &mut self.diagnostics, self.hints);
        let func = self
            .table
            .add_function(&method.name.node, owner, method.is_static, ret, method.name.span);
        self.bind(class_scope, &method.name.node, method.name.span, Symbol::Function(func));
        method.symbol = Some(func);

        let formal = self.table.function(func).scope;
        let mut params = Vec::with_capacity(method.params.len() + 1);
        if !method.is_static {
            let this = self.table.add_variable(Variable::new(
                "this",
                Type::Class(owner),
                VarKind::Param,
                method.name.span,
            ));
            self.bind(formal, "this", method.name.span, Symbol::Variable(this));
            params.push(Type::Class(owner));
        }
        for param in &mut method.params {
            let ty = self.variable_type(&param.ty, &param.name);
            let var = self.add_variable(&param.name, ty.clone(), VarKind::Param);
            self.bind(formal, &param.name.node, param.name.span, Symbol::Variable(var));
            param.symbol = Some(var);
            params.push(ty);
        }
        self.table.function_mut(func).params = params;

        self.block(&mut method.body, formal, Some(formal));
    }

    /// Declared type of a variable; `void` variables are reported.
    fn variable_type(&mut self, ty: &Spanned<TypeLit>, name: &Spanned<String>) -> Type {
        match resolve_type(&self.table, ty, &mut self.diagnostics, self.hints) {
            Type::Void => {
                self.issue(name.span, ErrorKind::BadVarType { name: name.node.clone() });
                Type::Error
            }
            ty => ty,
        }
    }

    fn add_variable(&mut self, name: &Spanned<String>, ty: Type, kind: VarKind) -> VarId {
        self.table
            .add_variable(Variable::new(&name.node, ty, kind, name.span))
    }

    /// Declares a local. `formal` is set only for the outermost block of a
    /// method, whose locals may not shadow parameters.
    fn local(&mut self, name: &str, span: Span, ty: Type, scope: ScopeId, formal: Option<ScopeId>) -> VarId {
        let var = self
            .table
            .add_variable(Variable::new(name, ty, VarKind::Local, span));
        if let Some(param) = formal.and_then(|formal| self.table.scope(formal).get(name)) {
            self.conflict(name, span, param);
        }
        self.bind(scope, name, span, Symbol::Variable(var));
        var
    }

    fn block(&mut self, block: &mut Block, parent: ScopeId, formal: Option<ScopeId>) {
        let scope = self.table.add_scope(ScopeKind::Local, Some(parent));
        block.scope = Some(scope);
        for stmt in &mut block.stmts {
            self.stmt(stmt, scope, formal);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt, scope: ScopeId, formal: Option<ScopeId>) {
        match &mut stmt.kind {
            StmtKind::VarDef(def) => {
                let ty = self.variable_type(&def.ty, &def.name);
                let var = self.local(&def.name.node, def.name.span, ty, scope, formal);
                def.symbol = Some(var);
            }
            StmtKind::Block(block) => self.block(block, scope, None),
            StmtKind::Expr(expr) | StmtKind::Assign { lhs: expr, .. } => self.var_decl(expr, scope, formal),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.stmt(then_branch, scope, formal);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch, scope, formal);
                }
            }
            StmtKind::While { body, .. } => self.stmt(body, scope, formal),
            StmtKind::For(for_loop) => {
                if let Some(init) = &mut for_loop.init {
                    self.stmt(init, scope, formal);
                }
                if let Some(update) = &mut for_loop.update {
                    self.stmt(update, scope, formal);
                }
                self.stmt(&mut for_loop.body, scope, formal);
            }
            StmtKind::Guard(guard) => self.guard(guard, scope, formal),
            StmtKind::Foreach(foreach) => self.foreach(foreach, scope),
            StmtKind::Break | StmtKind::Return(_) | StmtKind::Print(_) | StmtKind::Scopy(_) => {}
        }
    }

    /// `var x` declares `x` with a type fixed by its first assignment.
    fn var_decl(&mut self, expr: &mut Expr, scope: ScopeId, formal: Option<ScopeId>) {
        let span = expr.span;
        if let ExprKind::VarDecl(decl) = &mut expr.kind {
            let var = self.local(&decl.name, span, Type::Unknown, scope, formal);
            self.table.variable_mut(var).inferred = true;
            decl.symbol = Some(var);
        }
    }

    fn guard(&mut self, guard: &mut Guard, scope: ScopeId, formal: Option<ScopeId>) {
        match &mut guard.kind {
            GuardKind::Empty => {}
            GuardKind::Clause { body, .. } => self.stmt(body, scope, formal),
            GuardKind::Nested(inner) => self.guard(inner, scope, formal),
            GuardKind::Sequence { clauses, last } => {
                for clause in clauses {
                    self.guard(clause, scope, formal);
                }
                self.guard(last, scope, formal);
            }
        }
    }

    /// The loop scope holds the loop variable and the body's locals. A `var`
    /// loop variable is left to the checker, which knows the source type.
    fn foreach(&mut self, foreach: &mut Foreach, parent: ScopeId) {
        let scope = self.table.add_scope(ScopeKind::Local, Some(parent));
        foreach.scope = Some(scope);
        foreach.symbol = None;
        if !foreach.var_ty.node.is_var() {
            let ty = self.variable_type(&foreach.var_ty, &foreach.var_name);
            let var = self.local(&foreach.var_name.node, foreach.var_name.span, ty, scope, None);
            foreach.symbol = Some(var);
        }
        for stmt in &mut foreach.body {
            self.stmt(stmt, scope, None);
        }
    }
}
