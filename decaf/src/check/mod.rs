//! Type checker
//!
//! Walks a declared program, computes the type of every expression, resolves
//! identifiers and calls to symbols, classifies lvalues and records semantic
//! errors. A failed check types its node `Error`; checks that meet an `Error`
//! operand stay silent, so every root cause is reported once.

mod call;
mod expr;
mod ext;
mod stmt;

use crate::ast::{Block, ClassDef, Member, MethodDef, Program, Receiver, Span};
use crate::error::{Diagnostics, ErrorKind, SemanticError};
use crate::scope::ScopeStack;
use crate::symbol::{ClassId, FuncId, ScopeId, SymbolTable};
use crate::types::Type;
use crate::util;
use serde::{Deserialize, Serialize};

/// Knobs shared by the declaration pass and the checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Attach "did you mean" hints to unknown-name errors
    pub hints: bool,
    /// Order diagnostics by source position instead of issue order
    pub sort_diagnostics: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            hints: true,
            sort_diagnostics: false,
        }
    }
}

/// Checks `program` against a table built by the declaration pass.
pub fn check_program(program: &mut Program, table: &mut SymbolTable) -> Diagnostics {
    check_program_with(program, table, &CheckOptions::default())
}

#[tracing::instrument(skip_all, fields(classes = program.classes.len()))]
pub fn check_program_with(program: &mut Program, table: &mut SymbolTable, options: &CheckOptions) -> Diagnostics {
    let mut checker = TypeChecker::new(table, *options);
    checker.check_program(program);
    tracing::debug!(errors = checker.diagnostics.len(), "type checking complete");
    checker.diagnostics
}

/// State of one checking run
pub struct TypeChecker<'a> {
    table: &'a mut SymbolTable,
    scopes: ScopeStack,
    /// Enclosing loops, innermost last
    breakables: Vec<Span>,
    current_function: Option<FuncId>,
    diagnostics: Diagnostics,
    options: CheckOptions,
}

impl<'a> TypeChecker<'a> {
    pub fn new(table: &'a mut SymbolTable, options: CheckOptions) -> Self {
        Self {
            table,
            scopes: ScopeStack::new(),
            breakables: Vec::new(),
            current_function: None,
            diagnostics: Diagnostics::new(),
            options,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn check_program(&mut self, program: &mut Program) {
        self.table.reset_inferred();
        let global = program.scope.unwrap_or_else(|| self.table.global());
        self.with_scope(global, |c| {
            for class in &mut program.classes {
                c.check_class(class);
            }
        });
    }

    fn check_class(&mut self, class: &mut ClassDef) {
        let Some(id) = class.symbol else {
            tracing::warn!(class = %class.name.node, "class was not declared");
            return;
        };
        tracing::debug!(class = %class.name.node, "checking class");
        let (scope, parent) = {
            let symbol = self.table.class(id);
            (symbol.scope, symbol.parent)
        };
        if parent.is_some_and(|parent| self.table.class(parent).sealed) {
            self.issue(class.span, ErrorKind::SealedInheritance);
        }
        self.with_scope(scope, |c| {
            for member in &mut class.members {
                if let Member::Method(method) = member {
                    c.check_method(method);
                }
            }
        });
    }

    fn check_method(&mut self, method: &mut MethodDef) {
        let Some(func) = method.symbol else {
            tracing::warn!(method = %method.name.node, "method was not declared");
            return;
        };
        let scope = self.table.function(func).scope;
        self.current_function = Some(func);
        self.with_scope(scope, |c| c.check_block(&mut method.body));
        self.current_function = None;
    }

    pub(crate) fn check_block(&mut self, block: &mut Block) {
        match block.scope {
            Some(scope) => self.with_scope(scope, |c| {
                for stmt in &mut block.stmts {
                    c.check_stmt(stmt);
                }
            }),
            None => {
                tracing::warn!(span = %block.span, "block has no scope");
                for stmt in &mut block.stmts {
                    self.check_stmt(stmt);
                }
            }
        }
    }

    /// Runs `f` with `scope` open; the stack is rebalanced afterwards.
    fn with_scope<R>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.open(scope);
        let depth = self.scopes.depth();
        let result = f(self);
        debug_assert_eq!(self.scopes.depth(), depth, "unbalanced scope stack");
        self.scopes.close();
        result
    }

    /// Runs `f` inside a construct that `break` may leave.
    fn with_breakable<R>(&mut self, span: Span, f: impl FnOnce(&mut Self) -> R) -> R {
        self.breakables.push(span);
        let result = f(self);
        self.breakables.pop();
        result
    }

    /// How a member reached without a written owner gets its object: the
    /// current `this` inside an instance method, nothing in a static one.
    fn resolve_implicit_receiver(&self) -> Receiver {
        match self.this_class() {
            Some(class) if !self.in_static() => Receiver::ImplicitThis(class),
            _ => Receiver::Absent,
        }
    }

    fn this_class(&self) -> Option<ClassId> {
        self.scopes.enclosing_class(self.table)
    }

    fn in_static(&self) -> bool {
        self.current_function
            .is_some_and(|func| self.table.function(func).is_static)
    }

    fn current_function_name(&self) -> String {
        self.current_function
            .map(|func| self.table.function(func).name.clone())
            .unwrap_or_default()
    }

    fn issue(&mut self, span: Span, kind: ErrorKind) {
        self.diagnostics.issue(SemanticError::new(span, kind));
    }

    fn issue_with_hint(&mut self, span: Span, kind: ErrorKind, hint: Option<String>) {
        self.diagnostics.issue(SemanticError::new(span, kind).with_hint(hint));
    }

    fn compatible(&self, from: &Type, to: &Type) -> bool {
        from.compatible(to, &*self.table)
    }

    fn type_name(&self, ty: &Type) -> String {
        self.table.type_name(ty)
    }

    /// Suggestion among the names visible from the current position.
    fn name_hint(&self, name: &str) -> Option<String> {
        if !self.options.hints {
            return None;
        }
        util::suggest(name, &self.scopes.visible_names(self.table))
    }

    /// Suggestion among the members `class` can see.
    fn member_hint(&self, class: ClassId, name: &str) -> Option<String> {
        if !self.options.hints {
            return None;
        }
        util::suggest(name, &self.table.visible_member_names(class))
    }

    fn class_hint(&self, name: &str) -> Option<String> {
        crate::declare::class_hint(self.table, name, self.options.hints)
    }
}
