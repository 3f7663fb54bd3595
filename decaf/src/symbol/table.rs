//! Arena owning every scope and symbol of one program

use super::{Class, ClassId, FuncId, Function, ScopeId, Symbol, Variable, VarId};
use crate::ast::Span;
use crate::scope::{Scope, ScopeKind};
use crate::types::{ClassHierarchy, Type};

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    classes: Vec<Class>,
    functions: Vec<Function>,
    variables: Vec<Variable>,
}

impl SymbolTable {
    /// Creates a table holding only the empty global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
            classes: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.0]
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0]
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn variable_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.variables[id.0]
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.classes.iter().enumerate().map(|(i, c)| (ClassId(i), c))
    }

    pub fn add_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope::new(kind, parent));
        ScopeId(self.scopes.len() - 1)
    }

    /// Adds a class together with its member scope. The class is not bound
    /// to its name; see [`SymbolTable::declare`].
    pub fn add_class(&mut self, name: impl Into<String>, sealed: bool, span: Span) -> ClassId {
        let id = ClassId(self.classes.len());
        let scope = self.add_scope(ScopeKind::Class(id), Some(self.global()));
        self.classes.push(Class {
            name: name.into(),
            parent: None,
            sealed,
            scope,
            span,
        });
        id
    }

    /// Adds a method of `owner` together with its formal scope.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        owner: ClassId,
        is_static: bool,
        ret: Type,
        span: Span,
    ) -> FuncId {
        let id = FuncId(self.functions.len());
        let class_scope = self.class(owner).scope;
        let scope = self.add_scope(ScopeKind::Formal(id), Some(class_scope));
        self.functions.push(Function {
            name: name.into(),
            owner,
            is_static,
            ret,
            params: Vec::new(),
            scope,
            span,
        });
        id
    }

    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }

    /// Returns every `var` local to `Unknown`, undoing a previous checker run.
    pub fn reset_inferred(&mut self) {
        for variable in self.variables.iter_mut().filter(|v| v.inferred) {
            variable.ty = Type::Unknown;
        }
    }

    /// Binds `name` in `scope`, returning the previous binding on conflict.
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: Symbol) -> Result<(), Symbol> {
        self.scopes[scope.0].insert(name, symbol)
    }

    /// Global lookup restricted to classes
    pub fn lookup_class(&self, name: &str) -> Option<ClassId> {
        match self.scope(self.global()).get(name) {
            Some(Symbol::Class(id)) => Some(id),
            _ => None,
        }
    }

    /// Finds a member of `class` or of the nearest ancestor declaring it.
    pub fn lookup_visible(&self, class: ClassId, name: &str) -> Option<Symbol> {
        let mut current = Some(class);
        for _ in 0..self.classes.len() {
            let id = current?;
            if let Some(symbol) = self.scope(self.class(id).scope).get(name) {
                return Some(symbol);
            }
            current = self.class(id).parent;
        }
        None
    }

    /// Member names visible in `class`, own members first.
    pub fn visible_member_names(&self, class: ClassId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = Some(class);
        for _ in 0..self.classes.len() {
            let Some(id) = current else { break };
            names.extend(self.scope(self.class(id).scope).names());
            current = self.class(id).parent;
        }
        names
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.scope(self.global()).names().collect()
    }

    pub fn symbol_type(&self, symbol: Symbol) -> Type {
        match symbol {
            Symbol::Class(id) => Type::Class(id),
            Symbol::Function(id) => self.function(id).ty(),
            Symbol::Variable(id) => self.variable(id).ty.clone(),
        }
    }

    pub fn symbol_span(&self, symbol: Symbol) -> Span {
        match symbol {
            Symbol::Class(id) => self.class(id).span,
            Symbol::Function(id) => self.function(id).span,
            Symbol::Variable(id) => self.variable(id).span,
        }
    }

    pub fn type_name(&self, ty: &Type) -> String {
        ty.display(self).to_string()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassHierarchy for SymbolTable {
    fn parent_of(&self, class: ClassId) -> Option<ClassId> {
        self.class(class).parent
    }

    fn class_name(&self, class: ClassId) -> &str {
        &self.class(class).name
    }
}
