//! Stack of the scopes currently open during a traversal
//!
//! The stack mirrors lexical nesting: the global scope at the bottom, then
//! the class, the method's formal scope and any blocks. Lookups walk it from
//! the top. Class scopes are searched through the inheritance chain.

use super::ScopeKind;
use crate::ast::Span;
use crate::symbol::{ClassId, FuncId, ScopeId, Symbol, SymbolTable};

#[derive(Debug, Default)]
pub struct ScopeStack {
    /// Open scopes, innermost last
    scopes: Vec<ScopeId>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, scope: ScopeId) {
        self.scopes.push(scope);
    }

    pub fn close(&mut self) -> Option<ScopeId> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current(&self) -> Option<ScopeId> {
        self.scopes.last().copied()
    }

    fn find_in(table: &SymbolTable, scope: ScopeId, name: &str) -> Option<Symbol> {
        match table.scope(scope).kind {
            ScopeKind::Class(class) => table.lookup_visible(class, name),
            _ => table.scope(scope).get(name),
        }
    }

    /// Looks `name` up in the innermost scope only, or outward through
    /// every open scope.
    pub fn lookup(&self, table: &SymbolTable, name: &str, local_only: bool) -> Option<Symbol> {
        if local_only {
            return self.current().and_then(|scope| Self::find_in(table, scope, name));
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|&scope| Self::find_in(table, scope, name))
    }

    /// Like an outward [`ScopeStack::lookup`], but a local variable declared
    /// after `at` is invisible there. Members, parameters and classes are
    /// visible regardless of position.
    pub fn lookup_before_location(&self, table: &SymbolTable, name: &str, at: Span) -> Option<Symbol> {
        for &scope in self.scopes.iter().rev() {
            let Some(symbol) = Self::find_in(table, scope, name) else {
                continue;
            };
            let declared_later = match symbol {
                Symbol::Variable(var) => {
                    table.scope(scope).kind.is_local() && table.variable(var).span.starts_after(at)
                }
                _ => false,
            };
            if !declared_later {
                return Some(symbol);
            }
        }
        None
    }

    pub fn lookup_class(&self, table: &SymbolTable, name: &str) -> Option<ClassId> {
        table.lookup_class(name)
    }

    /// Nearest open scope whose kind satisfies `want`.
    pub fn look_for_scope(&self, table: &SymbolTable, want: impl Fn(ScopeKind) -> bool) -> Option<ScopeId> {
        self.scopes
            .iter()
            .rev()
            .copied()
            .find(|&scope| want(table.scope(scope).kind))
    }

    pub fn enclosing_class(&self, table: &SymbolTable) -> Option<ClassId> {
        let scope = self.look_for_scope(table, |kind| matches!(kind, ScopeKind::Class(_)))?;
        match table.scope(scope).kind {
            ScopeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn enclosing_function(&self, table: &SymbolTable) -> Option<FuncId> {
        let scope = self.look_for_scope(table, |kind| matches!(kind, ScopeKind::Formal(_)))?;
        match table.scope(scope).kind {
            ScopeKind::Formal(func) => Some(func),
            _ => None,
        }
    }

    /// Binds `name` in the innermost open scope.
    pub fn declare(&self, table: &mut SymbolTable, name: &str, symbol: Symbol) -> Result<(), Symbol> {
        match self.current() {
            Some(scope) => table.declare(scope, name, symbol),
            None => table.declare(table.global(), name, symbol),
        }
    }

    /// Every name reachable from the top of the stack, innermost first.
    pub fn visible_names<'t>(&self, table: &'t SymbolTable) -> Vec<&'t str> {
        let mut names = Vec::new();
        for &scope in self.scopes.iter().rev() {
            match table.scope(scope).kind {
                ScopeKind::Class(class) => names.extend(table.visible_member_names(class)),
                _ => names.extend(table.scope(scope).names()),
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{VarId, VarKind, Variable};
    use crate::types::Type;

    struct Fixture {
        table: SymbolTable,
        stack: ScopeStack,
        class: ClassId,
        func: FuncId,
        field: VarId,
        param: VarId,
        local: VarId,
    }

    /// class A { int v; void f(int p) { { int l; /* top */ } } } with the
    /// local `l` declared at offset 50.
    fn fixture() -> Fixture {
        let mut table = SymbolTable::new();
        let global = table.global();
        let class = table.add_class("A", false, Span::new(0, 1));
        table.declare(global, "A", Symbol::Class(class)).unwrap();

        let field = table.add_variable(Variable::new("v", Type::Int, VarKind::Member, Span::new(100, 101)));
        let class_scope = table.class(class).scope;
        table.declare(class_scope, "v", Symbol::Variable(field)).unwrap();

        let func = table.add_function("f", class, false, Type::Void, Span::new(10, 11));
        let formal = table.function(func).scope;
        let param = table.add_variable(Variable::new("p", Type::Int, VarKind::Param, Span::new(12, 13)));
        table.declare(formal, "p", Symbol::Variable(param)).unwrap();

        let block = table.add_scope(ScopeKind::Local, Some(formal));
        let local = table.add_variable(Variable::new("l", Type::Bool, VarKind::Local, Span::new(50, 51)));
        table.declare(block, "l", Symbol::Variable(local)).unwrap();

        let mut stack = ScopeStack::new();
        for scope in [global, class_scope, formal, block] {
            stack.open(scope);
        }
        Fixture {
            table,
            stack,
            class,
            func,
            field,
            param,
            local,
        }
    }

    #[test]
    fn test_lookup_walks_outward() {
        let f = fixture();
        assert_eq!(f.stack.lookup(&f.table, "p", false), Some(Symbol::Variable(f.param)));
        assert_eq!(f.stack.lookup(&f.table, "v", false), Some(Symbol::Variable(f.field)));
        assert_eq!(f.stack.lookup(&f.table, "A", false), Some(Symbol::Class(f.class)));
        assert_eq!(f.stack.lookup(&f.table, "nope", false), None);
    }

    #[test]
    fn test_lookup_local_only() {
        let f = fixture();
        assert_eq!(f.stack.lookup(&f.table, "l", true), Some(Symbol::Variable(f.local)));
        assert_eq!(f.stack.lookup(&f.table, "p", true), None);
    }

    #[test]
    fn test_lookup_before_location_hides_later_locals() {
        let f = fixture();
        assert_eq!(f.stack.lookup_before_location(&f.table, "l", Span::new(40, 41)), None);
        assert_eq!(
            f.stack.lookup_before_location(&f.table, "l", Span::new(60, 61)),
            Some(Symbol::Variable(f.local))
        );
    }

    #[test]
    fn test_lookup_before_location_ignores_member_order() {
        let f = fixture();
        // The field is declared at offset 100, after the use.
        assert_eq!(
            f.stack.lookup_before_location(&f.table, "v", Span::new(20, 21)),
            Some(Symbol::Variable(f.field))
        );
    }

    #[test]
    fn test_enclosing_scopes() {
        let mut f = fixture();
        assert_eq!(f.stack.enclosing_class(&f.table), Some(f.class));
        assert_eq!(f.stack.enclosing_function(&f.table), Some(f.func));
        f.stack.close();
        f.stack.close();
        assert_eq!(f.stack.enclosing_function(&f.table), None);
        assert_eq!(f.stack.depth(), 2);
    }

    #[test]
    fn test_declare_goes_to_innermost_scope() {
        let mut f = fixture();
        let var = f
            .table
            .add_variable(Variable::new("e", Type::Int, VarKind::Local, Span::new(70, 71)));
        f.stack.declare(&mut f.table, "e", Symbol::Variable(var)).unwrap();
        assert_eq!(f.stack.lookup(&f.table, "e", true), Some(Symbol::Variable(var)));
        assert!(f.stack.visible_names(&f.table).contains(&"e"));
    }
}
