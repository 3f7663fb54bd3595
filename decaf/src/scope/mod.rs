//! Scopes and the scope stack
//!
//! A scope maps names to symbols. Scopes nest: global, then one class scope
//! per class, one formal scope per method, then local scopes for blocks and
//! `foreach` bodies. Each scope records the id of its enclosing scope.

mod stack;

pub use stack::ScopeStack;

use crate::symbol::{ClassId, FuncId, ScopeId, Symbol};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    /// Members of a class
    Class(ClassId),
    /// Parameters of a method
    Formal(FuncId),
    /// Block or loop body
    Local,
}

impl ScopeKind {
    pub fn is_local(&self) -> bool {
        matches!(self, ScopeKind::Local)
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Lexically enclosing scope
    pub parent: Option<ScopeId>,
    entries: BTreeMap<String, Symbol>,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.entries.get(name).copied()
    }

    /// Binds `name`; names are unique within one scope.
    pub fn insert(&mut self, name: &str, symbol: Symbol) -> Result<(), Symbol> {
        match self.entries.get(name) {
            Some(existing) => Err(*existing),
            None => {
                self.entries.insert(name.to_string(), symbol);
                Ok(())
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::VarId;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut scope = Scope::new(ScopeKind::Local, None);
        assert!(scope.insert("x", Symbol::Variable(VarId(0))).is_ok());
        assert_eq!(
            scope.insert("x", Symbol::Variable(VarId(1))),
            Err(Symbol::Variable(VarId(0)))
        );
        assert_eq!(scope.get("x"), Some(Symbol::Variable(VarId(0))));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let mut scope = Scope::new(ScopeKind::Global, None);
        scope.insert("b", Symbol::Class(ClassId(1))).unwrap();
        scope.insert("a", Symbol::Class(ClassId(0))).unwrap();
        assert_eq!(scope.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
