//! Semantic types and the compatibility lattice
//!
//! `equal` is exact identity and `compatible` is assignability of a value
//! into a target. `Error` is the poison type for already-reported failures:
//! it is compatible with everything in both directions and equal to nothing,
//! not even itself, so poison is always detected with [`Type::is_error`].

use crate::symbol::ClassId;
use serde::{Deserialize, Serialize};

/// Semantic type of an expression or declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Bool,
    String,
    Void,
    Null,
    /// Declared with `var` and not yet inferred
    Unknown,
    Error,
    Array(Box<Type>),
    Class(ClassId),
    Function { params: Vec<Type>, ret: Box<Type> },
}

/// Read access to single-inheritance class relations.
pub trait ClassHierarchy {
    fn parent_of(&self, class: ClassId) -> Option<ClassId>;

    fn class_name(&self, class: ClassId) -> &str;

    /// True if `sub` is `sup` or one of its descendants.
    fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut current = Some(sub);
        // Bounded walk: a malformed hierarchy must not hang the checker.
        for _ in 0..=u16::MAX {
            match current {
                Some(class) if class == sup => return true,
                Some(class) => current = self.parent_of(class),
                None => return false,
            }
        }
        false
    }
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Type::Class(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) => Some(*id),
            _ => None,
        }
    }

    /// Exact type identity. `Error` is equal to nothing.
    pub fn equal(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Error, _) | (_, Type::Error) => false,
            (Type::Array(a), Type::Array(b)) => a.equal(b),
            (
                Type::Function { params: pa, ret: ra },
                Type::Function { params: pb, ret: rb },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(a, b)| a.equal(b))
                    && ra.equal(rb)
            }
            (a, b) => a == b,
        }
    }

    /// Can a value of type `self` be stored in a location of type `target`?
    pub fn compatible(&self, target: &Type, classes: &impl ClassHierarchy) -> bool {
        match (self, target) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Null, Type::Class(_) | Type::Array(_)) => true,
            (Type::Class(sub), Type::Class(sup)) => classes.is_subclass(*sub, *sup),
            (a, b) => a.equal(b),
        }
    }

    /// Renders the type with class names looked up in `classes`.
    pub fn display<'a, H: ClassHierarchy>(&'a self, classes: &'a H) -> TypeDisplay<'a, H> {
        TypeDisplay { ty: self, classes }
    }
}

/// Display adapter returned by [`Type::display`]
pub struct TypeDisplay<'a, H> {
    ty: &'a Type,
    classes: &'a H,
}

impl<H: ClassHierarchy> std::fmt::Display for TypeDisplay<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ty {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Unknown => write!(f, "unknown"),
            Type::Error => write!(f, "error"),
            Type::Array(element) => write!(f, "{}[]", element.display(self.classes)),
            Type::Class(id) => write!(f, "class : {}", self.classes.class_name(*id)),
            Type::Function { params, ret } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.display(self.classes))?;
                }
                write!(f, ") -> {}", ret.display(self.classes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Animal <- Dog <- Puppy, Cat unrelated.
    struct Zoo;

    const ANIMAL: ClassId = ClassId(0);
    const DOG: ClassId = ClassId(1);
    const PUPPY: ClassId = ClassId(2);
    const CAT: ClassId = ClassId(3);

    impl ClassHierarchy for Zoo {
        fn parent_of(&self, class: ClassId) -> Option<ClassId> {
            match class {
                DOG => Some(ANIMAL),
                PUPPY => Some(DOG),
                _ => None,
            }
        }

        fn class_name(&self, class: ClassId) -> &str {
            ["Animal", "Dog", "Puppy", "Cat"][class.0]
        }
    }

    fn all_types() -> Vec<Type> {
        vec![
            Type::Int,
            Type::Bool,
            Type::String,
            Type::Void,
            Type::Null,
            Type::Unknown,
            Type::Error,
            Type::array(Type::Int),
            Type::Class(DOG),
            Type::function(vec![Type::Int], Type::Bool),
        ]
    }

    #[test]
    fn test_error_is_compatible_both_ways() {
        for ty in all_types() {
            assert!(Type::Error.compatible(&ty, &Zoo), "error -> {ty:?}");
            assert!(ty.compatible(&Type::Error, &Zoo), "{ty:?} -> error");
        }
    }

    #[test]
    fn test_error_equals_nothing() {
        assert!(!Type::Error.equal(&Type::Error));
        for ty in all_types() {
            assert!(!Type::Error.equal(&ty));
            assert!(!ty.equal(&Type::Error));
        }
    }

    #[test]
    fn test_equal_is_reflexive_for_non_error() {
        for ty in all_types().into_iter().filter(|t| !t.is_error()) {
            assert!(ty.equal(&ty), "{ty:?}");
        }
    }

    #[test]
    fn test_subclass_compatibility_is_one_way() {
        assert!(Type::Class(PUPPY).compatible(&Type::Class(ANIMAL), &Zoo));
        assert!(Type::Class(DOG).compatible(&Type::Class(ANIMAL), &Zoo));
        assert!(!Type::Class(ANIMAL).compatible(&Type::Class(DOG), &Zoo));
        assert!(!Type::Class(CAT).compatible(&Type::Class(ANIMAL), &Zoo));
        assert!(Type::Class(CAT).compatible(&Type::Class(CAT), &Zoo));
    }

    #[test]
    fn test_null_widens_to_references_only() {
        assert!(Type::Null.compatible(&Type::Class(CAT), &Zoo));
        assert!(Type::Null.compatible(&Type::array(Type::String), &Zoo));
        assert!(!Type::Null.compatible(&Type::Int, &Zoo));
        assert!(!Type::Class(CAT).compatible(&Type::Null, &Zoo));
        assert!(!Type::array(Type::Int).compatible(&Type::Null, &Zoo));
    }

    #[test]
    fn test_arrays_are_invariant() {
        let dogs = Type::array(Type::Class(DOG));
        let animals = Type::array(Type::Class(ANIMAL));
        assert!(!dogs.compatible(&animals, &Zoo));
        assert!(dogs.compatible(&dogs, &Zoo));
    }

    #[test]
    fn test_array_of_error_is_not_equal() {
        let poisoned = Type::array(Type::Error);
        assert!(!poisoned.equal(&poisoned));
    }

    #[test]
    fn test_function_equality_is_structural() {
        let f = Type::function(vec![Type::Int, Type::Bool], Type::Void);
        assert!(f.equal(&Type::function(vec![Type::Int, Type::Bool], Type::Void)));
        assert!(!f.equal(&Type::function(vec![Type::Int], Type::Void)));
        assert!(!f.equal(&Type::function(vec![Type::Int, Type::Bool], Type::Int)));
    }

    #[test]
    fn test_accessors() {
        let arr = Type::array(Type::Bool);
        assert_eq!(arr.element_type(), Some(&Type::Bool));
        assert_eq!(Type::Class(CAT).class_id(), Some(CAT));
        assert!(Type::function(vec![], Type::Void).is_function());
        assert!(Type::Int.element_type().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::array(Type::array(Type::Int)).display(&Zoo).to_string(), "int[][]");
        assert_eq!(Type::Class(PUPPY).display(&Zoo).to_string(), "class : Puppy");
        assert_eq!(
            Type::function(vec![Type::Class(CAT), Type::Int], Type::Void)
                .display(&Zoo)
                .to_string(),
            "(class : Cat, int) -> void"
        );
    }
}
