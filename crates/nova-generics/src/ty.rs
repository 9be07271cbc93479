use crate::{ClassId, DeclId};

/// A type descriptor: an immutable, structurally comparable description of a (possibly generic)
/// type as seen through reflection.
///
/// Descriptors never point back into a [`crate::ResolutionContext`]; a [`Type::Var`] is only
/// meaningful relative to a context that has a generics map for its declaring entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// A concrete non-generic (or erased) type, e.g. `String` or `int`.
    Raw(ClassId),
    /// A raw class applied to type arguments, e.g. `List<String>`.
    Parameterized(ParameterizedType),
    /// A reference to a declared type variable, e.g. `T`.
    Var(TypeVar),
    /// A bounded type argument, e.g. `? extends Number` or `? super T`.
    Wildcard(WildcardType),
    /// An array of the element type, e.g. `T[]`.
    Array(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterizedType {
    pub raw: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub name: String,
    pub decl: DeclId,
}

/// `?` is modelled as `? extends Object`; a lower bound never removes the upper bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WildcardType {
    pub upper: Box<Type>,
    pub lower: Option<Box<Type>>,
}

impl Type {
    /// `Raw` when `args` is empty, `Parameterized` otherwise.
    pub fn class(raw: ClassId, args: Vec<Type>) -> Type {
        if args.is_empty() {
            Type::Raw(raw)
        } else {
            Type::Parameterized(ParameterizedType { raw, args })
        }
    }

    pub fn var(name: impl Into<String>, decl: impl Into<DeclId>) -> Type {
        Type::Var(TypeVar {
            name: name.into(),
            decl: decl.into(),
        })
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// `? extends upper`
    pub fn extends(upper: Type) -> Type {
        Type::Wildcard(WildcardType {
            upper: Box::new(upper),
            lower: None,
        })
    }

    /// `? super lower`; `object` is the implicit upper bound.
    pub fn super_of(object: ClassId, lower: Type) -> Type {
        Type::Wildcard(WildcardType {
            upper: Box::new(Type::Raw(object)),
            lower: Some(Box::new(lower)),
        })
    }

    /// `?`
    pub fn unbounded(object: ClassId) -> Type {
        Type::extends(Type::Raw(object))
    }

    /// The class this type is an instantiation of, if it is a class type at all.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Raw(id) => Some(*id),
            Type::Parameterized(p) => Some(p.raw),
            _ => None,
        }
    }

    /// Type arguments of a parameterized type; empty for every other shape.
    pub fn args(&self) -> &[Type] {
        match self {
            Type::Parameterized(p) => &p.args,
            _ => &[],
        }
    }

    pub fn has_type_vars(&self) -> bool {
        let mut found = false;
        self.visit_type_vars(&mut |_| found = true);
        found
    }

    /// A type is concrete when no type variable occurs anywhere inside it.
    pub fn is_concrete(&self) -> bool {
        !self.has_type_vars()
    }

    /// Calls `f` for every type variable occurring in `self`, in left-to-right order.
    pub fn visit_type_vars(&self, f: &mut dyn FnMut(&TypeVar)) {
        match self {
            Type::Raw(_) => {}
            Type::Parameterized(p) => p.args.iter().for_each(|arg| arg.visit_type_vars(f)),
            Type::Var(var) => f(var),
            Type::Wildcard(w) => {
                w.upper.visit_type_vars(f);
                if let Some(lower) = &w.lower {
                    lower.visit_type_vars(f);
                }
            }
            Type::Array(elem) => elem.visit_type_vars(f),
        }
    }

    pub fn type_vars(&self) -> Vec<TypeVar> {
        let mut out: Vec<TypeVar> = Vec::new();
        self.visit_type_vars(&mut |var| {
            if !out.contains(var) {
                out.push(var.clone());
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MethodId;

    #[test]
    fn class_without_args_is_raw() {
        let id = ClassId::new(7);
        assert_eq!(Type::class(id, vec![]), Type::Raw(id));
        assert_eq!(Type::class(id, vec![]).args(), &[] as &[Type]);
    }

    #[test]
    fn type_vars_are_collected_once_in_order() {
        let list = ClassId::new(1);
        let map = ClassId::new(2);
        let object = ClassId::new(0);
        let m = MethodId::new(3);

        let ty = Type::class(
            map,
            vec![
                Type::var("K", m),
                Type::class(
                    list,
                    vec![Type::super_of(object, Type::array(Type::var("V", m)))],
                ),
                Type::var("K", m),
            ],
        );

        let names: Vec<String> = ty.type_vars().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["K".to_string(), "V".to_string()]);
        assert!(!ty.is_concrete());
        assert!(Type::unbounded(object).is_concrete());
    }

    #[test]
    fn same_name_different_declaration_is_a_different_variable() {
        let a = Type::var("T", ClassId::new(1));
        let b = Type::var("T", MethodId::new(1));
        assert_ne!(a, b);
    }
}
