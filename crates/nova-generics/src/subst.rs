use std::collections::HashSet;

use crate::{Binding, DeclId, GenericsMap, Type, TypeEnv, TypeVar, UnknownGenericError, WildcardType};

/// Where a [`Substitutor`] looks up bindings.
///
/// Implemented by [`crate::ResolutionContext`]; context construction implements it over the maps
/// built so far.
pub trait GenericsScope {
    fn generics_map(&self, decl: DeclId) -> Option<&GenericsMap>;
}

/// Rewrites type variables in a descriptor using the bindings of a [`GenericsScope`].
///
/// * variables bound to concrete types are replaced
/// * chained bindings (a variable bound to another variable) are followed to a fixpoint
/// * variables bound to [`Binding::Unresolved`] are kept as-is
/// * variables whose declaring entity, or name, is unknown to the scope fail with
///   [`UnknownGenericError`] (without a context type)
pub struct Substitutor<'a> {
    env: &'a dyn TypeEnv,
    scope: &'a dyn GenericsScope,
}

impl<'a> Substitutor<'a> {
    pub fn new(env: &'a dyn TypeEnv, scope: &'a dyn GenericsScope) -> Self {
        Self { env, scope }
    }

    pub fn substitute(&self, ty: &Type) -> Result<Type, UnknownGenericError> {
        let mut visiting = Vec::new();
        self.substitute_inner(ty, &mut visiting)
    }

    fn substitute_inner(
        &self,
        ty: &Type,
        visiting: &mut Vec<TypeVar>,
    ) -> Result<Type, UnknownGenericError> {
        Ok(match ty {
            Type::Raw(_) => ty.clone(),
            Type::Parameterized(p) => {
                let args = p
                    .args
                    .iter()
                    .map(|arg| self.substitute_inner(arg, visiting))
                    .collect::<Result<Vec<_>, _>>()?;
                Type::class(p.raw, args)
            }
            Type::Array(elem) => Type::Array(Box::new(self.substitute_inner(elem, visiting)?)),
            Type::Wildcard(w) => {
                let upper = self.substitute_inner(&w.upper, visiting)?;
                let lower = match &w.lower {
                    Some(lower) => Some(Box::new(self.substitute_inner(lower, visiting)?)),
                    None => None,
                };
                Type::Wildcard(WildcardType {
                    upper: Box::new(upper),
                    lower,
                })
            }
            Type::Var(var) => self.substitute_var(var, visiting)?,
        })
    }

    fn substitute_var(
        &self,
        var: &TypeVar,
        visiting: &mut Vec<TypeVar>,
    ) -> Result<Type, UnknownGenericError> {
        let binding = self
            .scope
            .generics_map(var.decl)
            .and_then(|map| map.get(&var.name));
        let Some(binding) = binding else {
            tracing::debug!(
                target: "nova.generics",
                generic = var.name.as_str(),
                source = %self.env.describe_decl(var.decl),
                "unknown generic"
            );
            return Err(UnknownGenericError::new(
                self.env,
                var.name.clone(),
                Some(var.decl),
            ));
        };

        match binding {
            Binding::Unresolved { .. } => Ok(Type::Var(var.clone())),
            Binding::Resolved(ty) if ty.is_concrete() => Ok(ty.clone()),
            Binding::Resolved(ty) => {
                if visiting.contains(var) {
                    return Ok(Type::Var(var.clone()));
                }
                visiting.push(var.clone());
                let out = self.substitute_inner(ty, visiting);
                visiting.pop();
                out
            }
        }
    }
}

/// Static erasure: parameterized types lose their arguments, variables become the erasure of
/// their first declared bound (`Object` when unbounded or unknown), wildcards their upper bound.
pub fn erase(env: &dyn TypeEnv, ty: &Type) -> Type {
    let mut seen = HashSet::new();
    erase_inner(env, ty, &mut seen)
}

fn erase_inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVar>) -> Type {
    let object = Type::Raw(env.well_known().object);
    match ty {
        Type::Raw(_) => ty.clone(),
        Type::Parameterized(p) => Type::Raw(p.raw),
        Type::Array(elem) => Type::Array(Box::new(erase_inner(env, elem, seen))),
        Type::Wildcard(w) => erase_inner(env, &w.upper, seen),
        Type::Var(var) => {
            if !seen.insert(var.clone()) {
                return object;
            }
            let bound = env
                .type_params(var.decl)
                .and_then(|params| params.iter().find(|tp| tp.name == var.name))
                .and_then(|tp| tp.bounds.first());
            match bound {
                Some(bound) => erase_inner(env, bound, seen),
                None => object,
            }
        }
    }
}
