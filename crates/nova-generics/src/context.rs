use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::{ResolverConfig, UnresolvedGenerics};
use crate::error::{ResolveError, Result};
use crate::hierarchy::{walk_hierarchy, Ancestor};
use crate::subst::{erase, GenericsScope, Substitutor};
use crate::{
    format_type, Binding, ClassId, DeclId, GenericsMap, MethodId, Type, TypeEnv, TypeParamDef,
    UnknownGenericError,
};

/// Generic bindings for the whole hierarchy of one concrete (root) class.
///
/// A context is built once and then only read: it owns plain data, is `Send + Sync`, and cloning
/// it is cheap (the class maps are shared). Methods that add method-scoped bindings return a new
/// context and leave `self` untouched.
///
/// Every query reports unknown generics annotated with the root class as context type.
#[derive(Clone, Debug)]
pub struct ResolutionContext {
    root: ClassId,
    /// The root first, then ancestors in walk order.
    classes: Arc<IndexMap<ClassId, GenericsMap>>,
    methods: Arc<HashMap<MethodId, GenericsMap>>,
}

/// Options for building a [`ResolutionContext`].
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    root: ClassId,
    root_generics: Option<Vec<Type>>,
    ignore: HashSet<ClassId>,
    ignore_names: Vec<String>,
    unresolved: UnresolvedGenerics,
}

impl ContextBuilder {
    /// Explicit bindings for the root class's own type parameters, in declaration order.
    pub fn root_generics(mut self, args: Vec<Type>) -> Self {
        self.root_generics = Some(args);
        self
    }

    /// Stop walking the hierarchy at `class`.
    pub fn ignore(mut self, class: ClassId) -> Self {
        self.ignore.insert(class);
        self
    }

    pub fn unresolved_generics(mut self, policy: UnresolvedGenerics) -> Self {
        self.unresolved = policy;
        self
    }

    pub fn config(mut self, config: &ResolverConfig) -> Self {
        self.unresolved = config.unresolved_generics;
        self.ignore_names.extend(config.ignore_classes.iter().cloned());
        self
    }

    pub fn build(self, env: &dyn TypeEnv) -> Result<ResolutionContext> {
        let root = self.root;
        let root_def = env.class(root).ok_or(ResolveError::UnknownClass(root))?;

        let mut ignore = self.ignore;
        ignore.extend(
            self.ignore_names
                .iter()
                .filter_map(|name| env.lookup_class(name)),
        );

        let mut classes: IndexMap<ClassId, GenericsMap> = IndexMap::new();

        let mut root_map = GenericsMap::new(DeclId::Class(root));
        match self.root_generics {
            Some(args) => {
                if args.len() != root_def.type_params.len() {
                    return Err(ResolveError::RootGenericsArity {
                        class: root_def.name.clone(),
                        expected: root_def.type_params.len(),
                        found: args.len(),
                    });
                }
                for (tp, arg) in root_def.type_params.iter().zip(args) {
                    root_map.insert(tp.name.clone(), Binding::Resolved(arg));
                }
            }
            None => {
                for tp in &root_def.type_params {
                    root_map.insert(
                        tp.name.clone(),
                        unbound(env, DeclId::Class(root), tp, self.unresolved),
                    );
                }
            }
        }
        classes.insert(root, root_map);

        let ancestors = walk_hierarchy(env, root, &ignore);
        for Ancestor {
            class,
            args,
            subtype,
        } in ancestors
        {
            let map = ancestor_map(env, &classes, class, &args, self.unresolved).map_err(|err| {
                tracing::debug!(
                    target: "nova.generics",
                    ancestor = env.class_name(class).unwrap_or("<unknown>"),
                    subtype = env.class_name(subtype).unwrap_or("<unknown>"),
                    "malformed supertype arguments"
                );
                ResolveError::from(err.with_context_type(env, root))
            })?;
            classes.insert(class, map);
        }

        tracing::debug!(
            target: "nova.generics",
            root = root_def.name.as_str(),
            ancestors = classes.len() - 1,
            "built resolution context"
        );

        Ok(ResolutionContext {
            root,
            classes: Arc::new(classes),
            methods: Arc::new(HashMap::new()),
        })
    }
}

/// Bind the declared generics of `class` to the arguments supplied by its subtype, substituting
/// the subtype's own variables through the maps built so far.
fn ancestor_map(
    env: &dyn TypeEnv,
    built: &IndexMap<ClassId, GenericsMap>,
    class: ClassId,
    args: &[Type],
    unresolved: UnresolvedGenerics,
) -> std::result::Result<GenericsMap, UnknownGenericError> {
    let mut map = GenericsMap::new(DeclId::Class(class));
    let Some(def) = env.class(class) else {
        return Ok(map);
    };

    let scope = BuiltMaps(built);
    let subst = Substitutor::new(env, &scope);
    for (idx, tp) in def.type_params.iter().enumerate() {
        // Raw usage (`extends Base`) supplies no arguments at all.
        let binding = match args.get(idx) {
            Some(arg) => Binding::Resolved(subst.substitute(arg)?),
            None => unbound(env, DeclId::Class(class), tp, unresolved),
        };
        tracing::trace!(
            target: "nova.generics",
            class = def.name.as_str(),
            generic = tp.name.as_str(),
            binding = ?binding,
            "bound generic"
        );
        map.insert(tp.name.clone(), binding);
    }
    Ok(map)
}

fn unbound(
    env: &dyn TypeEnv,
    decl: DeclId,
    tp: &TypeParamDef,
    policy: UnresolvedGenerics,
) -> Binding {
    let bound = erase(env, &Type::var(tp.name.clone(), decl));
    match policy {
        UnresolvedGenerics::UpperBound => Binding::Resolved(bound),
        UnresolvedGenerics::Variable => Binding::Unresolved { bound },
    }
}

struct BuiltMaps<'a>(&'a IndexMap<ClassId, GenericsMap>);

impl GenericsScope for BuiltMaps<'_> {
    fn generics_map(&self, decl: DeclId) -> Option<&GenericsMap> {
        match decl {
            DeclId::Class(id) => self.0.get(&id),
            DeclId::Method(_) => None,
        }
    }
}

impl GenericsScope for ResolutionContext {
    fn generics_map(&self, decl: DeclId) -> Option<&GenericsMap> {
        match decl {
            DeclId::Class(id) => self.classes.get(&id),
            DeclId::Method(id) => self.methods.get(&id),
        }
    }
}

impl ResolutionContext {
    /// Build a context for `root` with default options.
    pub fn new(env: &dyn TypeEnv, root: ClassId) -> Result<Self> {
        Self::builder(root).build(env)
    }

    pub fn builder(root: ClassId) -> ContextBuilder {
        ContextBuilder {
            root,
            root_generics: None,
            ignore: HashSet::new(),
            ignore_names: Vec::new(),
            unresolved: UnresolvedGenerics::default(),
        }
    }

    pub fn root(&self) -> ClassId {
        self.root
    }

    /// Ancestors of the root in walk order (see [`crate::walk_hierarchy`]).
    pub fn ancestors(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.keys().copied().skip(1)
    }

    /// `true` for the root and each of its ancestors.
    pub fn contains(&self, class: ClassId) -> bool {
        self.classes.contains_key(&class)
    }

    pub fn class_generics(&self, class: ClassId) -> Option<&GenericsMap> {
        self.classes.get(&class)
    }

    pub fn method_generics(&self, method: MethodId) -> Option<&GenericsMap> {
        self.methods.get(&method)
    }

    /// Resolve `ty`, written relative to any class of this hierarchy, from the root's point of
    /// view.
    pub fn resolve_type(&self, env: &dyn TypeEnv, ty: &Type) -> Result<Type> {
        Substitutor::new(env, self)
            .substitute(ty)
            .map_err(|err| self.annotate(env, err))
    }

    /// The binding of `class`'s generic `name`, e.g. `T` of `Base` seen from `Impl`.
    pub fn generic(&self, env: &dyn TypeEnv, class: ClassId, name: &str) -> Result<Type> {
        self.ensure_contains(env, class)?;
        self.resolve_type(env, &Type::var(name, class))
    }

    /// All generics of `class` in declaration order.
    pub fn generics(&self, env: &dyn TypeEnv, class: ClassId) -> Result<Vec<Type>> {
        self.ensure_contains(env, class)?;
        let map = &self.classes[&class];
        map.names()
            .map(|name| self.resolve_type(env, &Type::var(name, class)))
            .collect()
    }

    /// `class` parameterized with its bindings, e.g. `Base<String>` for `Base` seen from `Impl`.
    pub fn ancestor_type(&self, env: &dyn TypeEnv, class: ClassId) -> Result<Type> {
        Ok(Type::class(class, self.generics(env, class)?))
    }

    pub fn resolve_field_type(&self, env: &dyn TypeEnv, class: ClassId, field: &str) -> Result<Type> {
        self.ensure_contains(env, class)?;
        let def = env.class(class).ok_or(ResolveError::UnknownClass(class))?;
        let field_def = def.field(field).ok_or_else(|| ResolveError::UnknownField {
            class: def.name.clone(),
            field: field.to_string(),
        })?;
        self.resolve_type(env, &field_def.ty)
    }

    /// `Ok(None)` for `void` methods.
    pub fn resolve_return_type(&self, env: &dyn TypeEnv, method: MethodId) -> Result<Option<Type>> {
        let def = env.method(method).ok_or(ResolveError::UnknownMethod(method))?;
        self.ensure_contains(env, def.owner)?;
        def.return_type
            .as_ref()
            .map(|ty| self.resolve_type(env, ty))
            .transpose()
    }

    pub fn resolve_parameters(&self, env: &dyn TypeEnv, method: MethodId) -> Result<Vec<Type>> {
        let def = env.method(method).ok_or(ResolveError::UnknownMethod(method))?;
        self.ensure_contains(env, def.owner)?;
        def.params
            .iter()
            .map(|ty| self.resolve_type(env, ty))
            .collect()
    }

    /// Resolve `ty` and erase the result (`List<String>` becomes `List`, an unresolved `T` its
    /// bound).
    pub fn resolve_class(&self, env: &dyn TypeEnv, ty: &Type) -> Result<Type> {
        Ok(erase(env, &self.resolve_type(env, ty)?))
    }

    pub fn to_string_type(&self, env: &dyn TypeEnv, ty: &Type) -> Result<String> {
        Ok(format_type(env, &self.resolve_type(env, ty)?))
    }

    /// A context that additionally binds `method`'s type parameters to `args`, given in
    /// declaration order. Arguments may reference the hierarchy's class generics; they are resolved
    /// against this context first.
    pub fn with_method_generics(
        &self,
        env: &dyn TypeEnv,
        method: MethodId,
        args: Vec<Type>,
    ) -> Result<ResolutionContext> {
        let def = env.method(method).ok_or(ResolveError::UnknownMethod(method))?;
        self.ensure_contains(env, def.owner)?;
        if args.len() != def.type_params.len() {
            return Err(ResolveError::MethodGenericsArity {
                method: env.describe_decl(DeclId::Method(method)),
                expected: def.type_params.len(),
                found: args.len(),
            });
        }

        let mut map = GenericsMap::new(DeclId::Method(method));
        for (tp, arg) in def.type_params.iter().zip(&args) {
            map.insert(tp.name.clone(), Binding::Resolved(self.resolve_type(env, arg)?));
        }
        Ok(self.with_method_map(method, map))
    }

    /// A context that binds each of `method`'s type parameters to its first declared bound,
    /// resolved in this context. Bounds may reference earlier parameters of the same method;
    /// self-referencing bounds (`T extends Comparable<T>`) keep the variable.
    pub fn with_method_bounds(&self, env: &dyn TypeEnv, method: MethodId) -> Result<ResolutionContext> {
        let def = env.method(method).ok_or(ResolveError::UnknownMethod(method))?;
        self.ensure_contains(env, def.owner)?;

        let decl = DeclId::Method(method);
        let mut map = GenericsMap::new(decl);
        for tp in &def.type_params {
            map.insert(
                tp.name.clone(),
                unbound(env, decl, tp, UnresolvedGenerics::Variable),
            );
        }

        let mut ctx = self.with_method_map(method, map);
        for tp in &def.type_params {
            let bound = tp
                .bounds
                .first()
                .cloned()
                .unwrap_or(Type::Raw(env.well_known().object));
            let resolved = ctx.resolve_type(env, &bound)?;
            let mut map = ctx.methods[&method].clone();
            map.insert(tp.name.clone(), Binding::Resolved(resolved));
            ctx = ctx.with_method_map(method, map);
        }
        Ok(ctx)
    }

    fn with_method_map(&self, method: MethodId, map: GenericsMap) -> ResolutionContext {
        let mut methods = (*self.methods).clone();
        methods.insert(method, map);
        ResolutionContext {
            root: self.root,
            classes: Arc::clone(&self.classes),
            methods: Arc::new(methods),
        }
    }

    fn ensure_contains(&self, env: &dyn TypeEnv, class: ClassId) -> Result<()> {
        if self.contains(class) {
            return Ok(());
        }
        Err(ResolveError::NotInHierarchy {
            class: class_label(env, class),
            root: class_label(env, self.root),
        })
    }

    fn annotate(&self, env: &dyn TypeEnv, err: UnknownGenericError) -> ResolveError {
        ResolveError::UnknownGeneric(err.with_context_type(env, self.root))
    }
}

fn class_label(env: &dyn TypeEnv, class: ClassId) -> String {
    env.class_name(class)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{class:?}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ClassDef, ClassKind, ClassStore};

    fn is_send_sync<T: Send + Sync>() {}

    #[test]
    fn context_is_shareable() {
        is_send_sync::<ResolutionContext>();
    }

    #[test]
    fn root_generics_arity_is_checked() {
        let store = ClassStore::with_minimal_jdk();
        let list = store.class_id("java.util.ArrayList").unwrap();

        let err = ResolutionContext::builder(list)
            .root_generics(vec![])
            .build(&store)
            .unwrap_err();
        assert!(
            matches!(
                err,
                ResolveError::RootGenericsArity {
                    expected: 1,
                    found: 0,
                    ..
                }
            ),
            "{err}"
        );
    }

    #[test]
    fn classes_outside_the_hierarchy_are_rejected() {
        let mut store = ClassStore::with_minimal_jdk();
        let unrelated = store.add_class(ClassDef::new("com.example.Unrelated", ClassKind::Class));
        let list = store.class_id("java.util.ArrayList").unwrap();

        let ctx = ResolutionContext::new(&store, list).unwrap();
        let err = ctx.generics(&store, unrelated).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type com.example.Unrelated is not part of the hierarchy of java.util.ArrayList"
        );
    }
}
