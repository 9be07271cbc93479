use std::collections::HashSet;

use crate::{ClassId, Type, TypeEnv};

/// One supertype of a walked class, together with the type arguments the more specific type in
/// the chain supplied for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub class: ClassId,
    /// Arguments exactly as written on `subtype`'s declaration; they may reference `subtype`'s own
    /// type variables. Empty when the supertype is used raw.
    pub args: Vec<Type>,
    /// The type whose `extends`/`implements` clause introduced this ancestor.
    pub subtype: ClassId,
}

/// Enumerate every ancestor of `root` (excluding `root` itself).
///
/// The order is a depth-first pre-order walk where a class's superclass edge is followed before
/// its interface edges, and interfaces are followed in declaration order. An ancestor reachable
/// through several paths is reported once, for the first path in that order; later paths are
/// dropped even when they supply different type arguments.
///
/// Classes in `ignore` are neither reported nor walked through. Supertypes without metadata in
/// `env` are reported but not walked through.
pub fn walk_hierarchy(env: &dyn TypeEnv, root: ClassId, ignore: &HashSet<ClassId>) -> Vec<Ancestor> {
    let mut out = Vec::new();
    let mut seen: HashSet<ClassId> = HashSet::new();
    seen.insert(root);

    let mut stack: Vec<Ancestor> = Vec::new();
    push_supertypes(env, root, &mut stack);

    while let Some(ancestor) = stack.pop() {
        if ignore.contains(&ancestor.class) {
            tracing::trace!(
                target: "nova.generics",
                class = ?ancestor.class,
                "skipping ignored ancestor"
            );
            continue;
        }
        if !seen.insert(ancestor.class) {
            continue;
        }

        let class = ancestor.class;
        tracing::trace!(
            target: "nova.generics",
            class = env.class_name(class).unwrap_or("<unknown>"),
            via = env.class_name(ancestor.subtype).unwrap_or("<unknown>"),
            "visiting ancestor"
        );
        out.push(ancestor);
        push_supertypes(env, class, &mut stack);
    }

    out
}

/// Push the direct supertypes of `class` so that they pop in walk order.
fn push_supertypes(env: &dyn TypeEnv, class: ClassId, stack: &mut Vec<Ancestor>) {
    let Some(def) = env.class(class) else {
        tracing::trace!(target: "nova.generics", class = ?class, "no metadata for class");
        return;
    };

    let direct = def.super_class.iter().chain(def.interfaces.iter());
    let mut supertypes: Vec<Ancestor> = direct
        .filter_map(|ty| {
            let Some(id) = ty.class_id() else {
                tracing::trace!(
                    target: "nova.generics",
                    class = def.name.as_str(),
                    "ignoring non-class supertype"
                );
                return None;
            };
            Some(Ancestor {
                class: id,
                args: ty.args().to_vec(),
                subtype: class,
            })
        })
        .collect();

    supertypes.reverse();
    stack.extend(supertypes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, ClassKind, ClassStore, MethodDef, MethodId, TypeParamDef, WellKnownTypes};

    /// A store that pretends one class has no metadata.
    struct Hiding<'a> {
        store: &'a ClassStore,
        hidden: ClassId,
    }

    impl TypeEnv for Hiding<'_> {
        fn class(&self, id: ClassId) -> Option<&ClassDef> {
            if id == self.hidden {
                None
            } else {
                self.store.class(id)
            }
        }

        fn method(&self, id: MethodId) -> Option<&MethodDef> {
            self.store.method(id)
        }

        fn lookup_class(&self, binary_name: &str) -> Option<ClassId> {
            self.store.lookup_class(binary_name)
        }

        fn well_known(&self) -> &WellKnownTypes {
            self.store.well_known()
        }
    }

    #[test]
    fn superclass_chain_comes_before_interfaces() {
        let mut store = ClassStore::new();
        let object = Type::Raw(store.well_known().object);

        let i_root = store.add_class(ClassDef::new("IRoot", ClassKind::Interface));
        let i_base = store.add_class(ClassDef::new("IBase", ClassKind::Interface));

        let mut base = ClassDef::new("Base", ClassKind::Class);
        base.super_class = Some(object);
        base.interfaces = vec![Type::Raw(i_base)];
        let base = store.add_class(base);

        let mut root = ClassDef::new("Root", ClassKind::Class);
        root.super_class = Some(Type::Raw(base));
        root.interfaces = vec![Type::Raw(i_root)];
        let root = store.add_class(root);

        let order: Vec<&str> = walk_hierarchy(&store, root, &HashSet::new())
            .iter()
            .map(|a| store.class_name(a.class).unwrap())
            .collect();
        assert_eq!(order, vec!["Base", "java.lang.Object", "IBase", "IRoot"]);
    }

    #[test]
    fn ignored_classes_cut_the_walk() {
        let mut store = ClassStore::new();
        let object = Type::Raw(store.well_known().object);

        let i_hidden = store.add_class(ClassDef::new("IHidden", ClassKind::Interface));
        let mut proxy = ClassDef::new("Proxy", ClassKind::Interface);
        proxy.interfaces = vec![Type::Raw(i_hidden)];
        let proxy = store.add_class(proxy);

        let mut root = ClassDef::new("Root", ClassKind::Class);
        root.super_class = Some(object);
        root.interfaces = vec![Type::Raw(proxy)];
        let root = store.add_class(root);

        let ignore: HashSet<ClassId> = [proxy].into_iter().collect();
        let classes: Vec<ClassId> = walk_hierarchy(&store, root, &ignore)
            .into_iter()
            .map(|a| a.class)
            .collect();
        assert_eq!(classes, vec![store.well_known().object]);
    }

    #[test]
    fn records_arguments_supplied_by_the_subtype() {
        let mut store = ClassStore::with_minimal_jdk();
        let string = store.class_id("java.lang.String").unwrap();

        let base = store.intern_class("Base");
        let mut def = ClassDef::new("Base", ClassKind::Class);
        def.type_params = vec![TypeParamDef::unbounded("T")];
        store.define_class(base, def);

        let mut def = ClassDef::new("Impl", ClassKind::Class);
        def.super_class = Some(Type::class(base, vec![Type::Raw(string)]));
        let imp = store.add_class(def);

        let walked = walk_hierarchy(&store, imp, &HashSet::new());
        assert_eq!(
            walked[0],
            Ancestor {
                class: base,
                args: vec![Type::Raw(string)],
                subtype: imp,
            }
        );
    }

    #[test]
    fn supertypes_without_metadata_are_reported_but_not_walked() {
        let mut store = ClassStore::new();
        let object = Type::Raw(store.well_known().object);

        let i_behind = store.add_class(ClassDef::new("IBehind", ClassKind::Interface));
        let mut opaque = ClassDef::new("Opaque", ClassKind::Class);
        opaque.super_class = Some(object);
        opaque.interfaces = vec![Type::Raw(i_behind)];
        let opaque = store.add_class(opaque);

        let i_root = store.add_class(ClassDef::new("IRoot", ClassKind::Interface));
        let mut root = ClassDef::new("Root", ClassKind::Class);
        root.super_class = Some(Type::Raw(opaque));
        root.interfaces = vec![Type::Raw(i_root)];
        let root = store.add_class(root);

        let env = Hiding {
            store: &store,
            hidden: opaque,
        };
        let classes: Vec<ClassId> = walk_hierarchy(&env, root, &HashSet::new())
            .into_iter()
            .map(|a| a.class)
            .collect();
        assert_eq!(classes, vec![opaque, i_root]);

        let classes: Vec<ClassId> = walk_hierarchy(&store, root, &HashSet::new())
            .into_iter()
            .map(|a| a.class)
            .collect();
        assert_eq!(
            classes,
            vec![opaque, store.well_known().object, i_behind, i_root]
        );
    }
}
