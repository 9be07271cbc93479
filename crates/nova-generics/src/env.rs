//! The introspection seam.
//!
//! The resolution engine never enumerates declarations itself: it asks a [`TypeEnv`] for the
//! erasure-level facts reflection exposes (supertypes with their declared type arguments, type
//! parameters with bounds, members). [`ClassStore`] is the in-memory implementation used by the
//! signature loader and by tests.

use std::collections::HashMap;

use crate::{ClassId, DeclId, MethodId, Type};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Primitive,
}

/// A declared type parameter. An empty bound list means `Object`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub bounds: Vec<Type>,
}

impl TypeParamDef {
    pub fn new(name: impl Into<String>, bounds: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub owner: ClassId,
    pub type_params: Vec<TypeParamDef>,
    pub params: Vec<Type>,
    /// `None` for `void`.
    pub return_type: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.Map$Entry`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeParamDef>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodId>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn type_param(&self, name: &str) -> Option<&TypeParamDef> {
        self.type_params.iter().find(|tp| tp.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The class's own type variables as descriptors, in declaration order.
    pub fn type_vars(&self, id: ClassId) -> Vec<Type> {
        self.type_params
            .iter()
            .map(|tp| Type::var(tp.name.clone(), id))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
}

pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn method(&self, id: MethodId) -> Option<&MethodDef>;
    fn lookup_class(&self, binary_name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    fn class_name(&self, id: ClassId) -> Option<&str> {
        self.class(id).map(|def| def.name.as_str())
    }

    /// Type parameters declared by a class or a method.
    fn type_params(&self, decl: DeclId) -> Option<&[TypeParamDef]> {
        match decl {
            DeclId::Class(id) => self.class(id).map(|def| def.type_params.as_slice()),
            DeclId::Method(id) => self.method(id).map(|def| def.type_params.as_slice()),
        }
    }

    /// Human-readable label of a declaring entity: `class com.example.Base` or
    /// `method com.example.Base#get`.
    fn describe_decl(&self, decl: DeclId) -> String {
        match decl {
            DeclId::Class(id) => match self.class_name(id) {
                Some(name) => format!("class {name}"),
                None => format!("class {id:?}"),
            },
            DeclId::Method(id) => match self.method(id) {
                Some(def) => {
                    let owner = self.class_name(def.owner).unwrap_or("<unknown>");
                    format!("method {owner}#{}", def.name)
                }
                None => format!("method {id:?}"),
            },
        }
    }
}

/// In-memory [`TypeEnv`].
///
/// Declarations that reference their own id (a class whose fields use its type variables, a
/// method using its own generics) are created in two steps: `intern_*` hands out the id, and
/// `define_*` fills in the declaration.
#[derive(Clone, Debug)]
pub struct ClassStore {
    classes: Vec<ClassDef>,
    methods: Vec<MethodDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for ClassStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassStore {
    /// A store that only knows `java.lang.Object`.
    pub fn new() -> Self {
        let mut store = Self {
            classes: Vec::new(),
            methods: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes {
                object: ClassId::new(0),
            },
        };
        let object = store.intern_class("java.lang.Object");
        store.well_known.object = object;
        store
    }

    /// A store seeded with primitives and a handful of `java.lang`/`java.util` types, enough to
    /// describe realistic hierarchies in tests.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        let object = Type::Raw(store.well_known.object);

        for name in [
            "boolean", "byte", "char", "short", "int", "long", "float", "double",
        ] {
            store.add_class(ClassDef::new(name, ClassKind::Primitive));
        }

        let serializable = store.add_class(ClassDef::new("java.io.Serializable", ClassKind::Interface));
        let char_sequence =
            store.add_class(ClassDef::new("java.lang.CharSequence", ClassKind::Interface));

        let comparable = store.intern_class("java.lang.Comparable");
        let mut def = ClassDef::new("java.lang.Comparable", ClassKind::Interface);
        def.type_params = vec![TypeParamDef::unbounded("T")];
        store.define_class(comparable, def);

        let string = store.intern_class("java.lang.String");
        let mut def = ClassDef::new("java.lang.String", ClassKind::Class);
        def.super_class = Some(object.clone());
        def.interfaces = vec![
            Type::Raw(serializable),
            Type::class(comparable, vec![Type::Raw(string)]),
            Type::Raw(char_sequence),
        ];
        store.define_class(string, def);

        let mut def = ClassDef::new("java.lang.Number", ClassKind::Class);
        def.super_class = Some(object.clone());
        def.interfaces = vec![Type::Raw(serializable)];
        let number = store.add_class(def);

        for name in ["java.lang.Integer", "java.lang.Long", "java.lang.Double"] {
            let id = store.intern_class(name);
            let mut def = ClassDef::new(name, ClassKind::Class);
            def.super_class = Some(Type::Raw(number));
            def.interfaces = vec![Type::class(comparable, vec![Type::Raw(id)])];
            store.define_class(id, def);
        }

        let iterable = store.generic_jdk_type("java.lang.Iterable", ClassKind::Interface, &["T"], None, &[]);
        let collection = store.generic_jdk_type(
            "java.util.Collection",
            ClassKind::Interface,
            &["E"],
            None,
            &[iterable],
        );
        let list = store.generic_jdk_type("java.util.List", ClassKind::Interface, &["E"], None, &[collection]);
        store.generic_jdk_type("java.util.ArrayList", ClassKind::Class, &["E"], Some(object.clone()), &[list]);
        let map = store.generic_jdk_type("java.util.Map", ClassKind::Interface, &["K", "V"], None, &[]);
        store.generic_jdk_type("java.util.HashMap", ClassKind::Class, &["K", "V"], Some(object), &[map]);

        store
    }

    /// Declares a JDK type whose supertypes forward its own type variables positionally.
    fn generic_jdk_type(
        &mut self,
        name: &str,
        kind: ClassKind,
        params: &[&str],
        super_class: Option<Type>,
        interfaces: &[ClassId],
    ) -> ClassId {
        let id = self.intern_class(name);
        let mut def = ClassDef::new(name, kind);
        def.type_params = params.iter().map(|p| TypeParamDef::unbounded(*p)).collect();
        def.super_class = super_class;
        def.interfaces = interfaces
            .iter()
            .map(|iface| {
                let arity = self.classes[iface.to_raw() as usize].type_params.len();
                let args = params
                    .iter()
                    .take(arity)
                    .map(|p| Type::var(*p, id))
                    .collect();
                Type::class(*iface, args)
            })
            .collect();
        self.define_class(id, def);
        id
    }

    /// Returns the id for `binary_name`, creating an empty placeholder declaration if needed.
    pub fn intern_class(&mut self, binary_name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(binary_name) {
            return *id;
        }
        let raw: u32 = self
            .classes
            .len()
            .try_into()
            .expect("too many classes in store");
        let id = ClassId::new(raw);
        self.classes
            .push(ClassDef::new(binary_name, ClassKind::Class));
        self.by_name.insert(binary_name.to_string(), id);
        id
    }

    /// Replaces the declaration behind `id`. Methods already attached to `id` are kept.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this store.
    pub fn define_class(&mut self, id: ClassId, mut def: ClassDef) {
        let slot = &mut self.classes[id.to_raw() as usize];
        if slot.name != def.name {
            self.by_name.remove(&slot.name);
            self.by_name.insert(def.name.clone(), id);
        }
        for method in std::mem::take(&mut slot.methods) {
            if !def.methods.contains(&method) {
                def.methods.push(method);
            }
        }
        *slot = def;
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class_id(&self, binary_name: &str) -> Option<ClassId> {
        self.by_name.get(binary_name).copied()
    }

    /// # Panics
    ///
    /// Panics if `class` was not handed out by this store.
    pub fn add_field(&mut self, class: ClassId, field: FieldDef) {
        self.classes[class.to_raw() as usize].fields.push(field);
    }

    /// Hands out a method id attached to `owner`, with an empty `void name()` declaration.
    ///
    /// # Panics
    ///
    /// Panics if `owner` was not handed out by this store.
    pub fn intern_method(&mut self, owner: ClassId, name: &str) -> MethodId {
        let raw: u32 = self
            .methods
            .len()
            .try_into()
            .expect("too many methods in store");
        let id = MethodId::new(raw);
        self.methods.push(MethodDef {
            name: name.to_string(),
            owner,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
        });
        self.classes[owner.to_raw() as usize].methods.push(id);
        id
    }

    /// Drops `id` if it is the most recently interned method, detaching it from its owner.
    /// Returns `false` and leaves the store untouched for any other id.
    pub fn discard_method(&mut self, id: MethodId) -> bool {
        if id.to_raw() as usize + 1 != self.methods.len() {
            return false;
        }
        if let Some(def) = self.methods.pop() {
            if let Some(owner) = self.classes.get_mut(def.owner.to_raw() as usize) {
                owner.methods.retain(|m| *m != id);
            }
        }
        true
    }

    /// Replaces the declaration behind `id`; the owner recorded at intern time is kept.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this store.
    pub fn define_method(&mut self, id: MethodId, def: MethodDef) {
        let slot = &mut self.methods[id.to_raw() as usize];
        debug_assert_eq!(slot.owner, def.owner, "method owner can't change");
        *slot = MethodDef {
            owner: slot.owner,
            ..def
        };
    }

    pub fn add_method(&mut self, def: MethodDef) -> MethodId {
        let id = self.intern_method(def.owner, &def.name);
        self.define_method(id, def);
        id
    }

    /// Methods named `name` declared directly on `class`.
    pub fn methods_named(&self, class: ClassId, name: &str) -> Vec<MethodId> {
        self.class(class)
            .map(|def| {
                def.methods
                    .iter()
                    .copied()
                    .filter(|m| self.methods[m.to_raw() as usize].name == name)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TypeEnv for ClassStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.to_raw() as usize)
    }

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.methods.get(id.to_raw() as usize)
    }

    fn lookup_class(&self, binary_name: &str) -> Option<ClassId> {
        self.class_id(binary_name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_jdk_forwards_type_vars_to_supertypes() {
        let store = ClassStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();
        let map = store.class_id("java.util.Map").unwrap();
        let hash_map = store.class_id("java.util.HashMap").unwrap();

        let list_def = store.class(list).unwrap();
        assert_eq!(
            list_def.interfaces,
            vec![Type::class(collection, vec![Type::var("E", list)])]
        );

        let hash_map_def = store.class(hash_map).unwrap();
        assert_eq!(
            hash_map_def.interfaces,
            vec![Type::class(
                map,
                vec![Type::var("K", hash_map), Type::var("V", hash_map)]
            )]
        );
    }

    #[test]
    fn intern_then_define_keeps_methods() {
        let mut store = ClassStore::new();
        let id = store.intern_class("com.example.Foo");
        let m = store.intern_method(id, "get");
        store.define_class(id, ClassDef::new("com.example.Foo", ClassKind::Class));

        assert_eq!(store.class(id).unwrap().methods, vec![m]);
        assert_eq!(store.methods_named(id, "get"), vec![m]);
        assert_eq!(store.describe_decl(DeclId::Method(m)), "method com.example.Foo#get");
        assert_eq!(store.describe_decl(DeclId::Class(id)), "class com.example.Foo");
    }

    #[test]
    fn discarding_only_undoes_the_latest_method() {
        let mut store = ClassStore::new();
        let id = store.intern_class("com.example.Foo");
        let kept = store.intern_method(id, "get");
        let dropped = store.intern_method(id, "set");

        assert!(!store.discard_method(kept));
        assert!(store.discard_method(dropped));
        assert!(store.method(dropped).is_none());
        assert_eq!(store.class(id).unwrap().methods, vec![kept]);
        assert_eq!(store.methods_named(id, "set"), Vec::<MethodId>::new());

        // The freed id is handed out again.
        assert_eq!(store.intern_method(id, "put"), dropped);
    }
}
