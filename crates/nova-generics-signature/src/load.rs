use std::collections::HashMap;

use nova_generics::{
    ClassDef, ClassId, ClassKind, ClassStore, DeclId, FieldDef, MethodDef, MethodId, Type,
    TypeEnv, TypeParamDef,
};

use crate::error::{Result, SignatureError};
use crate::parse::{
    parse_class_signature, parse_field_signature, parse_method_signature, BaseType,
    ClassTypeSignature, MethodSignature, ReferenceTypeSignature, TypeArgument, TypeParameter,
    TypeSignature,
};

/// Type variable names visible while translating one signature.
///
/// Later insertions shadow earlier ones, so method type parameters inserted after the class's
/// hide same-named class type parameters.
#[derive(Clone, Debug, Default)]
pub struct TypeVarScope {
    vars: HashMap<String, DeclId>,
}

impl TypeVarScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, decl: DeclId) {
        self.vars.insert(name.into(), decl);
    }

    pub fn get(&self, name: &str) -> Option<DeclId> {
        self.vars.get(name).copied()
    }
}

/// Defines classes, fields and methods in a [`ClassStore`] from their generic signatures.
///
/// Classes referenced by a signature but not defined yet are interned as placeholders, so
/// declarations can be loaded in any order.
pub struct SignatureLoader<'a> {
    store: &'a mut ClassStore,
}

impl<'a> SignatureLoader<'a> {
    pub fn new(store: &'a mut ClassStore) -> Self {
        Self { store }
    }

    /// Define `binary_name` from a class signature such as
    /// `<T:Ljava/lang/Object;>Lcom/example/Base<TT;>;Ljava/lang/Comparable<TT;>;`.
    ///
    /// Interfaces get no superclass even though their signature names `Object`. Fields already
    /// defined on a placeholder are kept.
    pub fn define_class(&mut self, binary_name: &str, kind: ClassKind, signature: &str) -> Result<ClassId> {
        let sig = parse_class_signature(signature)?;
        let id = self.store.intern_class(binary_name);

        let mut scope = TypeVarScope::new();
        for tp in &sig.type_params {
            scope.insert(tp.name.clone(), DeclId::Class(id));
        }

        let type_params = self.type_params(&scope, signature, &sig.type_params)?;
        let super_class = match kind {
            ClassKind::Interface => None,
            _ => Some(self.class_type(&scope, signature, &sig.super_class)?),
        };
        let interfaces = sig
            .interfaces
            .iter()
            .map(|iface| self.class_type(&scope, signature, iface))
            .collect::<Result<Vec<_>>>()?;

        let fields = self
            .store
            .class(id)
            .map(|def| def.fields.clone())
            .unwrap_or_default();
        let mut def = ClassDef::new(binary_name, kind);
        def.type_params = type_params;
        def.super_class = super_class;
        def.interfaces = interfaces;
        def.fields = fields;
        self.store.define_class(id, def);

        tracing::trace!(target: "nova.generics", class = binary_name, signature, "defined class");
        Ok(id)
    }

    /// Add a field whose generic signature is `signature` (e.g. `Ljava/util/List<TT;>;`).
    pub fn define_field(&mut self, class: ClassId, name: &str, signature: &str) -> Result<()> {
        self.ensure_class(class)?;
        let sig = parse_field_signature(signature)?;
        let scope = self.class_scope(class);
        let ty = self.reference_type(&scope, signature, &sig)?;
        self.store.add_field(class, FieldDef::new(name, ty));
        Ok(())
    }

    /// Add a method whose generic signature is `signature` (e.g. `<M:Ljava/lang/Object;>(TT;)TM;`).
    ///
    /// Nothing is attached to `class` when the signature doesn't translate.
    pub fn define_method(&mut self, class: ClassId, name: &str, signature: &str) -> Result<MethodId> {
        self.ensure_class(class)?;
        let sig = parse_method_signature(signature)?;
        // The method's own type variables refer to its id, so it is reserved up front.
        let id = self.store.intern_method(class, name);

        match self.method_def(class, id, name, signature, &sig) {
            Ok(def) => {
                self.store.define_method(id, def);
                Ok(id)
            }
            Err(err) => {
                self.store.discard_method(id);
                Err(err)
            }
        }
    }

    fn method_def(
        &mut self,
        class: ClassId,
        id: MethodId,
        name: &str,
        signature: &str,
        sig: &MethodSignature,
    ) -> Result<MethodDef> {
        let mut scope = self.class_scope(class);
        for tp in &sig.type_params {
            scope.insert(tp.name.clone(), DeclId::Method(id));
        }

        let type_params = self.type_params(&scope, signature, &sig.type_params)?;
        let params = sig
            .params
            .iter()
            .map(|p| self.java_type(&scope, signature, p))
            .collect::<Result<Vec<_>>>()?;
        let return_type = sig
            .return_type
            .as_ref()
            .map(|ty| self.java_type(&scope, signature, ty))
            .transpose()?;

        Ok(MethodDef {
            name: name.to_string(),
            owner: class,
            type_params,
            params,
            return_type,
        })
    }

    fn ensure_class(&self, class: ClassId) -> Result<()> {
        match self.store.class(class) {
            Some(_) => Ok(()),
            None => Err(SignatureError::UnknownClass(class)),
        }
    }

    fn class_scope(&self, class: ClassId) -> TypeVarScope {
        let mut scope = TypeVarScope::new();
        if let Some(def) = self.store.class(class) {
            for tp in &def.type_params {
                scope.insert(tp.name.clone(), DeclId::Class(class));
            }
        }
        scope
    }

    fn type_params(
        &mut self,
        scope: &TypeVarScope,
        signature: &str,
        params: &[TypeParameter],
    ) -> Result<Vec<TypeParamDef>> {
        params
            .iter()
            .map(|tp| {
                let bounds = tp
                    .bounds()
                    .map(|bound| self.reference_type(scope, signature, bound))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeParamDef::new(tp.name.clone(), bounds))
            })
            .collect()
    }

    fn java_type(&mut self, scope: &TypeVarScope, signature: &str, ty: &TypeSignature) -> Result<Type> {
        match ty {
            TypeSignature::Base(base) => Ok(Type::Raw(self.primitive(*base))),
            TypeSignature::Reference(r) => self.reference_type(scope, signature, r),
        }
    }

    fn reference_type(
        &mut self,
        scope: &TypeVarScope,
        signature: &str,
        ty: &ReferenceTypeSignature,
    ) -> Result<Type> {
        match ty {
            ReferenceTypeSignature::Class(class) => self.class_type(scope, signature, class),
            ReferenceTypeSignature::TypeVar(name) => match scope.get(name) {
                Some(decl) => Ok(Type::var(name.clone(), decl)),
                None => Err(SignatureError::UnknownTypeVariable {
                    name: name.clone(),
                    signature: signature.to_string(),
                }),
            },
            ReferenceTypeSignature::Array(elem) => {
                Ok(Type::array(self.java_type(scope, signature, elem)?))
            }
        }
    }

    fn class_type(
        &mut self,
        scope: &TypeVarScope,
        signature: &str,
        class: &ClassTypeSignature,
    ) -> Result<Type> {
        let id = self.store.intern_class(&class.binary_name);
        let object = self.store.well_known().object;
        let args = class
            .args
            .iter()
            .map(|arg| {
                Ok(match arg {
                    TypeArgument::Any => Type::unbounded(object),
                    TypeArgument::Exact(r) => self.reference_type(scope, signature, r)?,
                    TypeArgument::Extends(r) => Type::extends(self.reference_type(scope, signature, r)?),
                    TypeArgument::Super(r) => Type::super_of(object, self.reference_type(scope, signature, r)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Type::class(id, args))
    }

    fn primitive(&mut self, base: BaseType) -> ClassId {
        let keyword = base.keyword();
        match self.store.class_id(keyword) {
            Some(id) => id,
            None => self
                .store
                .add_class(ClassDef::new(keyword, ClassKind::Primitive)),
        }
    }
}
