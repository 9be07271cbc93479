use std::fmt;
use std::sync::Arc;

use crate::{ClassId, DeclId, MethodId, TypeEnv};

pub type Result<T> = std::result::Result<T, ResolveError>;

/// A type variable has no binding reachable from the resolution context in use.
///
/// The value is immutable and cheap to clone; clones share an identity (see
/// [`UnknownGenericError::is_same`]). It starts without a context type and is annotated exactly
/// once, by the outermost resolution call, via [`UnknownGenericError::with_context_type`].
#[derive(Clone)]
pub struct UnknownGenericError(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    name: String,
    source: Option<Labeled<DeclId>>,
    context_type: Option<Labeled<ClassId>>,
    cause: Option<UnknownGenericError>,
}

#[derive(Debug, Clone)]
struct Labeled<T> {
    id: T,
    label: String,
}

impl UnknownGenericError {
    /// `source` is the declaring entity of the variable, if known.
    pub fn new(env: &dyn TypeEnv, name: impl Into<String>, source: Option<DeclId>) -> Self {
        let source = source.map(|id| Labeled {
            id,
            label: env.describe_decl(id),
        });
        Self(Arc::new(Inner {
            name: name.into(),
            source,
            context_type: None,
            cause: None,
        }))
    }

    pub fn generic_name(&self) -> &str {
        &self.0.name
    }

    pub fn generic_source(&self) -> Option<DeclId> {
        self.0.source.as_ref().map(|s| s.id)
    }

    /// Convenience for the common case of a method-scoped variable.
    pub fn generic_source_method(&self) -> Option<MethodId> {
        self.generic_source().and_then(DeclId::as_method)
    }

    pub fn context_type(&self) -> Option<ClassId> {
        self.0.context_type.as_ref().map(|c| c.id)
    }

    /// The failure this one was derived from, when it was produced by annotation.
    pub fn cause(&self) -> Option<&UnknownGenericError> {
        self.0.cause.as_ref()
    }

    /// Identity comparison: `true` only for clones of the same failure.
    pub fn is_same(&self, other: &UnknownGenericError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Attach the concrete class the caller was resolving against.
    ///
    /// * no context type yet: returns a new failure caused by `self`
    /// * same context type: returns `self` (same identity)
    ///
    /// # Panics
    ///
    /// Panics if a *different* context type was already recorded. The context type never changes
    /// while a failure propagates; seeing one change means the resolution call graph is broken.
    #[track_caller]
    pub fn with_context_type(&self, env: &dyn TypeEnv, class: ClassId) -> UnknownGenericError {
        match &self.0.context_type {
            Some(existing) if existing.id == class => self.clone(),
            Some(existing) => context_type_conflict(
                &self.0.name,
                &existing.label,
                env.class_name(class).unwrap_or("<unknown>"),
            ),
            None => Self(Arc::new(Inner {
                name: self.0.name.clone(),
                source: self.0.source.clone(),
                context_type: Some(Labeled {
                    id: class,
                    label: env
                        .class_name(class)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{class:?}")),
                }),
                cause: Some(self.clone()),
            })),
        }
    }
}

#[cold]
#[track_caller]
fn context_type_conflict(name: &str, existing: &str, requested: &str) -> ! {
    panic!(
        "context type can't be changed: unknown generic '{name}' is already bound to \
         {existing}, refusing to rebind it to {requested}"
    )
}

impl fmt::Debug for UnknownGenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnknownGenericError")
            .field("name", &self.0.name)
            .field("source", &self.generic_source())
            .field("context_type", &self.context_type())
            .field("has_cause", &self.0.cause.is_some())
            .finish()
    }
}

impl fmt::Display for UnknownGenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generic '{}'", self.0.name)?;
        if let Some(source) = &self.0.source {
            write!(f, " (defined on {})", source.label)?;
        }
        f.write_str(" is not declared")?;
        if let Some(context) = &self.0.context_type {
            write!(f, " on type {}", context.label)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnknownGenericError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0
            .cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Errors surfaced by the resolution API.
///
/// Only [`ResolveError::UnknownGeneric`] comes out of the engine itself; the other variants
/// report requests that don't fit the context they were made against.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    UnknownGeneric(#[from] UnknownGenericError),

    #[error("unknown class {0:?}")]
    UnknownClass(ClassId),

    #[error("unknown method {0:?}")]
    UnknownMethod(MethodId),

    #[error("type {class} is not part of the hierarchy of {root}")]
    NotInHierarchy { class: String, root: String },

    #[error("field {field} is not declared on {class}")]
    UnknownField { class: String, field: String },

    #[error("{class} declares {expected} generic(s), but {found} were provided")]
    RootGenericsArity {
        class: String,
        expected: usize,
        found: usize,
    },

    #[error("{method} declares {expected} generic(s), but {found} were provided")]
    MethodGenericsArity {
        method: String,
        expected: usize,
        found: usize,
    },
}

impl ResolveError {
    pub fn as_unknown_generic(&self) -> Option<&UnknownGenericError> {
        match self {
            ResolveError::UnknownGeneric(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::{ClassDef, ClassKind, ClassStore, MethodDef};

    fn store_with_method() -> (ClassStore, ClassId, ClassId, MethodId) {
        let mut store = ClassStore::new();
        let base = store.add_class(ClassDef::new("com.example.Base", ClassKind::Class));
        let other = store.add_class(ClassDef::new("com.example.Other", ClassKind::Class));
        let method = store.add_method(MethodDef {
            name: "convert".to_string(),
            owner: base,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
        });
        (store, base, other, method)
    }

    #[test]
    fn message_mentions_source_and_context() {
        let (store, base, _, method) = store_with_method();

        let err = UnknownGenericError::new(&store, "T", Some(DeclId::Method(method)));
        assert_eq!(
            err.to_string(),
            "Generic 'T' (defined on method com.example.Base#convert) is not declared"
        );

        let annotated = err.with_context_type(&store, base);
        assert_eq!(
            annotated.to_string(),
            "Generic 'T' (defined on method com.example.Base#convert) is not declared on type \
             com.example.Base"
        );

        let anonymous = UnknownGenericError::new(&store, "X", None);
        assert_eq!(anonymous.to_string(), "Generic 'X' is not declared");
    }

    #[test]
    fn annotation_links_to_the_original_failure() {
        let (store, base, _, method) = store_with_method();
        let err = UnknownGenericError::new(&store, "T", Some(DeclId::Method(method)));
        assert_eq!(err.context_type(), None);

        let annotated = err.with_context_type(&store, base);
        assert!(!annotated.is_same(&err));
        assert_eq!(annotated.context_type(), Some(base));
        assert_eq!(annotated.generic_name(), "T");
        assert_eq!(annotated.generic_source_method(), Some(method));
        assert!(annotated.cause().unwrap().is_same(&err));
        assert!(annotated.source().is_some());
        assert!(err.source().is_none());
    }

    #[test]
    fn annotating_twice_with_the_same_type_keeps_identity() {
        let (store, base, _, method) = store_with_method();
        let annotated =
            UnknownGenericError::new(&store, "T", Some(DeclId::Method(method))).with_context_type(&store, base);

        let again = annotated.with_context_type(&store, base);
        assert!(again.is_same(&annotated));
    }

    #[test]
    #[should_panic(expected = "context type can't be changed")]
    fn annotating_with_a_different_type_is_fatal() {
        let (store, base, other, method) = store_with_method();
        let annotated =
            UnknownGenericError::new(&store, "T", Some(DeclId::Method(method))).with_context_type(&store, base);

        let _ = annotated.with_context_type(&store, other);
    }
}
