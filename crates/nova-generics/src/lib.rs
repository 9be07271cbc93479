//! Generic type resolution for Java class hierarchies.
//!
//! Reflection only exposes generic information as declared: `class Impl extends Base<String>`
//! and a field `T value` on `Base<T>`. This crate answers what `T` *is* from `Impl`'s point of
//! view by building a [`ResolutionContext`] for `Impl`:
//!
//! 1. [`walk_hierarchy`] enumerates every ancestor together with the type arguments supplied for
//!    it by the more specific type in the chain.
//! 2. One [`GenericsMap`] is built per ancestor, substituting those arguments through the maps of
//!    the more specific types (so `Mid<X> extends Base<X>` forwards `Impl`'s binding of `X`).
//! 3. [`Substitutor`] rewrites any type descriptor through the maps.
//!
//! Variables that can't be resolved from the context (typically method-scoped generics without
//! explicit bindings) fail with [`UnknownGenericError`].
//!
//! The crate doesn't read class files itself; declarations come from a [`TypeEnv`]
//! (see `nova-generics-signature` for a class-file backed loader).

#![forbid(unsafe_code)]

mod config;
mod context;
mod env;
mod error;
mod format;
mod generics;
mod hierarchy;
mod ids;
mod subst;
mod ty;

pub use crate::config::{ConfigError, ResolverConfig, UnresolvedGenerics};
pub use crate::context::{ContextBuilder, ResolutionContext};
pub use crate::env::{
    ClassDef, ClassKind, ClassStore, FieldDef, MethodDef, TypeEnv, TypeParamDef, WellKnownTypes,
};
pub use crate::error::{ResolveError, Result, UnknownGenericError};
pub use crate::format::{display_type, format_type, TypeDisplay};
pub use crate::generics::{Binding, GenericsMap};
pub use crate::hierarchy::{walk_hierarchy, Ancestor};
pub use crate::ids::{ClassId, DeclId, MethodId};
pub use crate::subst::{erase, GenericsScope, Substitutor};
pub use crate::ty::{ParameterizedType, Type, TypeVar, WildcardType};
