//! JVM generic signature support for `nova-generics`.
//!
//! Class files record generic declarations in `Signature` attributes
//! (`<T:Ljava/lang/Object;>Lcom/example/Base<TT;>;`). [`parse_class_signature`] and friends turn
//! those strings into a small AST, and [`SignatureLoader`] defines the corresponding classes,
//! fields and methods in a [`nova_generics::ClassStore`] so they can be resolved.

#![forbid(unsafe_code)]

mod error;
mod load;
mod parse;

pub use crate::error::{Result, SignatureError};
pub use crate::load::{SignatureLoader, TypeVarScope};
pub use crate::parse::{
    parse_class_signature, parse_field_signature, parse_method_signature, BaseType,
    ClassSignature, ClassTypeSignature, MethodSignature, ReferenceTypeSignature, TypeArgument,
    TypeParameter, TypeSignature,
};
