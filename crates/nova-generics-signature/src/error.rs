use nova_generics::ClassId;

pub type Result<T> = std::result::Result<T, SignatureError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature {signature:?} at offset {offset}: {reason}")]
    Invalid {
        signature: String,
        offset: usize,
        reason: &'static str,
    },

    #[error("type variable {name} is not in scope for signature {signature:?}")]
    UnknownTypeVariable { name: String, signature: String },

    #[error("class {0:?} does not belong to this store")]
    UnknownClass(ClassId),
}
