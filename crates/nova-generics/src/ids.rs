use std::fmt;

/// Identity of a class (or interface, or primitive) known to a [`crate::TypeEnv`].
///
/// Ids are opaque tokens handed out by the environment; the engine only compares and hashes them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Identity of a method (or constructor) known to a [`crate::TypeEnv`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(u32);

impl MethodId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({})", self.0)
    }
}

/// The entity that declares a type variable.
///
/// Two variables named `T` are only the same variable when they share a declaring entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclId {
    Class(ClassId),
    Method(MethodId),
}

impl DeclId {
    pub fn as_class(self) -> Option<ClassId> {
        match self {
            DeclId::Class(id) => Some(id),
            DeclId::Method(_) => None,
        }
    }

    pub fn as_method(self) -> Option<MethodId> {
        match self {
            DeclId::Method(id) => Some(id),
            DeclId::Class(_) => None,
        }
    }
}

impl From<ClassId> for DeclId {
    fn from(id: ClassId) -> Self {
        DeclId::Class(id)
    }
}

impl From<MethodId> for DeclId {
    fn from(id: MethodId) -> Self {
        DeclId::Method(id)
    }
}
