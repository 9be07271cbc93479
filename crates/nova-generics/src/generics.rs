use indexmap::IndexMap;

use crate::{DeclId, Type};

/// What a type variable is bound to inside one [`GenericsMap`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Fully concrete, or partially resolved (still containing variables of other declarations
    /// in the same context).
    Resolved(Type),
    /// No evidence is available. `bound` is the erasure of the variable's first declared bound.
    Unresolved { bound: Type },
}

impl Binding {
    pub fn resolved(&self) -> Option<&Type> {
        match self {
            Binding::Resolved(ty) => Some(ty),
            Binding::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Binding::Resolved(_))
    }
}

/// Bindings for the type variables of one declaring entity (a class or a method).
///
/// Lookup is by name; iteration follows declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericsMap {
    owner: DeclId,
    entries: IndexMap<String, Binding>,
}

impl GenericsMap {
    pub fn new(owner: DeclId) -> Self {
        Self {
            owner,
            entries: IndexMap::new(),
        }
    }

    pub fn owner(&self) -> DeclId {
        self.owner
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) {
        self.entries.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(name, binding)| (name.as_str(), binding))
    }
}
