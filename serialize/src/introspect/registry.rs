//! Type-id keyed store of [`TypeDescription`]s.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::description::TypeDescription;

/// Types that can describe their own members.
///
/// Usually implemented with `#[derive(Introspect)]`.
pub trait Introspect: Any + Send + Sync {
    /// Build the description of `Self`.
    fn describe() -> TypeDescription
    where
        Self: Sized;

    /// Register types this one reaches (nested objects, bases).
    fn register_dependencies(_registry: &TypeRegistry)
    where
        Self: Sized,
    {
    }
}

/// Thread-safe map from [`TypeId`] to [`TypeDescription`].
#[derive(Default)]
pub struct TypeRegistry {
    descriptions: RwLock<HashMap<TypeId, Arc<TypeDescription>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe and register `T` together with its dependencies.
    ///
    /// Registering a type twice keeps the first description.
    pub fn register<T: Introspect>(&self) -> Arc<TypeDescription> {
        if let Some(existing) = self.get(TypeId::of::<T>()) {
            return existing;
        }
        let description = self.insert(T::describe());
        T::register_dependencies(self);
        description
    }

    /// Insert a hand-built description, replacing nothing already present.
    pub fn insert(&self, description: TypeDescription) -> Arc<TypeDescription> {
        let type_id = description.type_id();
        self.descriptions
            .write()
            .entry(type_id)
            .or_insert_with(|| {
                log::debug!("Registered type description '{}'", description.name());
                Arc::new(description)
            })
            .clone()
    }

    pub fn get(&self, type_id: TypeId) -> Option<Arc<TypeDescription>> {
        self.descriptions.read().get(&type_id).cloned()
    }

    pub fn get_of<T: Any>(&self) -> Option<Arc<TypeDescription>> {
        self.get(TypeId::of::<T>())
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.descriptions.read().contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.descriptions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.read().is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{FieldInfo, TypeShape};
    use crate::value::to_value;

    struct Marker {
        id: u32,
    }

    impl Introspect for Marker {
        fn describe() -> TypeDescription {
            TypeDescription::builder::<Marker>()
                .field(FieldInfo::new("id", TypeShape::of::<u32>(), |m: &Marker| {
                    to_value(&m.id)
                }))
                .build()
        }
    }

    #[test]
    fn register_is_idempotent() {
        let registry = TypeRegistry::new();
        let first = registry.register::<Marker>();
        let second = registry.register::<Marker>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(TypeId::of::<Marker>()));
        assert_eq!(registry.get_of::<Marker>().map(|d| d.fields().len()), Some(1));
    }

    #[test]
    fn unknown_type_is_absent() {
        let registry = TypeRegistry::new();
        assert!(registry.get_of::<String>().is_none());
        assert!(registry.is_empty());
    }
}
