//! Build-once schema memoization keyed by type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::builder::SchemaBuilder;
use super::settings::SchemaSettings;
use super::type_schema::TypeSchema;
use crate::error::SchemaError;
use crate::introspect::TypeRegistry;

type Slot = Arc<Mutex<Option<Arc<TypeSchema>>>>;

/// Lazily built, process-lifetime schemas keyed by [`TypeId`].
///
/// Each type is built at most once: concurrent callers asking for the same
/// type wait on that type's slot while one of them builds. Failed builds
/// are not cached.
pub struct SchemaCache {
    registry: Arc<TypeRegistry>,
    settings: SchemaSettings,
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl SchemaCache {
    pub fn new(registry: Arc<TypeRegistry>, settings: SchemaSettings) -> Self {
        Self {
            registry,
            settings,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &SchemaSettings {
        &self.settings
    }

    /// Schema for `type_id`, building it on first use.
    pub fn get_or_build(&self, type_id: TypeId) -> Result<Arc<TypeSchema>, SchemaError> {
        let slot = self.slot(type_id);
        let mut guard = slot.lock();
        if let Some(schema) = guard.as_ref() {
            return Ok(schema.clone());
        }

        let description = self
            .registry
            .get(type_id)
            .ok_or_else(|| SchemaError::UnknownType {
                type_id,
                type_name: format!("{type_id:?}"),
            })?;
        let schema = Arc::new(SchemaBuilder::new(&self.settings).build(&description)?);
        log::debug!("Cached schema for '{}'", schema.type_name());
        *guard = Some(schema.clone());
        Ok(schema)
    }

    pub fn schema_of<T: Any>(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        self.get_or_build(TypeId::of::<T>()).map_err(|err| match err {
            SchemaError::UnknownType { type_id, .. } => SchemaError::UnknownType {
                type_id,
                type_name: std::any::type_name::<T>().to_owned(),
            },
            other => other,
        })
    }

    /// Already built schema, without building.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<TypeSchema>> {
        let slot = self.slots.read().get(&type_id).cloned()?;
        let guard = slot.lock();
        guard.clone()
    }

    /// Number of schemas built so far.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, type_id: TypeId) -> Slot {
        if let Some(slot) = self.slots.read().get(&type_id) {
            return slot.clone();
        }
        self.slots.write().entry(type_id).or_default().clone()
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("settings", &self.settings)
            .field("schemas", &self.len())
            .finish()
    }
}
