//! Object writer and reader driven by cached schemas.
//!
//! [`SerializeContext`] walks an instance through its [`TypeSchema`] and
//! produces a [`Value::Map`] keyed by display names.
//! [`DeserializeContext`] applies such a map back onto an existing instance.

use std::any::{Any, TypeId};

use crate::error::{DeserializeError, SerializeError};
use crate::introspect::MemberMode;
use crate::schema::{MemberEntry, SchemaCache, TypeSchema};
use crate::value::Value;

// ---------------------------------------------------------------------------
// SerializeContext
// ---------------------------------------------------------------------------

/// Writes objects into [`Value`] trees.
///
/// Members are visited in schema order. A member is written when its mask
/// intersects the settings' member mask and its inclusion check passes.
/// Nested objects ([`Value::Object`]) are expanded through their own schema,
/// with the member that holds them passed as the parent.
pub struct SerializeContext<'c> {
    cache: &'c SchemaCache,
}

impl<'c> SerializeContext<'c> {
    pub fn new(cache: &'c SchemaCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SchemaCache {
        self.cache
    }

    /// Serialize a typed instance.
    pub fn write<T: Any>(&self, instance: &T) -> Result<Value, SerializeError> {
        self.write_object(instance)
    }

    /// Serialize a type-erased instance using the schema of its concrete type.
    pub fn write_object(&self, instance: &dyn Any) -> Result<Value, SerializeError> {
        self.write_with_parent(instance, None)
    }

    fn write_with_parent(
        &self,
        instance: &dyn Any,
        parent: Option<&MemberEntry>,
    ) -> Result<Value, SerializeError> {
        let schema = self.cache.get_or_build(Any::type_id(instance))?;
        let mask = self.cache.settings().member_mask;

        let mut entries = Vec::with_capacity(schema.len());
        for member in schema.members() {
            if member.mask() & mask == 0 || !member.should_include(instance, parent) {
                continue;
            }
            let value = member
                .get(instance)
                .map_err(|err| name_field(err, member.name()))?;
            entries.push((member.name().to_owned(), self.expand(value, member)?));
        }
        Ok(Value::Map(entries))
    }

    /// Replace nested objects, also inside lists and maps, by their maps.
    fn expand(&self, value: Value, member: &MemberEntry) -> Result<Value, SerializeError> {
        match value {
            Value::Object(instance) => self.write_with_parent(instance.as_any(), Some(member)),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.expand(item, member))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, item)| Ok((key, self.expand(item, member)?)))
                .collect::<Result<_, SerializeError>>()
                .map(Value::Map),
            other => Ok(other),
        }
    }
}

fn name_field(err: SerializeError, member: &str) -> SerializeError {
    match err {
        SerializeError::FieldError { field, message } if field.is_empty() => {
            SerializeError::FieldError {
                field: member.to_owned(),
                message,
            }
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// DeserializeContext
// ---------------------------------------------------------------------------

/// Applies [`Value::Map`] data onto existing objects.
///
/// Keys are resolved through the schema's name index, so aliases work.
/// A map value for a member with in-place access populates the nested
/// object; `Assign` members reset it first. Everything else goes through
/// the member's setter.
pub struct DeserializeContext<'c> {
    cache: &'c SchemaCache,
}

impl<'c> DeserializeContext<'c> {
    pub fn new(cache: &'c SchemaCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SchemaCache {
        self.cache
    }

    /// Populate a typed instance from `data`.
    pub fn read_into<T: Any>(&self, target: &mut T, data: Value) -> Result<(), DeserializeError> {
        self.read_object(target, data)
    }

    /// Build a default instance and populate it from `data`.
    pub fn read<T: Any + Default>(&self, data: Value) -> Result<T, DeserializeError> {
        let mut target = T::default();
        self.read_into(&mut target, data)?;
        Ok(target)
    }

    /// Populate a type-erased instance using the schema of its concrete type.
    pub fn read_object(&self, target: &mut dyn Any, data: Value) -> Result<(), DeserializeError> {
        let type_id: TypeId = Any::type_id(&*target);
        let schema = self.cache.get_or_build(type_id)?;
        let entries = match data {
            Value::Map(entries) => entries,
            other => {
                return Err(DeserializeError::TypeMismatch {
                    field: schema.type_name().to_owned(),
                    expected: "map".into(),
                    found: other.kind_name().into(),
                });
            }
        };

        for (key, value) in entries {
            let Some(member) = schema.try_member(&key) else {
                if self.cache.settings().ignore_unknown_members {
                    log::warn!("Skipping unknown member '{key}' of '{}'", schema.type_name());
                    continue;
                }
                return Err(DeserializeError::UnknownMember {
                    type_name: schema.type_name().to_owned(),
                    name: key,
                });
            };
            self.read_member(&schema, member, target, value)?;
        }
        Ok(())
    }

    fn read_member(
        &self,
        schema: &TypeSchema,
        member: &MemberEntry,
        target: &mut dyn Any,
        value: Value,
    ) -> Result<(), DeserializeError> {
        if matches!(value, Value::Map(_)) && member.has_content() {
            if member.mode() == MemberMode::Assign && !member.reset(target) {
                log::warn!(
                    "Member '{}' of '{}' has no reset, populating it in place",
                    member.name(),
                    schema.type_name()
                );
            }
            if let Some(nested) = member.content(target) {
                return self.read_object(nested, value);
            }
        }
        if !member.has_setter() {
            return Err(DeserializeError::ReadOnlyMember {
                type_name: schema.type_name().to_owned(),
                member: member.name().to_owned(),
            });
        }
        member.set(target, value)
    }
}
