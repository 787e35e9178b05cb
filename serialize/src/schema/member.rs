//! A single serializable member of a [`TypeSchema`](super::TypeSchema).

use std::any::Any;
use std::fmt;

use crate::error::{DeserializeError, SerializeError};
use crate::introspect::{Accessor, DataStyle, InclusionPredicate, MemberMode, TypeShape};
use crate::value::Value;

/// Whether the member came from a property or a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Field,
}

/// How [`MemberEntry::should_include`] decides.
#[derive(Clone)]
pub(crate) enum Inclusion {
    Always,
    /// Registered predicate for the member.
    Custom(InclusionPredicate),
    /// Skip while the live value equals the (coerced) default.
    UnlessDefault(Value),
}

/// Read-only view of [`Inclusion`] for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionKind {
    Always,
    Custom,
    UnlessDefault,
}

/// A member that takes part in serialization, with its resolved policy.
#[derive(Clone)]
pub struct MemberEntry {
    pub(crate) owner_name: String,
    pub(crate) original_name: String,
    pub(crate) name: String,
    pub(crate) kind: MemberKind,
    pub(crate) shape: TypeShape,
    pub(crate) mode: MemberMode,
    pub(crate) style: DataStyle,
    pub(crate) order: Option<i32>,
    pub(crate) mask: u32,
    pub(crate) alternate_names: Vec<String>,
    pub(crate) default_value: Option<Value>,
    pub(crate) public: bool,
    pub(crate) accessor: Accessor,
    pub(crate) inclusion: Inclusion,
}

impl MemberEntry {
    /// Name of the type this member belongs to.
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Name as declared on the type.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Name written to the output.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    pub fn mode(&self) -> MemberMode {
        self.mode
    }

    pub fn style(&self) -> DataStyle {
        self.style
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Extra names this member binds to on read.
    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn has_setter(&self) -> bool {
        self.accessor.can_write()
    }

    /// Whether the member can be populated in place (nested object).
    pub fn has_content(&self) -> bool {
        self.accessor.has_content()
    }

    pub fn inclusion_kind(&self) -> InclusionKind {
        match self.inclusion {
            Inclusion::Always => InclusionKind::Always,
            Inclusion::Custom(_) => InclusionKind::Custom,
            Inclusion::UnlessDefault(_) => InclusionKind::UnlessDefault,
        }
    }

    pub fn get(&self, instance: &dyn Any) -> Result<Value, SerializeError> {
        self.accessor.read(instance)
    }

    pub fn set(&self, instance: &mut dyn Any, value: Value) -> Result<(), DeserializeError> {
        self.accessor
            .write(instance, value)
            .unwrap_or_else(|| {
                Err(DeserializeError::ReadOnlyMember {
                    type_name: self.owner_name.clone(),
                    member: self.original_name.clone(),
                })
            })
    }

    pub fn content<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.accessor.content(instance)
    }

    pub fn reset(&self, instance: &mut dyn Any) -> bool {
        self.accessor.reset(instance)
    }

    /// Whether this member's value on `instance` should be written.
    ///
    /// `parent` is the member through which `instance` was reached. When the
    /// member compares against its default and `parent` declares an object
    /// default of this instance's type, the comparison uses this member's
    /// value inside that parent default instead of the member's own default.
    /// A live value that cannot be read is always included so the writer
    /// reports the failure.
    pub fn should_include(&self, instance: &dyn Any, parent: Option<&MemberEntry>) -> bool {
        match &self.inclusion {
            Inclusion::Always => true,
            Inclusion::Custom(predicate) => predicate(instance, parent),
            Inclusion::UnlessDefault(default) => {
                let Ok(live) = self.accessor.read(instance) else {
                    return true;
                };
                let contextual = parent
                    .and_then(MemberEntry::default_value)
                    .and_then(Value::as_object)
                    .and_then(|parent_default| self.accessor.read(parent_default.as_any()).ok());
                match contextual {
                    Some(reference) => reference != live,
                    None => *default != live,
                }
            }
        }
    }
}

impl fmt::Debug for MemberEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberEntry")
            .field("original_name", &self.original_name)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .field("mode", &self.mode)
            .field("order", &self.order)
            .field("mask", &self.mask)
            .field("alternate_names", &self.alternate_names)
            .field("default_value", &self.default_value)
            .field("inclusion", &self.inclusion_kind())
            .finish()
    }
}
