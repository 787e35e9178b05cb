//! Resolved per-type member table with name and alias lookup.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use super::member::MemberEntry;
use crate::error::SchemaError;
use crate::introspect::{DataStyle, MemberMode, TypeCategory};
use crate::naming::NamingConvention;

/// The ordered, immutable set of serializable members of one type.
///
/// Built by [`SchemaBuilder`](super::SchemaBuilder) and usually shared
/// through a [`SchemaCache`](super::SchemaCache).
pub struct TypeSchema {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: String,
    pub(crate) category: TypeCategory,
    pub(crate) default_member_mode: MemberMode,
    pub(crate) style: DataStyle,
    pub(crate) members: Vec<MemberEntry>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) remapped: HashSet<String>,
    pub(crate) naming: Arc<dyn NamingConvention>,
}

impl TypeSchema {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn category(&self) -> TypeCategory {
        self.category
    }

    /// Mode members start from before their own tags apply.
    pub fn default_member_mode(&self) -> MemberMode {
        self.default_member_mode
    }

    pub fn style(&self) -> DataStyle {
        self.style
    }

    /// Members in serialization order.
    pub fn members(&self) -> &[MemberEntry] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member bound to `name`, either its display name or an alias.
    pub fn try_member(&self, name: &str) -> Option<&MemberEntry> {
        if self.members.is_empty() {
            return None;
        }
        let key = self.naming.lookup_key(name);
        self.index.get(key.as_ref()).map(|&i| &self.members[i])
    }

    /// Like [`try_member`](Self::try_member) but reports a missing name.
    pub fn member(&self, name: &str) -> Result<&MemberEntry, SchemaError> {
        self.try_member(name).ok_or_else(|| SchemaError::MemberNotFound {
            type_name: self.type_name.clone(),
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.try_member(name).is_some()
    }

    /// Whether `name` is an alias rather than a member's display name.
    pub fn is_remapped(&self, name: &str) -> bool {
        self.remapped.contains(self.naming.lookup_key(name).as_ref())
    }

    pub fn remapped_names(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .flat_map(|m| m.alternate_names.iter().map(String::as_str))
    }
}

impl Index<&str> for TypeSchema {
    type Output = MemberEntry;

    /// # Panics
    ///
    /// Panics when no member is bound to `name`.
    fn index(&self, name: &str) -> &MemberEntry {
        match self.member(name) {
            Ok(member) => member,
            Err(err) => panic!("{err}"),
        }
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("type_name", &self.type_name)
            .field("category", &self.category)
            .field("default_member_mode", &self.default_member_mode)
            .field("style", &self.style)
            .field("members", &self.members)
            .field("remapped", &self.remapped)
            .finish()
    }
}
