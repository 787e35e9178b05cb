//! Metadata tags attached to types and members.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Controls whether and how a member is written back on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemberMode {
    /// Not decided yet; resolved to `Content` or `Never` during schema build.
    #[default]
    Default,
    /// Populate the existing value in place.
    Content,
    /// Replace the value through the setter.
    Assign,
    /// Never serialized.
    Never,
}

/// Emission style hint for the output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataStyle {
    #[default]
    Any,
    Compact,
    Normal,
}

/// Explicit per-member serialization settings.
///
/// Its presence also force-includes the member: non-public and
/// getter-only members carrying it are still candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberTag {
    pub name: Option<String>,
    pub mode: MemberMode,
    pub order: Option<i32>,
    pub mask: u32,
}

impl MemberTag {
    /// Mask bit every member carries unless told otherwise.
    pub const DEFAULT_MASK: u32 = 1;

    pub fn new() -> Self {
        Self {
            name: None,
            mode: MemberMode::Default,
            order: None,
            mask: Self::DEFAULT_MASK,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mode(mut self, mode: MemberMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }
}

impl Default for MemberTag {
    fn default() -> Self {
        Self::new()
    }
}

/// A single piece of metadata attached to a type or member.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Explicit member settings (name, mode, order, mask).
    Member(MemberTag),
    /// Exclude the member unconditionally.
    Ignore,
    /// Value the member holds when it does not need to be emitted.
    DefaultValue(Value),
    /// Additional name the member binds to on read.
    Alias(String),
    /// Style override (member) or schema style (type).
    Style(DataStyle),
    /// Type-level default for members' [`MemberMode`].
    DefaultMode(MemberMode),
}

/// Ordered collection of [`Tag`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagBag(Vec<Tag>);

impl TagBag {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_ignored(&self) -> bool {
        self.0.iter().any(|t| matches!(t, Tag::Ignore))
    }

    /// Last member tag, so later tags override earlier ones.
    pub fn member(&self) -> Option<&MemberTag> {
        self.0.iter().rev().find_map(|t| match t {
            Tag::Member(m) => Some(m),
            _ => None,
        })
    }

    pub fn style(&self) -> Option<DataStyle> {
        self.0.iter().rev().find_map(|t| match t {
            Tag::Style(s) => Some(*s),
            _ => None,
        })
    }

    pub fn default_mode(&self) -> Option<MemberMode> {
        self.0.iter().rev().find_map(|t| match t {
            Tag::DefaultMode(m) => Some(*m),
            _ => None,
        })
    }

    /// First default value; duplicates after it are ignored.
    pub fn default_value(&self) -> Option<&Value> {
        self.0.iter().find_map(|t| match t {
            Tag::DefaultValue(v) => Some(v),
            _ => None,
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|t| match t {
            Tag::Alias(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl From<Vec<Tag>> for TagBag {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl FromIterator<Tag> for TagBag {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Tag> for TagBag {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
