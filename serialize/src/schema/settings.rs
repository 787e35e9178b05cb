//! Schema policy settings.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::member::MemberEntry;
use crate::introspect::MemberTag;
use crate::naming::{CaseInsensitive, NamingConvention, NamingStyle};

/// Caller-supplied total order applied to members after the explicit-order sort.
pub type MemberComparer = Arc<dyn Fn(&MemberEntry, &MemberEntry) -> Ordering + Send + Sync>;

/// Policy shared by every schema a [`SchemaCache`](super::SchemaCache) builds.
///
/// ```ignore
/// let settings = SchemaSettings::default()
///     .with_naming(NamingStyle::Camel)
///     .with_emit_default_values(false);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Emit members even when they hold their declared default value.
    pub emit_default_values: bool,
    /// Naming style for display names (ignored when a custom convention is set).
    pub naming: NamingStyle,
    /// Resolve member names ignoring ASCII case.
    pub case_insensitive_lookup: bool,
    /// Members whose mask shares no bit with this are not written.
    pub member_mask: u32,
    /// Skip unknown keys on read instead of failing.
    pub ignore_unknown_members: bool,
    #[serde(skip)]
    custom_naming: Option<Arc<dyn NamingConvention>>,
    #[serde(skip)]
    member_order: Option<MemberComparer>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            emit_default_values: true,
            naming: NamingStyle::Identity,
            case_insensitive_lookup: false,
            member_mask: MemberTag::DEFAULT_MASK,
            ignore_unknown_members: false,
            custom_naming: None,
            member_order: None,
        }
    }
}

impl SchemaSettings {
    pub fn with_emit_default_values(mut self, emit: bool) -> Self {
        self.emit_default_values = emit;
        self
    }

    pub fn with_naming(mut self, naming: NamingStyle) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_custom_naming(mut self, naming: impl NamingConvention + 'static) -> Self {
        self.custom_naming = Some(Arc::new(naming));
        self
    }

    pub fn with_case_insensitive_lookup(mut self, enabled: bool) -> Self {
        self.case_insensitive_lookup = enabled;
        self
    }

    pub fn with_member_mask(mut self, mask: u32) -> Self {
        self.member_mask = mask;
        self
    }

    pub fn with_ignore_unknown_members(mut self, ignore: bool) -> Self {
        self.ignore_unknown_members = ignore;
        self
    }

    /// Re-sort every schema's members with `compare` once explicit orders are applied.
    pub fn with_member_order<F>(mut self, compare: F) -> Self
    where
        F: Fn(&MemberEntry, &MemberEntry) -> Ordering + Send + Sync + 'static,
    {
        self.member_order = Some(Arc::new(compare));
        self
    }

    /// Sort members alphabetically by display name.
    pub fn with_alphabetical_order(self) -> Self {
        self.with_member_order(|a, b| a.name().cmp(b.name()))
    }

    pub fn member_order(&self) -> Option<&MemberComparer> {
        self.member_order.as_ref()
    }

    /// The effective naming convention, including case-insensitive lookup.
    pub fn naming_convention(&self) -> Arc<dyn NamingConvention> {
        match (&self.custom_naming, self.case_insensitive_lookup) {
            (Some(custom), false) => custom.clone(),
            (Some(custom), true) => Arc::new(CaseInsensitive(SharedConvention(custom.clone()))),
            (None, false) => Arc::new(self.naming),
            (None, true) => Arc::new(CaseInsensitive(self.naming)),
        }
    }

    /// Parse settings from RON text; missing fields keep their defaults.
    #[cfg(feature = "serialize-ron")]
    pub fn from_ron(text: &str) -> Result<Self, crate::DeserializeError> {
        ron::from_str(text).map_err(|e| crate::DeserializeError::FormatError(e.to_string()))
    }
}

impl fmt::Debug for SchemaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSettings")
            .field("emit_default_values", &self.emit_default_values)
            .field("naming", &self.naming)
            .field("case_insensitive_lookup", &self.case_insensitive_lookup)
            .field("member_mask", &self.member_mask)
            .field("ignore_unknown_members", &self.ignore_unknown_members)
            .field("custom_naming", &self.custom_naming.is_some())
            .field("member_order", &self.member_order.is_some())
            .finish()
    }
}

struct SharedConvention(Arc<dyn NamingConvention>);

impl NamingConvention for SharedConvention {
    fn convert(&self, name: &str) -> String {
        self.0.convert(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl NamingConvention for Upper {
        fn convert(&self, name: &str) -> String {
            name.to_uppercase()
        }
    }

    #[test]
    fn defaults_emit_everything() {
        let settings = SchemaSettings::default();
        assert!(settings.emit_default_values);
        assert_eq!(settings.member_mask, MemberTag::DEFAULT_MASK);
        assert!(settings.member_order().is_none());
    }

    #[test]
    fn custom_naming_overrides_style() {
        let settings = SchemaSettings::default()
            .with_naming(NamingStyle::Camel)
            .with_custom_naming(Upper)
            .with_case_insensitive_lookup(true);
        let naming = settings.naming_convention();
        assert_eq!(naming.convert("mass"), "MASS");
        assert_eq!(naming.lookup_key("MASS"), "mass");
    }

    #[cfg(feature = "serialize-ron")]
    #[test]
    fn settings_from_ron() {
        let settings =
            SchemaSettings::from_ron("(emit_default_values: false, naming: Camel)").unwrap();
        assert!(!settings.emit_default_values);
        assert_eq!(settings.naming, NamingStyle::Camel);
        assert!(!settings.ignore_unknown_members);
    }
}
