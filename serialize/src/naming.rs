//! Member naming conventions.
//!
//! A [`NamingConvention`] turns a member's original (Rust) name into the
//! name written to the output, and produces the key used for name lookups.

use std::borrow::Cow;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

pub trait NamingConvention: Send + Sync {
    /// Display name for a member's original name.
    fn convert(&self, name: &str) -> String;

    /// Key under which `name` is stored in and looked up from a name index.
    fn lookup_key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }
}

/// Built-in naming styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamingStyle {
    /// Keep the original name.
    #[default]
    Identity,
    Camel,
    Pascal,
    Snake,
    Kebab,
}

impl NamingConvention for NamingStyle {
    fn convert(&self, name: &str) -> String {
        match self {
            NamingStyle::Identity => name.to_owned(),
            NamingStyle::Camel => name.to_case(Case::Camel),
            NamingStyle::Pascal => name.to_case(Case::Pascal),
            NamingStyle::Snake => name.to_case(Case::Snake),
            NamingStyle::Kebab => name.to_case(Case::Kebab),
        }
    }
}

/// Wraps a convention so that lookups ignore ASCII case.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitive<N>(pub N);

impl<N: NamingConvention> NamingConvention for CaseInsensitive<N> {
    fn convert(&self, name: &str) -> String {
        self.0.convert(name)
    }

    fn lookup_key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_convert_snake_case_names() {
        assert_eq!(NamingStyle::Identity.convert("linear_damping"), "linear_damping");
        assert_eq!(NamingStyle::Camel.convert("linear_damping"), "linearDamping");
        assert_eq!(NamingStyle::Pascal.convert("linear_damping"), "LinearDamping");
        assert_eq!(NamingStyle::Kebab.convert("linear_damping"), "linear-damping");
        assert_eq!(NamingStyle::Snake.convert("LinearDamping"), "linear_damping");
    }

    #[test]
    fn case_insensitive_lookup_key() {
        let naming = CaseInsensitive(NamingStyle::Pascal);
        assert_eq!(naming.convert("gravity_scale"), "GravityScale");
        assert_eq!(naming.lookup_key("GravityScale"), "gravityscale");
        assert!(matches!(naming.lookup_key("mass"), Cow::Borrowed(_)));
    }
}
