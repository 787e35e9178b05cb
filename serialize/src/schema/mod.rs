//! Serialization schemas derived from type descriptions.
//!
//! A [`TypeSchema`] is the answer to "which members of this type are
//! serialized, under which names, in which order, and when". It is built by
//! [`SchemaBuilder`] from a [`TypeDescription`](crate::TypeDescription)
//! and cached per type by [`SchemaCache`].

mod builder;
mod cache;
mod member;
mod settings;
mod type_schema;

pub use builder::SchemaBuilder;
pub use cache::SchemaCache;
pub use member::{InclusionKind, MemberEntry, MemberKind};
pub use settings::{MemberComparer, SchemaSettings};
pub use type_schema::TypeSchema;
