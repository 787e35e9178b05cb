//! # RedLilium Serialize
//!
//! Reflection-driven serialization schemas.
//!
//! ## Introspection
//!
//! - [`TypeDescription`]: Members (properties and fields) a type exposes, with tags
//! - [`Introspect`]: Trait producing a type's description; derive with `#[derive(Introspect)]`
//! - [`TypeRegistry`]: Thread-safe `TypeId` to description map
//! - [`Tag`] / [`TagBag`]: Per-member and per-type metadata
//!
//! ## Schemas
//!
//! - [`SchemaBuilder`]: Decides which members are serialized, under which names and modes
//! - [`TypeSchema`] / [`MemberEntry`]: The resulting ordered, indexed member set
//! - [`SchemaCache`]: Build-once-per-type schema store
//! - [`SchemaSettings`]: Policy: default-value suppression, naming, masks, ordering
//!
//! ## Objects
//!
//! - [`Value`]: Format-agnostic intermediate representation
//! - [`SerializeContext`] / [`DeserializeContext`]: Write and read objects through their schema
//! - [`Format`] / [`encode`] / [`decode`]: Format-specific I/O (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! #[derive(Default, Introspect)]
//! struct RigidBody {
//!     #[schema(default = 1.0)]
//!     pub mass: f32,
//!     #[schema(alias = "drag")]
//!     pub linear_damping: f32,
//! }
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register::<RigidBody>();
//! let cache = SchemaCache::new(registry, SchemaSettings::default().with_emit_default_values(false));
//! let value = SerializeContext::new(&cache).write(&RigidBody::default())?;
//! ```

extern crate self as redlilium_serialize;

mod context;
mod error;
mod format;
pub mod introspect;
pub mod naming;
pub mod schema;
pub mod value;

pub use context::{DeserializeContext, SerializeContext};
pub use error::{DeserializeError, SchemaError, SerializeError};
pub use format::{Format, decode, encode};
pub use introspect::{
    DataStyle, FieldInfo, Introspect, MemberMode, MemberTag, PropertyInfo, ShapeKind, Shaped,
    Tag, TagBag, TypeCategory, TypeDescription, TypeRegistry, TypeShape,
};
pub use naming::{CaseInsensitive, NamingConvention, NamingStyle};
pub use schema::{
    InclusionKind, MemberEntry, MemberKind, SchemaBuilder, SchemaCache, SchemaSettings, TypeSchema,
};
pub use serialize_macro::Introspect;
pub use value::{Instance, Value, from_value, to_value};
