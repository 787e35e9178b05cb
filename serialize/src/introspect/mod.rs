//! Runtime type introspection.
//!
//! Describes what a type exposes (properties, fields, their shapes and
//! tags) without deciding what gets serialized. That decision is made by
//! [`SchemaBuilder`](crate::SchemaBuilder).

mod description;
mod registry;
mod shape;
mod tags;

pub use description::{
    Accessor, BaseType, FieldInfo, InclusionPredicate, PropertyInfo, TypeCategory,
    TypeDescription, TypeDescriptionBuilder,
};
pub use registry::{Introspect, TypeRegistry};
pub use shape::{ShapeKind, Shaped, TypeShape};
pub use tags::{DataStyle, MemberMode, MemberTag, Tag, TagBag};
