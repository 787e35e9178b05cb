//! Type descriptions: the members a type exposes and the tags attached to them.
//!
//! A [`TypeDescription`] is produced once per Rust type, either by
//! `#[derive(Introspect)]` or by hand through [`TypeDescription::builder`].
//! Accessors are type-erased closures over `dyn Any`; they downcast to the
//! described type and report [`InstanceMismatch`](SerializeError::InstanceMismatch)
//! when handed something else.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use super::shape::TypeShape;
use super::tags::{Tag, TagBag};
use crate::error::{DeserializeError, SerializeError};
use crate::schema::MemberEntry;
use crate::value::Value;

type ReadFn = dyn Fn(&dyn Any) -> Result<Value, SerializeError> + Send + Sync;
type WriteFn = dyn Fn(&mut dyn Any, Value) -> Result<(), DeserializeError> + Send + Sync;
type ContentFn = dyn for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any> + Send + Sync;
type ResetFn = dyn Fn(&mut dyn Any) -> bool + Send + Sync;
type ProjectFn = dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync;

/// Per-instance inclusion check: `(instance, parent member) -> include?`.
///
/// The parent is the member through which `instance` was reached, if any.
pub type InclusionPredicate = Arc<dyn Fn(&dyn Any, Option<&MemberEntry>) -> bool + Send + Sync>;

// Closure signature pinning for higher-ranked borrows.
fn content_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any>,
{
    f
}

fn project_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any>,
{
    f
}

/// Category of a described type; drives candidate visibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeCategory {
    #[default]
    Object,
    /// Plain data aggregate: non-public fields are serialized too.
    PlainData,
    /// Compiler-generated aggregate: every member is a candidate.
    Anonymous,
    /// Built-in collection type.
    BuiltinCollection,
}

impl TypeCategory {
    /// Whether non-public members take part without an explicit member tag.
    pub fn exposes_all_fields(self) -> bool {
        matches!(self, Self::PlainData | Self::Anonymous)
    }
}

// ---------------------------------------------------------------------------
// Accessor
// ---------------------------------------------------------------------------

/// Type-erased read/write access to one member of an instance.
#[derive(Clone)]
pub struct Accessor {
    member: Arc<str>,
    owner: &'static str,
    read: Arc<ReadFn>,
    write: Option<Arc<WriteFn>>,
    content: Option<Arc<ContentFn>>,
    reset: Option<Arc<ResetFn>>,
}

impl Accessor {
    fn new<T, F>(member: &str, read: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<Value, SerializeError> + Send + Sync + 'static,
    {
        let name: Arc<str> = Arc::from(member);
        let owner = std::any::type_name::<T>();
        let error_name = name.clone();
        Self {
            member: name,
            owner,
            read: Arc::new(move |instance: &dyn Any| match instance.downcast_ref::<T>() {
                Some(typed) => read(typed),
                None => Err(SerializeError::InstanceMismatch {
                    member: error_name.to_string(),
                    expected: owner,
                }),
            }),
            write: None,
            content: None,
            reset: None,
        }
    }

    /// Accessor for metadata-only members that are never read.
    fn detached(member: &str) -> Self {
        let name: Arc<str> = Arc::from(member);
        let error_name = name.clone();
        Self {
            member: name,
            owner: "<metadata>",
            read: Arc::new(move |_: &dyn Any| {
                Err(SerializeError::FieldError {
                    field: error_name.to_string(),
                    message: "metadata-only member has no value".into(),
                })
            }),
            write: None,
            content: None,
            reset: None,
        }
    }

    fn set_writer<T, F>(&mut self, write: F)
    where
        T: Any,
        F: Fn(&mut T, Value) -> Result<(), DeserializeError> + Send + Sync + 'static,
    {
        let member = self.member.clone();
        let owner = self.owner;
        self.write = Some(Arc::new(
            move |instance: &mut dyn Any, value: Value| match instance.downcast_mut::<T>() {
                Some(typed) => write(typed, value),
                None => Err(DeserializeError::InstanceMismatch {
                    member: member.to_string(),
                    expected: owner,
                }),
            },
        ));
    }

    fn set_content<T, N, F>(&mut self, content: F)
    where
        T: Any,
        N: Any,
        F: Fn(&mut T) -> &mut N + Send + Sync + 'static,
    {
        self.content = Some(Arc::new(content_fn(move |instance: &mut dyn Any| {
            instance
                .downcast_mut::<T>()
                .map(|typed| content(typed) as &mut dyn Any)
        })));
    }

    fn set_reset<T, F>(&mut self, reset: F)
    where
        T: Any,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.reset = Some(Arc::new(move |instance: &mut dyn Any| {
            match instance.downcast_mut::<T>() {
                Some(typed) => {
                    reset(typed);
                    true
                }
                None => false,
            }
        }));
    }

    /// Route every accessor through a base projection of the instance.
    fn through(&self, base: &BaseType) -> Self {
        let project = base.project.clone();
        let project_mut = base.project_mut.clone();
        let owner = self.owner;
        let member = self.member.clone();

        let read = self.read.clone();
        let read_member = member.clone();
        let mut projected = Self {
            member: member.clone(),
            owner,
            read: Arc::new(move |instance: &dyn Any| match project(instance) {
                Some(inner) => read(inner),
                None => Err(SerializeError::InstanceMismatch {
                    member: read_member.to_string(),
                    expected: owner,
                }),
            }),
            write: None,
            content: None,
            reset: None,
        };

        if let Some(write) = self.write.clone() {
            let project_mut = project_mut.clone();
            let member = member.clone();
            projected.write = Some(Arc::new(move |instance: &mut dyn Any, value: Value| {
                match project_mut(instance) {
                    Some(inner) => write(inner, value),
                    None => Err(DeserializeError::InstanceMismatch {
                        member: member.to_string(),
                        expected: owner,
                    }),
                }
            }));
        }

        if let Some(content) = self.content.clone() {
            let project_mut = project_mut.clone();
            projected.content = Some(Arc::new(content_fn(move |instance: &mut dyn Any| {
                project_mut(instance).and_then(|inner| content(inner))
            })));
        }

        if let Some(reset) = self.reset.clone() {
            projected.reset = Some(Arc::new(move |instance: &mut dyn Any| {
                project_mut(instance).is_some_and(|inner| reset(inner))
            }));
        }

        projected
    }

    pub fn read(&self, instance: &dyn Any) -> Result<Value, SerializeError> {
        (self.read)(instance)
    }

    pub fn write(&self, instance: &mut dyn Any, value: Value) -> Option<Result<(), DeserializeError>> {
        self.write.as_ref().map(|write| write(instance, value))
    }

    /// In-place mutable access to a nested object.
    pub fn content<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.content.as_ref().and_then(|content| content(instance))
    }

    /// Reset a nested object to its default; `false` when unsupported.
    pub fn reset(&self, instance: &mut dyn Any) -> bool {
        self.reset.as_ref().is_some_and(|reset| reset(instance))
    }

    pub fn can_write(&self) -> bool {
        self.write.is_some()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor")
            .field("member", &self.member)
            .field("owner", &self.owner)
            .field("write", &self.write.is_some())
            .field("content", &self.content.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PropertyInfo / FieldInfo
// ---------------------------------------------------------------------------

/// A getter/setter pair exposed by a type.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub(crate) name: String,
    pub(crate) shape: TypeShape,
    pub(crate) accessor: Accessor,
    pub(crate) readable: bool,
    pub(crate) getter_public: bool,
    pub(crate) setter_public: bool,
    pub(crate) backed: bool,
    pub(crate) indexed: bool,
    /// Set by the builder when the owner is a built-in collection.
    pub(crate) declared_on_collection: bool,
    pub(crate) tags: TagBag,
}

impl PropertyInfo {
    /// A public, read-only property.
    pub fn new<T, F>(name: &str, shape: TypeShape, get: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<Value, SerializeError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_owned(),
            shape,
            accessor: Accessor::new(name, get),
            readable: true,
            getter_public: true,
            setter_public: false,
            backed: false,
            indexed: false,
            declared_on_collection: false,
            tags: TagBag::new(),
        }
    }

    /// A property that only carries tags (companion types).
    pub fn metadata(name: &str, shape: TypeShape) -> Self {
        Self {
            name: name.to_owned(),
            shape,
            accessor: Accessor::detached(name),
            readable: false,
            getter_public: true,
            setter_public: false,
            backed: false,
            indexed: false,
            declared_on_collection: false,
            tags: TagBag::new(),
        }
    }

    /// Public setter.
    pub fn setter<T, F>(mut self, set: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, Value) -> Result<(), DeserializeError> + Send + Sync + 'static,
    {
        self.accessor.set_writer(set);
        self.setter_public = true;
        self
    }

    /// Setter that is not publicly accessible.
    pub fn private_setter<T, F>(mut self, set: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, Value) -> Result<(), DeserializeError> + Send + Sync + 'static,
    {
        self.accessor.set_writer(set);
        self.setter_public = false;
        self
    }

    /// In-place access to the object the property returns.
    pub fn content<T, N, F>(mut self, content: F) -> Self
    where
        T: Any,
        N: Any,
        F: Fn(&mut T) -> &mut N + Send + Sync + 'static,
    {
        self.accessor.set_content(content);
        self
    }

    /// The getter reads a storage slot the type owns.
    pub fn backed(mut self) -> Self {
        self.backed = true;
        self
    }

    pub fn private_getter(mut self) -> Self {
        self.getter_public = false;
        self
    }

    /// The property takes parameters.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    pub fn tags(&self) -> &TagBag {
        &self.tags
    }

    pub fn has_setter(&self) -> bool {
        self.accessor.can_write()
    }

    fn projected(&self, base: &BaseType) -> Self {
        Self {
            accessor: self.accessor.through(base),
            ..self.clone()
        }
    }
}

/// A storage slot exposed by a type.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub(crate) name: String,
    pub(crate) shape: TypeShape,
    pub(crate) accessor: Accessor,
    pub(crate) public: bool,
    pub(crate) tags: TagBag,
}

impl FieldInfo {
    /// A public, read-only field. Add [`setter`](Self::setter) to make it writable.
    pub fn new<T, F>(name: &str, shape: TypeShape, get: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<Value, SerializeError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_owned(),
            shape,
            accessor: Accessor::new(name, get),
            public: true,
            tags: TagBag::new(),
        }
    }

    /// A field that only carries tags (companion types).
    pub fn metadata(name: &str, shape: TypeShape) -> Self {
        Self {
            name: name.to_owned(),
            shape,
            accessor: Accessor::detached(name),
            public: true,
            tags: TagBag::new(),
        }
    }

    pub fn setter<T, F>(mut self, set: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, Value) -> Result<(), DeserializeError> + Send + Sync + 'static,
    {
        self.accessor.set_writer(set);
        self
    }

    /// In-place access to a nested object stored in this field.
    pub fn content<T, N, F>(mut self, content: F) -> Self
    where
        T: Any,
        N: Any,
        F: Fn(&mut T) -> &mut N + Send + Sync + 'static,
    {
        self.accessor.set_content(content);
        self
    }

    /// Restore the nested object to its default before an assigning read.
    pub fn reset<T, F>(mut self, reset: F) -> Self
    where
        T: Any,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.accessor.set_reset(reset);
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn visibility(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    pub fn tags(&self) -> &TagBag {
        &self.tags
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    fn projected(&self, base: &BaseType) -> Self {
        Self {
            accessor: self.accessor.through(base),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// BaseType
// ---------------------------------------------------------------------------

/// Link from a type to the type it extends.
///
/// Rust has no inheritance; a "derived" type embeds its base and exposes it
/// through a projection so the base's members apply to the derived instance.
#[derive(Clone)]
pub struct BaseType {
    description: Arc<TypeDescription>,
    project: Arc<ProjectFn>,
    project_mut: Arc<ContentFn>,
}

impl BaseType {
    pub fn description(&self) -> &Arc<TypeDescription> {
        &self.description
    }
}

impl std::fmt::Debug for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BaseType").field(&self.description.name).finish()
    }
}

// ---------------------------------------------------------------------------
// TypeDescription
// ---------------------------------------------------------------------------

/// Everything the schema builder needs to know about one type.
#[derive(Clone)]
pub struct TypeDescription {
    type_id: TypeId,
    name: String,
    category: TypeCategory,
    base: Option<BaseType>,
    tags: TagBag,
    properties: Vec<PropertyInfo>,
    fields: Vec<FieldInfo>,
    companions: Vec<Arc<TypeDescription>>,
    predicates: HashMap<String, InclusionPredicate>,
}

impl TypeDescription {
    pub fn builder<T: Any>() -> TypeDescriptionBuilder<T> {
        TypeDescriptionBuilder::new()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> TypeCategory {
        self.category
    }

    pub fn base(&self) -> Option<&BaseType> {
        self.base.as_ref()
    }

    pub fn tags(&self) -> &TagBag {
        &self.tags
    }

    /// Properties declared on this type (not its base).
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// Fields declared on this type (not its base).
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn companions(&self) -> &[Arc<TypeDescription>] {
        &self.companions
    }

    /// This type followed by its bases, nearest first.
    pub fn ancestry(&self) -> impl Iterator<Item = &TypeDescription> {
        std::iter::successors(Some(self), |desc| {
            desc.base.as_ref().map(|base| base.description.as_ref())
        })
    }

    /// First type-level tag value found walking from this type to its bases.
    pub fn inherited_tag<R>(&self, find: impl Fn(&TagBag) -> Option<R>) -> Option<R> {
        self.ancestry().find_map(|desc| find(&desc.tags))
    }

    /// Properties of this type and its bases, projected onto this type.
    ///
    /// Derived members come first; a base member hidden by a derived member
    /// of the same name is skipped.
    pub fn all_properties(&self) -> Vec<PropertyInfo> {
        let mut out: Vec<PropertyInfo> = self.properties.clone();
        if let Some(base) = &self.base {
            for inherited in base.description.all_properties() {
                if out.iter().all(|p| p.name != inherited.name) {
                    out.push(inherited.projected(base));
                }
            }
        }
        out
    }

    /// Fields of this type and its bases, projected onto this type.
    pub fn all_fields(&self) -> Vec<FieldInfo> {
        let mut out: Vec<FieldInfo> = self.fields.clone();
        if let Some(base) = &self.base {
            for inherited in base.description.all_fields() {
                if out.iter().all(|f| f.name != inherited.name) {
                    out.push(inherited.projected(base));
                }
            }
        }
        out
    }

    /// Registered inclusion predicate for a member, searching bases too.
    pub fn predicate(&self, member: &str) -> Option<InclusionPredicate> {
        if let Some(predicate) = self.predicates.get(member) {
            return Some(predicate.clone());
        }
        let base = self.base.as_ref()?;
        let inner = base.description.predicate(member)?;
        let project = base.project.clone();
        Some(Arc::new(move |instance: &dyn Any, parent: Option<&MemberEntry>| {
            project(instance).is_none_or(|base| inner(base, parent))
        }))
    }
}

impl std::fmt::Debug for TypeDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescription")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("base", &self.base)
            .field("tags", &self.tags)
            .field("properties", &self.properties)
            .field("fields", &self.fields)
            .field("companions", &self.companions.len())
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `a::b::Body<c::Mesh>` becomes `Body<c::Mesh>`.
fn short_type_name(full: &str) -> String {
    let (path, generics) = full.split_at(full.find('<').unwrap_or(full.len()));
    let short = path.rsplit("::").next().unwrap_or(path);
    format!("{short}{generics}")
}

/// Builder for [`TypeDescription`], typed on the described type.
pub struct TypeDescriptionBuilder<T: Any> {
    description: TypeDescription,
    _marker: std::marker::PhantomData<fn(&T)>,
}

impl<T: Any> TypeDescriptionBuilder<T> {
    fn new() -> Self {
        Self {
            description: TypeDescription {
                type_id: TypeId::of::<T>(),
                name: short_type_name(std::any::type_name::<T>()),
                category: TypeCategory::Object,
                base: None,
                tags: TagBag::new(),
                properties: Vec::new(),
                fields: Vec::new(),
                companions: Vec::new(),
                predicates: HashMap::new(),
            },
            _marker: std::marker::PhantomData,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.description.name = name.into();
        self
    }

    pub fn category(mut self, category: TypeCategory) -> Self {
        self.description.category = category;
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.description.tags.push(tag);
        self
    }

    pub fn property(mut self, property: PropertyInfo) -> Self {
        self.description.properties.push(property);
        self
    }

    pub fn field(mut self, field: FieldInfo) -> Self {
        self.description.fields.push(field);
        self
    }

    /// Declare the embedded base type `B`.
    pub fn base<B, G, M>(mut self, description: Arc<TypeDescription>, get: G, get_mut: M) -> Self
    where
        B: Any,
        G: Fn(&T) -> &B + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut B + Send + Sync + 'static,
    {
        debug_assert_eq!(description.type_id, TypeId::of::<B>());
        self.description.base = Some(BaseType {
            description,
            project: Arc::new(project_fn(move |instance: &dyn Any| {
                instance.downcast_ref::<T>().map(|typed| get(typed) as &dyn Any)
            })),
            project_mut: Arc::new(content_fn(move |instance: &mut dyn Any| {
                instance
                    .downcast_mut::<T>()
                    .map(|typed| get_mut(typed) as &mut dyn Any)
            })),
        });
        self
    }

    /// Add a companion type whose members contribute tags only.
    pub fn companion(mut self, companion: Arc<TypeDescription>) -> Self {
        self.description.companions.push(companion);
        self
    }

    /// Register the inclusion predicate for `member` (by original name).
    pub fn should_serialize<F>(mut self, member: &str, predicate: F) -> Self
    where
        F: Fn(&T, Option<&MemberEntry>) -> bool + Send + Sync + 'static,
    {
        self.description.predicates.insert(
            member.to_owned(),
            Arc::new(move |instance: &dyn Any, parent: Option<&MemberEntry>| {
                instance
                    .downcast_ref::<T>()
                    .is_none_or(|typed| predicate(typed, parent))
            }),
        );
        self
    }

    pub fn build(mut self) -> TypeDescription {
        let on_collection = self.description.category == TypeCategory::BuiltinCollection;
        for property in &mut self.description.properties {
            property.declared_on_collection = on_collection;
        }
        self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::MemberMode;
    use crate::value::{from_value, to_value};

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        label: String,
    }

    fn base_description() -> Arc<TypeDescription> {
        Arc::new(
            TypeDescription::builder::<Base>()
                .tag(Tag::DefaultMode(MemberMode::Assign))
                .field(
                    FieldInfo::new("id", TypeShape::of::<u32>(), |b: &Base| to_value(&b.id))
                        .setter(|b: &mut Base, v| {
                            b.id = from_value(v)?;
                            Ok(())
                        }),
                )
                .should_serialize("id", |b: &Base, _| b.id != 0)
                .build(),
        )
    }

    fn derived_description() -> TypeDescription {
        TypeDescription::builder::<Derived>()
            .base(base_description(), |d: &Derived| &d.base, |d: &mut Derived| &mut d.base)
            .field(FieldInfo::new(
                "label",
                TypeShape::of::<String>(),
                |d: &Derived| to_value(&d.label),
            ))
            .build()
    }

    #[test]
    fn builder_uses_short_type_name() {
        assert_eq!(derived_description().name(), "Derived");
    }

    #[test]
    fn base_members_are_projected() {
        let desc = derived_description();
        let fields = desc.all_fields();
        assert_eq!(
            fields.iter().map(|f| f.name()).collect::<Vec<_>>(),
            vec!["label", "id"]
        );

        let mut instance = Derived::default();
        let id = &fields[1];
        id.accessor
            .write(&mut instance, Value::U64(9))
            .unwrap()
            .unwrap();
        assert_eq!(instance.base.id, 9);
        assert_eq!(id.accessor.read(&instance).unwrap(), Value::U64(9));
    }

    #[test]
    fn type_tags_are_inherited() {
        let desc = derived_description();
        assert_eq!(
            desc.inherited_tag(|tags| tags.default_mode()),
            Some(MemberMode::Assign)
        );
    }

    #[test]
    fn base_predicates_are_projected() {
        let desc = derived_description();
        let predicate = desc.predicate("id").unwrap();
        let mut instance = Derived::default();
        assert!(!predicate(&instance, None));
        instance.base.id = 3;
        assert!(predicate(&instance, None));
    }

    #[test]
    fn wrong_instance_is_reported() {
        let desc = derived_description();
        let err = desc.fields()[0].accessor.read(&5u8).unwrap_err();
        assert!(matches!(err, SerializeError::InstanceMismatch { .. }));
    }
}
