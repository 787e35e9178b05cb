//! Turns a [`TypeDescription`] into a [`TypeSchema`].
//!
//! The pipeline is: collect candidates, merge companion tags, pre-filter,
//! resolve per-member policy, order, then index names.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::member::{Inclusion, MemberEntry, MemberKind};
use super::settings::SchemaSettings;
use super::type_schema::TypeSchema;
use crate::error::SchemaError;
use crate::introspect::{
    Accessor, DataStyle, MemberMode, MemberTag, Tag, TagBag, TypeCategory, TypeDescription,
    TypeShape,
};
use crate::naming::NamingConvention;
use crate::value::Value;

/// A member that passed candidate collection, with merged tags.
struct Candidate {
    name: String,
    kind: MemberKind,
    shape: TypeShape,
    accessor: Accessor,
    public: bool,
    declared_on_collection: bool,
    tags: TagBag,
}

impl Candidate {
    fn has_setter(&self) -> bool {
        self.accessor.can_write()
    }
}

/// Tags contributed by companion types, keyed by (member name, shape name).
type CompanionTags = HashMap<(String, &'static str), TagBag>;

/// Builds schemas under one set of [`SchemaSettings`].
pub struct SchemaBuilder<'a> {
    settings: &'a SchemaSettings,
    naming: Arc<dyn NamingConvention>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(settings: &'a SchemaSettings) -> Self {
        Self {
            settings,
            naming: settings.naming_convention(),
        }
    }

    /// Build the schema for `description`.
    ///
    /// Fails with [`SchemaError::NameConflict`] when two members resolve to
    /// the same primary or alternate name.
    pub fn build(&self, description: &TypeDescription) -> Result<TypeSchema, SchemaError> {
        let default_mode = description
            .inherited_tag(TagBag::default_mode)
            .unwrap_or_default();
        let style = description.inherited_tag(TagBag::style).unwrap_or_default();

        let companions = companion_tags(description);
        let candidates = self.collect_candidates(description, &companions);

        let mut members = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(reason) = excluded(&candidate) {
                log::trace!(
                    "{}: dropping member '{}' ({reason})",
                    description.name(),
                    candidate.name
                );
                continue;
            }
            if let Some(entry) = self.prepare_member(description, default_mode, candidate) {
                members.push(entry);
            }
        }

        members.sort_by_key(|m| (m.order.is_none(), m.order));
        if let Some(compare) = self.settings.member_order() {
            members.sort_by(|a, b| compare(a, b));
        }

        let (index, remapped) = self.index_names(description, &members)?;

        log::debug!(
            "Built schema for '{}' with {} members",
            description.name(),
            members.len()
        );

        Ok(TypeSchema {
            type_id: description.type_id(),
            type_name: description.name().to_owned(),
            category: description.category(),
            default_member_mode: default_mode,
            style,
            members,
            index,
            remapped,
            naming: self.naming.clone(),
        })
    }

    /// Properties first, then fields, each in discovery order.
    fn collect_candidates(
        &self,
        description: &TypeDescription,
        companions: &CompanionTags,
    ) -> Vec<Candidate> {
        let category = description.category();
        let mut candidates = Vec::new();

        for property in description.all_properties() {
            if property.indexed {
                log::trace!(
                    "{}: skipping indexed property '{}'",
                    description.name(),
                    property.name
                );
                continue;
            }
            if !property.readable {
                continue;
            }
            let companion = companions.get(&(property.name.clone(), property.shape.name()));
            let tags = merge_tags(companion, &property.tags);
            let visible = category == TypeCategory::Anonymous
                || tags.member().is_some()
                || (property.getter_public && (property.setter_public || property.backed));
            if !visible {
                log::trace!(
                    "{}: property '{}' has no public write path or backing slot",
                    description.name(),
                    property.name
                );
                continue;
            }
            candidates.push(Candidate {
                name: property.name,
                kind: MemberKind::Property,
                shape: property.shape,
                accessor: property.accessor,
                public: property.getter_public,
                declared_on_collection: property.declared_on_collection,
                tags,
            });
        }

        for field in description.all_fields() {
            let companion = companions.get(&(field.name.clone(), field.shape.name()));
            let tags = merge_tags(companion, &field.tags);
            if !(field.public || category.exposes_all_fields() || tags.member().is_some()) {
                continue;
            }
            candidates.push(Candidate {
                name: field.name,
                kind: MemberKind::Field,
                shape: field.shape,
                accessor: field.accessor,
                public: field.public,
                declared_on_collection: false,
                tags,
            });
        }

        candidates
    }

    /// Resolve mode, naming, defaults and inclusion for one candidate.
    fn prepare_member(
        &self,
        description: &TypeDescription,
        default_mode: MemberMode,
        candidate: Candidate,
    ) -> Option<MemberEntry> {
        let owner = description.category();
        let tags = &candidate.tags;
        let member_tag = tags.member();
        let has_setter = candidate.has_setter();
        let shape = candidate.shape;

        let mut mode = default_mode;
        let style = tags.style().unwrap_or(DataStyle::Any);
        let mut mask = MemberTag::DEFAULT_MASK;
        let mut order = None;

        if let Some(tag) = member_tag {
            mask = tag.mask;
            order = tag.order;
            mode = tag.mode;
            if !has_setter
                && (mode == MemberMode::Assign || shape.is_value_type() || shape.is_string())
            {
                mode = MemberMode::Never;
            }
        }

        if mode == MemberMode::Default {
            let immutable = !has_setter
                && (shape.is_string() || shape.is_value_type())
                && owner != TypeCategory::Anonymous;
            mode = if immutable {
                MemberMode::Never
            } else {
                MemberMode::Content
            };
        }

        if !candidate.public && member_tag.is_none() && !owner.exposes_all_fields() {
            log::trace!(
                "{}: dropping non-public member '{}'",
                description.name(),
                candidate.name
            );
            return None;
        }
        if mode == MemberMode::Never {
            log::trace!(
                "{}: member '{}' resolved to Never",
                description.name(),
                candidate.name
            );
            return None;
        }

        let name = match member_tag.and_then(|t| t.name.as_deref()) {
            Some(explicit) if !explicit.trim().is_empty() => explicit.to_owned(),
            _ => self.naming.convert(&candidate.name),
        };

        let mut alternate_names: Vec<String> = Vec::new();
        let mut seen_keys = vec![self.naming.lookup_key(&name).into_owned()];
        for alias in tags.aliases() {
            if alias.trim().is_empty() {
                continue;
            }
            let key = self.naming.lookup_key(alias).into_owned();
            if seen_keys.contains(&key) {
                continue;
            }
            seen_keys.push(key);
            alternate_names.push(alias.to_owned());
        }

        let default_value = tags
            .default_value()
            .cloned()
            .map(|value| coerce_default(description, &candidate.name, shape, value));

        let inclusion = match (description.predicate(&candidate.name), &default_value) {
            (Some(predicate), _) => Inclusion::Custom(predicate),
            (None, Some(default)) if !self.settings.emit_default_values => {
                Inclusion::UnlessDefault(default.clone())
            }
            _ => Inclusion::Always,
        };

        Some(MemberEntry {
            owner_name: description.name().to_owned(),
            original_name: candidate.name,
            name,
            kind: candidate.kind,
            shape,
            mode,
            style,
            order,
            mask,
            alternate_names,
            default_value,
            public: candidate.public,
            accessor: candidate.accessor,
            inclusion,
        })
    }

    /// Primary names first, then aliases, per member in final order.
    fn index_names(
        &self,
        description: &TypeDescription,
        members: &[MemberEntry],
    ) -> Result<(HashMap<String, usize>, HashSet<String>), SchemaError> {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(members.len());
        let mut remapped = HashSet::new();

        for (position, member) in members.iter().enumerate() {
            let names = std::iter::once(member.name.as_str())
                .chain(member.alternate_names.iter().map(String::as_str));
            for (n, name) in names.enumerate() {
                let key = self.naming.lookup_key(name).into_owned();
                if let Some(&existing) = index.get(&key) {
                    return Err(SchemaError::NameConflict {
                        type_name: description.name().to_owned(),
                        name: name.to_owned(),
                        member: member.original_name.clone(),
                        existing: members[existing].original_name.clone(),
                    });
                }
                if n > 0 {
                    remapped.insert(key.clone());
                }
                index.insert(key, position);
            }
        }

        Ok((index, remapped))
    }
}

/// Reason a candidate is excluded before any policy applies.
fn excluded(candidate: &Candidate) -> Option<&'static str> {
    if candidate.shape.is_delegate() {
        Some("delegate")
    } else if candidate.kind == MemberKind::Property
        && candidate.declared_on_collection
        && candidate.name == "SyncRoot"
    {
        Some("collection sync root")
    } else if candidate.tags.is_ignored() {
        Some("ignored")
    } else {
        None
    }
}

/// Companion tags precede own tags. A companion default value only
/// survives when the member declares none.
fn merge_tags(companion: Option<&TagBag>, own: &TagBag) -> TagBag {
    let Some(companion) = companion else {
        return own.clone();
    };
    let own_default = own.default_value().is_some();
    companion
        .iter()
        .filter(|tag| !(own_default && matches!(tag, Tag::DefaultValue(_))))
        .chain(own.iter())
        .cloned()
        .collect()
}

fn companion_tags(description: &TypeDescription) -> CompanionTags {
    let mut out = CompanionTags::new();
    for companion in description.ancestry().flat_map(|d| d.companions()) {
        let properties = companion
            .all_properties()
            .into_iter()
            .filter(|p| p.getter_public && !p.indexed)
            .map(|p| (p.name, p.shape, p.tags));
        let fields = companion
            .all_fields()
            .into_iter()
            .filter(|f| f.public)
            .map(|f| (f.name, f.shape, f.tags));
        for (name, shape, tags) in properties.chain(fields) {
            out.entry((name, shape.name())).or_default().extend(tags.iter().cloned());
        }
    }
    out
}

fn coerce_default(
    description: &TypeDescription,
    member: &str,
    shape: TypeShape,
    value: Value,
) -> Value {
    if !shape.kind().is_numeric() {
        return value;
    }
    match value.coerce_to(shape.kind()) {
        Some(coerced) => coerced,
        None => {
            log::debug!(
                "{}: default {:?} of '{member}' does not convert to {}, keeping it",
                description.name(),
                value,
                shape.name()
            );
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeserializeError;
    use crate::introspect::{FieldInfo, PropertyInfo, ShapeKind};
    use crate::value::{from_value, to_value};

    #[derive(Default)]
    struct Body {
        mass: f32,
        label: String,
        shapes: Vec<u32>,
        secret: u8,
    }

    fn mass_field() -> FieldInfo {
        FieldInfo::new("mass", TypeShape::of::<f32>(), |b: &Body| to_value(&b.mass)).setter(
            |b: &mut Body, v| {
                b.mass = from_value(v)?;
                Ok(())
            },
        )
    }

    fn build(description: &TypeDescription) -> Result<TypeSchema, SchemaError> {
        SchemaBuilder::new(&SchemaSettings::default()).build(description)
    }

    #[test]
    fn getter_only_value_type_is_never() {
        let desc = TypeDescription::builder::<Body>()
            .field(mass_field())
            .field(FieldInfo::new("label", TypeShape::of::<String>(), |b: &Body| {
                to_value(&b.label)
            }))
            .build();
        let schema = build(&desc).unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.members()[0].mode(), MemberMode::Content);
    }

    #[test]
    fn private_field_needs_member_tag() {
        let secret = |b: &Body| to_value(&b.secret);
        let set = |b: &mut Body, v: Value| -> Result<(), DeserializeError> {
            b.secret = from_value(v)?;
            Ok(())
        };
        let hidden = TypeDescription::builder::<Body>()
            .field(FieldInfo::new("secret", TypeShape::of::<u8>(), secret).setter(set).private())
            .build();
        assert!(build(&hidden).unwrap().is_empty());

        let tagged = TypeDescription::builder::<Body>()
            .field(
                FieldInfo::new("secret", TypeShape::of::<u8>(), secret)
                    .setter(set)
                    .private()
                    .tag(Tag::Member(MemberTag::new())),
            )
            .build();
        assert!(build(&tagged).unwrap().contains("secret"));

        let plain = TypeDescription::builder::<Body>()
            .category(TypeCategory::PlainData)
            .field(FieldInfo::new("secret", TypeShape::of::<u8>(), secret).setter(set).private())
            .build();
        assert!(build(&plain).unwrap().contains("secret"));
    }

    #[test]
    fn sync_root_dropped_only_on_collections() {
        let sync_root = || {
            PropertyInfo::new("SyncRoot", TypeShape::of::<Vec<u32>>(), |b: &Body| {
                to_value(&b.shapes)
            })
            .backed()
        };
        let collection = TypeDescription::builder::<Body>()
            .category(TypeCategory::BuiltinCollection)
            .property(sync_root())
            .build();
        assert!(build(&collection).unwrap().is_empty());

        let object = TypeDescription::builder::<Body>().property(sync_root()).build();
        assert!(build(&object).unwrap().contains("SyncRoot"));
    }

    #[test]
    fn numeric_default_is_coerced_to_member_kind() {
        let desc = TypeDescription::builder::<Body>()
            .field(mass_field().tag(Tag::DefaultValue(Value::I64(1))))
            .build();
        let schema = build(&desc).unwrap();
        assert_eq!(schema.members()[0].default_value(), Some(&Value::F32(1.0)));
    }

    #[test]
    fn failed_coercion_keeps_original_default() {
        let desc = TypeDescription::builder::<Body>()
            .field(
                FieldInfo::new("secret", TypeShape::of::<u8>(), |b: &Body| to_value(&b.secret))
                    .setter(|b: &mut Body, v| {
                        b.secret = from_value(v)?;
                        Ok(())
                    })
                    .tag(Tag::DefaultValue(Value::I64(-4))),
            )
            .build();
        let schema = build(&desc).unwrap();
        assert_eq!(schema.members()[0].default_value(), Some(&Value::I64(-4)));
    }

    #[test]
    fn companion_default_is_fallback_only() {
        let companion = Arc::new(
            TypeDescription::builder::<()>()
                .field(
                    FieldInfo::metadata("mass", TypeShape::of::<f32>())
                        .tag(Tag::DefaultValue(Value::F32(5.0)))
                        .tag(Tag::Alias("weight".into())),
                )
                .build(),
        );
        let own = TypeDescription::builder::<Body>()
            .companion(companion.clone())
            .field(mass_field().tag(Tag::DefaultValue(Value::F32(2.0))))
            .build();
        let schema = build(&own).unwrap();
        let mass = schema.member("mass").unwrap();
        assert_eq!(mass.default_value(), Some(&Value::F32(2.0)));
        assert_eq!(mass.alternate_names(), ["weight".to_owned()]);

        let fallback = TypeDescription::builder::<Body>()
            .companion(companion)
            .field(mass_field())
            .build();
        let schema = build(&fallback).unwrap();
        assert_eq!(schema.member("mass").unwrap().default_value(), Some(&Value::F32(5.0)));
    }

    #[test]
    fn companion_must_match_shape() {
        let companion = Arc::new(
            TypeDescription::builder::<()>()
                .field(FieldInfo::metadata("mass", TypeShape::of::<f64>()).tag(Tag::Ignore))
                .build(),
        );
        let desc = TypeDescription::builder::<Body>()
            .companion(companion)
            .field(mass_field())
            .build();
        assert!(build(&desc).unwrap().contains("mass"));
    }

    #[test]
    fn blank_and_self_aliases_are_skipped() {
        let desc = TypeDescription::builder::<Body>()
            .field(
                mass_field()
                    .tag(Tag::Alias("  ".into()))
                    .tag(Tag::Alias("mass".into()))
                    .tag(Tag::Alias("m".into()))
                    .tag(Tag::Alias("m".into())),
            )
            .build();
        let schema = build(&desc).unwrap();
        assert_eq!(schema.members()[0].alternate_names(), ["m".to_owned()]);
    }

    #[test]
    fn aliases_matching_by_lookup_key_are_skipped() {
        let settings = SchemaSettings::default().with_case_insensitive_lookup(true);
        let desc = TypeDescription::builder::<Body>()
            .field(
                mass_field()
                    .tag(Tag::Alias("MASS".into()))
                    .tag(Tag::Alias("weight".into()))
                    .tag(Tag::Alias("Weight".into())),
            )
            .build();
        let schema = SchemaBuilder::new(&settings).build(&desc).unwrap();
        assert_eq!(schema.members()[0].alternate_names(), ["weight".to_owned()]);
        assert!(schema.contains("WEIGHT"));
    }

    #[test]
    fn member_tag_overrides_opt_in_default_mode() {
        let desc = TypeDescription::builder::<Body>()
            .tag(Tag::DefaultMode(MemberMode::Never))
            .field(mass_field().tag(Tag::Member(MemberTag::new())))
            .field(FieldInfo::new("shapes", TypeShape::of::<Vec<u32>>(), |b: &Body| {
                to_value(&b.shapes)
            }))
            .build();
        let schema = build(&desc).unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema["mass"].mode(), MemberMode::Content);
    }

    #[test]
    fn delegate_shape_kind_is_dropped() {
        let desc = TypeDescription::builder::<Body>()
            .field(FieldInfo::new(
                "callback",
                TypeShape::with_kind::<fn()>(ShapeKind::Delegate),
                |_: &Body| Ok(Value::Null),
            ))
            .build();
        assert!(build(&desc).unwrap().is_empty());
    }
}
