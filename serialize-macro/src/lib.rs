use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Expr, Fields, GenericArgument, Ident, LitStr, Member, Path,
    PathArguments, Type, TypeParamBound, Visibility, parse_macro_input,
};

/// Derive `Introspect` for a struct, describing its fields for schema building.
///
/// Field values go through serde (`Serialize + DeserializeOwned`) unless the
/// field is marked `nested`, `ignore` or `delegate`.
///
/// # Type attributes
///
/// ```ignore
/// #[derive(Default, Introspect)]
/// #[schema(default_mode = Assign, style = Compact, plain_data, companion = BodyHints)]
/// struct RigidBody { /* ... */ }
/// ```
///
/// - `name = "..."`: schema type name
/// - `default_mode = Content | Assign | Never`: mode members start from
/// - `style = Any | Compact | Normal`
/// - `plain_data`: private fields are serialized too
/// - `anonymous`: every member is a candidate and getter-only values stay
/// - `companion = Type`: take extra member tags from `Type` (repeatable)
///
/// # Field attributes
///
/// ```ignore
/// #[schema(name = "Mass", order = 0, alias = "weight", default = 1.0)]
/// pub mass: f32,
/// #[schema(nested)]
/// pub material: PhysicsMaterial,
/// #[schema(base)]
/// body: BodyBase,
/// ```
///
/// - `name`, `mode`, `order`, `mask`, `include`: explicit member tag
/// - `alias = "..."`: alternate name (repeatable)
/// - `default = expr` / `default_with = path`: default value
/// - `style = ...`, `ignore`, `readonly`, `delegate`, `kind = ShapeKind`
/// - `nested`: field is itself `Introspect`, populated in place
/// - `base`: field is the embedded base type
/// - `should_serialize = method` (`fn(&self) -> bool`)
/// - `should_serialize_with = method` (`fn(&self, Option<&MemberEntry>) -> bool`)
#[proc_macro_derive(Introspect, attributes(schema))]
pub fn derive_introspect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct TypeAttrs {
    name: Option<LitStr>,
    default_mode: Option<Ident>,
    style: Option<Ident>,
    category: Option<Ident>,
    companions: Vec<Type>,
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<LitStr>,
    mode: Option<Ident>,
    order: Option<Expr>,
    mask: Option<Expr>,
    include: bool,
    aliases: Vec<LitStr>,
    default: Option<Expr>,
    default_with: Option<Path>,
    style: Option<Ident>,
    kind: Option<Ident>,
    ignore: bool,
    readonly: bool,
    delegate: bool,
    nested: bool,
    base: bool,
    should_serialize: Option<Ident>,
    should_serialize_with: Option<Ident>,
}

impl FieldAttrs {
    fn has_member_tag(&self) -> bool {
        self.include
            || self.name.is_some()
            || self.mode.is_some()
            || self.order.is_some()
            || self.mask.is_some()
    }
}

fn parse_type_attrs(input: &DeriveInput) -> syn::Result<TypeAttrs> {
    let mut attrs = TypeAttrs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("schema")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                attrs.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("default_mode") {
                attrs.default_mode = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("style") {
                attrs.style = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("plain_data") {
                attrs.category = Some(format_ident!("PlainData"));
            } else if meta.path.is_ident("anonymous") {
                attrs.category = Some(format_ident!("Anonymous"));
            } else if meta.path.is_ident("companion") {
                attrs.companions.push(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unsupported type-level schema attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("schema")) {
        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("name") {
                attrs.name = Some(meta.value()?.parse()?);
            } else if path.is_ident("mode") {
                attrs.mode = Some(meta.value()?.parse()?);
            } else if path.is_ident("order") {
                attrs.order = Some(meta.value()?.parse()?);
            } else if path.is_ident("mask") {
                attrs.mask = Some(meta.value()?.parse()?);
            } else if path.is_ident("include") {
                attrs.include = true;
            } else if path.is_ident("alias") {
                attrs.aliases.push(meta.value()?.parse()?);
            } else if path.is_ident("default") {
                attrs.default = Some(meta.value()?.parse()?);
            } else if path.is_ident("default_with") {
                attrs.default_with = Some(meta.value()?.parse()?);
            } else if path.is_ident("style") {
                attrs.style = Some(meta.value()?.parse()?);
            } else if path.is_ident("kind") {
                attrs.kind = Some(meta.value()?.parse()?);
            } else if path.is_ident("ignore") {
                attrs.ignore = true;
            } else if path.is_ident("readonly") {
                attrs.readonly = true;
            } else if path.is_ident("delegate") {
                attrs.delegate = true;
            } else if path.is_ident("nested") {
                attrs.nested = true;
            } else if path.is_ident("base") {
                attrs.base = true;
            } else if path.is_ident("should_serialize") {
                attrs.should_serialize = Some(meta.value()?.parse()?);
            } else if path.is_ident("should_serialize_with") {
                attrs.should_serialize_with = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unsupported field-level schema attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let type_attrs = parse_type_attrs(input)?;

    let fields: Vec<(Member, &syn::Field)> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|f| f.ident.clone().map(|id| (Member::Named(id), f)))
                .collect(),
            Fields::Unnamed(fields) => fields
                .unnamed
                .iter()
                .enumerate()
                .map(|(i, f)| (Member::Unnamed(syn::Index::from(i)), f))
                .collect(),
            Fields::Unit => Vec::new(),
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Introspect can only be derived for structs",
            ));
        }
    };

    let mut type_calls = Vec::new();
    if let Some(type_name) = &type_attrs.name {
        type_calls.push(quote! { .name(#type_name) });
    }
    if let Some(category) = &type_attrs.category {
        type_calls.push(quote! { .category(redlilium_serialize::TypeCategory::#category) });
    }
    if let Some(mode) = &type_attrs.default_mode {
        type_calls.push(quote! {
            .tag(redlilium_serialize::Tag::DefaultMode(redlilium_serialize::MemberMode::#mode))
        });
    }
    if let Some(style) = &type_attrs.style {
        type_calls.push(quote! {
            .tag(redlilium_serialize::Tag::Style(redlilium_serialize::DataStyle::#style))
        });
    }
    for companion in &type_attrs.companions {
        type_calls.push(quote! {
            .companion(::std::sync::Arc::new(
                <#companion as redlilium_serialize::Introspect>::describe()
            ))
        });
    }

    let mut member_calls = Vec::new();
    let mut dependencies = Vec::new();
    let mut base_seen = false;

    for (member, field) in &fields {
        let attrs = parse_field_attrs(field)?;
        let ty = &field.ty;

        if attrs.base {
            if base_seen {
                return Err(syn::Error::new_spanned(field, "only one field can be `base`"));
            }
            base_seen = true;
            type_calls.push(quote! {
                .base::<#ty, _, _>(
                    ::std::sync::Arc::new(<#ty as redlilium_serialize::Introspect>::describe()),
                    |s: &Self| &s.#member,
                    |s: &mut Self| &mut s.#member,
                )
            });
            continue;
        }

        let member_name = match member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(index) => index.index.to_string(),
        };
        let is_public = matches!(field.vis, Visibility::Public(_));

        member_calls.push(field_info(member, &member_name, ty, is_public, &attrs));

        if let Some(method) = &attrs.should_serialize {
            member_calls.push(quote! {
                .should_serialize(#member_name, |s: &Self, _| s.#method())
            });
        } else if let Some(method) = &attrs.should_serialize_with {
            member_calls.push(quote! {
                .should_serialize(#member_name, |s: &Self, parent| s.#method(parent))
            });
        }

        if attrs.nested && !attrs.ignore {
            dependencies.push(quote! { registry.register::<#ty>(); });
        }
    }

    Ok(quote! {
        impl #impl_generics redlilium_serialize::Introspect for #name #ty_generics #where_clause {
            fn describe() -> redlilium_serialize::TypeDescription {
                redlilium_serialize::TypeDescription::builder::<Self>()
                    #(#type_calls)*
                    #(#member_calls)*
                    .build()
            }

            fn register_dependencies(registry: &redlilium_serialize::TypeRegistry) {
                let _ = registry;
                #(#dependencies)*
            }
        }
    })
}

/// `.field(FieldInfo::new(...)...)` for one struct field.
fn field_info(
    member: &Member,
    member_name: &str,
    ty: &Type,
    is_public: bool,
    attrs: &FieldAttrs,
) -> TokenStream2 {
    let kind = if attrs.delegate {
        format_ident!("Delegate")
    } else if attrs.nested {
        format_ident!("Class")
    } else if let Some(kind) = &attrs.kind {
        kind.clone()
    } else {
        format_ident!("{}", infer_shape_kind(ty))
    };
    let shape = quote! {
        redlilium_serialize::TypeShape::new(
            ::core::any::type_name::<#ty>(),
            redlilium_serialize::ShapeKind::#kind,
        )
    };

    // Callables have no value representation.
    let opaque = attrs.ignore || kind == "Delegate";
    let getter = if opaque {
        quote! { |_: &Self| ::core::result::Result::Ok(redlilium_serialize::Value::Null) }
    } else if attrs.nested {
        quote! {
            |s: &Self| ::core::result::Result::Ok(
                redlilium_serialize::Value::object(::core::clone::Clone::clone(&s.#member))
            )
        }
    } else {
        quote! { |s: &Self| redlilium_serialize::to_value(&s.#member) }
    };

    let mut calls = Vec::new();
    if !opaque && !attrs.readonly {
        if attrs.nested {
            calls.push(quote! {
                .setter(|s: &mut Self, v: redlilium_serialize::Value| {
                    match v.as_object().and_then(|i| i.downcast_ref::<#ty>()) {
                        ::core::option::Option::Some(inner) => {
                            s.#member = ::core::clone::Clone::clone(inner);
                            ::core::result::Result::Ok(())
                        }
                        ::core::option::Option::None => ::core::result::Result::Err(
                            redlilium_serialize::DeserializeError::TypeMismatch {
                                field: #member_name.into(),
                                expected: ::core::any::type_name::<#ty>().into(),
                                found: v.kind_name().into(),
                            },
                        ),
                    }
                })
            });
        } else {
            calls.push(quote! {
                .setter(|s: &mut Self, v: redlilium_serialize::Value| {
                    s.#member = redlilium_serialize::from_value(v)?;
                    ::core::result::Result::Ok(())
                })
            });
        }
    }
    if attrs.nested && !opaque {
        calls.push(quote! {
            .content(|s: &mut Self| &mut s.#member)
            .reset(|s: &mut Self| s.#member = ::core::default::Default::default())
        });
    }
    calls.push(quote! { .visibility(#is_public) });

    if attrs.ignore {
        calls.push(quote! { .tag(redlilium_serialize::Tag::Ignore) });
    }
    if attrs.has_member_tag() {
        let mut member_tag = quote! { redlilium_serialize::MemberTag::new() };
        if let Some(name) = &attrs.name {
            member_tag = quote! { #member_tag.with_name(#name) };
        }
        if let Some(mode) = &attrs.mode {
            member_tag = quote! { #member_tag.with_mode(redlilium_serialize::MemberMode::#mode) };
        }
        if let Some(order) = &attrs.order {
            member_tag = quote! { #member_tag.with_order(#order) };
        }
        if let Some(mask) = &attrs.mask {
            member_tag = quote! { #member_tag.with_mask(#mask) };
        }
        calls.push(quote! { .tag(redlilium_serialize::Tag::Member(#member_tag)) });
    }
    if let Some(style) = &attrs.style {
        calls.push(quote! {
            .tag(redlilium_serialize::Tag::Style(redlilium_serialize::DataStyle::#style))
        });
    }
    for alias in &attrs.aliases {
        calls.push(quote! {
            .tag(redlilium_serialize::Tag::Alias(::std::string::String::from(#alias)))
        });
    }
    let default_value = match (&attrs.default, &attrs.default_with) {
        (Some(expr), _) if attrs.nested => Some(quote! { redlilium_serialize::Value::object(#expr) }),
        (Some(expr), _) => Some(quote! { redlilium_serialize::Value::from(#expr) }),
        (None, Some(path)) if attrs.nested => {
            Some(quote! { redlilium_serialize::Value::object(#path()) })
        }
        (None, Some(path)) => Some(quote! { redlilium_serialize::Value::from(#path()) }),
        (None, None) => None,
    };
    if let Some(value) = default_value {
        calls.push(quote! { .tag(redlilium_serialize::Tag::DefaultValue(#value)) });
    }

    quote! {
        .field(
            redlilium_serialize::FieldInfo::new(#member_name, #shape, #getter)
                #(#calls)*
        )
    }
}

/// Infer the `ShapeKind` variant name from a type by matching the last path segment.
fn infer_shape_kind(ty: &Type) -> &'static str {
    match ty {
        Type::BareFn(_) => "Delegate",
        Type::TraitObject(object) => trait_object_kind(&object.bounds),
        Type::Reference(reference) => infer_shape_kind(&reference.elem),
        Type::Paren(paren) => infer_shape_kind(&paren.elem),
        Type::Group(group) => infer_shape_kind(&group.elem),
        Type::Array(_) | Type::Slice(_) => "Collection",
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => match segment.ident.to_string().as_str() {
                "bool" => "Bool",
                "char" => "Char",
                "i8" => "I8",
                "i16" => "I16",
                "i32" => "I32",
                "i64" | "isize" => "I64",
                "u8" => "U8",
                "u16" => "U16",
                "u32" => "U32",
                "u64" | "usize" => "U64",
                "f32" => "F32",
                "f64" => "F64",
                "String" | "str" => "String",
                "Vec" | "VecDeque" | "HashMap" | "BTreeMap" | "HashSet" | "BTreeSet" => {
                    "Collection"
                }
                "Option" => match first_type_argument(&segment.arguments) {
                    Some(inner) => infer_shape_kind(inner),
                    None => "Struct",
                },
                "Box" | "Arc" | "Rc" => match first_type_argument(&segment.arguments) {
                    Some(Type::TraitObject(object)) => trait_object_kind(&object.bounds),
                    _ => "Class",
                },
                _ => "Struct",
            },
            None => "Struct",
        },
        _ => "Struct",
    }
}

/// `dyn Fn*` is a delegate, any other trait object an interface.
fn trait_object_kind<P>(bounds: &syn::punctuated::Punctuated<TypeParamBound, P>) -> &'static str {
    let callable = bounds.iter().any(|bound| match bound {
        TypeParamBound::Trait(tr) => tr
            .path
            .segments
            .last()
            .is_some_and(|s| matches!(s.ident.to_string().as_str(), "Fn" | "FnMut" | "FnOnce")),
        _ => false,
    });
    if callable { "Delegate" } else { "Interface" }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}
