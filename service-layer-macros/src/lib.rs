use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Data, DeriveInput, Fields, LitStr, Token, parse_macro_input};

/// Derive `service_layer::Entity` for a struct with named fields.
///
/// Struct attributes:
/// - `#[entity(resource = "Items")]` overrides the pluralized resource name
///
/// Field attributes:
/// - `#[entity(key)]` marks a key property; keys keep declaration order
/// - `#[entity(rename = "U_Color")]` sets the wire name
/// - `#[entity(skip)]` leaves the field out of the schema
///
/// Wire names otherwise follow `#[serde(rename = "..")]`, then the struct's
/// `#[serde(rename_all = "..")]`, then the PascalCase form of the field name.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct Property {
    wire_name: String,
    field: syn::Ident,
    is_key: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (resource, rename_all) = struct_options(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut properties = Vec::new();
    for field in fields {
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        if let Some(property) = field_property(field, field_ident, rename_all.as_deref())? {
            properties.push(property);
        }
    }

    let type_name = ident.to_string();
    let resource = match resource {
        Some(resource) => quote!(::core::option::Option::Some(#resource)),
        None => quote!(::core::option::Option::None),
    };

    let descriptors = properties.iter().map(|p| {
        let name = &p.wire_name;
        let field = unraw(&p.field);
        if p.is_key {
            quote!(::service_layer::PropertyDescriptor::key(#name, #field))
        } else {
            quote!(::service_layer::PropertyDescriptor::new(#name, #field))
        }
    });

    let key_values = properties.iter().filter(|p| p.is_key).map(|p| {
        let name = &p.wire_name;
        let field = &p.field;
        quote! {
            (#name, ::service_layer::FilterValue::from(::core::clone::Clone::clone(&self.#field)))
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::service_layer::Entity for #ident #ty_generics #where_clause {
            fn schema() -> &'static ::service_layer::EntitySchema {
                static SCHEMA: ::service_layer::EntitySchema = ::service_layer::EntitySchema {
                    name: #type_name,
                    resource: #resource,
                    properties: &[#(#descriptors),*],
                };
                &SCHEMA
            }

            fn key_values(&self) -> ::std::vec::Vec<(&'static str, ::service_layer::FilterValue)> {
                ::std::vec![#(#key_values),*]
            }
        }
    })
}

/// `#[entity(resource = "..")]` and serde's `rename_all` from the struct
fn struct_options(attrs: &[syn::Attribute]) -> syn::Result<(Option<String>, Option<String>)> {
    let mut resource = None;
    let mut rename_all = None;

    for attr in attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("resource") {
                    let value: LitStr = meta.value()?.parse()?;
                    resource = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity attribute, expected `resource`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    rename_all = Some(value.value());
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
    }

    Ok((resource, rename_all))
}

fn field_property(
    field: &syn::Field,
    ident: syn::Ident,
    rename_all: Option<&str>,
) -> syn::Result<Option<Property>> {
    let mut is_key = false;
    let mut skip = false;
    let mut entity_rename = None;
    let mut serde_rename = None;

    for attr in &field.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    is_key = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    entity_rename = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity attribute, expected `key`, `skip` or `rename`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    serde_rename = Some(value.value());
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
    }

    if skip {
        if is_key {
            return Err(syn::Error::new_spanned(
                &ident,
                "a skipped field cannot be a key",
            ));
        }
        return Ok(None);
    }

    let wire_name = entity_rename
        .or(serde_rename)
        .unwrap_or_else(|| apply_rename_all(&unraw(&ident), rename_all));

    Ok(Some(Property {
        wire_name,
        field: ident,
        is_key,
    }))
}

/// Consume a serde option this macro does not care about
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

fn apply_rename_all(field: &str, rule: Option<&str>) -> String {
    match rule {
        Some("camelCase") => {
            let pascal = pascal_case(field);
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => pascal,
            }
        }
        Some("snake_case") => field.to_string(),
        Some("lowercase") => field.to_lowercase(),
        Some("UPPERCASE") => field.to_uppercase(),
        Some("SCREAMING_SNAKE_CASE") => field.to_uppercase(),
        _ => pascal_case(field),
    }
}

fn pascal_case(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
