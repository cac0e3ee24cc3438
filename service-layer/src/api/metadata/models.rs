//! Entity schema descriptors
//!
//! Each entity type carries a static [`EntitySchema`] listing its wire
//! property names in declaration order and which of them are keys. The
//! schema is normally generated by `#[derive(Entity)]`.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::pluralization::pluralize_entity_name;
use crate::api::query::FilterValue;
use crate::error::{Error, Result};

/// One declared property of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Name on the wire (e.g. "ItemCode")
    pub name: &'static str,
    /// Rust field the property is read from
    pub field: &'static str,
    pub is_key: bool,
}

impl PropertyDescriptor {
    pub const fn new(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            field,
            is_key: false,
        }
    }

    pub const fn key(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            field,
            is_key: true,
        }
    }
}

/// Static shape of an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Type name (e.g. "BusinessPartner")
    pub name: &'static str,
    /// Explicit resource name; derived from `name` when absent
    pub resource: Option<&'static str>,
    pub properties: &'static [PropertyDescriptor],
}

impl EntitySchema {
    /// Resource path segment, e.g. "Items" for `Item`
    pub fn resource_name(&self) -> String {
        match self.resource {
            Some(resource) => resource.to_string(),
            None => pluralize_entity_name(self.name),
        }
    }

    /// Key properties in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_key)
    }

    pub fn has_keys(&self) -> bool {
        self.keys().next().is_some()
    }

    /// Property names exactly as serde reads and writes them
    pub fn wire_names(&self) -> Vec<&'static str> {
        self.properties.iter().map(|p| p.name).collect()
    }

    /// All property names with their first letter capitalized
    pub fn property_names(&self) -> Vec<String> {
        self.properties.iter().map(|p| capitalize(p.name)).collect()
    }

    /// Match a member name against the schema, ignoring case.
    ///
    /// Returns the capitalized property name when the schema has it.
    pub fn resolve(&self, member: &str) -> Option<String> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(member))
            .map(|p| capitalize(p.name))
    }
}

/// A record type exposed by a Service Layer resource
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;

    /// Wire name and current value of each key property, in declaration order
    fn key_values(&self) -> Vec<(&'static str, FilterValue)>;

    fn resource_name() -> String {
        Self::schema().resource_name()
    }
}

/// Upper-case the first character, leaving the rest untouched
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parenthesized key predicate addressing one entity, e.g.
/// `(CardCode='C001')` or `(DocEntry=12,LineNum=0)`
///
/// String values are percent-encoded so the predicate is safe as a path
/// segment.
pub fn key_predicate<T: Entity>(entity: &T) -> Result<String> {
    let schema = T::schema();
    let values = entity.key_values();
    if !schema.has_keys() || values.is_empty() {
        return Err(Error::schema(format!(
            "{} does not declare a key property",
            schema.name
        )));
    }

    let mut parts = Vec::with_capacity(values.len());
    for (name, value) in values {
        if value.is_null() {
            return Err(Error::value(format!(
                "key property {}.{} is null",
                schema.name, name
            )));
        }
        parts.push(format!("{}={}", capitalize(name), value.to_uri_literal()));
    }

    Ok(format!("({})", parts.join(",")))
}
