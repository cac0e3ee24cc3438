//! Entity metadata: schema descriptors and key predicates

pub mod models;

pub use models::{Entity, EntitySchema, PropertyDescriptor, capitalize, key_predicate};
