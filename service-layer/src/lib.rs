//! Typed client for the SAP Business One Service Layer
//!
//! A [`ServiceLayerContext`] owns one authenticated session and hands out
//! [`ResourceSet`]s, one per entity type. Sets compose filters, projections,
//! ordering and paging into OData query text, and the session manager logs
//! in transparently whenever the session is missing or has expired.
//!
//! ```ignore
//! use service_layer::{ContextOptions, Entity, ServiceLayerContext, field};
//!
//! #[derive(Debug, serde::Serialize, serde::Deserialize, Entity)]
//! #[serde(rename_all = "PascalCase")]
//! struct Item {
//!     #[entity(key)]
//!     item_code: String,
//!     item_name: Option<String>,
//! }
//!
//! let context = ServiceLayerContext::new(options)?;
//! let kits = context
//!     .set::<Item>()
//!     .filter(field("ItemCode").starts_with("KIT"))
//!     .top(20)
//!     .to_list(&cancel)
//!     .await?;
//! ```

extern crate self as service_layer;

pub mod api;
pub mod config;
pub mod error;

pub use api::{
    BinaryOperator, Entity, EntitySchema, Filter, FilterValue, HttpRequest, HttpResponse,
    HttpTransport, OrderBy, Projection, ProjectionExpr, PropertyDescriptor, Query, ResourceSet,
    ServiceLayerContext, Session, SessionManager, SessionState, field, value,
};
pub use config::ContextOptions;
pub use error::{Error, Result};
pub use service_layer_macros::Entity;
pub use tokio_util::sync::CancellationToken;
