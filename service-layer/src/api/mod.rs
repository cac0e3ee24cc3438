//! Service Layer API module
//!
//! Session management, typed resource sets and the query pipeline that turns
//! predicate and projection trees into request URIs.

pub mod client;
pub mod constants;
pub mod context;
pub mod json;
pub mod metadata;
pub mod models;
pub mod pluralization;
pub mod query;
pub mod session;
pub mod set;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::SessionManager;
pub use context::ServiceLayerContext;
pub use metadata::{Entity, EntitySchema, PropertyDescriptor};
pub use query::{
    BinaryOperator, Filter, FilterValue, OrderBy, Projection, ProjectionExpr, Query, QueryBuilder,
    field, value,
};
pub use session::{Session, SessionState};
pub use set::ResourceSet;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
