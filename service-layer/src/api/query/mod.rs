//! Query AST, translation and URI building
//!
//! Follows the same split as the rest of the API layer: plain data types
//! ([`Filter`], [`Projection`], [`OrderBy`], [`Query`]) and the components
//! that turn them into text ([`Translator`], [`QueryBuilder`]).

pub mod builder;
pub mod filters;
pub mod orderby;
pub mod query;
pub mod result;
pub mod select;
pub mod translator;

pub use builder::QueryBuilder;
pub use filters::{BinaryOperator, Filter, FilterValue, field, value};
pub use orderby::OrderBy;
pub use query::{ClauseValue, Query, QueryClause};
pub use result::QueryResponse;
pub use select::{Projection, ProjectionExpr};
pub use translator::Translator;
