//! Resource URI assembly
//!
//! Each clause of a [`Query`] is computed independently; clauses that come
//! out empty are dropped and the rest are joined with `&`. Literal values
//! arrive percent-encoded from the translator, so `&`, `#` and `%` inside a
//! value never split the query string.

use super::query::Query;
use super::translator::Translator;
use crate::api::metadata::EntitySchema;
use crate::error::Result;

/// Builds request URIs for one entity schema
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    schema: &'a EntitySchema,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self { schema }
    }

    /// `resource?clause&clause...`, or just `resource` when no clause applies
    pub fn build_uri(&self, resource: &str, query: &Query) -> Result<String> {
        let query_string = self.query_string(query)?;
        if query_string.is_empty() {
            Ok(resource.to_string())
        } else {
            Ok(format!("{}?{}", resource, query_string))
        }
    }

    /// URI of the `$count` endpoint; only the predicate applies
    pub fn build_count_uri(&self, resource: &str, query: &Query) -> Result<String> {
        let count_resource = format!("{}{}", resource, crate::api::constants::COUNT_SUFFIX);
        match self.filter_clause(query)? {
            Some(filter) => Ok(format!("{}?{}", count_resource, filter)),
            None => Ok(count_resource),
        }
    }

    /// All non-empty clauses joined with `&`
    pub fn query_string(&self, query: &Query) -> Result<String> {
        let clauses = [
            self.filter_clause(query)?,
            self.select_clause(query),
            self.order_by_clause(query),
            query.top().map(|n| format!("$top={}", n)),
            query.skip().map(|n| format!("$skip={}", n)),
        ];

        Ok(clauses.into_iter().flatten().collect::<Vec<_>>().join("&"))
    }

    fn filter_clause(&self, query: &Query) -> Result<Option<String>> {
        let Some(predicate) = query.filter() else {
            return Ok(None);
        };
        let text = Translator::translate(predicate)?;
        Ok((!text.is_empty()).then(|| format!("$filter={}", text)))
    }

    fn select_clause(&self, query: &Query) -> Option<String> {
        let fields = match query.select() {
            Some(projection) => projection.select_fields(self.schema),
            None => self.schema.property_names(),
        };
        (!fields.is_empty()).then(|| format!("$select={}", fields.join(",")))
    }

    fn order_by_clause(&self, query: &Query) -> Option<String> {
        query
            .order_by()
            .and_then(|order| order.to_clause())
            .map(|clause| format!("$orderby={}", clause))
    }
}
