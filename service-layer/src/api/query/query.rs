//! Immutable query state
//!
//! A [`Query`] maps clause names to their expression. Every transition
//! returns a new value; the receiver is never modified, so one query can be
//! the base of any number of independent refinements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::filters::Filter;
use super::orderby::OrderBy;
use super::select::Projection;

/// Clause keys of the query map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QueryClause {
    Query,
    Select,
    OrderBy,
    Top,
    Skip,
}

impl QueryClause {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryClause::Query => "query",
            QueryClause::Select => "select",
            QueryClause::OrderBy => "orderby",
            QueryClause::Top => "top",
            QueryClause::Skip => "skip",
        }
    }
}

/// Expression stored under a clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseValue {
    Predicate(Filter),
    Projection(Projection),
    Ordering(OrderBy),
    Paging(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    clauses: BTreeMap<QueryClause, ClauseValue>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// New query with only the predicate set.
    ///
    /// Projection, ordering and paging from the receiver do not carry over.
    pub fn with_filter(&self, predicate: Filter) -> Self {
        let mut clauses = self.clauses.clone();
        for clause in [
            QueryClause::Select,
            QueryClause::OrderBy,
            QueryClause::Top,
            QueryClause::Skip,
        ] {
            clauses.remove(&clause);
        }
        clauses.insert(QueryClause::Query, ClauseValue::Predicate(predicate));
        Self { clauses }
    }

    pub fn with_select(&self, projection: Projection) -> Self {
        self.with(QueryClause::Select, ClauseValue::Projection(projection))
    }

    pub fn with_order_by(&self, order: OrderBy) -> Self {
        self.with(QueryClause::OrderBy, ClauseValue::Ordering(order))
    }

    pub fn with_top(&self, top: u32) -> Self {
        self.with(QueryClause::Top, ClauseValue::Paging(top))
    }

    pub fn with_skip(&self, skip: u32) -> Self {
        self.with(QueryClause::Skip, ClauseValue::Paging(skip))
    }

    fn with(&self, clause: QueryClause, value: ClauseValue) -> Self {
        let mut clauses = self.clauses.clone();
        clauses.insert(clause, value);
        Self { clauses }
    }

    pub fn get(&self, clause: QueryClause) -> Option<&ClauseValue> {
        self.clauses.get(&clause)
    }

    pub fn filter(&self) -> Option<&Filter> {
        match self.get(QueryClause::Query) {
            Some(ClauseValue::Predicate(filter)) => Some(filter),
            _ => None,
        }
    }

    pub fn select(&self) -> Option<&Projection> {
        match self.get(QueryClause::Select) {
            Some(ClauseValue::Projection(projection)) => Some(projection),
            _ => None,
        }
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        match self.get(QueryClause::OrderBy) {
            Some(ClauseValue::Ordering(order)) => Some(order),
            _ => None,
        }
    }

    pub fn top(&self) -> Option<u32> {
        self.paging(QueryClause::Top)
    }

    pub fn skip(&self) -> Option<u32> {
        self.paging(QueryClause::Skip)
    }

    fn paging(&self, clause: QueryClause) -> Option<u32> {
        match self.get(clause) {
            Some(ClauseValue::Paging(n)) => Some(*n),
            _ => None,
        }
    }

    /// Clause names currently set, in key order
    pub fn clause_names(&self) -> Vec<&'static str> {
        self.clauses.keys().map(QueryClause::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}
