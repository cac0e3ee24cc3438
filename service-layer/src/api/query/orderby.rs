//! `$orderby` key selectors
//!
//! Ordering is ascending only; every field is rendered with ` asc`.

use serde::{Deserialize, Serialize};

use crate::api::metadata::capitalize;

/// Fields to sort by, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    fields: Vec<String>,
}

impl OrderBy {
    /// Sort by a single member
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            fields: vec![name.into()],
        }
    }

    /// Sort by a tuple of members
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the clause value, `None` when there is nothing to sort by
    pub fn to_clause(&self) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }

        let names: Vec<String> = self.fields.iter().map(|f| capitalize(f)).collect();
        Some(format!("{} asc", names.join(" asc,")))
    }
}

impl From<&str> for OrderBy {
    fn from(name: &str) -> Self {
        OrderBy::field(name)
    }
}

impl From<String> for OrderBy {
    fn from(name: String) -> Self {
        OrderBy::field(name)
    }
}

impl<const N: usize> From<[&str; N]> for OrderBy {
    fn from(names: [&str; N]) -> Self {
        OrderBy::fields(names)
    }
}
