//! Typed envelopes for query responses

use serde::{Deserialize, Serialize};

/// The `{ "value": [...] }` collection envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> QueryResponse<T> {
    pub fn new(value: Vec<T>) -> Self {
        Self { value }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// First row, `None` on an empty result
    pub fn into_first(self) -> Option<T> {
        self.value.into_iter().next()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.value
    }
}

impl<T> IntoIterator for QueryResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.value.into_iter()
    }
}
