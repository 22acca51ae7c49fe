//! Mutable per-call state threaded through every transformer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::FieldSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Ordering requested by an `order_by:` pragma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }

    /// `(field, direction)` pair as exposed to callers.
    pub fn as_pair(&self) -> (&str, &str) {
        (self.field.as_str(), self.direction.as_str())
    }
}

/// Processing context for one `process()` call.
///
/// Created fresh per call, passed by `&mut` through every transformer and
/// handed back to the caller inside the processed query.
#[derive(Debug, Clone)]
pub struct QueryContext {
    language: String,
    order_by: Option<OrderBy>,
    is_forced_clean: bool,
    dois: Vec<String>,
    original_words: Option<Vec<String>>,
    field_schema: Arc<FieldSchema>,
}

impl QueryContext {
    pub fn new(language: impl Into<String>) -> Self {
        Self::with_field_schema(language, Arc::new(FieldSchema::default()))
    }

    pub fn with_field_schema(language: impl Into<String>, field_schema: Arc<FieldSchema>) -> Self {
        Self {
            language: language.into(),
            order_by: None,
            is_forced_clean: false,
            dois: Vec::new(),
            original_words: None,
            field_schema,
        }
    }

    pub fn language(&self) -> &str {
        self.language.as_str()
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn set_order_by(&mut self, order_by: OrderBy) {
        self.order_by = Some(order_by);
    }

    /// Whether the tree is frozen against further optimization.
    pub fn is_forced_clean(&self) -> bool {
        self.is_forced_clean
    }

    pub fn force_clean(&mut self) {
        self.is_forced_clean = true;
    }

    /// DOIs recognized in the query, normalized.
    pub fn dois(&self) -> &[String] {
        self.dois.as_slice()
    }

    pub fn push_doi(&mut self, doi: String) {
        self.dois.push(doi);
    }

    /// Words of the query as parsed, when it was a plain multi-word query.
    /// Recorded before any transformer runs.
    pub fn original_words(&self) -> Option<&[String]> {
        self.original_words.as_deref()
    }

    pub fn record_original_words(&mut self, words: Vec<String>) {
        self.original_words = Some(words);
    }

    pub fn field_schema(&self) -> &FieldSchema {
        self.field_schema.as_ref()
    }
}
