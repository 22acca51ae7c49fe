//! Rendering of the final AST into the search engine's structured query.
//!
//! The mapping is purely structural:
//! - `Group` -> `{"bool": {"subqueries": [{"occur", "query"}, ...]}}`
//! - `Word` / `Raw` -> `{"match": {"value"}}`
//! - unqualified `Phrase` -> `{"match": {"value": "\"...\""}}`
//! - `Field` over a term -> `{"term": {"field", "value"}}`
//! - `Field` over a phrase -> `{"phrase": {"field", "value"}}`
//! - `Field` over a regex -> `{"regex": {"field", "value"}}`
//! - `Range` -> `{"range": {"field", "value": {...}}}`
//! - `Boost` -> `{"boost": {"query", "score": "0.85000"}}`

use serde::Serialize;

use super::node::{Occur, QueryNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredQuery {
    Bool(BooleanQuery),
    Match(MatchQuery),
    Term(FieldValueQuery),
    Phrase(FieldValueQuery),
    Regex(FieldValueQuery),
    Range(RangeQuery),
    Boost(Box<BoostQuery>),
    /// Matches every document; emitted for empty queries.
    All(AllQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanQuery {
    pub subqueries: Vec<SubQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubQuery {
    pub occur: Occur,
    pub query: StructuredQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchQuery {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueQuery {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeQuery {
    pub field: String,
    pub value: RangeBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBounds {
    pub left: String,
    pub right: String,
    pub including_left: bool,
    pub including_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoostQuery {
    pub query: StructuredQuery,
    pub score: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllQuery {}

impl StructuredQuery {
    pub fn all() -> Self {
        Self::All(AllQuery {})
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Renders `node` into the wire query document.
pub fn to_structured_query(node: &QueryNode) -> StructuredQuery {
    match node {
        QueryNode::Group(entries) => StructuredQuery::Bool(BooleanQuery {
            subqueries: entries
                .iter()
                .map(|entry| SubQuery {
                    occur: entry.occur,
                    query: to_structured_query(&entry.node),
                })
                .collect(),
        }),
        QueryNode::Word(value) | QueryNode::Raw(value) => StructuredQuery::Match(MatchQuery {
            value: value.clone(),
        }),
        QueryNode::Phrase(_) | QueryNode::Regex(_) => StructuredQuery::Match(MatchQuery {
            value: node.to_string(),
        }),
        QueryNode::Field { field, value } => field_query(field, value),
        QueryNode::Range {
            field,
            left,
            right,
            including_left,
            including_right,
        } => StructuredQuery::Range(RangeQuery {
            field: field.clone(),
            value: RangeBounds {
                left: left.clone(),
                right: right.clone(),
                including_left: *including_left,
                including_right: *including_right,
            },
        }),
        QueryNode::Boost { query, score } => StructuredQuery::Boost(Box::new(BoostQuery {
            query: to_structured_query(query),
            score: score.to_fixed(),
        })),
    }
}

fn field_query(field: &str, value: &QueryNode) -> StructuredQuery {
    match value {
        QueryNode::Phrase(phrase) => StructuredQuery::Phrase(FieldValueQuery {
            field: field.to_string(),
            value: phrase.clone(),
        }),
        QueryNode::Regex(pattern) => StructuredQuery::Regex(FieldValueQuery {
            field: field.to_string(),
            value: pattern.clone(),
        }),
        QueryNode::Word(term) | QueryNode::Raw(term) => StructuredQuery::Term(FieldValueQuery {
            field: field.to_string(),
            value: term.clone(),
        }),
        // Ranges and groups carry their own scope.
        other => to_structured_query(other),
    }
}
