//! Query representation for the pipeline.
//!
//! This module provides:
//! - The AST shared by every stage (terms, phrases, fields, ranges, boosts, groups)
//! - Query parsing and tokenization
//! - The per-call processing context
//! - Serialization into the engine's structured query document

mod context;
mod node;
mod parser;
mod serializer;

pub use context::{OrderBy, OrderDirection, QueryContext};
pub use node::{BoostScore, GroupEntry, NodeKind, Occur, QueryNode};
pub use parser::QueryParser;
pub use serializer::{
    to_structured_query, AllQuery, BooleanQuery, BoostQuery, FieldValueQuery, MatchQuery,
    RangeBounds, RangeQuery, StructuredQuery, SubQuery,
};
