//! Search query processing library.
//!
//! This crate turns raw user query text into a structured query document:
//! - Tolerant parsing into a query AST
//! - Ordered tree transformers sharing a per-call context
//! - Serialization into the search engine's JSON query format

pub mod config;
pub mod dictionary;
pub mod error;
pub mod processor;
pub mod query;
pub mod transform;

// Re-export main types
pub use config::{FieldSchema, PipelineConfig, TransformerConfig, ValueWordConfig};
pub use dictionary::{MorphologyDictionary, StaticDictionary};
pub use error::{QueryPipelineError, Result};
pub use processor::{ProcessedQuery, QueryProcessor};
pub use query::{
    to_structured_query, BoostScore, GroupEntry, Occur, OrderBy, OrderDirection, QueryContext,
    QueryNode, QueryParser, StructuredQuery,
};
pub use transform::{Transformer, TreeTransformer};
