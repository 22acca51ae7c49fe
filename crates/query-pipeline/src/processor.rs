//! The query processing pipeline: parse, transform, hand back.

use std::fmt;
use std::sync::Arc;

use crate::config::{FieldSchema, PipelineConfig};
use crate::dictionary::MorphologyDictionary;
use crate::error::Result;
use crate::query::{to_structured_query, QueryContext, QueryNode, QueryParser, StructuredQuery};
use crate::transform::Transformer;

/// An ordered transformer chain.
///
/// Immutable after construction and shareable across threads; every
/// [`process`](Self::process) call works on its own tree and context.
#[derive(Debug)]
pub struct QueryProcessor {
    transformers: Vec<Transformer>,
    field_schema: Arc<FieldSchema>,
}

impl QueryProcessor {
    pub fn new(transformers: Vec<Transformer>) -> Self {
        Self {
            transformers,
            field_schema: Arc::new(FieldSchema::default()),
        }
    }

    pub fn with_field_schema(mut self, field_schema: FieldSchema) -> Self {
        self.field_schema = Arc::new(field_schema);
        self
    }

    pub fn from_config(
        config: &PipelineConfig,
        dictionary: Arc<dyn MorphologyDictionary>,
    ) -> Result<Self> {
        let transformers = config
            .transformers
            .iter()
            .map(|entry| entry.build(&dictionary))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(transformers).with_field_schema(config.field_schema.clone()))
    }

    pub fn transformers(&self) -> &[Transformer] {
        &self.transformers
    }

    /// Parses `query` and runs it through every transformer in order.
    ///
    /// Never fails: malformed input degrades during parsing, and a query
    /// that ends up empty is reported through [`ProcessedQuery::is_empty`].
    pub fn process(&self, query: &str, language: &str) -> ProcessedQuery {
        let mut context = QueryContext::with_field_schema(language, Arc::clone(&self.field_schema));

        let parsed = QueryParser::parse(query);
        if parsed.is_empty_group() {
            log::debug!("query {query:?} is empty");
            return ProcessedQuery::new(None, context);
        }
        log::debug!("parsed query: {parsed}");
        if let Some(words) = parsed.plain_words() {
            context.record_original_words(words.into_iter().map(str::to_string).collect());
        }

        let mut tree = Some(parsed);
        for transformer in &self.transformers {
            let Some(node) = tree.take() else {
                break;
            };
            tree = transformer.apply(node, &mut context);
            match &tree {
                Some(node) => log::trace!("after {}: {node}", transformer.name()),
                None => log::trace!("after {}: <empty>", transformer.name()),
            }
        }

        let tree = tree.filter(|node| !node.is_empty_group());
        let processed = ProcessedQuery::new(tree, context);
        log::debug!("processed query: {processed}");
        processed
    }
}

/// Final tree of a [`QueryProcessor::process`] call and its context.
#[derive(Debug, Clone)]
pub struct ProcessedQuery {
    query: Option<QueryNode>,
    context: QueryContext,
}

impl ProcessedQuery {
    fn new(query: Option<QueryNode>, context: QueryContext) -> Self {
        Self { query, context }
    }

    pub fn query(&self) -> Option<&QueryNode> {
        self.query.as_ref()
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none()
    }

    /// Structured query for the search engine; empty queries match all.
    pub fn to_structured_query(&self) -> StructuredQuery {
        self.query
            .as_ref()
            .map(to_structured_query)
            .unwrap_or_else(StructuredQuery::all)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.to_structured_query().to_json()
    }

    pub fn into_parts(self) -> (Option<QueryNode>, QueryContext) {
        (self.query, self.context)
    }
}

impl fmt::Display for ProcessedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{query}"),
            None => Ok(()),
        }
    }
}
