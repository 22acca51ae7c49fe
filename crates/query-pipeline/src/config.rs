//! Serializable pipeline configuration.
//!
//! A pipeline is described as an ordered list of transformer entries plus a
//! field schema shared by field-aware transformers:
//!
//! ```json
//! {
//!   "transformers": [
//!     {"type": "order_by", "field_aliases": {"f1": "field1"}, "valid_fields": ["field1"]},
//!     {"type": "morphy", "enable_morph": true},
//!     {"type": "tantivy"},
//!     {"type": "optimizing"}
//!   ],
//!   "field_schema": {"aliases": {"author": "authors"}, "valid_fields": ["authors", "title"]}
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dictionary::MorphologyDictionary;
use crate::error::{QueryPipelineError, Result};
use crate::query::BoostScore;
use crate::transform::{
    DoiTransformer, ExactMatchTransformer, FieldTransformer, MorphyTransformer,
    OptimizingTransformer, OrderByTransformer, TantivyTransformer, Transformer,
    ValueWordTransformer, ValuesWordTransformer, WordAction,
};

/// Field names known to the index and the aliases users may type instead.
///
/// Alias keys are stored lowercased, so two aliases differing only in case
/// must agree on their target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldSchema")]
pub struct FieldSchema {
    aliases: HashMap<String, String>,
    valid_fields: HashSet<String>,
}

#[derive(Deserialize)]
struct RawFieldSchema {
    #[serde(default)]
    aliases: HashMap<String, String>,
    #[serde(default)]
    valid_fields: HashSet<String>,
}

impl TryFrom<RawFieldSchema> for FieldSchema {
    type Error = QueryPipelineError;

    fn try_from(raw: RawFieldSchema) -> Result<Self> {
        Self::new(raw.aliases, raw.valid_fields)
    }
}

impl FieldSchema {
    pub fn new<A, K, V, F, S>(aliases: A, valid_fields: F) -> Result<Self>
    where
        A: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized: HashMap<String, String> = HashMap::new();
        for (alias, field) in aliases {
            let alias = alias.into().to_lowercase();
            let field = field.into();
            if let Some(existing) = normalized.get(&alias).filter(|existing| **existing != field) {
                return Err(QueryPipelineError::InvalidConfig(format!(
                    "alias '{alias}' maps to both '{existing}' and '{field}'"
                )));
            }
            normalized.insert(alias, field);
        }

        Ok(Self {
            aliases: normalized,
            valid_fields: valid_fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Canonical name for `field`. Aliases match case-insensitively.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases
            .get(&field.to_lowercase())
            .map_or(field, String::as_str)
    }

    /// An empty schema accepts every field.
    pub fn is_valid(&self, field: &str) -> bool {
        self.valid_fields.is_empty() || self.valid_fields.contains(field)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub transformers: Vec<TransformerConfig>,
    #[serde(default)]
    pub field_schema: FieldSchema,
}

impl PipelineConfig {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// One entry of the transformer chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformerConfig {
    Morphy {
        #[serde(default)]
        enable_morph: bool,
        #[serde(default = "default_true")]
        enable_accent: bool,
    },
    Tantivy,
    Optimizing,
    OrderBy {
        #[serde(default)]
        field_aliases: HashMap<String, String>,
        #[serde(default)]
        valid_fields: HashSet<String>,
    },
    ExactMatch {
        field: String,
        #[serde(default)]
        score: Option<f64>,
    },
    Doi,
    Field,
    Values {
        words: Vec<ValueWordConfig>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueWordConfig {
    pub literal: String,
    pub action: WordAction,
}

fn default_true() -> bool {
    true
}

impl TransformerConfig {
    pub fn build(&self, dictionary: &Arc<dyn MorphologyDictionary>) -> Result<Transformer> {
        let transformer: Transformer = match self {
            Self::Morphy {
                enable_morph,
                enable_accent,
            } => MorphyTransformer::new(Arc::clone(dictionary), *enable_morph)
                .with_accent(*enable_accent)
                .into(),
            Self::Tantivy => TantivyTransformer.into(),
            Self::Optimizing => OptimizingTransformer.into(),
            Self::OrderBy {
                field_aliases,
                valid_fields,
            } => OrderByTransformer::new(field_aliases.clone(), valid_fields.clone()).into(),
            Self::ExactMatch { field, score } => {
                if field.trim().is_empty() {
                    return Err(QueryPipelineError::InvalidConfig(
                        "exact_match requires a field".to_string(),
                    ));
                }
                let mut transformer = ExactMatchTransformer::new(field.clone());
                if let Some(score) = score {
                    transformer = transformer.with_score(BoostScore::new(*score)?);
                }
                transformer.into()
            }
            Self::Doi => DoiTransformer.into(),
            Self::Field => FieldTransformer.into(),
            Self::Values { words } => {
                let words = words
                    .iter()
                    .map(|word| ValueWordTransformer::new(word.literal.clone(), word.action))
                    .collect::<Result<Vec<_>>>()?;
                ValuesWordTransformer::new(words)?.into()
            }
        };
        Ok(transformer)
    }
}
