//! Tree transformers.
//!
//! Each transformer pairs a node predicate with a rewrite and is applied to
//! the whole tree by [`apply`]. The closed [`Transformer`] catalog is what
//! pipelines are assembled from.

mod catalog;
mod doi;
mod engine;
mod exact_match;
mod field;
mod morphy;
mod optimizing;
mod order_by;
mod tantivy;
mod values;

pub use catalog::Transformer;
pub use doi::DoiTransformer;
pub use engine::{apply, Action, Ancestor, TreeTransformer};
pub use exact_match::ExactMatchTransformer;
pub use field::FieldTransformer;
pub use morphy::MorphyTransformer;
pub use optimizing::OptimizingTransformer;
pub use order_by::OrderByTransformer;
pub use tantivy::TantivyTransformer;
pub use values::{UpdateContext, ValueWordTransformer, ValuesWordTransformer, WordAction, WordReaction};
