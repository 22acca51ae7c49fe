use crate::query::{QueryContext, QueryNode};

use super::doi::DoiTransformer;
use super::engine::apply;
use super::exact_match::ExactMatchTransformer;
use super::field::FieldTransformer;
use super::morphy::MorphyTransformer;
use super::optimizing::OptimizingTransformer;
use super::order_by::OrderByTransformer;
use super::tantivy::TantivyTransformer;
use super::values::ValuesWordTransformer;

/// Every transformer a pipeline can be assembled from.
#[derive(Debug)]
pub enum Transformer {
    Morphy(MorphyTransformer),
    Tantivy(TantivyTransformer),
    Optimizing(OptimizingTransformer),
    OrderBy(OrderByTransformer),
    ExactMatch(ExactMatchTransformer),
    Doi(DoiTransformer),
    Field(FieldTransformer),
    Values(ValuesWordTransformer),
}

impl Transformer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Morphy(_) => "morphy",
            Self::Tantivy(_) => "tantivy",
            Self::Optimizing(_) => "optimizing",
            Self::OrderBy(_) => "order_by",
            Self::ExactMatch(_) => "exact_match",
            Self::Doi(_) => "doi",
            Self::Field(_) => "field",
            Self::Values(_) => "values",
        }
    }

    /// Runs this transformer over the whole tree.
    pub fn apply(&self, root: QueryNode, context: &mut QueryContext) -> Option<QueryNode> {
        match self {
            Self::Morphy(transformer) => apply(transformer, root, context),
            Self::Tantivy(transformer) => apply(transformer, root, context),
            Self::Optimizing(transformer) => apply(transformer, root, context),
            Self::OrderBy(transformer) => apply(transformer, root, context),
            Self::ExactMatch(transformer) => apply(transformer, root, context),
            Self::Doi(transformer) => apply(transformer, root, context),
            Self::Field(transformer) => apply(transformer, root, context),
            Self::Values(transformer) => apply(transformer, root, context),
        }
    }
}

impl From<MorphyTransformer> for Transformer {
    fn from(transformer: MorphyTransformer) -> Self {
        Self::Morphy(transformer)
    }
}

impl From<TantivyTransformer> for Transformer {
    fn from(transformer: TantivyTransformer) -> Self {
        Self::Tantivy(transformer)
    }
}

impl From<OptimizingTransformer> for Transformer {
    fn from(transformer: OptimizingTransformer) -> Self {
        Self::Optimizing(transformer)
    }
}

impl From<OrderByTransformer> for Transformer {
    fn from(transformer: OrderByTransformer) -> Self {
        Self::OrderBy(transformer)
    }
}

impl From<ExactMatchTransformer> for Transformer {
    fn from(transformer: ExactMatchTransformer) -> Self {
        Self::ExactMatch(transformer)
    }
}

impl From<DoiTransformer> for Transformer {
    fn from(transformer: DoiTransformer) -> Self {
        Self::Doi(transformer)
    }
}

impl From<FieldTransformer> for Transformer {
    fn from(transformer: FieldTransformer) -> Self {
        Self::Field(transformer)
    }
}

impl From<ValuesWordTransformer> for Transformer {
    fn from(transformer: ValuesWordTransformer) -> Self {
        Self::Values(transformer)
    }
}
