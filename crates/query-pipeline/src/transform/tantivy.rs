//! Normalization of terms into the form the index stores.

use crate::query::{QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

/// Lowercases words, field names and field terms. A phrase of one token is
/// a word in disguise and is lowercased as one; longer phrases keep their
/// case and empty ones are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TantivyTransformer;

fn lowercase_term(node: &QueryNode) -> Option<QueryNode> {
    match node {
        QueryNode::Word(value) => Some(QueryNode::Word(value.to_lowercase())),
        QueryNode::Phrase(value) => {
            let mut tokens = value.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (None, _) => None,
                (Some(token), None) => Some(QueryNode::Word(token.to_lowercase())),
                _ => Some(node.clone()),
            }
        }
        other => Some(other.clone()),
    }
}

impl TreeTransformer for TantivyTransformer {
    type Matched = ();

    fn matches(&self, node: &QueryNode, _parents: &[Ancestor]) -> Option<()> {
        matches!(
            node,
            QueryNode::Word(_)
                | QueryNode::Phrase(_)
                | QueryNode::Field { .. }
                | QueryNode::Range { .. }
        )
        .then_some(())
    }

    fn transform(
        &self,
        node: &QueryNode,
        _context: &mut QueryContext,
        _parents: &[Ancestor],
        _matched: (),
    ) -> Action {
        let normalized = match node {
            QueryNode::Field { field, value } => match lowercase_term(value) {
                Some(value) => QueryNode::field(field.to_lowercase(), value),
                None => return Action::Remove,
            },
            QueryNode::Range {
                field,
                left,
                right,
                including_left,
                including_right,
            } => QueryNode::range(
                field.to_lowercase(),
                left.clone(),
                right.clone(),
                *including_left,
                *including_right,
            ),
            other => match lowercase_term(other) {
                Some(node) => node,
                None => return Action::Remove,
            },
        };

        if normalized == *node {
            Action::Keep
        } else {
            Action::Replace(normalized)
        }
    }
}
