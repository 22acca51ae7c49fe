//! Reactions to specific literal words in the query.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryPipelineError, Result};
use crate::query::{QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

/// What to do with a word once its literal was recognized.
pub trait WordReaction: Send + Sync {
    fn react(&self, node: &QueryNode, context: &mut QueryContext, parents: &[Ancestor]) -> Action;
}

/// Built-in reactions available from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordAction {
    /// Freeze the tree against optimization and drop the word.
    ForceClean,
    Drop,
}

impl WordReaction for WordAction {
    fn react(&self, _node: &QueryNode, context: &mut QueryContext, _parents: &[Ancestor]) -> Action {
        if *self == Self::ForceClean {
            context.force_clean();
        }
        Action::Remove
    }
}

/// Runs a context update and keeps the word in the query.
pub struct UpdateContext<F>(pub F);

impl<F> WordReaction for UpdateContext<F>
where
    F: Fn(&mut QueryContext) + Send + Sync,
{
    fn react(&self, _node: &QueryNode, context: &mut QueryContext, _parents: &[Ancestor]) -> Action {
        (self.0)(context);
        Action::Keep
    }
}

/// A literal bound to its reaction.
pub struct ValueWordTransformer {
    literal: String,
    reaction: Box<dyn WordReaction>,
}

impl ValueWordTransformer {
    pub fn new(literal: impl Into<String>, reaction: impl WordReaction + 'static) -> Result<Self> {
        let literal = literal.into();
        if literal.is_empty() {
            return Err(QueryPipelineError::EmptyLiteral);
        }
        Ok(Self {
            literal,
            reaction: Box::new(reaction),
        })
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl fmt::Debug for ValueWordTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueWordTransformer")
            .field("literal", &self.literal)
            .finish_non_exhaustive()
    }
}

/// Dispatches bare words to the reaction registered for their literal.
///
/// Literals are compared exactly; the first registered match wins.
#[derive(Debug)]
pub struct ValuesWordTransformer {
    words: Vec<ValueWordTransformer>,
}

impl ValuesWordTransformer {
    pub fn new(words: Vec<ValueWordTransformer>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(words.len());
        for word in &words {
            if !seen.insert(word.literal.as_str()) {
                return Err(QueryPipelineError::DuplicateLiteral(word.literal.clone()));
            }
        }
        Ok(Self { words })
    }
}

impl TreeTransformer for ValuesWordTransformer {
    type Matched = usize;

    fn matches(&self, node: &QueryNode, _parents: &[Ancestor]) -> Option<usize> {
        let value = node.as_word()?;
        self.words.iter().position(|word| word.literal == value)
    }

    fn transform(
        &self,
        node: &QueryNode,
        context: &mut QueryContext,
        parents: &[Ancestor],
        matched: usize,
    ) -> Action {
        match self.words.get(matched) {
            Some(word) => word.reaction.react(node, context, parents),
            None => Action::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParser;
    use crate::transform::engine::apply;

    struct Mark;

    impl WordReaction for Mark {
        fn react(
            &self,
            _node: &QueryNode,
            context: &mut QueryContext,
            _parents: &[Ancestor],
        ) -> Action {
            context.force_clean();
            Action::Remove
        }
    }

    #[test]
    fn mark_word_sets_flag_and_disappears() {
        let transformer =
            ValuesWordTransformer::new(vec![ValueWordTransformer::new("mark", Mark).unwrap()])
                .unwrap();
        let mut context = QueryContext::new("en");

        let result = apply(
            &transformer,
            QueryParser::parse("term1 term2 mark"),
            &mut context,
        );

        assert!(context.is_forced_clean());
        assert_eq!(
            result,
            Some(QueryNode::should_group([
                QueryNode::word("term1"),
                QueryNode::word("term2")
            ]))
        );
    }

    #[test]
    fn literal_match_is_exact() {
        let transformer = ValuesWordTransformer::new(vec![
            ValueWordTransformer::new("mark", WordAction::Drop).unwrap()
        ])
        .unwrap();
        let mut context = QueryContext::new("en");

        let tree = QueryParser::parse("Mark marks title:mark");
        let result = apply(&transformer, tree.clone(), &mut context);

        assert_eq!(result, Some(tree));
    }

    #[test]
    fn context_update_keeps_word() {
        let transformer = ValuesWordTransformer::new(vec![ValueWordTransformer::new(
            "fresh",
            UpdateContext(|context: &mut QueryContext| context.force_clean()),
        )
        .unwrap()])
        .unwrap();
        let mut context = QueryContext::new("en");

        let result = apply(&transformer, QueryNode::word("fresh"), &mut context);

        assert!(context.is_forced_clean());
        assert_eq!(result, Some(QueryNode::word("fresh")));
    }

    #[test]
    fn rejects_duplicate_and_empty_literals() {
        let duplicate = ValuesWordTransformer::new(vec![
            ValueWordTransformer::new("mark", WordAction::Drop).unwrap(),
            ValueWordTransformer::new("mark", WordAction::ForceClean).unwrap(),
        ]);
        assert!(matches!(
            duplicate,
            Err(QueryPipelineError::DuplicateLiteral(literal)) if literal == "mark"
        ));
        assert!(matches!(
            ValueWordTransformer::new("", WordAction::Drop),
            Err(QueryPipelineError::EmptyLiteral)
        ));
    }
}
