//! Exact-phrase boosting for plain multi-word queries.

use crate::query::{BoostScore, GroupEntry, QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

/// Appends a boosted phrase over `field` to queries that were typed as two
/// or more plain words, so documents containing the words verbatim rank
/// first.
///
/// The phrase is built from [`QueryContext::original_words`], so earlier
/// transformers may reshape the tree without hiding the query's structure.
#[derive(Debug, Clone)]
pub struct ExactMatchTransformer {
    field: String,
    score: BoostScore,
}

impl ExactMatchTransformer {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            score: BoostScore::ONE,
        }
    }

    pub fn with_score(mut self, score: BoostScore) -> Self {
        self.score = score;
        self
    }
}

impl TreeTransformer for ExactMatchTransformer {
    type Matched = ();

    fn matches(&self, _node: &QueryNode, parents: &[Ancestor]) -> Option<()> {
        parents.is_empty().then_some(())
    }

    fn transform(
        &self,
        node: &QueryNode,
        context: &mut QueryContext,
        _parents: &[Ancestor],
        _matched: (),
    ) -> Action {
        let Some(words) = context.original_words() else {
            return Action::Keep;
        };
        let phrase = GroupEntry::should(QueryNode::boost(
            QueryNode::field(self.field.clone(), QueryNode::Phrase(words.join(" "))),
            self.score,
        ));

        let mut entries = match node {
            QueryNode::Group(entries) => entries.clone(),
            other => vec![GroupEntry::should(other.clone())],
        };
        entries.push(phrase);
        Action::Replace(QueryNode::Group(entries))
    }

    fn descends(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParser;
    use crate::transform::engine::apply;

    fn context_for(tree: &QueryNode) -> QueryContext {
        let mut context = QueryContext::new("en");
        if let Some(words) = tree.plain_words() {
            context.record_original_words(words.into_iter().map(str::to_string).collect());
        }
        context
    }

    fn run(transformer: &ExactMatchTransformer, input: &str) -> Option<QueryNode> {
        let tree = QueryParser::parse(input);
        let mut context = context_for(&tree);
        apply(transformer, tree, &mut context)
    }

    #[test]
    fn appends_boosted_title_phrase() {
        let result = run(&ExactMatchTransformer::new("title"), "search engine");

        assert_eq!(
            result,
            Some(QueryNode::should_group([
                QueryNode::word("search"),
                QueryNode::word("engine"),
                QueryNode::boost(
                    QueryNode::field("title", QueryNode::phrase("search engine")),
                    BoostScore::ONE,
                ),
            ]))
        );
    }

    #[test]
    fn custom_score() {
        let transformer =
            ExactMatchTransformer::new("title").with_score(BoostScore::new(2.5).unwrap());

        let Some(QueryNode::Group(entries)) = run(&transformer, "a b c") else {
            panic!("expected a group");
        };
        assert_eq!(
            entries.last(),
            Some(&GroupEntry::should(QueryNode::boost(
                QueryNode::field("title", QueryNode::phrase("a b c")),
                BoostScore::new(2.5).unwrap(),
            )))
        );
    }

    #[test]
    fn phrase_uses_words_recorded_before_rewriting() {
        let mut context = context_for(&QueryParser::parse("Search engine"));
        let rewritten = QueryNode::group(vec![
            GroupEntry::should(QueryNode::word("search")),
            GroupEntry::should(QueryNode::boost(
                QueryNode::word("searches"),
                BoostScore::MORPHOLOGY_VARIANT,
            )),
            GroupEntry::should(QueryNode::word("engine")),
        ]);

        let Some(QueryNode::Group(entries)) =
            apply(&ExactMatchTransformer::new("title"), rewritten, &mut context)
        else {
            panic!("expected a group");
        };
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries.last(),
            Some(&GroupEntry::should(QueryNode::boost(
                QueryNode::field("title", QueryNode::phrase("Search engine")),
                BoostScore::ONE,
            )))
        );
    }

    #[test]
    fn single_node_root_is_wrapped() {
        let mut context = context_for(&QueryParser::parse("search engine"));

        assert_eq!(
            apply(&ExactMatchTransformer::new("title"), QueryNode::word("search"), &mut context),
            Some(QueryNode::should_group([
                QueryNode::word("search"),
                QueryNode::boost(
                    QueryNode::field("title", QueryNode::phrase("search engine")),
                    BoostScore::ONE,
                ),
            ]))
        );
    }

    #[test]
    fn skips_single_words_and_mixed_queries() {
        let transformer = ExactMatchTransformer::new("title");

        for input in ["search", "search +engine", "author:smith engine", "\"a b\" c", ""] {
            assert_eq!(
                run(&transformer, input),
                Some(QueryParser::parse(input)),
                "input: {input}"
            );
        }
    }
}
