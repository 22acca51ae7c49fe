//! Structural simplification of query groups.

use crate::query::{GroupEntry, Occur, QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

/// Flattens and prunes groups:
/// - `should` subgroups are spliced into their parent
/// - `must` subgroups made only of `must` entries are spliced
/// - empty groups and boosts over nothing are removed
/// - single-entry groups collapse into their entry where the roles allow it
///
/// Skipped entirely once the context is forced clean. Applying it twice
/// yields the same tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizingTransformer;

impl TreeTransformer for OptimizingTransformer {
    type Matched = ();

    fn matches(&self, node: &QueryNode, _parents: &[Ancestor]) -> Option<()> {
        matches!(node, QueryNode::Group(_)).then_some(())
    }

    fn transform(
        &self,
        node: &QueryNode,
        context: &mut QueryContext,
        _parents: &[Ancestor],
        _matched: (),
    ) -> Action {
        if context.is_forced_clean() {
            return Action::Keep;
        }
        let QueryNode::Group(entries) = node else {
            return Action::Keep;
        };

        // A lone required or excluded entry keeps its group.
        match optimize_group(entries.clone()) {
            Some(optimized) => Action::Replace(optimized),
            None => Action::Remove,
        }
    }
}

/// Optimizes one subtree; `None` when nothing of it is left.
fn optimize_node(node: QueryNode) -> Option<QueryNode> {
    match node {
        QueryNode::Group(entries) => optimize_group(entries),
        QueryNode::Boost { query, score } => {
            optimize_node(*query).map(|query| QueryNode::boost(query, score))
        }
        other => Some(other),
    }
}

fn optimize_group(entries: Vec<GroupEntry>) -> Option<QueryNode> {
    let mut flattened = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(node) = optimize_node(entry.node) else {
            continue;
        };
        match node {
            QueryNode::Group(nested) if can_splice(entry.occur, &nested) => {
                flattened.extend(nested);
            }
            QueryNode::Group(mut nested) if nested.len() == 1 => {
                let inner = nested.remove(0);
                match entry.occur.combine(inner.occur) {
                    Some(occur) => flattened.push(GroupEntry::new(occur, inner.node)),
                    None => flattened.push(GroupEntry::new(
                        entry.occur,
                        QueryNode::Group(vec![inner]),
                    )),
                }
            }
            node => flattened.push(GroupEntry::new(entry.occur, node)),
        }
    }

    match flattened.len() {
        0 => None,
        1 if flattened[0].occur == Occur::Should => Some(flattened.remove(0).node),
        _ => Some(QueryNode::Group(flattened)),
    }
}

fn can_splice(occur: Occur, nested: &[GroupEntry]) -> bool {
    match occur {
        Occur::Should => true,
        Occur::Must => nested.iter().all(|entry| entry.occur == Occur::Must),
        Occur::MustNot => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BoostScore, QueryParser};
    use crate::transform::engine::apply;

    fn word(value: &str) -> QueryNode {
        QueryNode::word(value)
    }

    fn optimize(node: QueryNode) -> Option<QueryNode> {
        let mut context = QueryContext::new("en");
        apply(&OptimizingTransformer, node, &mut context)
    }

    #[test]
    fn splices_should_subgroups() {
        let tree = QueryNode::should_group([
            word("a"),
            QueryNode::should_group([word("b"), QueryNode::should_group([word("c")])]),
        ]);

        assert_eq!(
            optimize(tree),
            Some(QueryNode::should_group([word("a"), word("b"), word("c")]))
        );
    }

    #[test]
    fn splices_all_must_subgroups_under_must() {
        let tree = QueryNode::group(vec![
            GroupEntry::should(word("a")),
            GroupEntry::must(QueryNode::group(vec![
                GroupEntry::must(word("b")),
                GroupEntry::must(word("c")),
            ])),
        ]);

        assert_eq!(
            optimize(tree),
            Some(QueryNode::group(vec![
                GroupEntry::should(word("a")),
                GroupEntry::must(word("b")),
                GroupEntry::must(word("c")),
            ]))
        );
    }

    #[test]
    fn keeps_excluded_groups_nested() {
        let tree = QueryParser::parse("a -(b c)");

        assert_eq!(optimize(tree.clone()), Some(tree));
    }

    #[test]
    fn removes_empty_groups_and_boosts() {
        let tree = QueryNode::should_group([
            word("a"),
            QueryNode::Group(vec![]),
            QueryNode::boost(QueryNode::Group(vec![]), BoostScore::ONE),
        ]);

        assert_eq!(optimize(tree), Some(word("a")));
        assert_eq!(optimize(QueryNode::Group(vec![])), None);
    }

    #[test]
    fn collapses_single_entry_groups() {
        let tree = QueryNode::group(vec![
            GroupEntry::should(word("a")),
            GroupEntry::must_not(QueryNode::group(vec![GroupEntry::must(word("b"))])),
            GroupEntry::must(QueryNode::group(vec![GroupEntry::must_not(word("c"))])),
        ]);

        assert_eq!(
            optimize(tree),
            Some(QueryNode::group(vec![
                GroupEntry::should(word("a")),
                GroupEntry::must_not(word("b")),
                GroupEntry::must_not(word("c")),
            ]))
        );
    }

    #[test]
    fn double_negation_is_kept() {
        let tree = QueryNode::group(vec![
            GroupEntry::should(word("a")),
            GroupEntry::must_not(QueryNode::group(vec![GroupEntry::must_not(word("b"))])),
        ]);

        assert_eq!(optimize(tree.clone()), Some(tree));
    }

    #[test]
    fn root_keeps_lone_required_entry() {
        let tree = QueryParser::parse("+engine");

        assert_eq!(optimize(tree.clone()), Some(tree));
    }

    #[test]
    fn optimizes_inside_boosts() {
        let tree = QueryNode::should_group([
            word("a"),
            QueryNode::boost(QueryNode::should_group([word("b")]), BoostScore::ONE),
        ]);

        assert_eq!(
            optimize(tree),
            Some(QueryNode::should_group([
                word("a"),
                QueryNode::boost(word("b"), BoostScore::ONE),
            ]))
        );
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "(a (b (c d)))",
            "a -(b +(c d)) +(+e +f)",
            "(x)^2 -(-y) +(z)",
            "title:(a b) -year:[2000 TO *]",
        ];
        for input in inputs {
            let once = optimize(QueryParser::parse(input));
            let twice = once.clone().and_then(optimize);
            assert_eq!(once, twice, "input: {input}");
        }
    }

    #[test]
    fn forced_clean_freezes_the_tree() {
        let tree = QueryNode::should_group([
            word("a"),
            QueryNode::should_group([word("b"), QueryNode::Group(vec![])]),
        ]);
        let mut context = QueryContext::new("en");
        context.force_clean();

        assert_eq!(
            apply(&OptimizingTransformer, tree.clone(), &mut context),
            Some(tree)
        );
    }
}
