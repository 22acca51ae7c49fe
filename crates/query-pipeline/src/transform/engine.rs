//! Generic tree walk that applies one transformer to a whole query.

use crate::query::{GroupEntry, NodeKind, Occur, QueryContext, QueryNode};

/// What a transformer decided for the node it matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Leave the node in place. The transformer may still have updated the
    /// context.
    Keep,
    /// Drop the node from its parent.
    Remove,
    /// Substitute the node. The replacement is not revisited by the same
    /// transformer.
    Replace(QueryNode),
}

/// One step of the chain from the root down to the visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ancestor {
    pub kind: NodeKind,
    /// Role of this ancestor inside its own parent group, if it has one.
    pub occur: Option<Occur>,
}

/// A rewriting rule over query trees.
///
/// `matches` is evaluated on every visited node; when it yields a value,
/// `transform` receives that value together with the node.
pub trait TreeTransformer {
    type Matched;

    fn matches(&self, node: &QueryNode, parents: &[Ancestor]) -> Option<Self::Matched>;

    fn transform(
        &self,
        node: &QueryNode,
        context: &mut QueryContext,
        parents: &[Ancestor],
        matched: Self::Matched,
    ) -> Action;

    /// Whether the walk continues into group entries and boosted queries.
    fn descends(&self) -> bool {
        true
    }
}

/// Applies `transformer` to every node of `root`, pre-order.
///
/// Returns `None` when the root itself was removed.
pub fn apply<T>(transformer: &T, root: QueryNode, context: &mut QueryContext) -> Option<QueryNode>
where
    T: TreeTransformer + ?Sized,
{
    let mut parents = Vec::new();
    visit(transformer, root, None, context, &mut parents)
}

fn visit<T>(
    transformer: &T,
    node: QueryNode,
    occur: Option<Occur>,
    context: &mut QueryContext,
    parents: &mut Vec<Ancestor>,
) -> Option<QueryNode>
where
    T: TreeTransformer + ?Sized,
{
    if let Some(matched) = transformer.matches(&node, parents) {
        match transformer.transform(&node, context, parents, matched) {
            Action::Keep => {}
            Action::Remove => return None,
            Action::Replace(replacement) => return Some(replacement),
        }
    }

    if !transformer.descends() {
        return Some(node);
    }

    parents.push(Ancestor {
        kind: node.kind(),
        occur,
    });
    let visited = match node {
        QueryNode::Group(entries) => {
            let mut kept = Vec::with_capacity(entries.len());
            for entry in entries {
                if let Some(child) = visit(transformer, entry.node, Some(entry.occur), context, parents)
                {
                    kept.push(GroupEntry::new(entry.occur, child));
                }
            }
            Some(QueryNode::Group(kept))
        }
        QueryNode::Boost { query, score } => {
            visit(transformer, *query, None, context, parents)
                .map(|query| QueryNode::boost(query, score))
        }
        // Fields, ranges and terms are leaves for the walk.
        other => Some(other),
    };
    parents.pop();

    visited
}
