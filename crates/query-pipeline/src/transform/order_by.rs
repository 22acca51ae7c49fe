//! Extraction of the `order_by:<field>` pragma.

use std::collections::{HashMap, HashSet};

use crate::query::{OrderBy, QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

const ORDER_BY_PRAGMA: &str = "order_by";

/// Removes `order_by:` pragmas from the tree and records the requested
/// field, after alias resolution, in the context. Unknown fields are
/// dropped without changing the ordering.
#[derive(Debug, Clone, Default)]
pub struct OrderByTransformer {
    field_aliases: HashMap<String, String>,
    valid_fields: HashSet<String>,
}

impl OrderByTransformer {
    pub fn new(field_aliases: HashMap<String, String>, valid_fields: HashSet<String>) -> Self {
        Self {
            field_aliases,
            valid_fields,
        }
    }
}

impl TreeTransformer for OrderByTransformer {
    type Matched = String;

    fn matches(&self, node: &QueryNode, _parents: &[Ancestor]) -> Option<String> {
        match node {
            QueryNode::Field { field, value } if field.eq_ignore_ascii_case(ORDER_BY_PRAGMA) => {
                value.as_word().map(str::to_string)
            }
            QueryNode::Word(value) => value
                .strip_prefix(ORDER_BY_PRAGMA)
                .and_then(|rest| rest.strip_prefix(':'))
                .filter(|requested| !requested.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }

    fn transform(
        &self,
        _node: &QueryNode,
        context: &mut QueryContext,
        _parents: &[Ancestor],
        requested: String,
    ) -> Action {
        let field = self
            .field_aliases
            .get(&requested)
            .cloned()
            .unwrap_or(requested);

        if self.valid_fields.contains(&field) {
            context.set_order_by(OrderBy::desc(field));
        } else {
            log::debug!("ignoring order_by on unknown field '{field}'");
        }
        Action::Remove
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParser;
    use crate::transform::engine::apply;

    fn transformer() -> OrderByTransformer {
        OrderByTransformer::new(
            HashMap::from([
                ("f1".to_string(), "field1".to_string()),
                ("f2".to_string(), "field2".to_string()),
            ]),
            HashSet::from([
                "field1".to_string(),
                "field2".to_string(),
                "field3".to_string(),
            ]),
        )
    }

    fn terms() -> QueryNode {
        QueryNode::should_group([QueryNode::word("term1"), QueryNode::word("term2")])
    }

    #[test]
    fn alias_is_resolved_and_pragma_removed() {
        let mut context = QueryContext::new("en");

        let result = apply(
            &transformer(),
            QueryParser::parse("term1 term2 order_by:f1"),
            &mut context,
        );

        assert_eq!(result, Some(terms()));
        assert_eq!(context.order_by().map(OrderBy::as_pair), Some(("field1", "desc")));
    }

    #[test]
    fn canonical_field_is_accepted() {
        let mut context = QueryContext::new("en");

        apply(
            &transformer(),
            QueryParser::parse("term1 order_by:field3"),
            &mut context,
        );

        assert_eq!(context.order_by().map(OrderBy::as_pair), Some(("field3", "desc")));
    }

    #[test]
    fn unknown_field_is_dropped_silently() {
        let mut context = QueryContext::new("en");

        let result = apply(
            &transformer(),
            QueryParser::parse("term1 term2 order_by:nope"),
            &mut context,
        );

        assert_eq!(result, Some(terms()));
        assert_eq!(context.order_by(), None);
    }

    #[test]
    fn last_pragma_wins() {
        let mut context = QueryContext::new("en");

        apply(
            &transformer(),
            QueryParser::parse("order_by:f1 term1 order_by:f2"),
            &mut context,
        );

        assert_eq!(context.order_by().map(OrderBy::as_pair), Some(("field2", "desc")));
    }

    #[test]
    fn pragma_in_word_form() {
        let mut context = QueryContext::new("en");

        let result = apply(
            &transformer(),
            QueryNode::should_group([QueryNode::word("term1"), QueryNode::word("order_by:f2")]),
            &mut context,
        );

        assert_eq!(
            result,
            Some(QueryNode::should_group([QueryNode::word("term1")]))
        );
        assert_eq!(context.order_by().map(OrderBy::as_pair), Some(("field2", "desc")));
    }
}
