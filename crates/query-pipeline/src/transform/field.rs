//! Field alias resolution and validation against the context's schema.

use crate::query::{QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

/// Renames aliased fields to their canonical name. Qualifiers naming an
/// unknown field are dropped: the field name and its value are searched
/// as plain text instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTransformer;

impl TreeTransformer for FieldTransformer {
    type Matched = ();

    fn matches(&self, node: &QueryNode, _parents: &[Ancestor]) -> Option<()> {
        matches!(node, QueryNode::Field { .. } | QueryNode::Range { .. }).then_some(())
    }

    fn transform(
        &self,
        node: &QueryNode,
        context: &mut QueryContext,
        _parents: &[Ancestor],
        _matched: (),
    ) -> Action {
        let schema = context.field_schema();

        match node {
            QueryNode::Field { field, value } => {
                let resolved = schema.resolve(field);
                if !schema.is_valid(resolved) {
                    log::debug!("unknown field '{field}', searching it as text");
                    return Action::Replace(QueryNode::should_group([
                        QueryNode::word(field.clone()),
                        value.as_ref().clone(),
                    ]));
                }
                if resolved == field.as_str() {
                    return Action::Keep;
                }
                Action::Replace(QueryNode::field(resolved, value.as_ref().clone()))
            }
            QueryNode::Range {
                field,
                left,
                right,
                including_left,
                including_right,
            } => {
                let resolved = schema.resolve(field);
                if !schema.is_valid(resolved) {
                    log::debug!("unknown range field '{field}', searching it as text");
                    let bounds = [left, right]
                        .into_iter()
                        .filter(|bound| bound.as_str() != "*")
                        .map(|bound| QueryNode::word(bound.clone()));
                    return Action::Replace(QueryNode::should_group(
                        std::iter::once(QueryNode::word(field.clone())).chain(bounds),
                    ));
                }
                if resolved == field.as_str() {
                    return Action::Keep;
                }
                Action::Replace(QueryNode::range(
                    resolved,
                    left.clone(),
                    right.clone(),
                    *including_left,
                    *including_right,
                ))
            }
            _ => Action::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::FieldSchema;
    use crate::query::QueryParser;
    use crate::transform::engine::apply;

    fn run(input: &str) -> Option<QueryNode> {
        let schema = FieldSchema::new(
            [("author", "authors"), ("journal", "container_title")],
            ["authors", "title", "container_title", "issued_at"],
        )
        .unwrap();
        let mut context = QueryContext::with_field_schema("en", Arc::new(schema));
        apply(&FieldTransformer, QueryParser::parse(input), &mut context)
    }

    #[test]
    fn aliases_are_renamed() {
        assert_eq!(
            run("Author:smith"),
            Some(QueryNode::field("authors", QueryNode::word("smith")))
        );
        assert_eq!(
            run("journal:\"nature genetics\""),
            Some(QueryNode::field(
                "container_title",
                QueryNode::phrase("nature genetics")
            ))
        );
    }

    #[test]
    fn known_fields_are_kept() {
        assert_eq!(
            run("title:kolobok"),
            Some(QueryNode::field("title", QueryNode::word("kolobok")))
        );
    }

    #[test]
    fn unknown_fields_become_text() {
        assert_eq!(
            run("term1 color:red"),
            Some(QueryNode::should_group([
                QueryNode::word("term1"),
                QueryNode::should_group([QueryNode::word("color"), QueryNode::word("red")]),
            ]))
        );
    }

    #[test]
    fn unknown_range_field_becomes_text() {
        assert_eq!(
            run("year:[2010 TO *]"),
            Some(QueryNode::should_group([
                QueryNode::word("year"),
                QueryNode::word("2010")
            ]))
        );
        assert_eq!(
            run("issued_at:[1 TO 2]"),
            Some(QueryNode::range("issued_at", "1", "2", true, true))
        );
    }

    #[test]
    fn empty_schema_accepts_any_field() {
        let mut context = QueryContext::new("en");
        let tree = QueryParser::parse("color:red");

        assert_eq!(apply(&FieldTransformer, tree.clone(), &mut context), Some(tree));
    }
}
