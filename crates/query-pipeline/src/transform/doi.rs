//! Recognition of queries that are a single DOI link.

use std::sync::LazyLock;

use regex::Regex;

use crate::query::{QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

const DOI_FIELD: &str = "doi";

static DOI_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:dx\.|www\.)?doi\.org/(10\.\d+)/(\S+)$")
        .expect("doi pattern is valid")
});

/// Rewrites a query consisting solely of a `doi.org` URL into a term query
/// on the `doi` field and records the DOI in the context.
///
/// The emitted value is the lowercased DOI followed by `/` and its prefix,
/// e.g. `10.1101/2022.05.26.493559/10.1101`, which is how the index stores
/// DOI terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoiTransformer;

/// A recognized DOI split into its registrant prefix and suffix.
pub struct Doi {
    prefix: String,
    suffix: String,
}

impl Doi {
    fn normalized(&self) -> String {
        format!("{}/{}", self.prefix, self.suffix).to_lowercase()
    }

    fn index_term(&self) -> String {
        format!("{}/{}/{}", self.prefix, self.suffix, self.prefix).to_lowercase()
    }
}

impl TreeTransformer for DoiTransformer {
    type Matched = Doi;

    fn matches(&self, node: &QueryNode, parents: &[Ancestor]) -> Option<Doi> {
        if !parents.is_empty() {
            return None;
        }
        let captures = DOI_URL.captures(node.as_word()?)?;
        Some(Doi {
            prefix: captures[1].to_string(),
            suffix: captures[2].to_string(),
        })
    }

    fn transform(
        &self,
        _node: &QueryNode,
        context: &mut QueryContext,
        _parents: &[Ancestor],
        doi: Doi,
    ) -> Action {
        context.push_doi(doi.normalized());
        Action::Replace(QueryNode::field(DOI_FIELD, QueryNode::Word(doi.index_term())))
    }

    fn descends(&self) -> bool {
        false
    }
}
