//! Morphological expansion of bare and field-qualified words.

use std::fmt;
use std::sync::Arc;

use crate::dictionary::MorphologyDictionary;
use crate::query::{BoostScore, GroupEntry, QueryContext, QueryNode};

use super::engine::{Action, Ancestor, TreeTransformer};

/// Expands each word into a `should` group of the word itself plus its
/// dictionary forms, the latter boosted by
/// [`BoostScore::MORPHOLOGY_VARIANT`].
///
/// With morphology disabled, words containing `ё` are paired with their
/// `е` spelling instead. Languages the dictionary does not know are left
/// untouched either way.
pub struct MorphyTransformer {
    dictionary: Arc<dyn MorphologyDictionary>,
    enable_morph: bool,
    enable_accent: bool,
}

impl MorphyTransformer {
    pub fn new(dictionary: Arc<dyn MorphologyDictionary>, enable_morph: bool) -> Self {
        Self {
            dictionary,
            enable_morph,
            enable_accent: true,
        }
    }

    pub fn with_accent(mut self, enable_accent: bool) -> Self {
        self.enable_accent = enable_accent;
        self
    }

    fn forms(&self, term: &str, language: &str) -> Vec<String> {
        let mut forms: Vec<String> = Vec::new();
        for form in self.dictionary.lookup(term, language) {
            if form.is_empty() || form.eq_ignore_ascii_case(term) || forms.contains(&form) {
                continue;
            }
            forms.push(form);
        }
        forms
    }
}

impl fmt::Debug for MorphyTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphyTransformer")
            .field("enable_morph", &self.enable_morph)
            .field("enable_accent", &self.enable_accent)
            .finish_non_exhaustive()
    }
}

/// The term of a matched node and how to rebuild a node around a new term.
pub struct MatchedTerm {
    term: String,
    field: Option<String>,
}

impl MatchedTerm {
    fn rebuild(&self, term: String) -> QueryNode {
        match &self.field {
            Some(field) => QueryNode::field(field.clone(), QueryNode::Word(term)),
            None => QueryNode::Word(term),
        }
    }
}

impl TreeTransformer for MorphyTransformer {
    type Matched = MatchedTerm;

    fn matches(&self, node: &QueryNode, _parents: &[Ancestor]) -> Option<MatchedTerm> {
        match node {
            QueryNode::Word(term) => Some(MatchedTerm {
                term: term.clone(),
                field: None,
            }),
            QueryNode::Field { field, value } => value.as_word().map(|term| MatchedTerm {
                term: term.to_string(),
                field: Some(field.clone()),
            }),
            _ => None,
        }
    }

    fn transform(
        &self,
        node: &QueryNode,
        context: &mut QueryContext,
        _parents: &[Ancestor],
        matched: MatchedTerm,
    ) -> Action {
        if !self.dictionary.supports_language(context.language()) {
            return Action::Keep;
        }

        if self.enable_morph {
            let forms = self.forms(&matched.term, context.language());
            if forms.is_empty() {
                return Action::Keep;
            }
            let mut entries = Vec::with_capacity(forms.len() + 1);
            entries.push(GroupEntry::should(node.clone()));
            entries.extend(forms.into_iter().map(|form| {
                GroupEntry::should(QueryNode::boost(
                    matched.rebuild(form),
                    BoostScore::MORPHOLOGY_VARIANT,
                ))
            }));
            return Action::Replace(QueryNode::Group(entries));
        }

        if self.enable_accent && matched.term.contains(['ё', 'Ё']) {
            let folded = matched.term.replace('ё', "е").replace('Ё', "Е");
            return Action::Replace(QueryNode::should_group([
                node.clone(),
                matched.rebuild(folded),
            ]));
        }

        Action::Keep
    }
}
