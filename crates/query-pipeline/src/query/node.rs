//! Query AST nodes shared by the parser, the transformers and the serializer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryPipelineError, Result};

/// Boolean role of an entry inside a [`QueryNode::Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    #[default]
    Should,
    Must,
    MustNot,
}

impl Occur {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Should => "should",
            Self::Must => "must",
            Self::MustNot => "must_not",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Should => "",
            Self::Must => "+",
            Self::MustNot => "-",
        }
    }

    /// Effective occur of the only entry of a group that itself sits in a
    /// parent group with occur `self`.
    ///
    /// Returns `None` when the two roles cannot be merged into one
    /// (a negated negation).
    pub fn combine(self, inner: Occur) -> Option<Occur> {
        match (self, inner) {
            (Self::Should, inner) => Some(inner),
            (outer, Self::Should) => Some(outer),
            (Self::Must, Self::Must) => Some(Self::Must),
            (Self::Must, Self::MustNot) | (Self::MustNot, Self::Must) => Some(Self::MustNot),
            (Self::MustNot, Self::MustNot) => None,
        }
    }
}

/// Static boost multiplier. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BoostScore(f64);

impl BoostScore {
    pub const ONE: BoostScore = BoostScore(1.0);

    /// Score attached to morphological variants.
    pub const MORPHOLOGY_VARIANT: BoostScore = BoostScore(0.85);

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(QueryPipelineError::InvalidBoost(value.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Fixed-point rendering used on the wire (`0.85000`).
    pub fn to_fixed(self) -> String {
        format!("{:.5}", self.0)
    }
}

impl fmt::Display for BoostScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed())
    }
}

/// Discriminant of a [`QueryNode`], used where the node itself is not
/// available (ancestor chains).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Word,
    Phrase,
    Field,
    Range,
    Boost,
    Group,
    Raw,
    Regex,
}

/// A parsed query (AST node).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A bare term.
    Word(String),
    /// A quoted literal, stored without the quote characters.
    Phrase(String),
    /// A field-qualified term or phrase.
    Field {
        field: String,
        value: Box<QueryNode>,
    },
    /// A field range; `*` marks an unbounded side.
    Range {
        field: String,
        left: String,
        right: String,
        including_left: bool,
        including_right: bool,
    },
    Boost {
        query: Box<QueryNode>,
        score: BoostScore,
    },
    Group(Vec<GroupEntry>),
    /// Unparsed fallback text.
    Raw(String),
    /// A slash-delimited pattern, stored without the slashes. Only
    /// meaningful as the value of a [`QueryNode::Field`].
    Regex(String),
}

/// One child of a [`QueryNode::Group`] together with its boolean role.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub occur: Occur,
    pub node: QueryNode,
}

impl GroupEntry {
    pub fn new(occur: Occur, node: QueryNode) -> Self {
        Self { occur, node }
    }

    pub fn should(node: QueryNode) -> Self {
        Self::new(Occur::Should, node)
    }

    pub fn must(node: QueryNode) -> Self {
        Self::new(Occur::Must, node)
    }

    pub fn must_not(node: QueryNode) -> Self {
        Self::new(Occur::MustNot, node)
    }
}

impl QueryNode {
    pub fn word(value: impl Into<String>) -> Self {
        Self::Word(value.into())
    }

    pub fn phrase(value: impl Into<String>) -> Self {
        Self::Phrase(value.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex(pattern.into())
    }

    pub fn field(field: impl Into<String>, value: QueryNode) -> Self {
        Self::Field {
            field: field.into(),
            value: Box::new(value),
        }
    }

    pub fn range(
        field: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        including_left: bool,
        including_right: bool,
    ) -> Self {
        Self::Range {
            field: field.into(),
            left: left.into(),
            right: right.into(),
            including_left,
            including_right,
        }
    }

    pub fn boost(query: QueryNode, score: BoostScore) -> Self {
        Self::Boost {
            query: Box::new(query),
            score,
        }
    }

    pub fn group(entries: Vec<GroupEntry>) -> Self {
        Self::Group(entries)
    }

    /// Group where every node participates as `should`.
    pub fn should_group(nodes: impl IntoIterator<Item = QueryNode>) -> Self {
        Self::Group(nodes.into_iter().map(GroupEntry::should).collect())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Word(_) => NodeKind::Word,
            Self::Phrase(_) => NodeKind::Phrase,
            Self::Field { .. } => NodeKind::Field,
            Self::Range { .. } => NodeKind::Range,
            Self::Boost { .. } => NodeKind::Boost,
            Self::Group(_) => NodeKind::Group,
            Self::Raw(_) => NodeKind::Raw,
            Self::Regex(_) => NodeKind::Regex,
        }
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Words of a group made only of two or more plain `should` words.
    pub fn plain_words(&self) -> Option<Vec<&str>> {
        let Self::Group(entries) = self else {
            return None;
        };
        if entries.len() < 2 {
            return None;
        }
        entries
            .iter()
            .map(|entry| match entry.occur {
                Occur::Should => entry.node.as_word(),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty_group(&self) -> bool {
        matches!(self, Self::Group(entries) if entries.is_empty())
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(value) | Self::Raw(value) => f.write_str(value),
            Self::Phrase(value) => write!(f, "\"{value}\""),
            Self::Regex(pattern) => write!(f, "/{}/", pattern.replace('/', "\\/")),
            Self::Field { field, value } => write!(f, "{field}:{value}"),
            Self::Range {
                field,
                left,
                right,
                including_left,
                including_right,
            } => write!(
                f,
                "{field}:{}{left} TO {right}{}",
                if *including_left { '[' } else { '{' },
                if *including_right { ']' } else { '}' },
            ),
            Self::Boost { query, score } => write!(f, "{query}^{}", score.value()),
            Self::Group(entries) => {
                f.write_str("(")?;
                for (position, entry) in entries.iter().enumerate() {
                    if position > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}{}", entry.occur.prefix(), entry.node)?;
                }
                f.write_str(")")
            }
        }
    }
}
