//! Query parser and tokenizer.
//!
//! The parser never fails: malformed fragments degrade to plain words,
//! phrases or [`QueryNode::Raw`] text.

use std::sync::LazyLock;

use regex::Regex;

use super::node::{BoostScore, GroupEntry, Occur, QueryNode};

/// Nesting depth beyond which parentheses are ignored.
const MAX_GROUP_DEPTH: usize = 32;

const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’', '«', '»', '„', '`'];

static URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+").expect("url pattern is valid")
});

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QueryToken {
    kind: QueryTokenKind,
    position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryTokenKind {
    Word(String),
    Phrase(String),
    /// A `name:` prefix; the value is the next token.
    Field(String),
    Range {
        left: String,
        right: String,
        including_left: bool,
        including_right: bool,
    },
    Raw(String),
    /// A `/pattern/` value, unescaped. Only produced after a field prefix.
    Regex(String),
    Boost(BoostScore),
    LParen,
    RParen,
    Plus,
    Minus,
}

// ---------------------------------------------------------------------------
// Query parser
// ---------------------------------------------------------------------------

pub struct QueryParser {
    tokens: Vec<QueryToken>,
    index: usize,
    /// Opening parentheses skipped because of `MAX_GROUP_DEPTH`.
    suppressed_groups: usize,
}

impl QueryParser {
    /// Parses raw query text into an AST.
    ///
    /// Whitespace-separated operands become `should` entries of a group; a
    /// single `should` operand is returned as-is. Empty input yields an
    /// empty group.
    pub fn parse(input: &str) -> QueryNode {
        let tokens = tokenize_query_input(input);
        let mut parser = Self {
            tokens,
            index: 0,
            suppressed_groups: 0,
        };
        let mut entries = parser.parse_sequence(0);

        if entries.len() == 1 && entries[0].occur == Occur::Should {
            return entries.remove(0).node;
        }
        QueryNode::Group(entries)
    }

    fn parse_sequence(&mut self, depth: usize) -> Vec<GroupEntry> {
        let mut entries = Vec::new();
        let mut occur = Occur::Should;

        while let Some(token) = self.next() {
            let node = match token.kind {
                QueryTokenKind::RParen => {
                    if self.suppressed_groups > 0 {
                        self.suppressed_groups -= 1;
                        continue;
                    }
                    if depth > 0 {
                        return entries;
                    }
                    log::debug!("ignoring unmatched ')' at byte {}", token.position);
                    continue;
                }
                QueryTokenKind::Plus => {
                    occur = Occur::Must;
                    continue;
                }
                QueryTokenKind::Minus => {
                    occur = Occur::MustNot;
                    continue;
                }
                QueryTokenKind::Boost(_) => {
                    log::debug!("ignoring boost without operand at byte {}", token.position);
                    continue;
                }
                QueryTokenKind::LParen => {
                    if depth >= MAX_GROUP_DEPTH {
                        self.suppressed_groups += 1;
                        continue;
                    }
                    QueryNode::Group(self.parse_sequence(depth + 1))
                }
                QueryTokenKind::Field(name) => self.parse_field_value(name, depth),
                QueryTokenKind::Word(value) => QueryNode::Word(value),
                QueryTokenKind::Phrase(value) => QueryNode::Phrase(value),
                QueryTokenKind::Raw(value) => QueryNode::Raw(value),
                QueryTokenKind::Regex(pattern) => QueryNode::Regex(pattern),
                QueryTokenKind::Range { left, right, .. } => {
                    QueryNode::Raw(format!("{left} TO {right}"))
                }
            };

            let (node, boosted) = self.with_boost(node);
            push_entry(&mut entries, occur, node, !boosted);
            occur = Occur::Should;
        }

        entries
    }

    fn parse_field_value(&mut self, name: String, depth: usize) -> QueryNode {
        let Some(kind) = self.peek().map(|token| token.kind.clone()) else {
            return QueryNode::Word(name);
        };

        match kind {
            QueryTokenKind::Word(value) => {
                self.index += 1;
                QueryNode::field(name, QueryNode::Word(value))
            }
            QueryTokenKind::Phrase(value) => {
                self.index += 1;
                QueryNode::field(name, QueryNode::Phrase(value))
            }
            QueryTokenKind::Regex(pattern) => {
                self.index += 1;
                QueryNode::field(name, QueryNode::Regex(pattern))
            }
            QueryTokenKind::Range {
                left,
                right,
                including_left,
                including_right,
            } => {
                self.index += 1;
                QueryNode::range(name, left, right, including_left, including_right)
            }
            QueryTokenKind::LParen if depth < MAX_GROUP_DEPTH => {
                self.index += 1;
                let group = QueryNode::Group(self.parse_sequence(depth + 1));
                distribute_field(&name, group)
            }
            _ => QueryNode::Word(name),
        }
    }

    fn with_boost(&mut self, node: QueryNode) -> (QueryNode, bool) {
        match self.peek().map(|token| token.kind.clone()) {
            Some(QueryTokenKind::Boost(score)) => {
                self.index += 1;
                (QueryNode::boost(node, score), true)
            }
            _ => (node, false),
        }
    }

    fn is_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&QueryToken> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<QueryToken> {
        if self.is_end() {
            return None;
        }
        let token = self.tokens[self.index].clone();
        self.index += 1;
        Some(token)
    }
}

/// Appends an operand, splicing an unboosted `should` group into the
/// parent so its entries keep their own occur.
fn push_entry(entries: &mut Vec<GroupEntry>, occur: Occur, node: QueryNode, spliceable: bool) {
    match node {
        QueryNode::Group(children) if spliceable && occur == Occur::Should => {
            entries.extend(children);
        }
        node => entries.push(GroupEntry::new(occur, node)),
    }
}

/// Scopes every term and phrase of `node` to `field`.
fn distribute_field(field: &str, node: QueryNode) -> QueryNode {
    match node {
        QueryNode::Word(_) | QueryNode::Phrase(_) => QueryNode::field(field, node),
        QueryNode::Group(entries) => QueryNode::Group(
            entries
                .into_iter()
                .map(|entry| GroupEntry::new(entry.occur, distribute_field(field, entry.node)))
                .collect(),
        ),
        QueryNode::Boost { query, score } => {
            QueryNode::boost(distribute_field(field, *query), score)
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn tokenize_query_input(input: &str) -> Vec<QueryToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0usize;

    while let Some(ch) = input[cursor..].chars().next() {
        if ch.is_whitespace() {
            cursor += ch.len_utf8();
            continue;
        }

        let position = cursor;
        match ch {
            '(' => {
                tokens.push(QueryToken {
                    kind: QueryTokenKind::LParen,
                    position,
                });
                cursor += 1;
            }
            ')' => {
                tokens.push(QueryToken {
                    kind: QueryTokenKind::RParen,
                    position,
                });
                cursor += 1;
            }
            '+' | '-' => {
                if starts_operand(input, cursor + 1) {
                    let kind = if ch == '+' {
                        QueryTokenKind::Plus
                    } else {
                        QueryTokenKind::Minus
                    };
                    tokens.push(QueryToken { kind, position });
                }
                cursor += 1;
            }
            '^' => {
                let (score, next_cursor) = consume_boost(input, cursor);
                if let Some(score) = score {
                    tokens.push(QueryToken {
                        kind: QueryTokenKind::Boost(score),
                        position,
                    });
                }
                cursor = next_cursor;
            }
            _ if QUOTE_CHARS.contains(&ch) => match consume_quoted_phrase(input, cursor) {
                Some((phrase, next_cursor)) => {
                    tokens.push(QueryToken {
                        kind: QueryTokenKind::Phrase(phrase),
                        position,
                    });
                    cursor = next_cursor;
                }
                None => cursor += ch.len_utf8(),
            },
            _ => {
                if let Some(found) = URL_PREFIX.find(&input[cursor..]) {
                    let end = cursor + found.end();
                    tokens.push(QueryToken {
                        kind: QueryTokenKind::Word(input[cursor..end].to_string()),
                        position,
                    });
                    cursor = end;
                    continue;
                }

                if let Some((name, next_cursor)) = consume_field_prefix(input, cursor) {
                    cursor = next_cursor;
                    if let Some((pattern, end)) = consume_regex(input, cursor) {
                        tokens.push(QueryToken {
                            kind: QueryTokenKind::Field(name),
                            position,
                        });
                        tokens.push(QueryToken {
                            kind: QueryTokenKind::Regex(pattern),
                            position: cursor,
                        });
                        cursor = end;
                        continue;
                    }
                    if !matches!(input[cursor..].chars().next(), Some('[' | '{')) {
                        tokens.push(QueryToken {
                            kind: QueryTokenKind::Field(name),
                            position,
                        });
                        continue;
                    }

                    match consume_range(input, cursor) {
                        RangeScan::Range { kind, end } => {
                            tokens.push(QueryToken {
                                kind: QueryTokenKind::Field(name),
                                position,
                            });
                            tokens.push(QueryToken {
                                kind,
                                position: cursor,
                            });
                            cursor = end;
                        }
                        RangeScan::Malformed { end } => {
                            log::debug!("malformed range near byte {position}, keeping raw text");
                            tokens.push(QueryToken {
                                kind: QueryTokenKind::Raw(input[position..end].to_string()),
                                position,
                            });
                            cursor = end;
                        }
                    }
                    continue;
                }

                let end = word_end(input, cursor);
                if end == cursor {
                    // Stray separator (':' or a bracket).
                    cursor += ch.len_utf8();
                    continue;
                }
                tokens.push(QueryToken {
                    kind: QueryTokenKind::Word(input[cursor..end].to_string()),
                    position,
                });
                cursor = end;
            }
        }
    }

    tokens
}

fn is_word_terminator(ch: char) -> bool {
    ch.is_whitespace()
        || QUOTE_CHARS.contains(&ch)
        || matches!(ch, '(' | ')' | '^' | ':' | '[' | ']' | '{' | '}')
}

fn word_end(input: &str, start: usize) -> usize {
    let mut end = start;
    while let Some(ch) = input[end..].chars().next() {
        if is_word_terminator(ch) {
            break;
        }
        end += ch.len_utf8();
    }
    end
}

fn starts_operand(input: &str, cursor: usize) -> bool {
    matches!(input[cursor..].chars().next(), Some(ch) if !ch.is_whitespace() && ch != ')')
}

/// Recognizes `name:` directly followed by a value.
fn consume_field_prefix(input: &str, start: usize) -> Option<(String, usize)> {
    let first = input[start..].chars().next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }

    let mut end = start;
    while let Some(ch) = input[end..].chars().next() {
        if ch.is_alphanumeric() || ch == '_' || ch == '.' {
            end += ch.len_utf8();
        } else {
            break;
        }
    }

    if !input[end..].starts_with(':') {
        return None;
    }
    match input[end + 1..].chars().next() {
        Some(next) if !next.is_whitespace() && next != ':' && next != ')' => {
            Some((input[start..end].to_string(), end + 1))
        }
        _ => None,
    }
}

fn consume_boost(input: &str, start: usize) -> (Option<BoostScore>, usize) {
    let digits_start = start + 1;
    let mut end = digits_start;
    while let Some(ch) = input[end..].chars().next() {
        if ch.is_ascii_digit() || ch == '.' {
            end += 1;
        } else {
            break;
        }
    }

    let raw = &input[digits_start..end];
    if raw.is_empty() {
        return (None, digits_start);
    }
    match raw.parse::<f64>().ok().map(BoostScore::new) {
        Some(Ok(score)) => (Some(score), end),
        _ => {
            log::debug!("ignoring invalid boost '^{raw}' at byte {start}");
            (None, end)
        }
    }
}

enum RangeScan {
    Range { kind: QueryTokenKind, end: usize },
    Malformed { end: usize },
}

fn consume_range(input: &str, start: usize) -> RangeScan {
    let including_left = input[start..].starts_with('[');
    let body_start = start + 1;

    let Some(offset) = input[body_start..].find([']', '}']) else {
        let end = input[start..]
            .find(char::is_whitespace)
            .map_or(input.len(), |offset| start + offset);
        return RangeScan::Malformed { end };
    };
    let close = body_start + offset;
    let including_right = input[close..].starts_with(']');
    let end = close + 1;

    let parts = input[body_start..close].split_whitespace().collect::<Vec<_>>();
    match parts.as_slice() {
        [left, to, right] if to.eq_ignore_ascii_case("to") => RangeScan::Range {
            kind: QueryTokenKind::Range {
                left: (*left).to_string(),
                right: (*right).to_string(),
                including_left,
                including_right,
            },
            end,
        },
        _ => RangeScan::Malformed { end },
    }
}

/// Scans `/pattern/` up to the next unescaped slash. `\/` stands for a
/// literal slash; other escapes are kept for the regex engine. The closing
/// slash must end the operand.
fn consume_regex(input: &str, start: usize) -> Option<(String, usize)> {
    if !input[start..].starts_with('/') {
        return None;
    }
    let mut cursor = start + 1;
    let mut pattern = String::new();
    let mut escaped = false;

    while let Some(ch) = input[cursor..].chars().next() {
        cursor += ch.len_utf8();
        if ch.is_whitespace() {
            return None;
        }
        if escaped {
            if ch != '/' {
                pattern.push('\\');
            }
            pattern.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '/' => {
                let closed = match input[cursor..].chars().next() {
                    None => true,
                    Some(next) => next.is_whitespace() || matches!(next, ')' | '^'),
                };
                return (closed && !pattern.is_empty()).then_some((pattern, cursor));
            }
            _ => pattern.push(ch),
        }
    }

    None
}

fn consume_quoted_phrase(input: &str, start: usize) -> Option<(String, usize)> {
    let opening = input[start..].chars().next()?;
    let mut cursor = start + opening.len_utf8();
    let mut phrase = String::new();
    let mut escaped = false;

    while cursor < input.len() {
        let ch = input[cursor..].chars().next()?;
        cursor += ch.len_utf8();

        if escaped {
            phrase.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if QUOTE_CHARS.contains(&ch) {
            return Some((phrase, cursor));
        }

        phrase.push(ch);
    }

    None
}
