//! Matcher graph nodes and their static-analysis queries.
//!
//! The seven kinds form a closed set, so a single enum with one `match` per
//! operation is used instead of a trait hierarchy. Matching itself lives in
//! [`crate::runtime::eval`]; this module owns construction and the queries
//! the validator needs: nullability, the leftmost-reference walk, and a
//! whole-graph visitor.

use super::{Grammar, RuleId};
use regex::Regex;

/// Three-valued nullability: can this matcher succeed without consuming
/// input? `Unknown` marks rules whose cycles have not yet been decided by
/// the fixpoint; the validator resolves leftovers to `Yes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Unknown,
    No,
    Yes,
}

/// One matcher node in the compiled grammar graph.
#[derive(Debug)]
pub enum Matcher {
    Text {
        literal: String,
        skip_ws: bool,
    },
    Regex {
        pattern: Regex,
        /// Pattern text as it appears in expectation messages.
        source: String,
        /// Whether the pattern matches the empty string; decided once at
        /// construction.
        nullable: bool,
        skip_ws: bool,
    },
    Symbol {
        rule: RuleId,
    },
    Sequence {
        items: Vec<Item>,
        replacement: Option<String>,
    },
    Choice {
        alternatives: Vec<Matcher>,
    },
    Repeat {
        base: Box<Matcher>,
        zero_ok: bool,
        multiple_ok: bool,
    },
    Predicate {
        base: Box<Matcher>,
        name: String,
    },
}

/// A sequence element: a matcher plus whether its value is kept.
#[derive(Debug)]
pub struct Item {
    pub matcher: Matcher,
    pub keep: bool,
}

impl Matcher {
    pub fn text(literal: impl Into<String>, skip_ws: bool) -> Self {
        Matcher::Text {
            literal: literal.into(),
            skip_ws,
        }
    }

    /// Compiles `source` anchored at the cursor. The `regex` crate has no
    /// mid-haystack anchor, so the pattern is wrapped as `\A(?:...)` and run
    /// against the input's cursor suffix.
    pub fn regex(source: &str, skip_ws: bool) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"\A(?:{source})"))?;
        let nullable = pattern.is_match("");
        Ok(Matcher::Regex {
            pattern,
            source: source.to_string(),
            nullable,
            skip_ws,
        })
    }

    pub fn symbol(rule: RuleId) -> Self {
        Matcher::Symbol { rule }
    }

    pub fn sequence(items: Vec<Item>, replacement: Option<String>) -> Self {
        Matcher::Sequence { items, replacement }
    }

    /// A single-alternative choice collapses to that alternative.
    pub fn choice(mut alternatives: Vec<Matcher>) -> Self {
        if alternatives.len() == 1 {
            alternatives.pop().expect("length checked")
        } else {
            Matcher::Choice { alternatives }
        }
    }

    pub fn repeat(base: Matcher, zero_ok: bool, multiple_ok: bool) -> Self {
        Matcher::Repeat {
            base: Box::new(base),
            zero_ok,
            multiple_ok,
        }
    }

    pub fn predicate(base: Matcher, name: impl Into<String>) -> Self {
        Matcher::Predicate {
            base: Box::new(base),
            name: name.into(),
        }
    }

    /// Default keep flag for an item holding this matcher: literal text is
    /// skipped, everything else is kept.
    pub fn default_keep(&self) -> bool {
        !matches!(self, Matcher::Text { .. })
    }

    /// Nullability of this matcher given the rules' current states.
    pub fn nullability(&self, states: &[Nullability]) -> Nullability {
        match self {
            Matcher::Text { .. } => Nullability::No,
            Matcher::Regex { nullable, .. } => {
                if *nullable {
                    Nullability::Yes
                } else {
                    Nullability::No
                }
            }
            Matcher::Symbol { rule } => states[rule.0],
            Matcher::Sequence { items, .. } => {
                let mut result = Nullability::Yes;
                for item in items {
                    match item.matcher.nullability(states) {
                        Nullability::No => return Nullability::No,
                        Nullability::Unknown => result = Nullability::Unknown,
                        Nullability::Yes => {}
                    }
                }
                result
            }
            Matcher::Choice { alternatives } => {
                let mut result = Nullability::No;
                for alternative in alternatives {
                    match alternative.nullability(states) {
                        Nullability::Yes => return Nullability::Yes,
                        Nullability::Unknown => result = Nullability::Unknown,
                        Nullability::No => {}
                    }
                }
                result
            }
            Matcher::Repeat { base, zero_ok, .. } => {
                if *zero_ok {
                    Nullability::Yes
                } else {
                    base.nullability(states)
                }
            }
            Matcher::Predicate { base, .. } => base.nullability(states),
        }
    }

    /// Collects the rules reachable at this matcher's leftmost positions.
    /// A sequence contributes its first item, then each following item while
    /// the prefix so far is nullable. Call after the nullability fixpoint so
    /// `states` holds no `Unknown`.
    pub fn left_references(&self, states: &[Nullability], out: &mut Vec<RuleId>) {
        match self {
            Matcher::Text { .. } | Matcher::Regex { .. } => {}
            Matcher::Symbol { rule } => out.push(*rule),
            Matcher::Sequence { items, .. } => {
                for item in items {
                    item.matcher.left_references(states, out);
                    if item.matcher.nullability(states) == Nullability::No {
                        break;
                    }
                }
            }
            Matcher::Choice { alternatives } => {
                for alternative in alternatives {
                    alternative.left_references(states, out);
                }
            }
            Matcher::Repeat { base, .. } | Matcher::Predicate { base, .. } => {
                base.left_references(states, out);
            }
        }
    }

    /// Visits this matcher and every matcher below it, without crossing
    /// `Symbol` edges.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Matcher)) {
        visit(self);
        match self {
            Matcher::Text { .. } | Matcher::Regex { .. } | Matcher::Symbol { .. } => {}
            Matcher::Sequence { items, .. } => {
                for item in items {
                    item.matcher.walk(visit);
                }
            }
            Matcher::Choice { alternatives } => {
                for alternative in alternatives {
                    alternative.walk(visit);
                }
            }
            Matcher::Repeat { base, .. } | Matcher::Predicate { base, .. } => {
                base.walk(visit);
            }
        }
    }

    /// Compact single-line rendering of the graph, for tests and debugging.
    pub fn dump(&self, grammar: &Grammar) -> String {
        match self {
            Matcher::Text { literal, .. } => format!("'{literal}'"),
            Matcher::Regex { source, .. } => format!("/{source}/"),
            Matcher::Symbol { rule } => grammar.rule(*rule).name.clone(),
            Matcher::Sequence { items, replacement } => {
                let mut parts = Vec::with_capacity(items.len() + 1);
                for item in items {
                    let rendered = item.matcher.dump(grammar);
                    if item.keep == item.matcher.default_keep() {
                        parts.push(rendered);
                    } else if item.keep {
                        parts.push(format!("!{rendered}"));
                    } else {
                        parts.push(format!("-{rendered}"));
                    }
                }
                if let Some(name) = replacement {
                    parts.push(format!("%{name}"));
                }
                format!("({})", parts.join(" "))
            }
            Matcher::Choice { alternatives } => {
                let parts: Vec<String> = alternatives.iter().map(|a| a.dump(grammar)).collect();
                format!("({})", parts.join(" | "))
            }
            Matcher::Repeat {
                base,
                zero_ok,
                multiple_ok,
            } => {
                let marker = match (*zero_ok, *multiple_ok) {
                    (true, true) => '*',
                    (false, true) => '+',
                    _ => '?',
                };
                format!("{}{marker}", base.dump(grammar))
            }
            Matcher::Predicate { base, name } => format!("{}:{name}", base.dump(grammar)),
        }
    }
}
