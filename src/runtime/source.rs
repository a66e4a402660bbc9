//! Per-match scratch state: the cursor and the furthest-failure record.
//!
//! A fresh [`Source`] is created for every match and dropped when it
//! returns. Besides the cursor it tracks the rightmost position at which any
//! matcher failed, together with what was expected there; the final error
//! message is composed from exactly that record, so backtracking never
//! degrades the diagnostic to "no match".

use regex::Regex;

use crate::actions::RichFailure;
use crate::diagnostics::format_at;

/// What a failed matcher expected at its position.
pub enum Expectation {
    /// A text terminal's literal; rendered in single quotes.
    Literal(String),
    /// A regex terminal's pattern source.
    Pattern(String),
    /// A described rule's expectation text.
    Described(String),
    /// A plain predicate rejection or an engine-level expectation such as
    /// `end of input`.
    Message(String),
    /// A self-formatting predicate failure; takes over the whole message.
    Rich(RichFailure),
}

impl Expectation {
    fn render(&self) -> Option<String> {
        match self {
            Expectation::Literal(text) => Some(format!("'{text}'")),
            Expectation::Pattern(source) => Some(source.clone()),
            Expectation::Described(text) | Expectation::Message(text) => Some(text.clone()),
            Expectation::Rich(_) => None,
        }
    }
}

pub struct Source {
    input: String,
    pub cursor: usize,
    furthest: usize,
    expectations: Vec<Expectation>,
}

impl Source {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            cursor: 0,
            furthest: 0,
            expectations: Vec::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The unconsumed suffix of the input.
    pub fn rest(&self) -> &str {
        &self.input[self.cursor..]
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.input.len()
    }

    pub fn furthest(&self) -> usize {
        self.furthest
    }

    /// Advances past whitespace at the cursor, if any. `pattern` must be
    /// `\A`-anchored.
    pub fn skip_whitespace(&mut self, pattern: &Regex) {
        if let Some(found) = pattern.find(self.rest()) {
            self.cursor += found.end();
        }
    }

    /// Truncation point for a described rule entered at the current cursor:
    /// the expectations already recorded here, or zero when the furthest
    /// failure lies elsewhere (a failure inside the rule's body will clear
    /// the list before anything of the body's is recorded).
    pub fn expectation_mark(&self) -> usize {
        if self.cursor == self.furthest {
            self.expectations.len()
        } else {
            0
        }
    }

    /// Records a failure at the cursor. Ahead of the furthest failure: the
    /// record starts over here. At the furthest failure: appended, after
    /// truncating to `keep` when supplied (described rules use this to
    /// discard their body's expectations). Behind it: ignored, a better
    /// report already exists.
    pub fn error(&mut self, what: Expectation, keep: Option<usize>) {
        if self.cursor > self.furthest {
            self.expectations.clear();
            self.furthest = self.cursor;
            self.expectations.push(what);
        } else if self.cursor == self.furthest {
            if let Some(mark) = keep {
                self.expectations.truncate(mark);
            }
            self.expectations.push(what);
        }
    }

    /// Composes the final three-line diagnostic from the furthest-failure
    /// record. The first rich failure short-circuits; otherwise the rendered
    /// expectations are sorted, deduplicated, and joined into one
    /// `expected …` message.
    pub fn failure_message(&self) -> String {
        let format_line = |message: &str, pos: usize| format_at(message, &self.input, pos);
        for expectation in &self.expectations {
            if let Expectation::Rich(render) = expectation {
                return render(&format_line);
            }
        }
        let mut rendered: Vec<String> = self
            .expectations
            .iter()
            .filter_map(Expectation::render)
            .collect();
        rendered.sort();
        rendered.dedup();
        format_line(&format!("expected {}", or_list(&rendered)), self.furthest)
    }
}

/// `x` / `x or y` / `x, y, or z`.
fn or_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        _ => {
            let (last, init) = items.split_last().expect("length checked");
            format!("{}, or {last}", init.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn furthest_failure_moves_forward_only() {
        let mut source = Source::new("abcdef");
        source.cursor = 2;
        source.error(Expectation::Literal("x".into()), None);
        assert_eq!(source.furthest(), 2);

        source.cursor = 4;
        source.error(Expectation::Literal("y".into()), None);
        assert_eq!(source.furthest(), 4);

        // behind the furthest failure: ignored
        source.cursor = 1;
        source.error(Expectation::Literal("z".into()), None);
        assert_eq!(source.furthest(), 4);
        assert!(source.failure_message().starts_with("expected 'y', line 1:"));
    }

    #[test]
    fn equal_position_accumulates_and_dedupes() {
        let mut source = Source::new("q");
        source.error(Expectation::Literal("one".into()), None);
        source.error(Expectation::Literal("two".into()), None);
        source.error(Expectation::Literal("one".into()), None);
        assert!(source
            .failure_message()
            .starts_with("expected 'one' or 'two', line 1:"));
    }

    #[test]
    fn keep_truncates_at_equal_position() {
        let mut source = Source::new("q");
        source.error(Expectation::Literal("inner".into()), None);
        source.error(Expectation::Literal("deeper".into()), None);
        source.error(Expectation::Described("a thing".into()), Some(0));
        assert!(source
            .failure_message()
            .starts_with("expected a thing, line 1:"));
    }

    #[test]
    fn rich_failure_short_circuits() {
        let mut source = Source::new("abc");
        source.error(Expectation::Literal("x".into()), None);
        source.error(
            Expectation::Rich(Box::new(|format_line| format_line("not today", 1))),
            None,
        );
        assert_eq!(source.failure_message(), "not today, line 1:\n    abc\n     ^");
    }

    #[test]
    fn or_list_shapes() {
        let items: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(or_list(&items[..1]), "a");
        assert_eq!(or_list(&items[..2]), "a or b");
        assert_eq!(or_list(&items), "a, b, or c");
    }
}
