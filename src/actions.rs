//! Named host functions and the binder that resolves them.
//!
//! The registry is the single source of truth for semantic actions: sequence
//! replacements (`%name` in the DSL) and validation predicates (`:name`).
//! Functions are `Rc` closures so hosts can capture state; matching is
//! single-threaded, so no `Send` bounds.

use std::fmt;
use std::rc::Rc;

use im::HashMap;

use crate::errors::VyakaError;
use crate::grammar::{Grammar, Matcher};
use crate::value::Value;

/// A sequence replacement: receives the kept values, returns the sequence's
/// value.
pub type ReplacementFn = Rc<dyn Fn(Vec<Value>) -> Value>;

/// A validation predicate: receives the matched value and the values already
/// kept by the enclosing sequence.
pub type PredicateFn = Rc<dyn Fn(&Value, &[Value]) -> Verdict>;

/// Formats a message and input position into a full diagnostic; handed to
/// rich failures so they can render themselves against the current input.
pub type FormatLine<'a> = &'a dyn Fn(&str, usize) -> String;

/// A self-formatting predicate failure; short-circuits the expectation list.
pub type RichFailure = Box<dyn Fn(FormatLine) -> String>;

/// What a predicate decides about a matched value.
pub enum Verdict {
    /// The value stands; the match proceeds.
    Accept,
    /// The value is vetoed; the text joins the expectation list ("expected
    /// a palindrome").
    Expect(String),
    /// The value is vetoed and the failure renders its own message.
    Reject(RichFailure),
}

impl Verdict {
    pub fn expect(text: impl Into<String>) -> Self {
        Verdict::Expect(text.into())
    }

    pub fn reject_with(message: impl Fn(FormatLine) -> String + 'static) -> Self {
        Verdict::Reject(Box::new(message))
    }
}

impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "Accept"),
            Verdict::Expect(text) => write!(f, "Expect({text:?})"),
            Verdict::Reject(_) => write!(f, "Reject(..)"),
        }
    }
}

/// Registry of replacement and predicate functions, inspectable at runtime.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    replacements: HashMap<String, ReplacementFn>,
    predicates: HashMap<String, PredicateFn>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ActionRegistry::register_replacement`].
    pub fn with_replacement(
        mut self,
        name: &str,
        function: impl Fn(Vec<Value>) -> Value + 'static,
    ) -> Self {
        self.register_replacement(name, Rc::new(function));
        self
    }

    /// Builder form of [`ActionRegistry::register_predicate`].
    pub fn with_predicate(
        mut self,
        name: &str,
        function: impl Fn(&Value, &[Value]) -> Verdict + 'static,
    ) -> Self {
        self.register_predicate(name, Rc::new(function));
        self
    }

    pub fn register_replacement(&mut self, name: &str, function: ReplacementFn) {
        self.replacements.insert(name.to_string(), function);
    }

    pub fn register_predicate(&mut self, name: &str, function: PredicateFn) {
        self.predicates.insert(name.to_string(), function);
    }

    pub fn replacement(&self, name: &str) -> Option<&ReplacementFn> {
        self.replacements.get(name)
    }

    pub fn predicate(&self, name: &str) -> Option<&PredicateFn> {
        self.predicates.get(name)
    }

    pub fn list_replacements(&self) -> Vec<String> {
        self.replacements.keys().cloned().collect()
    }

    pub fn list_predicates(&self) -> Vec<String> {
        self.predicates.keys().cloned().collect()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("replacements", &self.list_replacements())
            .field("predicates", &self.list_predicates())
            .finish()
    }
}

/// The binder: checks that every replacement and predicate name the grammar
/// references resolves in `actions`. Sequences without a replacement name
/// need no entry; they fall back to the unwrap-single-kept-item or
/// identity-on-list default at match time.
pub fn bind(grammar: &Grammar, actions: &ActionRegistry) -> Result<(), VyakaError> {
    for (_, rule) in grammar.rules() {
        let Some(body) = &rule.body else { continue };
        let mut missing = None;
        body.walk(&mut |matcher| {
            if missing.is_some() {
                return;
            }
            match matcher {
                Matcher::Sequence {
                    replacement: Some(name),
                    ..
                } if actions.replacement(name).is_none() => {
                    missing = Some(VyakaError::MissingReplacement { name: name.clone() });
                }
                Matcher::Predicate { name, .. } if actions.predicate(name).is_none() => {
                    missing = Some(VyakaError::MissingPredicate { name: name.clone() });
                }
                _ => {}
            }
        });
        if let Some(err) = missing {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn registry_lookup_and_listing() {
        let actions = ActionRegistry::new()
            .with_replacement("first", |mut values| values.remove(0))
            .with_predicate("always", |_, _| Verdict::Accept);
        assert!(actions.replacement("first").is_some());
        assert!(actions.replacement("second").is_none());
        assert_eq!(actions.list_predicates(), vec!["always".to_string()]);
    }

    #[test]
    fn binder_reports_missing_functions() {
        let grammar = parse("main = 'a' %build").unwrap();
        let err = bind(&grammar, &ActionRegistry::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing replacement function 'build'");

        let grammar = parse("main = word:check  word = /[a-z]+/").unwrap();
        let err = bind(&grammar, &ActionRegistry::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing predicate function 'check'");
    }

    #[test]
    fn binder_accepts_resolved_names() {
        let grammar = parse("main = 'a' %build").unwrap();
        let actions = ActionRegistry::new().with_replacement("build", |_| Value::Nil);
        assert!(bind(&grammar, &actions).is_ok());
    }
}
