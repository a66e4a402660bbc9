//! The compiled grammar: an arena of rules plus the whitespace policy.
//!
//! Rules and their matcher graphs form cycles for any recursive grammar, so
//! rules live in an index-keyed arena and [`Matcher::Symbol`] nodes store a
//! [`RuleId`] rather than a reference. A rule is created the first time its
//! name is seen; `body` stays `None` until the rule is defined, and the
//! validation pass rejects any grammar that leaves one undefined.

pub mod matcher;

pub use matcher::{Item, Matcher, Nullability};

use regex::Regex;
use std::collections::HashMap;

/// Index of a rule inside its [`Grammar`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) usize);

#[derive(Debug)]
pub struct Rule {
    pub name: String,
    /// Expectation text from the rule's `<description>` annotation; used in
    /// error messages in place of the rule's internal expectations.
    pub description: Option<String>,
    /// True for `=` rules; terminals inside absorb trailing whitespace and
    /// the rule skips whitespace at entry.
    pub skip_ws: bool,
    pub body: Option<Matcher>,
}

/// The whitespace skipper: raw pattern text plus its compiled, anchored form.
#[derive(Debug, Clone)]
pub struct Whitespace {
    source: String,
    pattern: Regex,
}

impl Whitespace {
    pub const DEFAULT_PATTERN: &'static str = r"\s+";

    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"\A(?:{source})"))?;
        Ok(Self {
            source: source.to_string(),
            pattern,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl Default for Whitespace {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN).expect("default whitespace pattern compiles")
    }
}

#[derive(Debug, Default)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, RuleId>,
    start: Option<RuleId>,
    whitespace: Whitespace,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a rule by name, creating an undefined placeholder on first
    /// reference.
    pub fn intern(&mut self, name: &str) -> RuleId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = RuleId(self.rules.len());
        self.rules.push(Rule {
            name: name.to_string(),
            description: None,
            skip_ws: true,
            body: None,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    /// Attaches a definition to an interned rule. The first defined rule
    /// becomes the start rule. Returns false if the rule was already defined.
    pub fn define(
        &mut self,
        id: RuleId,
        description: Option<String>,
        skip_ws: bool,
        body: Matcher,
    ) -> bool {
        let rule = &mut self.rules[id.0];
        if rule.body.is_some() {
            return false;
        }
        rule.description = description;
        rule.skip_ws = skip_ws;
        rule.body = Some(body);
        if self.start.is_none() {
            self.start = Some(id);
        }
        true
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    pub fn start(&self) -> Option<RuleId> {
        self.start
    }

    pub fn whitespace(&self) -> &Whitespace {
        &self.whitespace
    }

    pub fn set_whitespace(&mut self, whitespace: Whitespace) {
        self.whitespace = whitespace;
    }
}
