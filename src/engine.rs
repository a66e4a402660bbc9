//! Public facade: compile a grammar once, run it against many inputs.
//!
//! The pipeline is strictly layered: Lex/Parse -> Validate -> Bind -> Match.
//! Compilation and validation happen in [`compile`]; binding happens eagerly
//! when actions are supplied and lazily (against the current, possibly
//! empty, registry) on the first [`Parser::parse`] otherwise, so a grammar
//! that never names an action works without any registry at all.

use crate::actions::{self, ActionRegistry};
use crate::diagnostics::format_at;
use crate::errors::VyakaError;
use crate::grammar::Grammar;
use crate::runtime;
use crate::syntax;
use crate::validation;
use crate::value::Value;

/// Compiles and validates grammar DSL text into a ready [`Parser`] with no
/// actions bound.
pub fn compile(grammar_text: &str) -> Result<Parser, VyakaError> {
    let grammar = syntax::parse(grammar_text)?;
    validation::validate(&grammar).map_err(VyakaError::grammar)?;
    Ok(Parser {
        grammar,
        actions: ActionRegistry::new(),
        bound: false,
        last_input: None,
    })
}

/// [`compile`], then bind `actions` eagerly.
pub fn compile_with_actions(
    grammar_text: &str,
    actions: ActionRegistry,
) -> Result<Parser, VyakaError> {
    let mut parser = compile(grammar_text)?;
    parser.set_actions(actions)?;
    Ok(parser)
}

/// A compiled grammar plus its bound actions.
///
/// `parse` takes `&mut self`: the parser retains the most recent input for
/// [`Parser::error_at`], so a match and a rebind can never interleave.
#[derive(Debug)]
pub struct Parser {
    grammar: Grammar,
    actions: ActionRegistry,
    bound: bool,
    last_input: Option<String>,
}

impl Parser {
    /// Replaces the action bindings. Every replacement and predicate name
    /// the grammar references must resolve in the new registry.
    pub fn set_actions(&mut self, actions: ActionRegistry) -> Result<(), VyakaError> {
        actions::bind(&self.grammar, &actions)?;
        self.actions = actions;
        self.bound = true;
        Ok(())
    }

    /// Matches `input` against the grammar. Configuration failures (unbound
    /// action names) and input parse failures come back through the same
    /// `Result`, distinguishable by variant; a parse failure's message is
    /// the complete three-line diagnostic.
    pub fn parse(&mut self, input: &str) -> Result<Value, VyakaError> {
        if !self.bound {
            actions::bind(&self.grammar, &self.actions)?;
            self.bound = true;
        }
        self.last_input = Some(input.to_string());
        runtime::run(&self.grammar, &self.actions, input)
    }

    /// Formats an application-level diagnostic against the most recently
    /// parsed input, in the same three-line shape as match failures.
    pub fn error_at(&self, message: &str, pos: usize) -> String {
        format_at(message, self.last_input.as_deref().unwrap_or(""), pos)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }
}
