//! Unified error type for every vyaka failure mode.
//!
//! Three failure channels share one enum, distinguished by variant:
//! configuration failures from compiling a grammar ([`VyakaError::Grammar`]),
//! configuration failures from binding actions ([`VyakaError::MissingReplacement`],
//! [`VyakaError::MissingPredicate`]), and parse failures on user input
//! ([`VyakaError::Parse`]). Grammar and parse messages arrive already
//! formatted by [`crate::diagnostics::format_at`] where a source position is
//! known, so `Display` reproduces them verbatim.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum VyakaError {
    /// The grammar text failed to lex, parse, or validate.
    #[error("{message}")]
    #[diagnostic(code(vyaka::grammar))]
    Grammar { message: String },

    /// A sequence names a replacement function the registry does not hold.
    #[error("missing replacement function '{name}'")]
    #[diagnostic(
        code(vyaka::binding),
        help("register the function with ActionRegistry::with_replacement before binding")
    )]
    MissingReplacement { name: String },

    /// A predicate matcher names a function the registry does not hold.
    #[error("missing predicate function '{name}'")]
    #[diagnostic(
        code(vyaka::binding),
        help("register the function with ActionRegistry::with_predicate before binding")
    )]
    MissingPredicate { name: String },

    /// The input did not match the grammar. The message is the full
    /// three-line diagnostic built from the furthest-failure record.
    #[error("{message}")]
    #[diagnostic(code(vyaka::parse))]
    Parse { message: String },
}

impl VyakaError {
    pub fn grammar(message: impl Into<String>) -> Self {
        Self::Grammar {
            message: message.into(),
        }
    }

    /// True for input-match failures, false for configuration failures.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
