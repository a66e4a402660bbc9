//! Vyaka - a backtracking PEG parser library.
//!
//! A grammar is written in a compact textual DSL, compiled into an in-memory
//! matcher graph, statically validated, and then run against input strings.
//! Terminals are literal strings and anchored regular expressions; rules may
//! carry semantic actions (replacements) and validation predicates supplied
//! by the host through an [`ActionRegistry`].
//!
//! ```
//! use vyaka::{compile_with_actions, ActionRegistry, Value};
//!
//! let actions = ActionRegistry::new().with_replacement("number", |values| {
//!     Value::Number(values[0].text().unwrap().parse().unwrap())
//! });
//! let mut parser = compile_with_actions(
//!     "main = number  number <a number> = /[0-9]+/ %number",
//!     actions,
//! )
//! .unwrap();
//!
//! assert_eq!(parser.parse("250").unwrap(), Value::Number(250.0));
//! ```

pub use crate::actions::{ActionRegistry, Verdict};
pub use crate::engine::{compile, compile_with_actions, Parser};
pub use crate::errors::VyakaError;
pub use crate::value::Value;

pub mod actions;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod grammar;
pub mod runtime;
pub mod syntax;
pub mod validation;
pub mod value;
