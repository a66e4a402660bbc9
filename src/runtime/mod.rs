//! The matching engine and its per-match scratch state.

pub mod eval;
pub mod source;

pub use eval::run;
pub use source::Source;
