//! The matching engine: a backtracking recursive descent over the matcher
//! graph.
//!
//! Every matcher kind is one arm of `match_at`; `None` is the no-match
//! sentinel, and a failing matcher leaves the cursor where it found it.
//! Failure positions and expectations accumulate in the [`Source`]; no
//! message strings are built until a parse has definitively failed.
//!
//! Action and predicate names are resolved by the binder before any match
//! runs; the `expect` lookups here rely on that.

use super::source::{Expectation, Source};
use crate::actions::{ActionRegistry, Verdict};
use crate::errors::VyakaError;
use crate::grammar::{Grammar, Matcher};
use crate::value::Value;

struct MatchContext<'a> {
    grammar: &'a Grammar,
    actions: &'a ActionRegistry,
    source: Source,
}

/// Runs `grammar` against `input`, entering through the start rule's symbol
/// so a whitespace-skipping start rule absorbs leading whitespace. The root
/// value is whatever the start rule's replacement produces; the whole input
/// must be consumed.
pub fn run(grammar: &Grammar, actions: &ActionRegistry, input: &str) -> Result<Value, VyakaError> {
    let start = grammar.start().expect("validated grammar has a start rule");
    let root = Matcher::symbol(start);
    let mut ctx = MatchContext {
        grammar,
        actions,
        source: Source::new(input),
    };
    match match_at(&root, &mut ctx, &[]) {
        Some(value) if ctx.source.at_end() => Ok(value),
        Some(_) => {
            ctx.source
                .error(Expectation::Message("end of input".into()), None);
            Err(parse_failure(&ctx.source))
        }
        None => Err(parse_failure(&ctx.source)),
    }
}

fn parse_failure(source: &Source) -> VyakaError {
    VyakaError::Parse {
        message: source.failure_message(),
    }
}

/// Matches one node at the cursor. `kept` holds the values already kept by
/// the enclosing sequence; predicates receive it.
fn match_at(matcher: &Matcher, ctx: &mut MatchContext, kept: &[Value]) -> Option<Value> {
    match matcher {
        Matcher::Text { literal, skip_ws } => {
            if !ctx.source.rest().starts_with(literal.as_str()) {
                ctx.source
                    .error(Expectation::Literal(literal.clone()), None);
                return None;
            }
            let pos = ctx.source.cursor;
            ctx.source.cursor += literal.len();
            if *skip_ws {
                ctx.source
                    .skip_whitespace(ctx.grammar.whitespace().pattern());
            }
            Some(Value::token(literal.clone(), pos))
        }

        Matcher::Regex {
            pattern,
            source,
            skip_ws,
            ..
        } => match pattern.find(ctx.source.rest()) {
            Some(found) => {
                let pos = ctx.source.cursor;
                let text = found.as_str().to_string();
                ctx.source.cursor += found.end();
                if *skip_ws {
                    ctx.source
                        .skip_whitespace(ctx.grammar.whitespace().pattern());
                }
                Some(Value::token(text, pos))
            }
            None => {
                ctx.source.error(Expectation::Pattern(source.clone()), None);
                None
            }
        },

        Matcher::Symbol { rule } => {
            let rule = ctx.grammar.rule(*rule);
            let body = rule
                .body
                .as_ref()
                .expect("validated grammar has no undefined rules");
            let start = ctx.source.cursor;
            if rule.skip_ws {
                ctx.source
                    .skip_whitespace(ctx.grammar.whitespace().pattern());
            }
            // Snapshot before dispatching; on failure the description
            // replaces whatever the body recorded past this point.
            let mark = rule
                .description
                .as_ref()
                .map(|_| ctx.source.expectation_mark());
            match match_at(body, ctx, &[]) {
                Some(value) => Some(value),
                None => {
                    if let Some(description) = &rule.description {
                        ctx.source
                            .error(Expectation::Described(description.clone()), mark);
                    }
                    ctx.source.cursor = start;
                    None
                }
            }
        }

        Matcher::Sequence { items, replacement } => {
            let start = ctx.source.cursor;
            let mut collected = Vec::new();
            for item in items {
                match match_at(&item.matcher, ctx, &collected) {
                    Some(value) => {
                        if item.keep {
                            collected.push(value);
                        }
                    }
                    None => {
                        ctx.source.cursor = start;
                        return None;
                    }
                }
            }
            Some(apply_replacement(ctx, replacement.as_deref(), collected))
        }

        Matcher::Choice { alternatives } => {
            let start = ctx.source.cursor;
            for alternative in alternatives {
                ctx.source.cursor = start;
                if let Some(value) = match_at(alternative, ctx, kept) {
                    return Some(value);
                }
            }
            ctx.source.cursor = start;
            None
        }

        Matcher::Repeat {
            base,
            zero_ok,
            multiple_ok,
        } => {
            let mut collected = Vec::new();
            loop {
                // At end of input, stop once the repeat is satisfiable;
                // terminates zero-length loops even if a nullable base were
                // ever to slip past validation.
                if ctx.source.at_end() && (*zero_ok || !collected.is_empty()) {
                    break;
                }
                match match_at(base, ctx, kept) {
                    Some(value) => {
                        collected.push(value);
                        if !*multiple_ok {
                            break;
                        }
                    }
                    None => break,
                }
            }
            if !*zero_ok && collected.is_empty() {
                return None;
            }
            Some(Value::List(collected))
        }

        Matcher::Predicate { base, name } => {
            let start = ctx.source.cursor;
            let value = match_at(base, ctx, kept)?;
            let predicate = ctx
                .actions
                .predicate(name)
                .expect("predicate bound before matching")
                .clone();
            match (*predicate)(&value, kept) {
                Verdict::Accept => Some(value),
                Verdict::Expect(text) => {
                    ctx.source.error(Expectation::Message(text), None);
                    ctx.source.cursor = start;
                    None
                }
                Verdict::Reject(render) => {
                    ctx.source.error(Expectation::Rich(render), None);
                    ctx.source.cursor = start;
                    None
                }
            }
        }
    }
}

/// A named replacement receives the kept values; without one, a sequence
/// with exactly one kept item unwraps it (the parenthesised-expression
/// default) and any other sequence yields the list itself.
fn apply_replacement(
    ctx: &MatchContext,
    replacement: Option<&str>,
    mut collected: Vec<Value>,
) -> Value {
    match replacement {
        Some(name) => {
            let function = ctx
                .actions
                .replacement(name)
                .expect("replacement bound before matching");
            (**function)(collected)
        }
        None if collected.len() == 1 => collected.pop().expect("length checked"),
        None => Value::List(collected),
    }
}
