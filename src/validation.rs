//! Static validation of a compiled grammar.
//!
//! Runs once after DSL parsing, before any input is matched. Checks run in
//! order and the first failing check yields the single diagnostic: undefined
//! symbols, then left recursion (which needs the nullability fixpoint), then
//! repeats over possibly-empty matchers. The pass is purely structural; no
//! input is involved.

use std::collections::BTreeSet;

use crate::grammar::{Grammar, Matcher, Nullability};

/// Validates `grammar`, returning the first diagnostic found.
pub fn validate(grammar: &Grammar) -> Result<(), String> {
    if let Some(message) = GrammarValidators::check_undefined(grammar) {
        return Err(message);
    }
    let states = GrammarValidators::compute_nullability(grammar);
    if let Some(message) = GrammarValidators::check_left_recursion(grammar, &states) {
        return Err(message);
    }
    if let Some(message) = GrammarValidators::check_nullable_repeats(grammar, &states) {
        return Err(message);
    }
    Ok(())
}

/// Each validator focuses on a single structural concern.
struct GrammarValidators;

impl GrammarValidators {
    /// Rules that were referenced but never defined.
    fn check_undefined(grammar: &Grammar) -> Option<String> {
        let undefined: Vec<&str> = grammar
            .rules()
            .filter(|(_, rule)| rule.body.is_none())
            .map(|(_, rule)| rule.name.as_str())
            .collect();
        if undefined.is_empty() {
            return None;
        }
        Some(format!("undefined {}", rules_phrase(&undefined)))
    }

    /// Three-valued nullability per rule, iterated to fixpoint. Rules left
    /// undecided sit on cycles whose base case never resolves them; they are
    /// conservatively treated as nullable.
    fn compute_nullability(grammar: &Grammar) -> Vec<Nullability> {
        let mut states = vec![Nullability::Unknown; grammar.len()];
        loop {
            let mut progress = false;
            for (id, rule) in grammar.rules() {
                if states[id.0] != Nullability::Unknown {
                    continue;
                }
                let Some(body) = &rule.body else { continue };
                let computed = body.nullability(&states);
                if computed != Nullability::Unknown {
                    states[id.0] = computed;
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }
        for state in &mut states {
            if *state == Nullability::Unknown {
                *state = Nullability::Yes;
            }
        }
        states
    }

    /// Walks each rule's leftmost positions; reaching the starting rule
    /// again means every rule on the visit chain can recurse without
    /// consuming input.
    fn check_left_recursion(grammar: &Grammar, states: &[Nullability]) -> Option<String> {
        let left: Vec<Vec<usize>> = grammar
            .rules()
            .map(|(_, rule)| {
                let mut refs = Vec::new();
                if let Some(body) = &rule.body {
                    body.left_references(states, &mut refs);
                }
                let mut ids: Vec<usize> = refs.into_iter().map(|id| id.0).collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            })
            .collect();

        let mut flagged = BTreeSet::new();
        for start in 0..grammar.len() {
            if flagged.contains(&start) {
                continue;
            }
            let mut stack = Vec::new();
            Self::find_cycle(start, start, &left, &mut stack, &mut flagged);
        }
        if flagged.is_empty() {
            return None;
        }

        let names: Vec<&str> = grammar
            .rules()
            .filter(|(id, _)| flagged.contains(&id.0))
            .map(|(_, rule)| rule.name.as_str())
            .collect();
        Some(format!("left recursion in {}", rules_phrase(&names)))
    }

    fn find_cycle(
        start: usize,
        current: usize,
        left: &[Vec<usize>],
        stack: &mut Vec<usize>,
        flagged: &mut BTreeSet<usize>,
    ) {
        for &next in &left[current] {
            if next == start {
                flagged.insert(start);
                flagged.extend(stack.iter().copied());
            } else if !stack.contains(&next) {
                stack.push(next);
                Self::find_cycle(start, next, left, stack, flagged);
                stack.pop();
            }
        }
    }

    /// Rules containing a repeat whose base is not definitely consuming.
    /// Such a repeat could loop forever without advancing the cursor.
    fn check_nullable_repeats(grammar: &Grammar, states: &[Nullability]) -> Option<String> {
        let mut offenders = Vec::new();
        for (_, rule) in grammar.rules() {
            let Some(body) = &rule.body else { continue };
            let mut found = false;
            body.walk(&mut |matcher| {
                if let Matcher::Repeat { base, .. } = matcher {
                    if base.nullability(states) != Nullability::No {
                        found = true;
                    }
                }
            });
            if found {
                offenders.push(rule.name.as_str());
            }
        }
        if offenders.is_empty() {
            return None;
        }
        Some(format!(
            "wildcard over possibly-empty matcher in {}",
            rules_phrase(&offenders)
        ))
    }
}

/// `rule x` or `rules x, y, and z` (Oxford comma).
fn rules_phrase(names: &[&str]) -> String {
    if names.len() == 1 {
        return format!("rule {}", names[0]);
    }
    format!("rules {}", name_list(names))
}

fn name_list(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} and {second}"),
        _ => {
            let (last, init) = names.split_last().expect("length checked");
            format!("{}, and {last}", init.join(", "))
        }
    }
}
