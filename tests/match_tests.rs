// tests/match_tests.rs
//
// The matching engine through the public facade: values, whitespace policy,
// action invocation, predicate gating, and failure diagnostics.

use vyaka::{compile, compile_with_actions, ActionRegistry, Value, Verdict, VyakaError};

fn token(text: &str, pos: usize) -> Value {
    Value::token(text, pos)
}

fn parse_err(parser: &mut vyaka::Parser, input: &str) -> String {
    let err = parser.parse(input).expect_err("input should be rejected");
    assert!(err.is_parse_failure());
    err.to_string()
}

// ---
// Values and whitespace policy
// ---

#[test]
fn ordered_choice_takes_the_first_match() {
    let mut parser = compile("main .= !'one' | 'two'").unwrap();
    assert_eq!(parser.parse("one").unwrap(), token("one", 0));
    assert_eq!(parser.parse("two").unwrap(), Value::List(vec![]));
    let message = parse_err(&mut parser, "three");
    assert!(message.starts_with("expected 'one' or 'two', line 1"));
}

#[test]
fn whitespace_rules_absorb_whitespace_between_terminals() {
    let mut parser = compile("main = !'one' !'two'").unwrap();
    assert_eq!(
        parser.parse("one    two").unwrap(),
        Value::List(vec![token("one", 0), token("two", 7)])
    );
}

#[test]
fn dotted_rules_require_adjacent_terminals() {
    let mut parser = compile("main .= !'one' !'two'").unwrap();
    assert_eq!(
        parser.parse("onetwo").unwrap(),
        Value::List(vec![token("one", 0), token("two", 3)])
    );
    let message = parse_err(&mut parser, "one two");
    assert!(message.starts_with("expected 'two', line 1"));
}

#[test]
fn whitespace_skipping_start_rule_absorbs_leading_whitespace() {
    let mut parser = compile("main = !'x'").unwrap();
    assert_eq!(parser.parse("   x").unwrap(), token("x", 3));
}

#[test]
fn custom_whitespace_pattern_applies() {
    let mut parser = compile("whitespace /[ ]+/ main = !'a' !'b'").unwrap();
    assert_eq!(
        parser.parse("a b").unwrap(),
        Value::List(vec![token("a", 0), token("b", 2)])
    );
    let message = parse_err(&mut parser, "a\nb");
    assert!(message.starts_with("expected 'b', line 1"));
}

#[test]
fn repeat_collects_a_list() {
    let mut parser = compile("main = 'a'+").unwrap();
    assert_eq!(
        parser.parse("aaa").unwrap(),
        Value::List(vec![token("a", 0), token("a", 1), token("a", 2)])
    );
}

#[test]
fn optional_repeat_is_empty_at_end_of_input() {
    let mut parser = compile("main = 'a' 'b'*").unwrap();
    assert_eq!(parser.parse("a").unwrap(), Value::List(vec![]));
}

#[test]
fn kept_flags_control_the_value_list() {
    // A forced-skip regex and a default-skip literal both vanish.
    let mut parser = compile("main = -/[0-9]+/ ':' !/[a-z]+/").unwrap();
    assert_eq!(parser.parse("12:ab").unwrap(), token("ab", 3));
}

// ---
// Actions
// ---

#[test]
fn replacement_builds_the_result_value() {
    let actions = ActionRegistry::new().with_replacement("number", |values| {
        Value::Number(values[0].text().unwrap().parse().unwrap())
    });
    let mut parser = compile_with_actions(
        "main = number  number <a number> = /[0-9]+/ %number",
        actions,
    )
    .unwrap();
    assert_eq!(parser.parse("250").unwrap(), Value::Number(250.0));
}

#[test]
fn replacement_can_build_a_map() {
    let actions = ActionRegistry::new().with_replacement("entry", |values| {
        let mut map = im::HashMap::new();
        map.insert(
            values[0].text().unwrap().to_string(),
            values[1].clone(),
        );
        Value::Map(map)
    });
    let mut parser = compile_with_actions("main .= /[a-z]+/ '=' /[0-9]+/ %entry", actions).unwrap();
    let result = parser.parse("n=7").unwrap();
    match result {
        Value::Map(entries) => assert_eq!(entries["n"], token("7", 2)),
        other => panic!("expected a map, got {other}"),
    }
}

#[test]
fn rebinding_identical_actions_is_idempotent() {
    let build = || {
        ActionRegistry::new().with_replacement("number", |values| {
            Value::Number(values[0].text().unwrap().parse().unwrap())
        })
    };
    let mut parser = compile_with_actions("main = /[0-9]+/ %number", build()).unwrap();
    let first = parser.parse("41").unwrap();
    parser.set_actions(build()).unwrap();
    assert_eq!(parser.parse("41").unwrap(), first);
}

#[test]
fn partial_registries_leave_other_names_unresolved() {
    let only_replacements = ActionRegistry::new().with_replacement("wrap", Value::List);
    let err = compile_with_actions("main = word:check %wrap  word = /[a-z]+/", only_replacements)
        .unwrap_err();
    assert!(matches!(err, VyakaError::MissingPredicate { .. }));
}

// ---
// Predicates
// ---

fn palindrome_actions() -> ActionRegistry {
    ActionRegistry::new().with_predicate("palindrome", |value, _| {
        let text = value.text().unwrap_or_default();
        let reversed: String = text.chars().rev().collect();
        if text == reversed {
            Verdict::Accept
        } else {
            Verdict::expect("a palindrome")
        }
    })
}

#[test]
fn predicate_vetoes_become_expectations() {
    let grammar = "main = pal  pal = word:palindrome  word <a word> = /[a-z]+/";
    let mut parser = compile_with_actions(grammar, palindrome_actions()).unwrap();
    let message = parse_err(&mut parser, "hello");
    assert!(message.starts_with("expected a palindrome"));
    assert!(parser.parse("ablewasiereisawelba").is_ok());
}

#[test]
fn predicate_sees_previously_kept_values() {
    let actions = ActionRegistry::new().with_predicate("after", |_, kept| {
        if kept.len() == 1 && kept[0].text() == Some("a") {
            Verdict::Accept
        } else {
            Verdict::expect("a value after 'a'")
        }
    });
    let mut parser =
        compile_with_actions("main = !'a' word:after  word = /[b-z]+/", actions).unwrap();
    assert!(parser.parse("a bcd").is_ok());
}

#[test]
fn rich_failures_render_their_own_message() {
    let actions = ActionRegistry::new().with_predicate("shout", |value, _| {
        let pos = value.pos().unwrap_or(0);
        Verdict::reject_with(move |format_line| format_line("words must be shouted", pos))
    });
    let mut parser = compile_with_actions("main = word:shout  word = /[a-z]+/", actions).unwrap();
    let message = parse_err(&mut parser, "abc");
    assert_eq!(message, "words must be shouted, line 1:\n    abc\n    ^");
}

// ---
// Failure diagnostics
// ---

#[test]
fn trailing_input_expects_end_of_input() {
    let mut parser = compile("main = 'hello' name  name <a name> = /[a-z]+/").unwrap();
    let message = parse_err(&mut parser, "hello abc.");
    assert!(message.starts_with("expected end of input, line 1"));
}

#[test]
fn one_or_more_fails_on_empty_input_with_its_base() {
    let mut parser = compile("main = 'a'+").unwrap();
    let message = parse_err(&mut parser, "");
    assert!(message.starts_with("expected 'a', line 1"));
}

#[test]
fn descriptions_replace_inner_expectations() {
    let mut parser = compile("main = thing  thing <a thing> = 'x' 'y'").unwrap();
    let message = parse_err(&mut parser, "zzz");
    assert!(message.starts_with("expected a thing, line 1"));
    assert!(!message.contains("'x'"));
}

#[test]
fn descriptions_yield_to_deeper_failures() {
    let mut parser = compile("main = thing  thing <a thing> = 'x' 'y'").unwrap();
    let message = parse_err(&mut parser, "x!");
    assert!(message.starts_with("expected 'y', line 1"));
    assert!(!message.contains("a thing"));
}

#[test]
fn failure_reports_the_furthest_position() {
    let mut parser = compile("main = 'ab' 'cd' | 'a' 'zz'").unwrap();
    // The first alternative consumes "ab" before failing, so its expectation
    // wins over the second alternative's earlier failure.
    let message = parse_err(&mut parser, "abxx");
    assert!(message.starts_with("expected 'cd', line 1"));
}

#[test]
fn failure_lines_and_carets_point_into_the_input() {
    let mut parser = compile("main .= !'a' ('\n' !'a')*").unwrap();
    let message = parse_err(&mut parser, "a\nb");
    assert_eq!(message, "expected 'a', line 2:\n    b\n    ^");
}

#[test]
fn every_failure_matches_the_three_line_shape() {
    let shape = regex::Regex::new(r"^.*, line \d+:\n    .*\n *\^$").unwrap();
    let cases = vec![
        ("main = 'a'+", ""),
        ("main = 'a'+", "b"),
        ("main = 'a'", "aa"),
        ("main = 'hello' /[a-z]+/", "hello abc."),
    ];
    for (grammar, input) in cases {
        let mut parser = compile(grammar).unwrap();
        let message = parse_err(&mut parser, input);
        assert!(
            shape.is_match(&message),
            "diagnostic shape broken for {grammar:?} on {input:?}: {message:?}"
        );
    }
}

#[test]
fn error_at_formats_application_diagnostics() {
    let mut parser = compile("main = !/[a-z]+/ !/[0-9]+/").unwrap();
    parser.parse("abc 123").unwrap();
    assert_eq!(
        parser.error_at("unknown name", 4),
        "unknown name, line 1:\n    abc 123\n        ^"
    );
}
