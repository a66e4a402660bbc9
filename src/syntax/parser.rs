//! Recursive-descent parser for the grammar DSL.
//!
//! Consumes the token stream and builds a [`Grammar`]. This parser is purely
//! syntactic: rule references are interned immediately but checked later by
//! the validation pass, which is also where left recursion and nullable
//! repeats are rejected.
//!
//! The meta-grammar:
//!
//! ```text
//! grammar     := ('whitespace' REGEX)? rule+
//! rule        := SYMBOL DESCRIPTION? '.'? '=' choice
//! choice      := sequence ('|' sequence)*
//! sequence    := item+ ('%' SYMBOL)?
//! item        := ('!' | '-')? matcher ('*' | '+' | '?')? (':' SYMBOL)?
//! matcher     := TEXT | REGEX | SYMBOL | '(' choice ')'
//! ```
//!
//! A SYMBOL inside a sequence followed by `=`, `.`, or a description is the
//! head of the next rule; both tokens are pushed back and the sequence ends.
//! All failures latch a single error through the lexer; parsing then unwinds
//! and no grammar is returned.

use super::lexer::{Lexer, Token, TokenKind};
use crate::errors::VyakaError;
use crate::grammar::{Grammar, Item, Matcher, Whitespace};

/// Parses grammar DSL text into an unvalidated [`Grammar`].
pub fn parse(source: &str) -> Result<Grammar, VyakaError> {
    let mut parser = GrammarParser {
        lexer: Lexer::new(source),
        grammar: Grammar::new(),
        skip_ws: true,
    };
    parser.grammar_text();
    match parser.lexer.message() {
        Some(message) => Err(VyakaError::Grammar { message }),
        None => Ok(parser.grammar),
    }
}

struct GrammarParser<'a> {
    lexer: Lexer<'a>,
    grammar: Grammar,
    /// Whitespace flag of the rule currently being parsed; stamped onto
    /// every terminal built inside its body.
    skip_ws: bool,
}

impl GrammarParser<'_> {
    fn grammar_text(&mut self) {
        self.whitespace_preamble();
        loop {
            let token = self.lexer.next();
            match token.kind {
                TokenKind::Eof => {
                    if !self.lexer.failed() && self.grammar.start().is_none() {
                        self.lexer.error("empty grammar", &token);
                    }
                    return;
                }
                TokenKind::Symbol => self.rule(token),
                _ => {
                    self.lexer.error("expected rule name", &token);
                    return;
                }
            }
        }
    }

    /// `whitespace /…/` at the top of the grammar replaces the default
    /// whitespace pattern. A leading `whitespace` symbol must be followed by
    /// a regex.
    fn whitespace_preamble(&mut self) {
        let first = self.lexer.next();
        if first.kind != TokenKind::Symbol || first.value != "whitespace" {
            self.lexer.push_back(first);
            return;
        }
        let second = self.lexer.next();
        if second.kind != TokenKind::Regex {
            self.lexer
                .error("expected regular expression after 'whitespace'", &second);
            return;
        }
        match Whitespace::new(&second.value) {
            Ok(whitespace) => self.grammar.set_whitespace(whitespace),
            Err(err) => self
                .lexer
                .error(format!("invalid regular expression: {err}"), &second),
        }
    }

    fn rule(&mut self, name: Token) {
        let id = self.grammar.intern(&name.value);
        let mut description = None;
        let mut token = self.lexer.next();
        if token.kind == TokenKind::Description {
            description = Some(token.value);
            token = self.lexer.next();
        }
        let mut skip_ws = true;
        if token.is_char('.') {
            skip_ws = false;
            token = self.lexer.next();
        }
        if !token.is_char('=') {
            self.lexer.error("missing '=' in rule definition", &token);
            return;
        }
        self.skip_ws = skip_ws;
        let Some(body) = self.choice() else {
            return;
        };
        if !self.grammar.define(id, description, skip_ws, body) {
            self.lexer
                .error(format!("duplicate rule '{}'", name.value), &name);
        }
    }

    fn choice(&mut self) -> Option<Matcher> {
        let mut alternatives = vec![self.sequence()?];
        loop {
            let token = self.lexer.next();
            if token.is_char('|') {
                alternatives.push(self.sequence()?);
            } else {
                self.lexer.push_back(token);
                break;
            }
        }
        Some(Matcher::choice(alternatives))
    }

    fn sequence(&mut self) -> Option<Matcher> {
        let mut items = Vec::new();
        while let Some(item) = self.item() {
            items.push(item);
        }
        if self.lexer.failed() {
            return None;
        }
        if items.is_empty() {
            let token = self.lexer.peek();
            self.lexer.error("empty sequence", &token);
            return None;
        }
        let mut replacement = None;
        let token = self.lexer.next();
        if token.is_char('%') {
            let action = self.lexer.next();
            if action.kind != TokenKind::Symbol {
                self.lexer
                    .error("expected replacement name after '%'", &action);
                return None;
            }
            replacement = Some(action.value);
        } else {
            self.lexer.push_back(token);
        }
        Some(Matcher::sequence(items, replacement))
    }

    /// One sequence element, or `None` when the sequence ends (or an error
    /// latched; the caller distinguishes via the lexer).
    fn item(&mut self) -> Option<Item> {
        let mut token = self.lexer.next();
        let force = if token.is_char('!') {
            token = self.lexer.next();
            Some(true)
        } else if token.is_char('-') {
            token = self.lexer.next();
            Some(false)
        } else {
            None
        };

        let mut matcher = match token.kind {
            TokenKind::Text => Matcher::text(token.value, self.skip_ws),
            TokenKind::Regex => match Matcher::regex(&token.value, self.skip_ws) {
                Ok(matcher) => matcher,
                Err(err) => {
                    self.lexer
                        .error(format!("invalid regular expression: {err}"), &token);
                    return None;
                }
            },
            TokenKind::Symbol => {
                if force.is_none() && self.at_rule_boundary() {
                    self.lexer.push_back(token);
                    return None;
                }
                Matcher::symbol(self.grammar.intern(&token.value))
            }
            TokenKind::Char if token.is_char('(') => {
                let inner = self.choice()?;
                let close = self.lexer.next();
                if !close.is_char(')') {
                    self.lexer.error("expected ')'", &close);
                    return None;
                }
                inner
            }
            _ => {
                if force.is_some() {
                    self.lexer.error("expected matcher after '!' or '-'", &token);
                } else {
                    self.lexer.push_back(token);
                }
                return None;
            }
        };

        let token = self.lexer.next();
        if token.is_char('*') {
            matcher = Matcher::repeat(matcher, true, true);
        } else if token.is_char('+') {
            matcher = Matcher::repeat(matcher, false, true);
        } else if token.is_char('?') {
            matcher = Matcher::repeat(matcher, true, false);
        } else {
            self.lexer.push_back(token);
        }

        let token = self.lexer.next();
        if token.is_char(':') {
            let name = self.lexer.next();
            if name.kind != TokenKind::Symbol {
                self.lexer.error("expected predicate name after ':'", &name);
                return None;
            }
            matcher = Matcher::predicate(matcher, name.value);
        } else {
            self.lexer.push_back(token);
        }

        let keep = force.unwrap_or_else(|| matcher.default_keep());
        Some(Item { matcher, keep })
    }

    /// True when the just-read SYMBOL starts the next rule rather than
    /// referencing one: the following token is `=`, `.`, or a description.
    fn at_rule_boundary(&mut self) -> bool {
        let next = self.lexer.peek();
        next.is_char('=') || next.is_char('.') || next.kind == TokenKind::Description
    }
}
