//! Rust source emission.
//!
//! Two outputs, written by the driver to the files it names (the rules file
//! expects the token file as a sibling module called `tokens`):
//!
//! - the token file: a `TokenKind` enum with one variant per distinct
//!   terminal, a longest-match `match_token`, and a whitespace-skipping
//!   `tokenize`
//! - the rules file: one `parse_<rule>` function per rule, with numbered
//!   helper functions for nested constructs; every helper restores the
//!   position on failure so alternatives can backtrack

use std::collections::HashSet;
use std::fmt::Write;

use crate::parser::{Expr, ExprId, RuleSet};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("reference to unknown rule '{0}'")]
    UnknownRule(String),
    #[error("rule '{0}' is defined twice")]
    DuplicateRule(String),
}

#[derive(Debug, Clone)]
pub struct GeneratedParser {
    pub tokens_source: String,
    pub rules_source: String,
}

/// Generates both sources from a parsed rule set.
pub fn emit(rules: &RuleSet) -> Result<GeneratedParser, EmitError> {
    let mut emitter = Emitter {
        rules,
        rule_names: HashSet::new(),
        literals: Vec::new(),
        regexes: Vec::new(),
        helpers: String::new(),
        helper_count: 0,
    };

    for name in rules.rule_names() {
        if !emitter.rule_names.insert(name.to_owned()) {
            return Err(EmitError::DuplicateRule(name.to_owned()));
        }
    }
    for &rule in &rules.rules {
        emitter.collect_terminals(rule);
    }

    let rules_source = emitter.emit_rules()?;
    let tokens_source = emitter.emit_tokens();

    Ok(GeneratedParser {
        tokens_source,
        rules_source,
    })
}

struct Emitter<'a> {
    rules: &'a RuleSet,
    rule_names: HashSet<String>,
    /// Distinct string terminals, in order of first appearance.
    literals: Vec<String>,
    /// Distinct regex terminals, numbered after the literals.
    regexes: Vec<String>,
    helpers: String,
    helper_count: usize,
}

impl Emitter<'_> {
    fn collect_terminals(&mut self, id: ExprId) {
        match self.rules.expr(id) {
            Expr::Rule { cases, .. } => {
                for &case in cases {
                    self.collect_terminals(case);
                }
            }
            Expr::Seq(items) | Expr::Choice(items) => {
                for &item in items {
                    self.collect_terminals(item);
                }
            }
            Expr::Group(inner) | Expr::Star(inner) | Expr::Plus(inner) | Expr::Opt(inner) => {
                self.collect_terminals(*inner);
            }
            Expr::Str(text) => {
                if !self.literals.contains(text) {
                    self.literals.push(text.clone());
                }
            }
            Expr::Regex(text) => {
                if !self.regexes.contains(text) {
                    self.regexes.push(text.clone());
                }
            }
            Expr::Ident(_) => {}
        }
    }

    fn literal_kind(&self, text: &str) -> String {
        let index = self
            .literals
            .iter()
            .position(|l| l == text)
            .expect("terminal was collected");
        format!("TokenKind::Tok{index:03}")
    }

    fn regex_kind(&self, text: &str) -> String {
        let index = self
            .regexes
            .iter()
            .position(|r| r == text)
            .expect("terminal was collected");
        format!("TokenKind::Tok{:03}", self.literals.len() + index)
    }

    // --- token file ---

    fn emit_tokens(&self) -> String {
        let mut out = String::from(
            "//! Token kinds and matcher. Generated by rill-peg, do not edit.\n\n\
             use once_cell::sync::Lazy;\n\
             use regex::Regex;\n\n\
             #[derive(Debug, Clone, Copy, PartialEq, Eq)]\n\
             pub enum TokenKind {\n",
        );
        for i in 0..self.literals.len() + self.regexes.len() {
            let _ = writeln!(out, "    Tok{i:03},");
        }
        out.push_str("}\n\n");

        let _ = writeln!(
            out,
            "static REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {{\n    vec!["
        );
        for regex in &self.regexes {
            let escaped = regex.replace('\\', "\\\\").replace('"', "\\\"");
            let _ = writeln!(
                out,
                "        Regex::new(\"^(?:{escaped})\").expect(\"generated pattern compiles\"),"
            );
        }
        out.push_str("    ]\n});\n\n");

        out.push_str("/// Longest match at the start of `input`.\n");
        out.push_str("pub fn match_token(input: &str) -> Option<(TokenKind, usize)> {\n");
        out.push_str("    let mut best: Option<(TokenKind, usize)> = None;\n");
        if !self.literals.is_empty() {
            out.push_str("    let literals = [\n");
            for (i, literal) in self.literals.iter().enumerate() {
                let escaped = literal.replace('\\', "\\\\").replace('"', "\\\"");
                let _ = writeln!(out, "        (\"{escaped}\", TokenKind::Tok{i:03}),");
            }
            out.push_str("    ];\n");
            out.push_str(
                "    for (text, kind) in literals {\n\
                 \x20       if input.starts_with(text) && best.is_none_or(|(_, len)| text.len() > len) {\n\
                 \x20           best = Some((kind, text.len()));\n\
                 \x20       }\n\
                 \x20   }\n",
            );
        }
        if !self.regexes.is_empty() {
            let base = self.literals.len();
            let _ = writeln!(
                out,
                "    let regex_kinds = [{}];",
                (0..self.regexes.len())
                    .map(|i| format!("TokenKind::Tok{:03}", base + i))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            out.push_str(
                "    for (re, kind) in REGEXES.iter().zip(regex_kinds) {\n\
                 \x20       if let Some(m) = re.find(input) {\n\
                 \x20           if best.is_none_or(|(_, len)| m.end() > len) {\n\
                 \x20               best = Some((kind, m.end()));\n\
                 \x20           }\n\
                 \x20       }\n\
                 \x20   }\n",
            );
        }
        out.push_str("    best.filter(|&(_, len)| len > 0)\n}\n\n");

        out.push_str(
            "/// Whole-input tokenization, skipping whitespace. `None` on the first\n\
             /// unmatchable byte.\n\
             pub fn tokenize(source: &str) -> Option<Vec<TokenKind>> {\n\
             \x20   let mut tokens = Vec::new();\n\
             \x20   let mut rest = source.trim_start();\n\
             \x20   while !rest.is_empty() {\n\
             \x20       let (kind, len) = match_token(rest)?;\n\
             \x20       tokens.push(kind);\n\
             \x20       rest = rest[len..].trim_start();\n\
             \x20   }\n\
             \x20   Some(tokens)\n\
             }\n",
        );
        out
    }

    // --- rules file ---

    fn emit_rules(&mut self) -> Result<String, EmitError> {
        let mut out = String::from(
            "//! Rule parsers. Generated by rill-peg, do not edit.\n\n\
             use super::tokens::TokenKind;\n\n\
             fn eat(tokens: &[TokenKind], pos: &mut usize, kind: TokenKind) -> bool {\n\
             \x20   if tokens.get(*pos) == Some(&kind) {\n\
             \x20       *pos += 1;\n\
             \x20       true\n\
             \x20   } else {\n\
             \x20       false\n\
             \x20   }\n\
             }\n\n",
        );

        for &rule in &self.rules.rules {
            let Expr::Rule { name, cases } = self.rules.expr(rule) else {
                unreachable!("rules list only holds rule nodes");
            };

            self.helpers.clear();
            self.helper_count = 0;

            let mut body = String::new();
            let _ = writeln!(
                body,
                "pub fn parse_{name}(tokens: &[TokenKind], pos: &mut usize) -> bool {{"
            );
            body.push_str("    let start = *pos;\n");
            for &case in cases {
                let case_expr = self.compile(name, case)?;
                let _ = writeln!(body, "    if {case_expr} {{\n        return true;\n    }}");
                body.push_str("    *pos = start;\n");
            }
            body.push_str("    false\n}\n\n");

            out.push_str(&body);
            out.push_str(&self.helpers);
        }

        Ok(out)
    }

    /// Compiles one expression to a boolean Rust expression, appending
    /// helper functions as needed. Every produced expression leaves the
    /// position untouched on failure.
    fn compile(&mut self, rule: &str, id: ExprId) -> Result<String, EmitError> {
        match self.rules.expr(id) {
            Expr::Rule { .. } => unreachable!("rules never nest"),

            Expr::Ident(name) => {
                if !self.rule_names.contains(name) {
                    return Err(EmitError::UnknownRule(name.clone()));
                }
                Ok(format!("parse_{name}(tokens, pos)"))
            }

            Expr::Str(text) => {
                let kind = self.literal_kind(&text.clone());
                Ok(format!("eat(tokens, pos, {kind})"))
            }
            Expr::Regex(text) => {
                let kind = self.regex_kind(&text.clone());
                Ok(format!("eat(tokens, pos, {kind})"))
            }

            Expr::Group(inner) => self.compile(rule, *inner),

            Expr::Seq(items) => {
                let items = items.clone();
                let mut body = String::from("    let start = *pos;\n");
                for item in items {
                    let item_expr = self.compile(rule, item)?;
                    let _ = writeln!(
                        body,
                        "    if !{item_expr} {{\n        *pos = start;\n        return false;\n    }}"
                    );
                }
                body.push_str("    true\n");
                Ok(self.helper(rule, &body))
            }

            Expr::Choice(options) => {
                let options = options.clone();
                let mut body = String::from("    let start = *pos;\n");
                for option in options {
                    let option_expr = self.compile(rule, option)?;
                    let _ = writeln!(
                        body,
                        "    if {option_expr} {{\n        return true;\n    }}\n    *pos = start;"
                    );
                }
                body.push_str("    false\n");
                Ok(self.helper(rule, &body))
            }

            Expr::Star(inner) => {
                let inner_expr = self.compile(rule, *inner)?;
                let body = format!("    while {inner_expr} {{}}\n    true\n");
                Ok(self.helper(rule, &body))
            }

            Expr::Plus(inner) => {
                let inner_expr = self.compile(rule, *inner)?;
                let body = format!(
                    "    if !{inner_expr} {{\n        return false;\n    }}\n    while {inner_expr} {{}}\n    true\n"
                );
                Ok(self.helper(rule, &body))
            }

            Expr::Opt(inner) => {
                let inner_expr = self.compile(rule, *inner)?;
                let body = format!("    let _ = {inner_expr};\n    true\n");
                Ok(self.helper(rule, &body))
            }
        }
    }

    /// Wraps a compiled body into the next numbered helper for `rule` and
    /// returns the call expression.
    fn helper(&mut self, rule: &str, body: &str) -> String {
        let name = format!("{rule}_part{}", self.helper_count);
        self.helper_count += 1;

        self.helpers.push_str(&format!(
            "fn {name}(tokens: &[TokenKind], pos: &mut usize) -> bool {{\n{body}}}\n\n"
        ));
        format!("{name}(tokens, pos)")
    }
}
