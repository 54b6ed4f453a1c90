//! Rule parser: tokens into a pooled rule IR.
//!
//! Expressions live in one growable pool and refer to each other by
//! [`ExprId`] index, so any grammar size works.

use rill_core::Diagnostics;

use crate::lexer::{PegToken, PegTokenKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Rule { name: String, cases: Vec<ExprId> },
    Seq(Vec<ExprId>),
    Choice(Vec<ExprId>),
    Group(ExprId),
    Star(ExprId),
    Plus(ExprId),
    Opt(ExprId),
    Ident(String),
    Str(String),
    Regex(String),
}

/// The parsed grammar: expression pool plus the rule list.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pool: Vec<Expr>,
    pub rules: Vec<ExprId>,
}

impl RuleSet {
    pub fn push(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.pool.len() as u32);
        self.pool.push(expr);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.pool[id.index()]
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|&id| match self.expr(id) {
            Expr::Rule { name, .. } => name.as_str(),
            _ => unreachable!("rules list only holds rule nodes"),
        })
    }

    /// Indented dump for tests and debugging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for &rule in &self.rules {
            self.dump_expr(rule, 0, &mut out);
        }
        out
    }

    fn dump_expr(&self, id: ExprId, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match self.expr(id) {
            Expr::Rule { name, cases } => {
                out.push_str(&format!("{pad}rule {name}\n"));
                for &case in cases {
                    self.dump_expr(case, indent + 1, out);
                }
            }
            Expr::Seq(items) => {
                out.push_str(&format!("{pad}seq\n"));
                for &item in items {
                    self.dump_expr(item, indent + 1, out);
                }
            }
            Expr::Choice(options) => {
                out.push_str(&format!("{pad}choice\n"));
                for &option in options {
                    self.dump_expr(option, indent + 1, out);
                }
            }
            Expr::Group(inner) => {
                out.push_str(&format!("{pad}group\n"));
                self.dump_expr(*inner, indent + 1, out);
            }
            Expr::Star(inner) => {
                out.push_str(&format!("{pad}star\n"));
                self.dump_expr(*inner, indent + 1, out);
            }
            Expr::Plus(inner) => {
                out.push_str(&format!("{pad}plus\n"));
                self.dump_expr(*inner, indent + 1, out);
            }
            Expr::Opt(inner) => {
                out.push_str(&format!("{pad}opt\n"));
                self.dump_expr(*inner, indent + 1, out);
            }
            Expr::Ident(name) => out.push_str(&format!("{pad}ident {name}\n")),
            Expr::Str(text) => out.push_str(&format!("{pad}str '{text}'\n")),
            Expr::Regex(text) => out.push_str(&format!("{pad}regex /{text}/\n")),
        }
    }
}

#[derive(Debug)]
pub struct ParseResult {
    pub rules: RuleSet,
    pub had_error: bool,
}

pub fn parse(tokens: Vec<PegToken>, diag: &mut Diagnostics) -> ParseResult {
    let mut parser = Parser {
        tokens,
        pos: 0,
        rules: RuleSet::default(),
        diag,
        had_error: false,
    };
    parser.run();
    ParseResult {
        had_error: parser.had_error,
        rules: parser.rules,
    }
}

struct Parser<'d> {
    tokens: Vec<PegToken>,
    pos: usize,
    rules: RuleSet,
    diag: &'d mut Diagnostics,
    had_error: bool,
}

impl Parser<'_> {
    fn current(&self) -> &PegTokenKind {
        &self.tokens[self.pos].kind
    }

    fn at_end(&self) -> bool {
        matches!(self.current(), PegTokenKind::End)
    }

    fn bump(&mut self) -> PegToken {
        let token = self.tokens[self.pos].clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &PegTokenKind) -> bool {
        if std::mem::discriminant(self.current()) == std::mem::discriminant(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.had_error = true;
        let span = self.tokens[self.pos].span;
        self.diag.error(msg, span).emit();
    }

    /// Skip to the `;` ending the broken rule.
    fn sync_to_semi(&mut self) {
        while !self.at_end() && !matches!(self.current(), PegTokenKind::Semi) {
            self.pos += 1;
        }
        self.eat(&PegTokenKind::Semi);
    }

    fn run(&mut self) {
        while !self.at_end() {
            if let Some(rule) = self.rule() {
                self.rules.rules.push(rule);
            } else {
                self.sync_to_semi();
            }
        }
    }

    /// `IDENT ('->' case)+ ';'`
    fn rule(&mut self) -> Option<ExprId> {
        let name = match self.bump().kind {
            PegTokenKind::Ident(name) => name,
            _ => {
                self.error("expected rule name");
                return None;
            }
        };

        let mut cases = Vec::new();
        while self.eat(&PegTokenKind::Arrow) {
            cases.push(self.alternative()?);
        }
        if cases.is_empty() {
            self.error("rule has no '->' cases");
            return None;
        }

        if !self.eat(&PegTokenKind::Semi) {
            self.error("expected ';' after rule");
            return None;
        }

        Some(self.rules.push(Expr::Rule { name, cases }))
    }

    /// `seq ('|' seq)*`
    fn alternative(&mut self) -> Option<ExprId> {
        let first = self.sequence()?;
        if !matches!(self.current(), PegTokenKind::Or) {
            return Some(first);
        }

        let mut options = vec![first];
        while self.eat(&PegTokenKind::Or) {
            options.push(self.sequence()?);
        }
        Some(self.rules.push(Expr::Choice(options)))
    }

    /// `item+` until a delimiter.
    fn sequence(&mut self) -> Option<ExprId> {
        let mut items = Vec::new();
        loop {
            match self.current() {
                PegTokenKind::Arrow
                | PegTokenKind::Semi
                | PegTokenKind::Or
                | PegTokenKind::RParen
                | PegTokenKind::End => break,
                _ => items.push(self.item()?),
            }
        }

        match items.len() {
            0 => {
                self.error("expected a rule item");
                None
            }
            1 => Some(items[0]),
            _ => Some(self.rules.push(Expr::Seq(items))),
        }
    }

    /// `primary ('*' | '+' | '?')*`
    fn item(&mut self) -> Option<ExprId> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&PegTokenKind::Star) {
                expr = self.rules.push(Expr::Star(expr));
            } else if self.eat(&PegTokenKind::Plus) {
                expr = self.rules.push(Expr::Plus(expr));
            } else if self.eat(&PegTokenKind::Question) {
                expr = self.rules.push(Expr::Opt(expr));
            } else {
                break;
            }
        }
        Some(expr)
    }

    /// `IDENT | 'string' | /regex/ | '(' alternative ')'`
    fn primary(&mut self) -> Option<ExprId> {
        match self.bump().kind {
            PegTokenKind::Ident(name) => Some(self.rules.push(Expr::Ident(name))),
            PegTokenKind::Str(text) => Some(self.rules.push(Expr::Str(text))),
            PegTokenKind::Regex(text) => Some(self.rules.push(Expr::Regex(text))),
            PegTokenKind::LParen => {
                let inner = self.alternative()?;
                if !self.eat(&PegTokenKind::RParen) {
                    self.error("expected ')'");
                    return None;
                }
                Some(self.rules.push(Expr::Group(inner)))
            }
            other => {
                self.error(format!("unexpected token: {other}"));
                None
            }
        }
    }
}
