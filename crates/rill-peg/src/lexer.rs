//! Scanner for rule files.

use logos::Logos;

use rill_core::{Diagnostics, Span};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"#[^\n]*", allow_greedy = true))]
#[logos(skip(r"=[^\n]*", allow_greedy = true))]
enum RawToken<'src> {
    #[token("->")]
    Arrow,
    #[token("|")]
    Or,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,
    #[token(";")]
    Semi,

    #[regex(r"'[^'\n]*'")]
    Str(&'src str),

    #[regex(r"/[^/\n]*/")]
    Regex(&'src str),

    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Ident(&'src str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PegTokenKind {
    Arrow,
    Or,
    LParen,
    RParen,
    Star,
    Plus,
    Question,
    Semi,
    Str(String),
    Regex(String),
    Ident(String),
    End,
}

impl std::fmt::Display for PegTokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PegTokenKind::Arrow => f.write_str("->"),
            PegTokenKind::Or => f.write_str("|"),
            PegTokenKind::LParen => f.write_str("("),
            PegTokenKind::RParen => f.write_str(")"),
            PegTokenKind::Star => f.write_str("*"),
            PegTokenKind::Plus => f.write_str("+"),
            PegTokenKind::Question => f.write_str("?"),
            PegTokenKind::Semi => f.write_str(";"),
            PegTokenKind::Str(s) => write!(f, "'{s}'"),
            PegTokenKind::Regex(s) => write!(f, "/{s}/"),
            PegTokenKind::Ident(s) => f.write_str(s),
            PegTokenKind::End => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PegToken {
    pub kind: PegTokenKind,
    pub span: Span,
}

/// Scans rule text into an `End`-terminated token vector. Bad characters are
/// diagnosed and skipped; a lone `-` gets its own hint.
pub fn scan(source: &str, diag: &mut Diagnostics) -> Vec<PegToken> {
    let mut tokens = Vec::new();
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let span = Span::from(raw.span());
        let kind = match result {
            Ok(RawToken::Arrow) => PegTokenKind::Arrow,
            Ok(RawToken::Or) => PegTokenKind::Or,
            Ok(RawToken::LParen) => PegTokenKind::LParen,
            Ok(RawToken::RParen) => PegTokenKind::RParen,
            Ok(RawToken::Star) => PegTokenKind::Star,
            Ok(RawToken::Plus) => PegTokenKind::Plus,
            Ok(RawToken::Question) => PegTokenKind::Question,
            Ok(RawToken::Semi) => PegTokenKind::Semi,
            Ok(RawToken::Str(text)) => PegTokenKind::Str(text[1..text.len() - 1].to_owned()),
            Ok(RawToken::Regex(text)) => PegTokenKind::Regex(text[1..text.len() - 1].to_owned()),
            Ok(RawToken::Ident(text)) => PegTokenKind::Ident(text.to_owned()),
            Err(()) => {
                if raw.slice() == "-" {
                    diag.error("dangling '-' token, did you mean '->'?", span).emit();
                } else {
                    diag.error("bad token", span).emit();
                }
                continue;
            }
        };
        tokens.push(PegToken { kind, span });
    }

    tokens.push(PegToken {
        kind: PegTokenKind::End,
        span: Span::empty(source.len() as u32),
    });
    tokens
}
