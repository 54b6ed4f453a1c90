//! Lexer for Rill source text.
//!
//! A `logos`-derived raw token layer does the byte munching; [`lex`] rescans
//! the raw stream to produce the token vector the parser consumes:
//!
//! - line tracking (tokens carry 0-based line numbers)
//! - automatic semicolon insertion at newlines
//! - keyword recognition over identifiers
//! - numeric literal parsing (decimal, `0b`, `0o`, `0x`, underscores dropped)
//! - single-quoted strings, recovering from embedded newlines and EOF
//! - unknown characters coalesced into one diagnostic per run
//!
//! The lexer never fails: malformed input produces diagnostics and the scan
//! continues past the offending lexeme.

use logos::Logos;

use rill_core::{Diagnostics, Span};

/// One token: kind plus source position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(test, derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    /// 0-based source line.
    pub line: u32,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum TokenKind {
    // keywords
    Alloc,
    And,
    Break,
    Case,
    Co,
    Continue,
    Defer,
    Do,
    Dont,
    Else,
    Elif,
    Fall,
    False,
    Final,
    For,
    Free,
    If,
    In,
    Is,
    Include,
    Map,
    Match,
    Nil,
    Not,
    Or,
    Package,
    Protocol,
    Protect,
    Pub,
    Return,
    Static,
    Struct,
    Sumtype,
    Test,
    True,
    Vec,
    Yield,
    Alias,

    // operators
    Amper,
    Pipe,
    Tilde,
    DotDot,
    Ellipsis,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Arrow,

    // punctuation
    Equal,
    Colon,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Star,
    Plus,
    Slash,
    Minus,
    Question,
    Bang,
    Dot,
    Comma,
    Semi,

    // literal carriers
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    Eof,
}

impl TokenKind {
    /// Same variant, payloads ignored. What the parser's `at`/`expect` use.
    pub fn matches(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Tokens that may legally end a line without a statement break:
    /// a newline after one of these does not insert a semicolon.
    fn continues_line(&self) -> bool {
        matches!(
            self,
            TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::LBrace
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Semi
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::Alloc => "alloc",
            TokenKind::And => "and",
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Co => "co",
            TokenKind::Continue => "continue",
            TokenKind::Defer => "defer",
            TokenKind::Do => "do",
            TokenKind::Dont => "don't",
            TokenKind::Else => "else",
            TokenKind::Elif => "elif",
            TokenKind::Fall => "fall",
            TokenKind::False => "false",
            TokenKind::Final => "final",
            TokenKind::For => "for",
            TokenKind::Free => "free",
            TokenKind::If => "if",
            TokenKind::In => "in",
            TokenKind::Is => "is",
            TokenKind::Include => "include",
            TokenKind::Map => "map",
            TokenKind::Match => "match",
            TokenKind::Nil => "nil",
            TokenKind::Not => "not",
            TokenKind::Or => "or",
            TokenKind::Package => "package",
            TokenKind::Protocol => "protocol",
            TokenKind::Protect => "protect",
            TokenKind::Pub => "pub",
            TokenKind::Return => "return",
            TokenKind::Static => "static",
            TokenKind::Struct => "struct",
            TokenKind::Sumtype => "sumtype",
            TokenKind::Test => "test",
            TokenKind::True => "true",
            TokenKind::Vec => "vec",
            TokenKind::Yield => "yield",
            TokenKind::Alias => "alias",
            TokenKind::Amper => "&",
            TokenKind::Pipe => "|",
            TokenKind::Tilde => "~",
            TokenKind::DotDot => "..",
            TokenKind::Ellipsis => "...",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            TokenKind::Arrow => "->",
            TokenKind::Equal => "=",
            TokenKind::Colon => ":",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Star => "*",
            TokenKind::Plus => "+",
            TokenKind::Slash => "/",
            TokenKind::Minus => "-",
            TokenKind::Question => "?",
            TokenKind::Bang => "!",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Int(v) => return write!(f, "{v}"),
            TokenKind::Float(v) => return write!(f, "{v}"),
            TokenKind::Str(s) => return write!(f, "'{s}'"),
            TokenKind::Ident(s) => return write!(f, "{s}"),
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
enum RawToken<'src> {
    #[token("\n")]
    Newline,

    #[regex(r"--[^\n]*", allow_greedy = true)]
    Comment,

    #[token("alloc")]
    Alloc,
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("co")]
    Co,
    #[token("continue")]
    Continue,
    #[token("defer")]
    Defer,
    #[token("do")]
    Do,
    #[token("don't")]
    Dont,
    #[token("else")]
    Else,
    #[token("elif")]
    Elif,
    #[token("fall")]
    Fall,
    #[token("false")]
    False,
    #[token("final")]
    Final,
    #[token("for")]
    For,
    #[token("free")]
    Free,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("include")]
    Include,
    #[token("map")]
    Map,
    #[token("match")]
    Match,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("package")]
    Package,
    #[token("protocol")]
    Protocol,
    #[token("protect")]
    Protect,
    #[token("pub")]
    Pub,
    #[token("return")]
    Return,
    #[token("static")]
    Static,
    #[token("struct")]
    Struct,
    #[token("sumtype")]
    Sumtype,
    #[token("test")]
    Test,
    #[token("true")]
    True,
    #[token("vec")]
    Vec,
    #[token("yield")]
    Yield,
    #[token("alias")]
    Alias,

    #[token("&")]
    Amper,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEq,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEq,
    #[token("->")]
    Arrow,
    #[token("=")]
    Equal,
    #[token(":")]
    Colon,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("/")]
    Slash,
    #[token("-")]
    Minus,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'src str),

    #[regex(r"'[^'\n]*'")]
    Str(&'src str),

    // No closing quote before the next newline (or EOF).
    #[regex(r"'[^'\n]*")]
    UnterminatedStr(&'src str),

    // Radix literals swallow any alphanumeric tail so a bad digit consumes
    // the whole lexeme; validation happens in `lex_number`.
    #[regex(r"0b[0-9A-Za-z_]*")]
    BinNumber(&'src str),
    #[regex(r"0o[0-9A-Za-z_]*")]
    OctNumber(&'src str),
    #[regex(r"0x[0-9A-Za-z_]*")]
    HexNumber(&'src str),

    #[regex(r"[0-9][0-9_]*\.[0-9_]+")]
    FloatNumber(&'src str),
    #[regex(r"[0-9][0-9_]*")]
    IntNumber(&'src str),
}

/// Tokenizes `source` into a `Semi`/`Eof`-terminated stream.
///
/// Ownership of string payloads transfers to the returned tokens. Diagnostics
/// are appended to `diag`; the scan always runs to the end of input.
pub fn lex(source: &str, diag: &mut Diagnostics) -> Vec<Token> {
    Lexer::new(source, diag).run()
}

struct Lexer<'src, 'd> {
    source: &'src str,
    diag: &'d mut Diagnostics,
    tokens: Vec<Token>,
    line: u32,
    error_start: Option<usize>,
}

impl<'src, 'd> Lexer<'src, 'd> {
    fn new(source: &'src str, diag: &'d mut Diagnostics) -> Self {
        Self {
            source,
            diag,
            tokens: Vec::with_capacity(source.len() / 4),
            line: 0,
            error_start: None,
        }
    }

    fn run(mut self) -> Vec<Token> {
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            let span = Span::from(raw.span());
            match result {
                Ok(token) => {
                    self.flush_error_run(span.start as usize);
                    self.scan(token, span);
                }
                Err(()) => {
                    if self.error_start.is_none() {
                        self.error_start = Some(span.start as usize);
                    }
                }
            }
        }
        self.flush_error_run(self.source.len());

        self.push(TokenKind::Eof, Span::empty(self.source.len() as u32));
        self.tokens
    }

    fn scan(&mut self, token: RawToken<'src>, span: Span) {
        let kind = match token {
            RawToken::Newline => {
                self.auto_semicolon(span);
                self.line += 1;
                return;
            }
            RawToken::Comment => return,

            RawToken::Ident(text) => TokenKind::Ident(text.to_owned()),
            RawToken::Str(text) => TokenKind::Str(text[1..text.len() - 1].to_owned()),
            RawToken::UnterminatedStr(text) => {
                if (span.end as usize) < self.source.len() {
                    self.diag.error("string cannot contain new lines", span).emit();
                } else {
                    self.diag.error("string must end with a '", span).emit();
                }
                TokenKind::Str(text[1..].to_owned())
            }

            RawToken::BinNumber(text) => return self.lex_number(&text[2..], 2, "binary", span),
            RawToken::OctNumber(text) => return self.lex_number(&text[2..], 8, "octal", span),
            RawToken::HexNumber(text) => return self.lex_number(&text[2..], 16, "hex", span),
            RawToken::IntNumber(text) => return self.lex_number(text, 10, "decimal", span),
            RawToken::FloatNumber(text) => {
                let cleaned: String = text.chars().filter(|&c| c != '_').collect();
                match cleaned.parse::<f64>() {
                    Ok(value) => TokenKind::Float(value),
                    Err(_) => {
                        self.diag.error("number has invalid decimal", span).emit();
                        return;
                    }
                }
            }

            RawToken::Alloc => TokenKind::Alloc,
            RawToken::And => TokenKind::And,
            RawToken::Break => TokenKind::Break,
            RawToken::Case => TokenKind::Case,
            RawToken::Co => TokenKind::Co,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Defer => TokenKind::Defer,
            RawToken::Do => TokenKind::Do,
            RawToken::Dont => TokenKind::Dont,
            RawToken::Else => TokenKind::Else,
            RawToken::Elif => TokenKind::Elif,
            RawToken::Fall => TokenKind::Fall,
            RawToken::False => TokenKind::False,
            RawToken::Final => TokenKind::Final,
            RawToken::For => TokenKind::For,
            RawToken::Free => TokenKind::Free,
            RawToken::If => TokenKind::If,
            RawToken::In => TokenKind::In,
            RawToken::Is => TokenKind::Is,
            RawToken::Include => TokenKind::Include,
            RawToken::Map => TokenKind::Map,
            RawToken::Match => TokenKind::Match,
            RawToken::Nil => TokenKind::Nil,
            RawToken::Not => TokenKind::Not,
            RawToken::Or => TokenKind::Or,
            RawToken::Package => TokenKind::Package,
            RawToken::Protocol => TokenKind::Protocol,
            RawToken::Protect => TokenKind::Protect,
            RawToken::Pub => TokenKind::Pub,
            RawToken::Return => TokenKind::Return,
            RawToken::Static => TokenKind::Static,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Sumtype => TokenKind::Sumtype,
            RawToken::Test => TokenKind::Test,
            RawToken::True => TokenKind::True,
            RawToken::Vec => TokenKind::Vec,
            RawToken::Yield => TokenKind::Yield,
            RawToken::Alias => TokenKind::Alias,

            RawToken::Amper => TokenKind::Amper,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::Less => TokenKind::Less,
            RawToken::LessEq => TokenKind::LessEq,
            RawToken::Greater => TokenKind::Greater,
            RawToken::GreaterEq => TokenKind::GreaterEq,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Equal => TokenKind::Equal,
            RawToken::Colon => TokenKind::Colon,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::Star => TokenKind::Star,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Question => TokenKind::Question,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semi => TokenKind::Semi,
        };

        self.push(kind, span);
    }

    /// Statement break at a newline, unless the previous token keeps the
    /// line open (`.` `,` `{` `(` `[` `;`). Runs of newlines insert one
    /// semicolon at most, since the inserted `;` itself suppresses the next.
    fn auto_semicolon(&mut self, span: Span) {
        let Some(last) = self.tokens.last() else {
            return;
        };

        if !last.kind.continues_line() {
            self.push(TokenKind::Semi, Span::empty(span.start));
        }
    }

    /// Validates and parses one radix run with `_` separators dropped.
    /// A bad digit diagnoses and drops the whole lexeme.
    fn lex_number(&mut self, digits: &str, radix: u32, what: &str, span: Span) {
        let mut cleaned = String::with_capacity(digits.len());
        for ch in digits.chars() {
            if ch == '_' {
                continue;
            }
            if !ch.is_digit(radix) {
                self.diag
                    .error(format!("invalid digit '{ch}' in {what} literal"), span)
                    .emit();
                return;
            }
            cleaned.push(ch);
        }

        if cleaned.is_empty() {
            self.diag
                .error(format!("{what} literal has no digits"), span)
                .emit();
            return;
        }

        match i64::from_str_radix(&cleaned, radix) {
            Ok(value) => self.push(TokenKind::Int(value), span),
            Err(_) => {
                self.diag
                    .error(format!("{what} literal is out of range"), span)
                    .emit();
            }
        }
    }

    fn flush_error_run(&mut self, end: usize) {
        if let Some(start) = self.error_start.take() {
            self.diag
                .error(
                    "unexpected characters",
                    Span::new(start as u32, end as u32),
                )
                .emit();
        }
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token {
            kind,
            line: self.line,
            span,
        });
    }
}
