//! Recursive-descent parser.
//!
//! # Architecture
//!
//! The parser walks the token vector left to right and appends nodes to an
//! [`Ast`] pool; children are referenced by [`NodeId`], never by pointer, so
//! pool growth cannot invalidate anything. Types encountered in declarations
//! are interned into the shared [`TypeTree`] as parsing proceeds.
//!
//! # Recovery
//!
//! Errors are sticky: every diagnostic sets `had_error` on the parse result.
//! After an error the parser resynchronizes at the nearest statement boundary
//! (`;`, `}`, or end of input) and poisons the failed node with `Pass`, so a
//! single run reports every statement's first problem.

mod expr;
mod stmt;
mod ty;

#[cfg(test)]
mod ty_tests;

use rill_core::{Diagnostics, NameTable, Span};

use crate::ast::{Ast, Block, Node, NodeId};
use crate::lexer::{Token, TokenKind};
use crate::types::TypeTree;

/// Outcome of parsing one translation unit.
#[derive(Debug)]
pub struct ParseResult {
    pub ast: Ast,
    /// Sticky error flag; callers must check it before trusting the pool.
    pub had_error: bool,
}

/// Parses one token stream into an AST pool. Node 0 is the unit block.
pub fn parse(
    tokens: Vec<Token>,
    types: &mut TypeTree,
    names: &mut NameTable,
    diag: &mut Diagnostics,
) -> ParseResult {
    Parser::new(tokens, types, names, diag).run()
}

pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) ast: Ast,
    pub(crate) types: &'a mut TypeTree,
    pub(crate) names: &'a mut NameTable,
    diag: &'a mut Diagnostics,
    had_error: bool,
}

impl<'a> Parser<'a> {
    fn new(
        tokens: Vec<Token>,
        types: &'a mut TypeTree,
        names: &'a mut NameTable,
        diag: &'a mut Diagnostics,
    ) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));

        Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            types,
            names,
            diag,
            had_error: false,
        }
    }

    fn run(mut self) -> ParseResult {
        let root = self.ast.push(Node::Block(Block { stmts: Vec::new() }), Span::empty(0));
        debug_assert_eq!(root, NodeId::ROOT);

        let mut stmts = Vec::new();
        while !self.at_eof() {
            if self.eat(&TokenKind::Semi) {
                continue;
            }
            let before = self.pos;
            stmts.push(self.statement());
            if self.pos == before {
                // the statement made no progress on malformed input
                self.pos += 1;
            }
        }
        self.ast.replace(NodeId::ROOT, Node::Block(Block { stmts }));

        ParseResult {
            ast: self.ast,
            had_error: self.had_error,
        }
    }

    // --- token access ---

    /// Current token kind. The `Eof` sentinel is never consumed, so this is
    /// always in bounds.
    pub(crate) fn current(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    pub(crate) fn nth(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        self.current().matches(kind)
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current(), TokenKind::Eof)
    }

    /// Consume and return the current token. At `Eof`, returns it without
    /// moving.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected token: {what}"));
        false
    }

    /// Saved position for unwinding after a failed speculative match.
    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    pub(crate) fn unwind(&mut self, mark: usize) {
        self.pos = mark;
    }

    // --- errors ---

    pub(crate) fn error(&mut self, msg: impl Into<String>) {
        self.had_error = true;
        self.diag.error(msg, self.span()).emit();
    }

    /// Skip to the next statement boundary.
    pub(crate) fn sync_to_stmt_boundary(&mut self) {
        while !self.at_eof()
            && !self.at(&TokenKind::Semi)
            && !self.at(&TokenKind::RBrace)
        {
            self.pos += 1;
        }
    }
}
