//! Statement grammar: dispatch, declarations, control flow, blocks.

use rill_core::Name;

use crate::ast::{Block, Decl, ForEach, ForWhile, If, Node, NodeId, Qualifiers};
use crate::lexer::TokenKind;
use crate::types::TypeKind;

use super::Parser;

/// What a `for` header introduced: an iteration or a condition.
enum LoopHeader {
    Each {
        by_ref: bool,
        ident: Name,
        range: NodeId,
    },
    While {
        condition: NodeId,
    },
}

impl Parser<'_> {
    pub(crate) fn statement(&mut self) -> NodeId {
        match self.current() {
            TokenKind::Ellipsis => {
                let span = self.span();
                self.bump();
                self.ast.push(Node::Pass, span)
            }
            TokenKind::If => self.if_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Do => self.do_stmt(false),
            TokenKind::Dont => self.do_stmt(true),
            TokenKind::LBrace => self.block(),
            TokenKind::Ident(_) if self.at_decl() => self.decl(),
            _ => self.expression(),
        }
    }

    /// `IDENT qualifier* ':'` begins a declaration.
    fn at_decl(&self) -> bool {
        let mut n = 1;
        while matches!(
            self.nth(n),
            TokenKind::Static
                | TokenKind::Pub
                | TokenKind::Co
                | TokenKind::Protect
                | TokenKind::Final
        ) {
            n += 1;
        }
        matches!(self.nth(n), TokenKind::Colon)
    }

    /// `IDENT qualifier* ':' type? (':' | '=')? rhs?`
    fn decl(&mut self) -> NodeId {
        let span = self.span();
        let TokenKind::Ident(text) = self.bump().kind else {
            unreachable!("decl dispatch checked the identifier");
        };
        let name = self.names.intern(&text);

        let mut quals = Qualifiers::default();
        loop {
            match self.current() {
                TokenKind::Static => quals.is_static = true,
                TokenKind::Pub => quals.is_pub = true,
                TokenKind::Co => quals.is_co = true,
                TokenKind::Protect => quals.is_protect = true,
                TokenKind::Final => quals.is_final = true,
                _ => break,
            }
            self.bump();
        }

        self.expect(&TokenKind::Colon, "':'");
        let ty = self.parse_type();

        let mut is_const = false;
        let mut assign = None;

        if self.eat(&TokenKind::Colon) {
            is_const = true;
            assign = self.const_rhs(name);
        } else if self.eat(&TokenKind::Equal) {
            assign = Some(self.expression());
        }

        self.ast.push(
            Node::Decl(Decl {
                name,
                is_const,
                ty,
                assign,
                quals,
            }),
            span,
        )
    }

    /// A constant rhs beginning with `struct`, `sumtype`, or `alias`
    /// registers a type alias instead of producing a value.
    fn const_rhs(&mut self, name: Name) -> Option<NodeId> {
        match self.current() {
            TokenKind::Struct | TokenKind::Sumtype | TokenKind::Alias => {
                self.eat(&TokenKind::Alias);
                match self.parse_type() {
                    Some(target) => {
                        let from = self.types.get_leaf(None, TypeKind::Name(name));
                        if !self.types.add_typedef(from, target) {
                            self.error("duplicate alias");
                        }
                    }
                    None => self.error("expected type after alias"),
                }
                None
            }
            _ => Some(self.expression()),
        }
    }

    fn if_stmt(&mut self) -> NodeId {
        let span = self.span();
        self.bump(); // `if` or `elif`

        let condition = self.expression();
        let stmt = self.statement();

        // an auto-inserted `;` may sit between the body and the else arm
        if self.at(&TokenKind::Semi)
            && matches!(self.nth(1), TokenKind::Else | TokenKind::Elif)
        {
            self.bump();
        }

        let else_case = match self.current() {
            TokenKind::Else => {
                self.bump();
                Some(self.statement())
            }
            TokenKind::Elif => Some(self.if_stmt()),
            _ => None,
        };

        self.ast.push(
            Node::If(If {
                condition,
                stmt,
                else_case,
            }),
            span,
        )
    }

    /// After an optional `&`, `IDENT in` selects iteration; otherwise the
    /// `&` is unwound and a condition is parsed.
    fn loop_header(&mut self) -> LoopHeader {
        let mark = self.mark();
        let by_ref = self.eat(&TokenKind::Amper);

        if matches!(self.current(), TokenKind::Ident(_)) && matches!(self.nth(1), TokenKind::In) {
            let TokenKind::Ident(text) = self.bump().kind else {
                unreachable!();
            };
            let ident = self.names.intern(&text);
            self.bump(); // `in`
            let range = self.expression();
            return LoopHeader::Each {
                by_ref,
                ident,
                range,
            };
        }

        self.unwind(mark);
        LoopHeader::While {
            condition: self.expression(),
        }
    }

    fn for_stmt(&mut self) -> NodeId {
        let span = self.span();
        self.bump(); // `for`

        let header = self.loop_header();
        let stmt = self.statement();

        let node = match header {
            LoopHeader::Each {
                by_ref,
                ident,
                range,
            } => Node::ForEach(ForEach {
                by_ref,
                ident,
                range,
                stmt,
            }),
            LoopHeader::While { condition } => Node::ForWhile(ForWhile { condition, stmt }),
        };
        self.ast.push(node, span)
    }

    /// `do <stmt> for <header>` / `don't <stmt> for <header>`: the statement
    /// parsed up front becomes the loop body.
    fn do_stmt(&mut self, dont: bool) -> NodeId {
        let span = self.span();
        self.bump(); // `do` or `don't`

        let stmt = self.statement();

        if self.at(&TokenKind::Semi) && matches!(self.nth(1), TokenKind::For) {
            self.bump();
        }
        self.expect(&TokenKind::For, "'for'");

        let node = match (dont, self.loop_header()) {
            (
                false,
                LoopHeader::Each {
                    by_ref,
                    ident,
                    range,
                },
            ) => Node::DoEach(ForEach {
                by_ref,
                ident,
                range,
                stmt,
            }),
            (false, LoopHeader::While { condition }) => {
                Node::DoWhile(ForWhile { condition, stmt })
            }
            (
                true,
                LoopHeader::Each {
                    by_ref,
                    ident,
                    range,
                },
            ) => Node::DontEach(ForEach {
                by_ref,
                ident,
                range,
                stmt,
            }),
            (true, LoopHeader::While { condition }) => {
                Node::DontWhile(ForWhile { condition, stmt })
            }
        };
        self.ast.push(node, span)
    }

    pub(crate) fn block(&mut self) -> NodeId {
        let span = self.span();
        self.expect(&TokenKind::LBrace, "'{'");

        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_eof() {
            if self.eat(&TokenKind::Semi) {
                continue;
            }
            let before = self.mark();
            stmts.push(self.statement());
            if self.mark() == before {
                self.sync_to_stmt_boundary();
            }
        }

        self.expect(&TokenKind::RBrace, "'}'");
        self.ast.push(Node::Block(Block { stmts }), span)
    }
}
