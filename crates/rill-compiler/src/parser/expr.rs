//! Expression grammar: the precedence ladder, calls, and atoms.

use crate::ast::{
    BinOp, BinOpExpr, Call, Literal, Node, NodeId, SubMember, UnaryExpr, UnaryOp, MAX_CALL_ARGS,
};
use crate::lexer::TokenKind;

use super::Parser;

impl Parser<'_> {
    pub(crate) fn expression(&mut self) -> NodeId {
        self.range_expr()
    }

    fn binop(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let span = self.ast.span(lhs).join(self.ast.span(rhs));
        self.ast.push(Node::BinOp(BinOpExpr { op, lhs, rhs }), span)
    }

    /// `logic ( '..' logic )?`
    fn range_expr(&mut self) -> NodeId {
        let lhs = self.logic();
        if self.eat(&TokenKind::DotDot) {
            let rhs = self.logic();
            return self.binop(BinOp::Range, lhs, rhs);
        }
        lhs
    }

    fn logic(&mut self) -> NodeId {
        let mut lhs = self.equality();
        loop {
            let op = match self.current() {
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                _ => break,
            };
            self.bump();
            let rhs = self.equality();
            lhs = self.binop(op, lhs, rhs);
        }
        lhs
    }

    /// `comparison ( 'is' 'not'? comparison )*`
    fn equality(&mut self) -> NodeId {
        let mut lhs = self.comparison();
        while self.eat(&TokenKind::Is) {
            let op = if self.eat(&TokenKind::Not) {
                BinOp::IsNot
            } else {
                BinOp::Is
            };
            let rhs = self.comparison();
            lhs = self.binop(op, lhs, rhs);
        }
        lhs
    }

    fn comparison(&mut self) -> NodeId {
        let mut lhs = self.bitwise();
        loop {
            let op = match self.current() {
                TokenKind::Less => BinOp::Less,
                TokenKind::LessEq => BinOp::LessEq,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::GreaterEq => BinOp::GreaterEq,
                _ => break,
            };
            self.bump();
            let rhs = self.bitwise();
            lhs = self.binop(op, lhs, rhs);
        }
        lhs
    }

    fn bitwise(&mut self) -> NodeId {
        let mut lhs = self.sum();
        loop {
            let op = match self.current() {
                TokenKind::Pipe => BinOp::BitOr,
                TokenKind::Amper => BinOp::BitAnd,
                _ => break,
            };
            self.bump();
            let rhs = self.sum();
            lhs = self.binop(op, lhs, rhs);
        }
        lhs
    }

    fn sum(&mut self) -> NodeId {
        let mut lhs = self.factor();
        loop {
            let op = match self.current() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.factor();
            lhs = self.binop(op, lhs, rhs);
        }
        lhs
    }

    fn factor(&mut self) -> NodeId {
        let mut lhs = self.unary();
        loop {
            let op = match self.current() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.bump();
            let rhs = self.unary();
            lhs = self.binop(op, lhs, rhs);
        }
        lhs
    }

    /// One optional prefix: `-` `not` `*` `&`.
    fn unary(&mut self) -> NodeId {
        let op = match self.current() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Star => Some(UnaryOp::Ptr),
            TokenKind::Amper => Some(UnaryOp::Addr),
            _ => None,
        };

        match op {
            Some(op) => {
                let span = self.span();
                self.bump();
                let expr = self.call_expr();
                self.ast.push(Node::Unary(UnaryExpr { op, expr }), span)
            }
            None => self.call_expr(),
        }
    }

    /// `atom ( '(' args? ')' | '.' IDENT )*`, left-associated.
    fn call_expr(&mut self) -> NodeId {
        let mut expr = self.atom();
        loop {
            match self.current() {
                TokenKind::LParen => {
                    let args = self.call_args();
                    let span = self.ast.span(expr);
                    expr = self.ast.push(Node::Call(Call { caller: expr, args }), span);
                }
                TokenKind::Dot => {
                    self.bump();
                    let span = self.span();
                    match self.bump().kind {
                        TokenKind::Ident(text) => {
                            let name = self.names.intern(&text);
                            expr = self
                                .ast
                                .push(Node::SubMember(SubMember { expr, name }), span);
                        }
                        _ => {
                            self.error("expected member name after '.'");
                            return expr;
                        }
                    }
                }
                _ => break,
            }
        }
        expr
    }

    /// Arguments end at `)` regardless of trailing commas.
    fn call_args(&mut self) -> Vec<NodeId> {
        self.bump(); // `(`

        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at_eof() {
            args.push(self.expression());
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'");

        if args.len() > MAX_CALL_ARGS {
            self.error(format!("call has more than {MAX_CALL_ARGS} arguments"));
            args.truncate(MAX_CALL_ARGS);
        }
        args
    }

    fn atom(&mut self) -> NodeId {
        let span = self.span();
        let literal = match self.current() {
            TokenKind::Int(value) => Literal::Int(*value),
            TokenKind::Float(value) => Literal::Float(*value),
            TokenKind::Str(text) => Literal::Str(text.clone()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Nil => Literal::Nil,
            TokenKind::Ident(_) => {
                let TokenKind::Ident(text) = self.bump().kind else {
                    unreachable!();
                };
                let name = self.names.intern(&text);
                return self.ast.push(Node::Literal(Literal::Ident(name)), span);
            }
            TokenKind::LParen => {
                if self.at_function_literal() {
                    return self.function_literal();
                }
                self.bump();
                let expr = self.expression();
                self.expect(&TokenKind::RParen, "')'");
                return expr;
            }
            _ => {
                self.error("expected expression");
                self.bump();
                return self.ast.push(Node::Pass, span);
            }
        };
        self.bump();
        self.ast.push(Node::Literal(literal), span)
    }

    /// Look ahead to the matching `)` counting nested parentheses; `{` or
    /// `->` after it means a function literal.
    fn at_function_literal(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0usize;
        loop {
            match self.nth(n) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
        matches!(self.nth(n + 1), TokenKind::LBrace | TokenKind::Arrow)
    }

    /// `'(' (IDENT ':' type),* ')' ('->' type)? block`
    fn function_literal(&mut self) -> NodeId {
        use crate::ast::{Decl, Function, Qualifiers};

        let span = self.span();
        self.bump(); // `(`

        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at_eof() {
            let arg_span = self.span();
            let name = match self.bump().kind {
                TokenKind::Ident(text) => self.names.intern(&text),
                _ => {
                    self.error("expected argument name");
                    break;
                }
            };
            self.expect(&TokenKind::Colon, "':'");
            let ty = self.parse_type();
            if ty.is_none() {
                self.error("expected argument type");
            }
            args.push(self.ast.push(
                Node::Decl(Decl {
                    name,
                    is_const: false,
                    ty,
                    assign: None,
                    quals: Qualifiers::default(),
                }),
                arg_span,
            ));

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'");

        let ret_type = if self.eat(&TokenKind::Arrow) {
            let ty = self.parse_type();
            if ty.is_none() {
                self.error("expected return type after '->'");
            }
            ty
        } else {
            None
        };

        let body = self.block();
        self.ast.push(
            Node::Function(Function {
                ret_type,
                args,
                body,
            }),
            span,
        )
    }
}
