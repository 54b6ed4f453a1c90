//! Diagnostic AST printer.
//!
//! Renders a pool as an indented s-expression, one node per line. Used by
//! the `ast` CLI command and by parser snapshot tests.

use rill_core::NameTable;

use crate::ast::{Ast, Literal, Node, NodeId};
use crate::types::TypeTree;

pub fn print_ast(ast: &Ast, types: &TypeTree, names: &NameTable) -> String {
    let mut printer = Printer {
        ast,
        types,
        names,
        out: String::new(),
        indent: 0,
    };
    printer.node(NodeId::ROOT);
    printer.out
}

struct Printer<'a> {
    ast: &'a Ast,
    types: &'a TypeTree,
    names: &'a NameTable,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, head: &str) {
        self.line(head);
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent -= 1;
        self.line(")");
    }

    fn node(&mut self, id: NodeId) {
        let ast: &'a Ast = self.ast;
        match ast.node(id) {
            Node::Pass => self.line("..."),
            Node::If(stmt) => {
                self.open("(if");
                self.node(stmt.condition);
                self.node(stmt.stmt);
                if let Some(else_case) = stmt.else_case {
                    self.line("else:");
                    self.node(else_case);
                }
                self.close();
            }
            Node::ForEach(each) => self.for_each("for", each),
            Node::DoEach(each) => self.for_each("do", each),
            Node::DontEach(each) => self.for_each("don't", each),
            Node::ForWhile(whl) => self.for_while("for", whl),
            Node::DoWhile(whl) => self.for_while("do", whl),
            Node::DontWhile(whl) => self.for_while("don't", whl),
            Node::Block(block) => {
                self.open("({}");
                for &stmt in &block.stmts {
                    self.node(stmt);
                }
                self.close();
            }
            Node::Decl(decl) => {
                let sep = if decl.is_const { "::" } else { ":=" };
                let head = format!("({} {}", sep, self.names.resolve(decl.name));
                self.open(&head);

                if decl.quals.is_static {
                    self.line("static");
                }
                if decl.quals.is_pub {
                    self.line("pub");
                }
                if decl.quals.is_co {
                    self.line("co");
                }
                if decl.quals.is_protect {
                    self.line("protect");
                }
                if decl.quals.is_final {
                    self.line("final");
                }

                let ty_line = match decl.ty {
                    Some(ty) => format!("type: {}", self.types.display(ty, self.names)),
                    None => "type: _".to_owned(),
                };
                self.line(&ty_line);

                if let Some(assign) = decl.assign {
                    self.node(assign);
                }
                self.close();
            }
            Node::BinOp(binop) => {
                let head = format!("(binop: {}", binop.op.as_str());
                self.open(&head);
                self.node(binop.lhs);
                self.node(binop.rhs);
                self.close();
            }
            Node::Unary(unary) => {
                let head = format!("(unary: {}", unary.op.as_str());
                self.open(&head);
                self.node(unary.expr);
                self.close();
            }
            Node::Call(call) => {
                self.open("(call()");
                self.node(call.caller);
                self.line("args:");
                for &arg in &call.args {
                    self.node(arg);
                }
                self.close();
            }
            Node::SubMember(member) => {
                let head = format!("(.{}", self.names.resolve(member.name));
                self.open(&head);
                self.node(member.expr);
                self.close();
            }
            Node::Function(function) => {
                let ret = match function.ret_type {
                    Some(ty) => self.types.display(ty, self.names),
                    None => "_".to_owned(),
                };
                self.open(&format!("(fn() -> {ret}"));
                for &arg in &function.args {
                    self.node(arg);
                }
                self.line("body:");
                self.node(function.body);
                self.close();
            }
            Node::Literal(literal) => {
                let text = match literal {
                    Literal::Int(value) => value.to_string(),
                    Literal::Float(value) => format!("{value:?}"),
                    Literal::Bool(value) => value.to_string(),
                    Literal::Str(text) => format!("'{text}'"),
                    Literal::Ident(name) => self.names.resolve(*name).to_owned(),
                    Literal::Nil => "nil".to_owned(),
                };
                self.line(&text);
            }
        }
    }

    fn for_each(&mut self, word: &str, each: &'a crate::ast::ForEach) {
        let amp = if each.by_ref { "&" } else { "" };
        let head = format!("({word} {amp}{} in", self.names.resolve(each.ident));
        self.open(&head);
        self.node(each.range);
        self.node(each.stmt);
        self.close();
    }

    fn for_while(&mut self, word: &str, whl: &'a crate::ast::ForWhile) {
        self.open(&format!("({word} while"));
        self.node(whl.condition);
        self.node(whl.stmt);
        self.close();
    }
}
