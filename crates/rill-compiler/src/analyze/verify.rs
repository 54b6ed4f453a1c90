//! Phase 5: full verification over all statements.
//!
//! Walks every unit with a scope stack: frames push on `Block` entry and pop
//! on exit, declarations insert into the top frame, conditions must be
//! boolean, `for .. in` ranges must be `..` expressions, and every
//! expression must resolve to a non-void type.

use std::collections::HashMap;

use rill_core::{Diagnostics, NameTable};

use crate::ast::{Ast, BinOp, Node, NodeId};
use crate::types::{TypeId, TypeTree};

use super::infer::TypeResolver;
use super::scope::ScopeStack;
use super::symbols::SymbolTable;

pub(crate) fn verify_units(
    units: &[Ast],
    symbols: &SymbolTable,
    types: &mut TypeTree,
    names: &NameTable,
    diag: &mut Diagnostics,
    decl_types: &mut HashMap<(usize, NodeId), TypeId>,
) -> bool {
    let mut ok = true;

    for (unit, ast) in units.iter().enumerate() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        for info in symbols.values() {
            if let Some(ty) = info.ty {
                scopes.insert(info.name, ty);
            }
        }

        let mut verifier = Verifier {
            unit,
            ast,
            types: &mut *types,
            names,
            scopes,
            diag: &mut *diag,
            decl_types: &mut *decl_types,
        };
        ok &= verifier.stmt(NodeId::ROOT);
    }

    ok
}

struct Verifier<'a> {
    unit: usize,
    ast: &'a Ast,
    types: &'a mut TypeTree,
    names: &'a NameTable,
    scopes: ScopeStack,
    diag: &'a mut Diagnostics,
    decl_types: &'a mut HashMap<(usize, NodeId), TypeId>,
}

impl<'a> Verifier<'a> {
    fn error(&mut self, id: NodeId, msg: impl Into<String>) {
        self.diag.error(msg, self.ast.span(id)).emit();
    }

    fn resolve(&mut self, id: NodeId) -> TypeId {
        TypeResolver {
            ast: self.ast,
            types: &mut *self.types,
            names: self.names,
            scopes: &mut self.scopes,
            diag: &mut *self.diag,
        }
        .resolve_type(id)
    }

    fn stmt(&mut self, id: NodeId) -> bool {
        let ast: &'a Ast = self.ast;
        match ast.node(id) {
            Node::Pass => true,

            Node::Block(block) => {
                self.scopes.push();
                let mut ok = true;
                for &stmt in &block.stmts {
                    ok &= self.stmt(stmt);
                }
                self.scopes.pop();
                ok
            }

            Node::If(stmt) => {
                let mut ok = self.condition(stmt.condition);
                ok &= self.stmt(stmt.stmt);
                if let Some(else_case) = stmt.else_case {
                    ok &= self.stmt(else_case);
                }
                ok
            }

            Node::ForWhile(whl) | Node::DoWhile(whl) | Node::DontWhile(whl) => {
                let mut ok = self.condition(whl.condition);
                ok &= self.stmt(whl.stmt);
                ok
            }

            Node::ForEach(each) | Node::DoEach(each) | Node::DontEach(each) => {
                let mut ok = true;

                if !matches!(
                    ast.node(each.range),
                    Node::BinOp(binop) if binop.op == BinOp::Range
                ) {
                    self.error(each.range, "for..in expects a '..' range expression");
                    ok = false;
                }
                let elem = self.check_valued_expr(each.range);
                ok &= !elem.is_void();

                self.scopes.push();
                self.scopes.insert(each.ident, elem);
                ok &= self.stmt(each.stmt);
                self.scopes.pop();
                ok
            }

            Node::Decl(decl) => self.decl(id, decl),

            // an expression in statement position
            _ => !self.check_valued_expr(id).is_void(),
        }
    }

    fn decl(&mut self, id: NodeId, decl: &'a crate::ast::Decl) -> bool {
        // type-alias constants were applied during parsing
        if decl.is_const && decl.assign.is_none() && decl.ty.is_none() {
            return true;
        }

        let resolved = match decl.assign {
            Some(rhs) => {
                let ty = self.check_valued_expr(rhs);
                if ty.is_void() {
                    return false;
                }
                if let Some(declared) = decl.ty
                    && self.types.resolve_alias(declared) != self.types.resolve_alias(ty)
                {
                    self.error(id, "mismatched types in declaration");
                    return false;
                }
                decl.ty.unwrap_or(ty)
            }
            None => match decl.ty {
                Some(declared) => declared,
                None => {
                    self.error(id, "declaration needs a type or a value");
                    return false;
                }
            },
        };

        self.scopes.insert(decl.name, resolved);
        self.decl_types.insert((self.unit, id), resolved);
        true
    }

    fn condition(&mut self, id: NodeId) -> bool {
        let ty = self.check_valued_expr(id);
        if ty.is_void() {
            return false;
        }
        if !self.types.is_bool(self.types.resolve_alias(ty)) {
            self.error(id, "condition must be a boolean expression");
            return false;
        }
        true
    }

    /// Resolves an expression and additionally verifies the parts
    /// `resolve_type` does not look into: call arguments and function
    /// literal bodies.
    fn check_expr(&mut self, id: NodeId) -> TypeId {
        let ty = self.resolve(id);
        self.walk_expr(id);
        ty
    }

    /// Like [`Self::check_expr`], but a void result in a position that needs
    /// a value gets its own diagnostic unless resolution already produced
    /// one.
    fn check_valued_expr(&mut self, id: NodeId) -> TypeId {
        let before = self.diag.len();
        let ty = self.check_expr(id);
        if ty.is_void() && self.diag.len() == before {
            self.error(id, "expression has void type");
        }
        ty
    }

    fn walk_expr(&mut self, id: NodeId) {
        let ast: &'a Ast = self.ast;
        match ast.node(id) {
            Node::BinOp(binop) => {
                self.walk_expr(binop.lhs);
                self.walk_expr(binop.rhs);
            }
            Node::Unary(unary) => self.walk_expr(unary.expr),
            Node::SubMember(member) => self.walk_expr(member.expr),
            Node::Call(call) => {
                self.walk_expr(call.caller);
                for &arg in &call.args {
                    let ty = self.resolve(arg);
                    if ty.is_void() {
                        self.error(arg, "call argument has no type");
                    }
                    self.walk_expr(arg);
                }
            }
            Node::Function(function) => {
                self.scopes.push();
                for &arg in &function.args {
                    if let Node::Decl(decl) = ast.node(arg)
                        && let Some(ty) = decl.ty
                    {
                        self.scopes.insert(decl.name, ty);
                    }
                }
                self.stmt(function.body);
                self.scopes.pop();
            }
            _ => {}
        }
    }
}
