//! Phase 4: type inference.
//!
//! `resolve_type` is functional over the AST; its only mutation is interning
//! into the type tree. Failure yields [`VOID`] and a diagnostic; callers
//! treat a void result as poisoned and do not cascade further errors off it.

use rill_core::{Diagnostics, NameTable};

use crate::ast::{Ast, BinOp, Literal, Node, NodeId, UnaryOp};
use crate::types::{Primitive, TypeId, TypeKind, TypeTree, VOID};

use super::scope::ScopeStack;
use super::symbols::SymbolTable;

/// Infers the type of every global without an annotation, walking the
/// topological order so dependencies are typed before their dependents.
pub(crate) fn infer_globals(
    units: &[Ast],
    symbols: &mut SymbolTable,
    order: &[rill_core::Name],
    types: &mut TypeTree,
    names: &NameTable,
    diag: &mut Diagnostics,
) {
    let mut scopes = ScopeStack::new();
    scopes.push();

    for info in symbols.values() {
        if let Some(ty) = info.ty {
            scopes.insert(info.name, ty);
        }
    }

    for &name in order {
        let info = &symbols[&name];
        if info.ty.is_some() {
            continue;
        }
        let Some((unit, rvalue)) = info.rvalue else {
            continue;
        };

        let ty = TypeResolver {
            ast: &units[unit],
            types: &mut *types,
            names,
            scopes: &mut scopes,
            diag: &mut *diag,
        }
        .resolve_type(rvalue);

        symbols.get_mut(&name).expect("symbol exists").ty = Some(ty);
        scopes.insert(name, ty);
    }
}

/// Expression type resolution against a scope stack.
pub struct TypeResolver<'a> {
    pub ast: &'a Ast,
    pub types: &'a mut TypeTree,
    pub names: &'a NameTable,
    pub scopes: &'a mut ScopeStack,
    pub diag: &'a mut Diagnostics,
}

impl TypeResolver<'_> {
    fn error(&mut self, id: NodeId, msg: impl Into<String>) -> TypeId {
        self.diag.error(msg, self.ast.span(id)).emit();
        VOID
    }

    /// The type of `id`, or [`VOID`] with a diagnostic.
    pub fn resolve_type(&mut self, id: NodeId) -> TypeId {
        match self.ast.node(id) {
            Node::Literal(literal) => self.resolve_literal(id, literal.clone()),
            Node::Unary(unary) => {
                let unary = unary.clone();
                self.resolve_unary(id, unary.op, unary.expr)
            }
            Node::BinOp(binop) => {
                let binop = binop.clone();
                self.resolve_binop(id, binop.op, binop.lhs, binop.rhs)
            }
            Node::Call(call) => {
                let caller = call.caller;
                let ty = self.resolve_type(caller);
                if ty.is_void() {
                    return VOID;
                }
                match self.types.kind(self.types.resolve_alias(ty)) {
                    TypeKind::Fn { ret, .. } => *ret,
                    _ => self.error(id, "call of a non-function value"),
                }
            }
            Node::SubMember(member) => {
                let member = member.clone();
                let ty = self.resolve_type(member.expr);
                if ty.is_void() {
                    return VOID;
                }
                let resolved = self.types.resolve_alias(ty);
                match self.types.kind(resolved) {
                    TypeKind::Struct(members) | TypeKind::Union(members) => {
                        match members.iter().find(|m| m.name == member.name) {
                            Some(found) => found.ty,
                            None => {
                                let msg = format!(
                                    "no member '{}' on type {}",
                                    self.names.resolve(member.name),
                                    self.types.display(ty, self.names)
                                );
                                self.error(id, msg)
                            }
                        }
                    }
                    _ => {
                        let msg = format!(
                            "type {} has no members",
                            self.types.display(ty, self.names)
                        );
                        self.error(id, msg)
                    }
                }
            }
            Node::Function(function) => {
                let function = function.clone();
                let mut params = Vec::with_capacity(function.args.len());
                for &arg in &function.args {
                    match self.ast.node(arg) {
                        Node::Decl(decl) if decl.ty.is_some() => {
                            params.push(decl.ty.expect("checked above"));
                        }
                        _ => {
                            self.error(arg, "function argument needs a type");
                            params.push(VOID);
                        }
                    }
                }
                let ret = function.ret_type.unwrap_or(VOID);
                self.types.get_leaf(None, TypeKind::Fn { ret, params })
            }

            // statements have no value
            _ => VOID,
        }
    }

    fn resolve_literal(&mut self, id: NodeId, literal: Literal) -> TypeId {
        match literal {
            Literal::Str(_) => self.types.basic_type(Primitive::String),
            Literal::Bool(_) => self.types.basic_type(Primitive::Bool),
            Literal::Int(_) => self.types.basic_type(Primitive::Int),
            Literal::Float(_) => self.types.basic_type(Primitive::Dooble),
            Literal::Nil => self.types.basic_type(Primitive::Null),
            Literal::Ident(name) => match self.scopes.lookup(name) {
                Some(ty) => ty,
                None => {
                    let msg = format!("undefined identifier '{}'", self.names.resolve(name));
                    self.error(id, msg)
                }
            },
        }
    }

    fn resolve_unary(&mut self, id: NodeId, op: UnaryOp, expr: NodeId) -> TypeId {
        let ty = self.resolve_type(expr);
        if ty.is_void() {
            return VOID;
        }
        let resolved = self.types.resolve_alias(ty);

        match op {
            UnaryOp::Not => {
                if !self.types.is_bool(resolved) {
                    return self
                        .error(id, "'not' operator must be followed by a boolean expression");
                }
                resolved
            }
            UnaryOp::Neg => {
                if !self.types.is_numeric(resolved) {
                    return self
                        .error(id, "unary '-' must be followed by a number expression");
                }
                resolved
            }
            UnaryOp::Ptr => self.types.as_pointer(ty),
            UnaryOp::Addr => self.types.as_address(ty),
        }
    }

    fn resolve_binop(&mut self, id: NodeId, op: BinOp, lhs: NodeId, rhs: NodeId) -> TypeId {
        let raw_a = self.resolve_type(lhs);
        let raw_b = self.resolve_type(rhs);
        if raw_a.is_void() || raw_b.is_void() {
            return VOID;
        }

        // aliases are transparent to operators
        let ty_a = self.types.resolve_alias(raw_a);
        let ty_b = self.types.resolve_alias(raw_b);
        if ty_a != ty_b {
            return self.error(id, "mismatched types in expression");
        }

        match op {
            BinOp::And | BinOp::Or => {
                if !self.types.is_bool(ty_a) {
                    return self.error(
                        id,
                        "both sides of 'and' or 'or' are not boolean expressions",
                    );
                }
                ty_a
            }

            // equality compares any equal pair and yields bool
            BinOp::Is | BinOp::IsNot => self.types.basic_type(Primitive::Bool),

            BinOp::Less | BinOp::LessEq | BinOp::Greater | BinOp::GreaterEq => {
                if !self.types.is_numeric(ty_a) {
                    return self.error(
                        id,
                        "both sides of arithmetic expression are not number expressions",
                    );
                }
                self.types.basic_type(Primitive::Bool)
            }

            BinOp::Add
            | BinOp::Sub
            | BinOp::Mul
            | BinOp::Div
            | BinOp::BitAnd
            | BinOp::BitOr
            | BinOp::Range => {
                if !self.types.is_numeric(ty_a) {
                    return self.error(
                        id,
                        "both sides of arithmetic expression are not number expressions",
                    );
                }
                ty_a
            }
        }
    }
}
