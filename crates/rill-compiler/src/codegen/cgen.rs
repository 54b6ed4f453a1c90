//! The reference back-end: analyzed program to C source.
//!
//! Walks the globals in topological order. Function-literal constants become
//! C functions; every other constant becomes a `const` definition. Local
//! declarations attach to their scope through the builder, so they render at
//! the top of the block with the assignment at the declaration site.
//!
//! Loop policy: `do` loops run their body once before the condition is
//! tested; `don't` loops run only while (or, for ranges, only if) the
//! condition is false on entry.

use rill_core::{Name, NameTable};

use crate::analyze::Analysis;
use crate::ast::{BinOp, ForEach, Literal, Node, NodeId, UnaryOp};
use crate::types::{TypeTree, VOID};

use super::builder::{BuildError, CIdent, CodeBuilder};
use super::ctype::CType;
use super::typegen::{AnonTable, LowerError, build_type};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GenError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error("global '{0}' has no type")]
    UntypedGlobal(String),
    #[error("declaration '{0}' has no type")]
    UntypedDecl(String),
    #[error("nested function literals are not supported by the C back-end")]
    NestedFunction,
    #[error("'..' range used outside a loop header")]
    RangeExpr,
}

/// Emits the whole analyzed program as C text.
pub fn generate_c(
    analysis: &Analysis,
    types: &TypeTree,
    names: &NameTable,
) -> Result<String, GenError> {
    let mut cgen = CGen {
        analysis,
        types,
        names,
        anons: AnonTable::new(),
        builder: CodeBuilder::new(),
        unit: 0,
    };

    for &name in &analysis.order {
        cgen.global(name)?;
    }

    let program = cgen.builder.get_generated()?;

    let mut out = String::from("#include <stdbool.h>\n#include <stddef.h>\n\n");
    if !cgen.anons.is_empty() {
        out.push_str(&cgen.anons.render());
    }
    out.push_str(&program);
    Ok(out)
}

struct CGen<'a> {
    analysis: &'a Analysis,
    types: &'a TypeTree,
    names: &'a NameTable,
    anons: AnonTable,
    builder: CodeBuilder,
    unit: usize,
}

impl CGen<'_> {
    fn lower(&mut self, ty: crate::types::TypeId) -> Result<CType, GenError> {
        Ok(build_type(self.types, self.names, &mut self.anons, ty)?)
    }

    fn checked_name(&self, name: Name) -> Result<&str, GenError> {
        let text = self.names.resolve(name);
        if self.builder.is_reserved(text) {
            return Err(BuildError::ReservedWord(text.to_owned()).into());
        }
        Ok(text)
    }

    fn global(&mut self, name: Name) -> Result<(), GenError> {
        let info = &self.analysis.symbols[&name];
        let Some((unit, rvalue)) = info.rvalue else {
            return Ok(());
        };
        self.unit = unit;

        let ast = self.analysis.unit(unit);
        match ast.node(rvalue) {
            Node::Function(function) => {
                let function = function.clone();
                self.function(name, info.quals.is_static, &function)
            }
            _ => {
                let ty = info
                    .ty
                    .filter(|ty| !ty.is_void())
                    .ok_or_else(|| GenError::UntypedGlobal(self.names.resolve(name).to_owned()))?;
                let ctype = self.lower(ty)?;
                let rendered = ctype.render(Some(self.checked_name(name)?));

                let prefix = if info.quals.is_static { "static " } else { "" };
                self.builder
                    .emit_expression(format!("{prefix}const {rendered} = "));
                self.expr(rvalue)?;
                self.builder.emit_statement();
                Ok(())
            }
        }
    }

    fn function(
        &mut self,
        name: Name,
        is_static: bool,
        function: &crate::ast::Function,
    ) -> Result<(), GenError> {
        let ast = self.analysis.unit(self.unit);

        let ret = match function.ret_type {
            Some(ty) => self.lower(ty)?,
            None => CType::new("void"),
        };

        let mut params = Vec::with_capacity(function.args.len());
        for &arg in &function.args {
            let Node::Decl(decl) = ast.node(arg) else {
                continue;
            };
            let ty = decl.ty.unwrap_or(VOID);
            params.push(CIdent {
                name: self.checked_name(decl.name)?.to_owned(),
                ty: self.lower(ty)?,
                is_static: false,
                is_extern: false,
            });
        }

        let cname = self.checked_name(name)?.to_owned();
        self.builder.emit_function(&cname, is_static, ret, params)?;

        if let Node::Block(block) = ast.node(function.body) {
            for &stmt in &block.stmts {
                self.stmt(stmt)?;
            }
        }
        self.builder.emit_scope_end()?;
        Ok(())
    }

    fn stmt(&mut self, id: NodeId) -> Result<(), GenError> {
        let ast = self.analysis.unit(self.unit);
        match ast.node(id) {
            Node::Pass => {
                self.builder.emit_statement();
                Ok(())
            }

            Node::Block(block) => {
                let stmts = block.stmts.clone();
                self.builder.emit_scope();
                for stmt in stmts {
                    self.stmt(stmt)?;
                }
                self.builder.emit_scope_end()?;
                Ok(())
            }

            Node::Decl(decl) => {
                let decl = decl.clone();
                // type-alias constants emit nothing
                if decl.assign.is_none() && decl.ty.is_none() {
                    return Ok(());
                }

                let ty = self
                    .analysis
                    .decl_types
                    .get(&(self.unit, id))
                    .copied()
                    .or(decl.ty)
                    .filter(|ty| !ty.is_void())
                    .ok_or_else(|| {
                        GenError::UntypedDecl(self.names.resolve(decl.name).to_owned())
                    })?;

                let ctype = self.lower(ty)?;
                let cname = self.checked_name(decl.name)?.to_owned();
                self.builder
                    .emit_identifier(&cname, ctype, decl.quals.is_static, false)?;

                if let Some(assign) = decl.assign {
                    self.builder.emit_expression(format!("{cname} = "));
                    self.expr(assign)?;
                    self.builder.emit_statement();
                }
                Ok(())
            }

            Node::If(stmt) => {
                let stmt = stmt.clone();
                self.builder.emit_expression("if ($)");
                self.expr(stmt.condition)?;
                self.braced(stmt.stmt)?;
                if let Some(else_case) = stmt.else_case {
                    self.builder.emit_expression("else");
                    self.braced(else_case)?;
                }
                Ok(())
            }

            Node::ForWhile(whl) => {
                let whl = whl.clone();
                self.builder.emit_expression("while ($)");
                self.expr(whl.condition)?;
                self.braced(whl.stmt)
            }

            Node::DoWhile(whl) => {
                let whl = whl.clone();
                self.builder.emit_expression("do");
                self.braced(whl.stmt)?;
                self.builder.emit_expression("while ($)");
                self.expr(whl.condition)?;
                self.builder.emit_statement();
                Ok(())
            }

            Node::DontWhile(whl) => {
                let whl = whl.clone();
                self.builder.emit_expression("while (!($))");
                self.expr(whl.condition)?;
                self.braced(whl.stmt)
            }

            Node::ForEach(each) => {
                let each = each.clone();
                let (lo, hi) = self.range_bounds(each.range)?;
                let var = self.checked_name(each.ident)?.to_owned();

                self.builder
                    .emit_expression(format!("for (long {var} = $; {var} < $; {var}++)"));
                self.expr(lo)?;
                self.expr(hi)?;
                self.braced(each.stmt)
            }

            Node::DoEach(each) => {
                let each = each.clone();
                self.do_each(&each)
            }

            Node::DontEach(each) => {
                let each = each.clone();
                let (lo, hi) = self.range_bounds(each.range)?;
                let var = self.checked_name(each.ident)?.to_owned();

                self.builder.emit_expression(format!("long {var} = $"));
                self.expr(lo)?;
                self.builder.emit_statement();

                self.builder
                    .emit_expression(format!("if (!({var} < $))"));
                self.expr(hi)?;
                self.braced(each.stmt)
            }

            _ => {
                self.expr(id)?;
                self.builder.emit_statement();
                Ok(())
            }
        }
    }

    /// `do x in lo..hi` runs the body once before the bound is tested.
    fn do_each(&mut self, each: &ForEach) -> Result<(), GenError> {
        let (lo, hi) = self.range_bounds(each.range)?;
        let var = self.checked_name(each.ident)?.to_owned();

        self.builder.emit_expression(format!("long {var} = $"));
        self.expr(lo)?;
        self.builder.emit_statement();

        self.builder.emit_expression("do");
        self.builder.emit_scope();
        self.stmt(each.stmt)?;
        self.builder.emit_expression(format!("{var}++"));
        self.builder.emit_statement();
        self.builder.emit_scope_end()?;

        self.builder.emit_expression(format!("while ({var} < $)"));
        self.expr(hi)?;
        self.builder.emit_statement();
        Ok(())
    }

    fn range_bounds(&self, range: NodeId) -> Result<(NodeId, NodeId), GenError> {
        match self.analysis.unit(self.unit).node(range) {
            Node::BinOp(binop) if binop.op == BinOp::Range => Ok((binop.lhs, binop.rhs)),
            _ => Err(GenError::RangeExpr),
        }
    }

    /// Emits a statement wrapped in its own scope.
    fn braced(&mut self, id: NodeId) -> Result<(), GenError> {
        let ast = self.analysis.unit(self.unit);
        self.builder.emit_scope();
        if let Node::Block(block) = ast.node(id) {
            for &stmt in &block.stmts.clone() {
                self.stmt(stmt)?;
            }
        } else {
            self.stmt(id)?;
        }
        self.builder.emit_scope_end()?;
        Ok(())
    }

    fn expr(&mut self, id: NodeId) -> Result<(), GenError> {
        let ast = self.analysis.unit(self.unit);
        match ast.node(id) {
            Node::Literal(literal) => {
                match literal.clone() {
                    Literal::Int(value) => self.builder.emit_expression(value.to_string()),
                    Literal::Float(value) => self.builder.emit_expression(format!("{value:?}")),
                    Literal::Bool(value) => self.builder.emit_expression(value.to_string()),
                    Literal::Str(text) => self.builder.emit_atomic(&text),
                    Literal::Nil => self.builder.emit_expression("NULL"),
                    Literal::Ident(name) => {
                        let text = self.names.resolve(name).to_owned();
                        self.builder.emit_expression(text);
                    }
                }
                Ok(())
            }

            Node::BinOp(binop) => {
                let binop = binop.clone();
                let op = match binop.op {
                    BinOp::Add => "+",
                    BinOp::Sub => "-",
                    BinOp::Mul => "*",
                    BinOp::Div => "/",
                    BinOp::BitAnd => "&",
                    BinOp::BitOr => "|",
                    BinOp::Less => "<",
                    BinOp::LessEq => "<=",
                    BinOp::Greater => ">",
                    BinOp::GreaterEq => ">=",
                    BinOp::Is => "==",
                    BinOp::IsNot => "!=",
                    BinOp::And => "&&",
                    BinOp::Or => "||",
                    BinOp::Range => return Err(GenError::RangeExpr),
                };
                self.builder.emit_expression(format!("($ {op} $)"));
                self.expr(binop.lhs)?;
                self.expr(binop.rhs)
            }

            Node::Unary(unary) => {
                let unary = unary.clone();
                let template = match unary.op {
                    UnaryOp::Neg => "-($)",
                    UnaryOp::Not => "!($)",
                    // making a pointer and taking an address both lower to C's `&`
                    UnaryOp::Ptr | UnaryOp::Addr => "&($)",
                };
                self.builder.emit_expression(template);
                self.expr(unary.expr)
            }

            Node::Call(call) => {
                let call = call.clone();
                if let Node::Literal(Literal::Ident(name)) = ast.node(call.caller) {
                    let cname = self.checked_name(*name)?.to_owned();
                    self.builder.emit_call(&cname, call.args.len() as u32);
                } else {
                    let mut template = String::from("$(");
                    for i in 0..call.args.len() {
                        if i > 0 {
                            template.push_str(", ");
                        }
                        template.push('$');
                    }
                    template.push(')');
                    self.builder.emit_expression(template);
                    self.expr(call.caller)?;
                }
                for &arg in &call.args {
                    self.expr(arg)?;
                }
                Ok(())
            }

            Node::SubMember(member) => {
                let member = member.clone();
                let text = self.names.resolve(member.name).to_owned();
                self.builder.emit_expression(format!("$.{text}"));
                self.expr(member.expr)
            }

            Node::Function(_) => Err(GenError::NestedFunction),

            // poison or statement nodes never reach a verified emission
            _ => Ok(()),
        }
    }
}
