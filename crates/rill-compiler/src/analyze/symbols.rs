//! Phase 2: global symbol collection and dependency edges.
//!
//! Every top-level constant declaration with a value becomes a symbol. The
//! rvalue is then walked for identifier references, which become dependency
//! edges; call arguments are skipped, since they contribute nothing to type
//! inference of the callee.

use std::collections::HashSet;

use indexmap::IndexMap;
use rill_core::{Diagnostics, Name, Span};

use crate::ast::{Ast, Literal, Node, NodeId, Qualifiers};
use crate::types::TypeId;

/// Metadata for one global declaration.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: Name,
    /// Declared type if annotated, inferred type after phase 4.
    pub ty: Option<TypeId>,
    /// `(unit index, rvalue node)`.
    pub rvalue: Option<(usize, NodeId)>,
    pub quals: Qualifiers,
    pub span: Span,
    /// Globals this symbol's rvalue references.
    pub deps: Vec<Name>,
    /// How many globals reference this one. Symbols nobody references are
    /// the roots of the dependency walk.
    pub dependents: u32,
    pub(crate) visited: bool,
    pub(crate) active: bool,
}

/// Insertion-ordered so the topological tie-break is source order.
pub type SymbolTable = IndexMap<Name, SymbolInfo>;

pub(crate) fn collect_symbols(units: &[Ast], diag: &mut Diagnostics) -> SymbolTable {
    let mut symbols = SymbolTable::new();

    for (unit, ast) in units.iter().enumerate() {
        for &stmt in ast.root_stmts() {
            let Node::Decl(decl) = ast.node(stmt) else {
                continue;
            };
            if !decl.is_const {
                continue;
            }
            // type-alias constants carry no value and are not symbols
            let Some(assign) = decl.assign else {
                continue;
            };

            if symbols.contains_key(&decl.name) {
                diag.error("duplicate global declaration", ast.span(stmt))
                    .related_to("first declared here", symbols[&decl.name].span)
                    .emit();
                continue;
            }

            symbols.insert(
                decl.name,
                SymbolInfo {
                    name: decl.name,
                    ty: decl.ty,
                    rvalue: Some((unit, assign)),
                    quals: decl.quals,
                    span: ast.span(stmt),
                    deps: Vec::new(),
                    dependents: 0,
                    visited: false,
                    active: false,
                },
            );
        }
    }

    let known: HashSet<Name> = symbols.keys().copied().collect();
    let mut edges: Vec<(Name, Name)> = Vec::new();

    for (&name, info) in &symbols {
        let Some((unit, rvalue)) = info.rvalue else {
            continue;
        };
        let mut deps = Vec::new();
        visit_deps(&units[unit], rvalue, &known, &mut deps);
        for dep in deps {
            edges.push((name, dep));
        }
    }

    for (name, dep) in edges {
        let info = symbols.get_mut(&name).expect("edge source exists");
        if info.deps.contains(&dep) {
            continue;
        }
        info.deps.push(dep);
        symbols.get_mut(&dep).expect("edge target exists").dependents += 1;
    }

    symbols
}

/// Enumerates identifier references in an rvalue. Call arguments are not
/// visited; function literal bodies resolve against globals later and are
/// not visited either.
fn visit_deps(ast: &Ast, id: NodeId, known: &HashSet<Name>, out: &mut Vec<Name>) {
    match ast.node(id) {
        Node::BinOp(binop) => {
            visit_deps(ast, binop.lhs, known, out);
            visit_deps(ast, binop.rhs, known, out);
        }
        Node::Unary(unary) => visit_deps(ast, unary.expr, known, out),
        Node::Call(call) => visit_deps(ast, call.caller, known, out),
        Node::SubMember(member) => visit_deps(ast, member.expr, known, out),
        Node::Literal(Literal::Ident(name)) => {
            if known.contains(name) {
                out.push(*name);
            }
        }
        _ => {}
    }
}
