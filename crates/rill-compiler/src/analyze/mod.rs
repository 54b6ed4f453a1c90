//! Semantic analysis.
//!
//! [`Analysis`] accumulates parsed translation units and then runs five
//! ordered sub-phases over all of them:
//!
//! 1. verify that every `Name` type leaf is a primitive or a registered alias
//! 2. collect global constant declarations into the symbol table, with their
//!    dependency edges
//! 3. order the globals topologically, rejecting cycles
//! 4. infer the type of every global without an annotation, in order
//! 5. verify every statement of every unit with a scope stack

mod infer;
mod scope;
mod symbols;
mod topo;
mod verify;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use rill_core::{Diagnostics, Name, NameTable, Span};

use crate::ast::{Ast, NodeId};
use crate::parser::ParseResult;
use crate::types::{Primitive, TypeId, TypeKind, TypeTree};

pub use infer::TypeResolver;
pub use scope::ScopeStack;
pub use symbols::{SymbolInfo, SymbolTable};
pub use topo::topological_order;

/// Accumulated units plus everything the pass produces.
#[derive(Debug, Default)]
pub struct Analysis {
    units: Vec<Ast>,
    pub symbols: SymbolTable,
    /// Global symbols, every dependency before its dependents. Empty until
    /// [`Analysis::run`] succeeds.
    pub order: Vec<Name>,
    /// Types resolved for local declarations during verification, keyed by
    /// `(unit, node)`. The back-end reads these.
    pub decl_types: HashMap<(usize, NodeId), TypeId>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one parsed unit. Units with a sticky parse error are rejected;
    /// their pool must not be analyzed.
    pub fn add_unit(&mut self, result: ParseResult, diag: &mut Diagnostics) -> bool {
        if result.had_error {
            diag.error("unit has parse errors", Span::empty(0)).emit();
            return false;
        }
        if result.ast.is_empty() {
            return true;
        }
        self.units.push(result.ast);
        true
    }

    pub fn units(&self) -> &[Ast] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> &Ast {
        &self.units[index]
    }

    /// Runs the five phases. Returns `false` (and leaves diagnostics behind)
    /// on the first phase that cannot complete; later phases still run when
    /// their inputs are usable.
    pub fn run(
        &mut self,
        types: &mut TypeTree,
        names: &NameTable,
        diag: &mut Diagnostics,
    ) -> bool {
        verify_type_names(types, names, diag);

        self.symbols = symbols::collect_symbols(&self.units, diag);

        match topological_order(&mut self.symbols, names, diag) {
            Some(order) => self.order = order,
            None => return false,
        }

        infer::infer_globals(&self.units, &mut self.symbols, &self.order, types, names, diag);

        let verified = verify::verify_units(
            &self.units,
            &self.symbols,
            types,
            names,
            diag,
            &mut self.decl_types,
        );

        verified && !diag.has_errors()
    }
}

/// Phase 1: every `Name` leaf must resolve to a primitive or to an alias
/// registered during parsing.
fn verify_type_names(types: &TypeTree, names: &NameTable, diag: &mut Diagnostics) {
    let mut unknown: Vec<Name> = Vec::new();

    let mut cyclic: Vec<Name> = Vec::new();

    for (_, leaf) in types.leaves() {
        let &TypeKind::Name(name) = &leaf.kind else {
            continue;
        };
        let text = names.resolve(name);
        if Primitive::ALL.iter().any(|p| p.name() == text) {
            continue;
        }
        match types.root_name(name) {
            Some(root) if types.is_aliased(root) => {
                if types.alias_cycle(root) && !cyclic.contains(&name) {
                    cyclic.push(name);
                }
            }
            _ => {
                if !unknown.contains(&name) {
                    unknown.push(name);
                }
            }
        }
    }

    for name in unknown {
        diag.error(
            format!("unknown type name '{}'", names.resolve(name)),
            Span::empty(0),
        )
        .emit();
    }
    for name in cyclic {
        diag.error(
            format!("circular type alias '{}'", names.resolve(name)),
            Span::empty(0),
        )
        .emit();
    }
}
