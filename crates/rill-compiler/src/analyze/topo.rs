//! Phase 3: topological ordering of the global dependency graph.
//!
//! Iterative DFS with an explicit stack sized at the symbol count, so deep
//! dependency chains cannot overflow the native stack. Nodes are appended on
//! subtree completion (postorder), which puts every dependency before its
//! dependents. An `active` node reached again is a cycle and fails the pass.

use rill_core::{Diagnostics, Name, NameTable};

use super::symbols::SymbolTable;

/// Produces the evaluation order, or `None` if the graph has a cycle.
///
/// Roots (symbols nothing depends on) are walked first in table order;
/// whatever remains unvisited afterwards sits inside or behind a pure cycle
/// and is walked again so the cycle is reported.
pub fn topological_order(
    symbols: &mut SymbolTable,
    names: &NameTable,
    diag: &mut Diagnostics,
) -> Option<Vec<Name>> {
    let mut order = Vec::with_capacity(symbols.len());

    let roots: Vec<Name> = symbols
        .values()
        .filter(|info| info.dependents == 0)
        .map(|info| info.name)
        .collect();
    for root in roots {
        if !symbols[&root].visited && !dfs(root, symbols, &mut order, names, diag) {
            return None;
        }
    }

    let remainder: Vec<Name> = symbols
        .values()
        .filter(|info| !info.visited)
        .map(|info| info.name)
        .collect();
    for name in remainder {
        if !symbols[&name].visited && !dfs(name, symbols, &mut order, names, diag) {
            return None;
        }
    }

    debug_assert_eq!(order.len(), symbols.len());
    Some(order)
}

fn dfs(
    start: Name,
    symbols: &mut SymbolTable,
    order: &mut Vec<Name>,
    names: &NameTable,
    diag: &mut Diagnostics,
) -> bool {
    // frame: (symbol, next dep index)
    let mut stack: Vec<(Name, usize)> = Vec::with_capacity(symbols.len());

    {
        let info = symbols.get_mut(&start).expect("start symbol exists");
        info.visited = true;
        info.active = true;
    }
    stack.push((start, 0));

    while let Some(frame) = stack.last_mut() {
        let (sym, index) = *frame;
        let dep = symbols[&sym].deps.get(index).copied();

        let Some(child) = dep else {
            symbols.get_mut(&sym).expect("symbol exists").active = false;
            order.push(sym);
            stack.pop();
            continue;
        };
        frame.1 += 1;

        let child_info = &symbols[&child];
        if child_info.active {
            let child_span = child_info.span;
            diag.error(
                format!(
                    "circular variable dependency: {} referenced in {}",
                    names.resolve(child),
                    names.resolve(sym)
                ),
                symbols[&sym].span,
            )
            .related_to(
                format!("{} declared here", names.resolve(child)),
                child_span,
            )
            .emit();
            return false;
        }

        if !child_info.visited {
            let info = symbols.get_mut(&child).expect("child exists");
            info.visited = true;
            info.active = true;
            stack.push((child, 0));
        }
    }

    true
}
