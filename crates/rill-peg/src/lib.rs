//! Parser generator used to bootstrap the Rill parser.
//!
//! The tool has the same shape as the main compiler pipeline: `scan` turns
//! rule text into tokens, `parse` builds a pooled rule IR, and `emit`
//! produces Rust source for (a) a token-kind enum with a matcher and (b) one
//! parse function per rule. The driver writes the two outputs to the files
//! it names.
//!
//! Rule syntax:
//!
//! ```text
//! rule  -> item+ ';'
//! item  -> '->' (atom | group | choice | repeat | option)
//! group -> '(' item+ ')'
//! choice-> item ('|' item)+
//! repeat-> item ('*' | '+')
//! option-> item '?'
//! atom  -> IDENT | 'string' | /regex/
//! ```
//!
//! `#` and `=` start line comments.

mod emit;
mod lexer;
mod parser;

#[cfg(test)]
mod emit_tests;
#[cfg(test)]
mod lexer_tests;

use rill_core::Diagnostics;

pub use emit::{EmitError, GeneratedParser, emit};
pub use lexer::{PegToken, PegTokenKind, scan};
pub use parser::{Expr, ExprId, ParseResult, RuleSet, parse};

/// Full pipeline: rule text to the two generated sources.
pub fn generate(source: &str, diag: &mut Diagnostics) -> Result<GeneratedParser, Error> {
    let tokens = scan(source, diag);
    let result = parse(tokens, diag);
    if result.had_error {
        return Err(Error::Parse);
    }
    Ok(emit(&result.rules)?)
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("rule file has syntax errors")]
    Parse,

    #[error(transparent)]
    Emit(#[from] EmitError),
}
