//! Rill compiler front-end: lexer, parser, type tree, semantic pass, and a
//! C-emitting reference back-end.
//!
//! - `lexer` - source text to tokens, with automatic semicolon insertion
//! - `ast` - the index-based node pool
//! - `parser` - recursive descent plus the FSA type parser
//! - `types` - the canonicalizing type tree
//! - `analyze` - symbol collection, dependency order, inference, verification
//! - `printer` - diagnostic AST rendering
//! - `codegen` - the deferred build stream and the C back-end
//! - `session` - staged pipeline facade
//!
//! # Example
//!
//! ```
//! use rill_compiler::Session;
//!
//! let c = Session::compile("add :: (a: int, b: int) -> int {\n\ta + b\n}\n")
//!     .expect("valid program");
//! assert!(c.contains("long add(long a, long b)"));
//! ```

pub mod analyze;
pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod session;
pub mod types;

#[cfg(test)]
mod types_tests;

use rill_core::Diagnostics;

pub use session::Session;

/// Pipeline-level failures. Stage diagnostics ride along so callers can
/// render them with source context.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("parsing failed with {} errors", .0.error_count())]
    Parse(Diagnostics),

    #[error("analysis failed with {} errors", .0.error_count())]
    Analyze(Diagnostics),

    #[error(transparent)]
    Generate(#[from] codegen::GenError),
}

pub type Result<T> = std::result::Result<T, Error>;
