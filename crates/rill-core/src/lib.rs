//! Shared infrastructure for the Rill compiler and its companion tools.
//!
//! - `names` - string interning (`Name` handles used as symbol fingerprints)
//! - `span` - byte ranges into source text
//! - `diagnostics` - diagnostic collection and rendering

pub mod diagnostics;
pub mod names;
mod span;


pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use names::{Name, NameTable};
pub use span::Span;
