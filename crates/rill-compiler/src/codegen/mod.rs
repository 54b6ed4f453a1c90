//! Target code building.
//!
//! - `builder` - the deferred build stream any back-end can ingest
//! - `ctype` - C type representation and declarator rendering
//! - `typegen` - interned types lowered to C types (anonymous aggregates)
//! - `cgen` - the reference back-end driver producing C source

mod builder;
mod cgen;
mod ctype;
mod typegen;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod cgen_tests;
#[cfg(test)]
mod typegen_tests;

pub use builder::{BuildError, CIdent, CodeBuilder};
pub use cgen::{GenError, generate_c};
pub use ctype::{CType, CTypeMod};
pub use typegen::{AnonStruct, AnonTable, LowerError, build_type};
