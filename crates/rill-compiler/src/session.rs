//! Staged compilation facade.
//!
//! A [`Session`] owns the state shared across translation units (name table,
//! type tree, diagnostics, accumulated analysis) and walks the pipeline:
//! sources are lexed and parsed as they are added, then analyzed together,
//! then emitted. Nothing is emitted once any stage reported an error.

use rill_core::{Diagnostics, NameTable};

use crate::analyze::Analysis;
use crate::codegen::generate_c;
use crate::lexer::{Token, lex};
use crate::parser::parse;
use crate::printer::print_ast;
use crate::types::TypeTree;
use crate::Error;

pub struct Session {
    pub names: NameTable,
    pub types: TypeTree,
    pub diag: Diagnostics,
    pub analysis: Analysis,
    parse_failed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let mut names = NameTable::new();
        let types = TypeTree::new(&mut names);
        Self {
            names,
            types,
            diag: Diagnostics::new(),
            analysis: Analysis::new(),
            parse_failed: false,
        }
    }

    /// Lexes and parses one source, accumulating the unit for analysis.
    /// Returns `false` when the unit had lexical or syntactic errors.
    pub fn add_source(&mut self, source: &str) -> bool {
        let before = self.diag.error_count();
        let tokens = lex(source, &mut self.diag);
        let result = parse(tokens, &mut self.types, &mut self.names, &mut self.diag);

        let clean = !result.had_error && self.diag.error_count() == before;
        if clean {
            self.analysis.add_unit(result, &mut self.diag);
        } else {
            self.parse_failed = true;
        }
        clean
    }

    /// Token dump for the `tokens` command.
    pub fn tokens(&mut self, source: &str) -> Vec<Token> {
        lex(source, &mut self.diag)
    }

    /// Parses one source and renders its AST, without keeping the unit.
    pub fn dump_ast(&mut self, source: &str) -> Option<String> {
        let tokens = lex(source, &mut self.diag);
        let result = parse(tokens, &mut self.types, &mut self.names, &mut self.diag);
        if result.had_error {
            return None;
        }
        Some(print_ast(&result.ast, &self.types, &self.names))
    }

    /// Runs the semantic pass over every added unit.
    pub fn analyze(&mut self) -> bool {
        if self.parse_failed {
            return false;
        }
        self.analysis
            .run(&mut self.types, &self.names, &mut self.diag)
    }

    /// The full pipeline: analysis then C emission. On any error the output
    /// is withheld.
    pub fn generate(&mut self) -> Result<String, Error> {
        if self.parse_failed {
            return Err(Error::Parse(self.diag.clone()));
        }
        if !self.analyze() {
            return Err(Error::Analyze(self.diag.clone()));
        }
        Ok(generate_c(&self.analysis, &self.types, &self.names)?)
    }

    /// One-shot compilation of a single source to C.
    pub fn compile(source: &str) -> Result<String, Error> {
        let mut session = Session::new();
        if !session.add_source(source) {
            return Err(Error::Parse(session.diag));
        }
        session.generate()
    }
}
