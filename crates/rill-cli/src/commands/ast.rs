//! `rill ast` - diagnostic AST dump.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgMatches;
use rill_compiler::Session;

use super::{read_source, report};

pub fn run(matches: &ArgMatches) -> ExitCode {
    let path = matches
        .get_one::<PathBuf>("file")
        .expect("clap requires the file");
    let text = match read_source(path) {
        Ok(text) => text,
        Err(code) => return code,
    };

    let mut session = Session::new();
    match session.dump_ast(&text) {
        Some(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        None => {
            report(&session.diag, &[(path.clone(), text)]);
            ExitCode::FAILURE
        }
    }
}
