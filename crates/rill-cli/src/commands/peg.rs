//! `rill peg` - run the parser generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgMatches;
use rill_core::Diagnostics;

use super::{read_source, report};

pub fn run(matches: &ArgMatches) -> ExitCode {
    let grammar = matches
        .get_one::<PathBuf>("grammar")
        .expect("clap requires the grammar");
    let tokens_out = matches
        .get_one::<PathBuf>("tokens_out")
        .expect("clap requires the output");
    let rules_out = matches
        .get_one::<PathBuf>("rules_out")
        .expect("clap requires the output");

    let text = match read_source(grammar) {
        Ok(text) => text,
        Err(code) => return code,
    };

    let mut diag = Diagnostics::new();
    match rill_peg::generate(&text, &mut diag) {
        Ok(generated) => {
            for (path, source) in [
                (tokens_out, &generated.tokens_source),
                (rules_out, &generated.rules_source),
            ] {
                if let Err(err) = std::fs::write(path, source) {
                    eprintln!("error: cannot write {}: {err}", path.display());
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            report(&diag, &[(grammar.clone(), text)]);
            ExitCode::FAILURE
        }
    }
}
