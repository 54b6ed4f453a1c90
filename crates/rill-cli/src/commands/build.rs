//! `rill build` - full pipeline, C out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgMatches;

use super::{load_session, report};

pub fn run(matches: &ArgMatches) -> ExitCode {
    let (mut session, sources) = match load_session(matches) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    match session.generate() {
        Ok(output) => match matches.get_one::<PathBuf>("output") {
            Some(path) => {
                if let Err(err) = std::fs::write(path, output) {
                    eprintln!("error: cannot write {}: {err}", path.display());
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            None => {
                print!("{output}");
                ExitCode::SUCCESS
            }
        },
        Err(err) => {
            eprintln!("error: {err}");
            report(&session.diag, &sources);
            ExitCode::FAILURE
        }
    }
}
