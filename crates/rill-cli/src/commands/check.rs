//! `rill check` - parse and analyze, emit nothing.

use std::process::ExitCode;

use clap::ArgMatches;

use super::{load_session, report};

pub fn run(matches: &ArgMatches) -> ExitCode {
    let (mut session, sources) = match load_session(matches) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    if session.diag.has_errors() || !session.analyze() {
        report(&session.diag, &sources);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
