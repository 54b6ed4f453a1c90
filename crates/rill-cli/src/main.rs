mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();

    match matches.subcommand() {
        Some(("build", m)) => commands::build::run(m),
        Some(("check", m)) => commands::check::run(m),
        Some(("ast", m)) => commands::ast::run(m),
        Some(("tokens", m)) => commands::tokens::run(m),
        Some(("peg", m)) => commands::peg::run(m),
        _ => unreachable!("clap should have caught this"),
    }
}
