//! One module per subcommand.

pub mod ast;
pub mod build;
pub mod check;
pub mod peg;
pub mod tokens;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::ArgMatches;
use rill_compiler::Session;
use rill_core::Diagnostics;

pub(crate) fn read_source(path: &Path) -> Result<String, ExitCode> {
    std::fs::read_to_string(path).map_err(|err| {
        eprintln!("error: cannot read {}: {err}", path.display());
        ExitCode::FAILURE
    })
}

pub(crate) fn source_paths(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>("files")
        .expect("clap requires at least one file")
        .cloned()
        .collect()
}

/// Renders diagnostics with source context when the compilation had exactly
/// one source, plainly otherwise, then reports the error count.
pub(crate) fn report(diag: &Diagnostics, sources: &[(PathBuf, String)]) {
    let rendered = match sources {
        [(path, text)] => diag
            .printer()
            .source(text)
            .path(&path.display().to_string())
            .render(),
        _ => diag.printer().render(),
    };
    if !rendered.is_empty() {
        eprintln!("{rendered}");
    }
    eprintln!(
        "{} errors, {} warnings",
        diag.error_count(),
        diag.warning_count()
    );
}

/// Loads every file into one session. On read failure the exit code comes
/// back as the error.
pub(crate) fn load_session(
    matches: &ArgMatches,
) -> Result<(Session, Vec<(PathBuf, String)>), ExitCode> {
    let mut session = Session::new();
    let mut sources = Vec::new();

    for path in source_paths(matches) {
        let text = read_source(&path)?;
        session.add_source(&text);
        sources.push((path, text));
    }
    Ok((session, sources))
}
