//! Command-line surface.

use std::path::PathBuf;

use clap::{Arg, Command, value_parser};

fn files_arg() -> Arg {
    Arg::new("files")
        .value_name("FILE")
        .num_args(1..)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Rill source files")
}

fn file_arg() -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Rill source file")
}

pub fn build_cli() -> Command {
    Command::new("rill")
        .about("Compiler for the Rill language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Compile source files and emit C")
                .arg(files_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the generated C here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse and analyze without emitting")
                .arg(files_arg()),
        )
        .subcommand(
            Command::new("ast")
                .about("Print the parsed AST")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("peg")
                .about("Generate a parser from a rule file")
                .arg(
                    Arg::new("grammar")
                        .value_name("GRAMMAR")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Rule file"),
                )
                .arg(
                    Arg::new("tokens_out")
                        .value_name("TOKENS_OUT")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file for the token matcher"),
                )
                .arg(
                    Arg::new("rules_out")
                        .value_name("RULES_OUT")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file for the rule parsers"),
                ),
        )
}

#[cfg(test)]
mod tests {
    #[test]
    fn cli_definition_is_consistent() {
        super::build_cli().debug_assert();
    }
}
