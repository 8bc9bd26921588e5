//! # sat_engine
//!
//! Command-line front end for the DPLL and CDCL solvers.
//!
//! ```sh
//! sat_engine <file.cnf> [OPTIONS]
//! sat_engine file --path <file.cnf> [OPTIONS]
//! sat_engine text --input "1 -2 0 2 3 0" [OPTIONS]
//! sat_engine dir --path <directory> [OPTIONS]
//! sat_engine completions <shell>
//! ```
//!
//! The solver and its components are picked with `--solver`, `--propagator`,
//! `--variable-selection`, `--restart-strategy` and `--analyser`. Search can
//! be bounded with `--max-conflicts`, `--max-decisions` and `--timeout`.
//!
//! The result is printed as an `s` line. A single problem exits with 10 for
//! SATISFIABLE, 20 for UNSATISFIABLE and 0 otherwise; input errors exit
//! with 1.

use crate::command_line::cli::{Cli, Commands, CommonOptions, solve_dir, solve_file, solve_text};
use clap::{CommandFactory, Parser};
use sat_engine::sat::solver::SolveResult;
use std::process;
use tikv_jemallocator::Jemalloc;

mod command_line;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn init_logging(common: &CommonOptions) {
    let level = if common.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(cli: Cli) -> Result<Option<SolveResult>, String> {
    match cli.command {
        Some(Commands::File { path, common }) => {
            init_logging(&common);
            solve_file(&path, &common).map(Some)
        }
        Some(Commands::Text { input, common }) => {
            init_logging(&common);
            solve_text(&input, &common).map(Some)
        }
        Some(Commands::Dir { path, common }) => {
            init_logging(&common);
            solve_dir(&path, &common).map(|()| None)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(None)
        }
        None => {
            init_logging(&cli.common);
            let Some(path) = cli.path else {
                return Err("no input given; pass a .cnf path or a subcommand (see --help)".into());
            };
            solve_file(&path, &cli.common).map(Some)
        }
    }
}

fn main() {
    match run(Cli::parse()) {
        Ok(Some(result)) => process::exit(result.exit_code()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
