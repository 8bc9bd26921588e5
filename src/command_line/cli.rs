#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, Parser, Subcommand};
use sat_engine::sat::assignment::Solutions;
use sat_engine::sat::cdcl::Cdcl;
use sat_engine::sat::cnf::Cnf;
use sat_engine::sat::conflict_analysis::AnalyserType;
use sat_engine::sat::dimacs::{parse_file, parse_str};
use sat_engine::sat::dpll::Dpll;
use sat_engine::sat::propagation::PropagatorType;
use sat_engine::sat::restarter::RestarterType;
use sat_engine::sat::solver::{
    Budget, DynamicConfig, SolutionStats, SolveResult, Solver, SolverImpls, SolverType,
};
use sat_engine::sat::variable_selection::VariableSelectionType;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the solver.
#[derive(Parser, Debug)]
#[command(name = "sat_engine", version, about = "A DPLL/CDCL SAT solver")]
pub(crate) struct Cli {
    /// A DIMACS .cnf file to solve when no subcommand is given.
    pub path: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula given as DIMACS text (e.g. "1 -2 0 2 3 0").
    Text {
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf file under a directory.
    Dir {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving command.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Log search progress at debug level (RUST_LOG overrides).
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against the original clauses.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub(crate) verify: bool,

    /// Print problem and search statistics.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print the model of a satisfiable formula.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    #[arg(long, default_value_t = SolverType::Cdcl)]
    solver: SolverType,

    #[arg(long, default_value_t = PropagatorType::WatchedLiterals)]
    propagator: PropagatorType,

    #[arg(long, default_value_t = VariableSelectionType::FixedOrder)]
    variable_selection: VariableSelectionType,

    #[arg(long, default_value_t = RestarterType::Fixed)]
    restart_strategy: RestarterType,

    #[arg(long, default_value_t = AnalyserType::FirstUip)]
    analyser: AnalyserType,

    /// Give up with UNKNOWN after this many conflicts.
    #[arg(long)]
    max_conflicts: Option<usize>,

    /// Give up with UNKNOWN after this many decisions.
    #[arg(long)]
    max_decisions: Option<usize>,

    /// Give up with UNKNOWN after this many seconds.
    #[arg(long)]
    timeout: Option<f64>,
}

impl CommonOptions {
    pub(crate) fn budget(&self) -> Budget {
        Budget {
            max_conflicts: self.max_conflicts,
            max_decisions: self.max_decisions,
            timeout: self
                .timeout
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }
}

/// Builds the solver the options describe.
pub(crate) fn get_solver(common: &CommonOptions, cnf: &Cnf) -> SolverImpls<DynamicConfig> {
    if common.solver == SolverType::Cdcl
        && common.analyser == AnalyserType::LevelScan
        && common.restart_strategy == RestarterType::Fixed
    {
        log::warn!("level-scan learning with fixed restarts can revisit the same search forever");
    }

    let propagator = common.propagator.to_impl(cnf);
    let selector = common.variable_selection.to_impl(cnf.num_vars);

    let mut solver = match common.solver {
        SolverType::Cdcl => SolverImpls::Cdcl(Box::new(Cdcl::<DynamicConfig>::from_parts(
            cnf.clone(),
            propagator,
            selector,
            common.restart_strategy.to_impl(),
            common.analyser.to_impl(cnf.num_vars),
        ))),
        SolverType::Dpll => SolverImpls::Dpll(Box::new(Dpll::<DynamicConfig>::from_parts(
            cnf.clone(),
            propagator,
            selector,
        ))),
    };
    solver.set_budget(common.budget());
    solver
}

/// Solves every `.cnf` file below `path`, reporting each.
///
/// # Errors
///
/// If `path` is not a directory or a file fails to parse.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            log::debug!("skipping non-CNF file {}", file_path.display());
            continue;
        }

        solve_file(file_path, common)?;
    }

    Ok(())
}

/// Parses and solves one DIMACS file.
///
/// # Errors
///
/// If the file cannot be read or is not valid DIMACS.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<SolveResult, String> {
    let time = Instant::now();
    let cnf = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed();
    Ok(solve_and_report(&cnf, common, Some(path), parse_time))
}

/// Parses and solves DIMACS text.
///
/// # Errors
///
/// If the text is not valid DIMACS.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<SolveResult, String> {
    let time = Instant::now();
    let cnf = parse_str(input).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();
    Ok(solve_and_report(&cnf, common, None, parse_time))
}

/// Checks a model against the original clauses and prints the verdict.
pub(crate) fn verify_solution(cnf: &Cnf, sol: &Solutions) -> bool {
    let ok = cnf.verify(sol);
    println!("Verified: {ok:?}");
    if !ok {
        log::error!("model fails at least one original clause");
    }
    ok
}

/// Solves `cnf` with the configured solver, timing the search.
pub(crate) fn solve(
    cnf: &Cnf,
    label: Option<&Path>,
    common: &CommonOptions,
) -> (SolveResult, Duration, SolutionStats) {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    log::debug!(
        "{} variables, {} clauses, {} literals",
        cnf.num_vars,
        cnf.len(),
        cnf.num_literals()
    );

    let time = Instant::now();
    let mut solver = get_solver(common, cnf);
    let result = solver.solve();
    let elapsed = time.elapsed();

    (result, elapsed, solver.stats())
}

/// Allocated and resident memory in MiB, if jemalloc can report them.
fn memory_usage() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::read().ok()?;
    let resident = stats::resident::read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Solves, verifies and prints statistics as the options ask.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> SolveResult {
    let (result, elapsed, solver_stats) = solve(cnf, label, common);

    if common.verify {
        if let Some(sol) = result.solutions() {
            verify_solution(cnf, sol);
        }
    }

    if common.stats {
        print_stats(parse_time, elapsed, cnf, &solver_stats, memory_usage());
    }

    if common.print_solution {
        if let Some(sol) = result.solutions() {
            println!("v {sol}");
        }
    }

    println!("s {result}");
    result
}

pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    memory: Option<(f64, f64)>,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses (original)", cnf.num_original());
    stat_line("Literals (original)", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line("Learnt clauses", s.learnt_clauses);
    stat_line("Total clauses (incl. learnt)", cnf.len() + s.learnt_clauses);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Restarts", s.restarts, elapsed_secs);
    if let Some((allocated, resident)) = memory {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::parse_from([
            "sat_engine",
            "text",
            "--input",
            "1 0",
            "--solver",
            "dpll",
            "--propagator",
            "unit-search",
            "--verify",
            "false",
            "--max-conflicts",
            "5",
        ]);
        let Some(Commands::Text { input, common }) = cli.command else {
            panic!("expected the text subcommand");
        };
        assert_eq!(input, "1 0");
        assert_eq!(common.solver, SolverType::Dpll);
        assert_eq!(common.propagator, PropagatorType::UnitSearch);
        assert!(!common.verify);
        assert_eq!(common.budget().max_conflicts, Some(5));
    }

    #[test]
    fn test_get_solver_honours_options() {
        let cnf = parse_str("1 2 0\n-1 0\n").unwrap();
        let common = CommonOptions {
            solver: SolverType::Dpll,
            ..CommonOptions::default()
        };
        let mut solver = get_solver(&common, &cnf);
        assert!(matches!(solver, SolverImpls::Dpll(_)));
        let model = solver.solve().into_solutions().unwrap();
        assert_eq!(model.as_slice(), &[false, true]);
    }
}
