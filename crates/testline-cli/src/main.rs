use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Line-targeted test selection and rerun reports.
///
/// testline sits next to a test harness. It reads a registry manifest the
/// harness dumps (every runnable, case and source location) and either picks
/// the test that owns a source line or turns a stream of results into
/// ready-to-rerun commands.
///
/// EXAMPLES:
///     testline resolve -r registry.json -l 12 test/calc_test.rb
///     testline scan -r registry.json test/calc_test.rb
///     testline report -r registry.json --results results.jsonl
///
/// ENVIRONMENT VARIABLES:
///     TESTLINE_REGISTRY           Default registry manifest path
///     TESTLINE_RERUN_PREFIX       Invocation prefix of rerun lines
///     TESTLINE_TEST_FILE_PATTERN  Regex identifying test files
///     TESTLINE_LOG                Log filter (e.g. 'debug'), written to stderr
#[derive(Parser)]
#[command(name = "testline")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filter selecting the test that owns a line
    ///
    /// Looks for exactly one test file among ARGS. When a line is given and a
    /// single test file is found, prints the filter expression to pass to the
    /// harness. Otherwise prints nothing and the run stays unfiltered.
    ///
    /// EXAMPLES:
    ///     testline resolve -r registry.json -l 12 test/calc_test.rb
    ///     testline resolve -r registry.json -l 4 -- -Itest calc_test.rb
    Resolve {
        /// Registry manifest dumped by the harness
        #[arg(long, short = 'r', env = "TESTLINE_REGISTRY")]
        registry: PathBuf,
        /// Run the test at this line number
        #[arg(long, short = 'l')]
        line: Option<u32>,
        /// Arguments passed to the harness; the test file is detected among them
        args: Vec<String>,
    },

    /// List every test and group defined in a file
    ///
    /// EXAMPLES:
    ///     testline scan -r registry.json test/calc_test.rb
    ///     testline scan -r registry.json test/calc_test.rb --json
    Scan {
        /// Registry manifest dumped by the harness
        #[arg(long, short = 'r', env = "TESTLINE_REGISTRY")]
        registry: PathBuf,
        /// Test file to scan
        file: PathBuf,
        /// Output candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print rerun commands for failed tests
    ///
    /// Reads one JSON result per line and prints a rerun command for every
    /// failed or errored test. Prints nothing when all tests passed.
    ///
    /// EXAMPLES:
    ///     testline report -r registry.json --results results.jsonl
    ///     testline report -r registry.json --results - --prefix "bin/test"
    Report {
        /// Registry manifest dumped by the harness
        #[arg(long, short = 'r', env = "TESTLINE_REGISTRY")]
        registry: PathBuf,
        /// Results file in JSON lines format ('-' for stdin)
        #[arg(long)]
        results: PathBuf,
        /// Invocation prefix of rerun lines (overrides testline.toml)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     testline completions bash > ~/.bash_completions/testline.bash
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("TESTLINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Resolve {
            registry,
            line,
            args,
        } => {
            let args = commands::resolve::ResolveArgs {
                registry,
                line,
                args,
                project_dir: std::env::current_dir()?,
            };
            commands::resolve::run(args)?;
        }
        Commands::Scan {
            registry,
            file,
            json,
        } => {
            let args = commands::scan::ScanArgs {
                registry,
                file,
                json,
                project_dir: std::env::current_dir()?,
            };
            commands::scan::run(args)?;
        }
        Commands::Report {
            registry,
            results,
            prefix,
        } => {
            let args = commands::report::ReportArgs {
                registry,
                results,
                prefix,
                project_dir: std::env::current_dir()?,
            };
            commands::report::run(args)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "testline", &mut io::stdout());
        }
    }

    Ok(())
}
