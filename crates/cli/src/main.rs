//! jsondoc CLI: Redis-style shell for jsondoc document databases.
//!
//! Three modes:
//! - **Shell mode**: `jsondoc [flags] COMMAND`, single command, exit
//! - **REPL mode**: `jsondoc [flags]`, interactive prompt (if stdin is TTY)
//! - **Pipe mode**: `echo "select users" | jsondoc --db shop`, line-by-line from stdin

mod commands;
mod format;
mod parse;
mod repl;
mod state;
mod value;

use std::io::IsTerminal;
use std::process;

use jsondoc_engine::Store;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, OutputMode};
use parse::matches_to_command;
use state::SessionState;

/// Environment variable holding the log filter (e.g. `JSONDOC_LOG=jsondoc=debug`).
const LOG_ENV: &str = "JSONDOC_LOG";

/// Default data directory when `--data-dir` is not given.
const DEFAULT_DATA_DIR: &str = "./data";

fn main() {
    init_logging();

    let cli = build_cli();
    let matches = cli.get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let mut state = match open_session(&matches) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if matches.subcommand().is_some() {
        let exit_code = run_shell_mode(&matches, &mut state, output_mode);
        process::exit(exit_code);
    } else if std::io::stdin().is_terminal() {
        if let Err(e) = repl::run_repl(&mut state, output_mode) {
            eprintln!("(error) {}", e);
            process::exit(1);
        }
    } else {
        let exit_code = repl::run_pipe(&mut state, output_mode);
        process::exit(exit_code);
    }
}

/// Install the stderr log subscriber. Filter from `JSONDOC_LOG`, default `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(matches: &clap::ArgMatches) -> Result<SessionState, String> {
    let data_dir = matches
        .get_one::<String>("data-dir")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_DATA_DIR);

    let store = Store::open(data_dir).map_err(|e| format!("Failed to open store: {}", e))?;
    let mut state = SessionState::new(store);

    if let Some(name) = matches.get_one::<String>("db") {
        state
            .connect(name)
            .map_err(|e| format!("Failed to connect to '{}': {}", name, e))?;
    }
    Ok(state)
}

fn run_shell_mode(matches: &clap::ArgMatches, state: &mut SessionState, mode: OutputMode) -> i32 {
    let cmd = match matches_to_command(matches) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("(error) {}", e);
            return 1;
        }
    };

    match state.execute(cmd) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}
