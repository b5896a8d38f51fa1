//! REPL loop with rustyline.
//!
//! Interactive mode: prompt, meta-commands, history, TAB completion.
//! Pipe mode: read lines from stdin, execute each.

use std::io::{self, BufRead};
use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};

use crate::commands::build_repl_cmd;
use crate::format::{format_error, format_output, OutputMode};
use crate::parse::{check_meta_command, matches_to_command, MetaCommand};
use crate::state::{Output, SessionState};

/// Run the interactive REPL.
pub fn run_repl(state: &mut SessionState, mode: OutputMode) -> rustyline::Result<()> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<JsondocHelper, _> = Editor::with_config(config)?;
    rl.set_helper(Some(JsondocHelper));

    let history_path = history_file();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = state.prompt();
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                if let Some(meta) = check_meta_command(trimmed) {
                    match meta {
                        MetaCommand::Quit => break,
                        MetaCommand::Clear => {
                            // ANSI clear screen
                            print!("\x1B[2J\x1B[1;1H");
                        }
                        MetaCommand::Help { command } => print_help(command.as_deref()),
                        MetaCommand::Use { database } => match state.connect(&database) {
                            Ok(()) => println!(
                                "{}",
                                format_output(&Output::Connected(database), mode)
                            ),
                            Err(e) => eprintln!("{}", format_error(&e, mode)),
                        },
                    }
                    continue;
                }

                execute_line(trimmed, state, mode);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: fresh prompt
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("(error) {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
    Ok(())
}

/// Run in pipe mode: read lines from stdin, execute each.
///
/// Blank lines and `#` comments are skipped. Returns a non-zero exit code if
/// any line failed.
pub fn run_pipe(state: &mut SessionState, mode: OutputMode) -> i32 {
    let stdin = io::stdin();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(MetaCommand::Use { database }) = check_meta_command(trimmed) {
            if let Err(e) = state.connect(&database) {
                eprintln!("{}", format_error(&e, mode));
                exit_code = 1;
            }
            continue;
        }

        if !execute_line(trimmed, state, mode) {
            exit_code = 1;
        }
    }

    exit_code
}

/// Tokenize, parse and execute one line. Returns true on success.
fn execute_line(line: &str, state: &mut SessionState, mode: OutputMode) -> bool {
    // shlex respects quotes, so JSON arguments can contain spaces.
    let tokens = match shlex::split(line) {
        Some(t) if !t.is_empty() => t,
        Some(_) => return true,
        None => {
            eprintln!("(error) Invalid quoting: {}", line);
            return false;
        }
    };

    let matches = match build_repl_cmd().try_get_matches_from(tokens) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return false;
        }
    };

    let cmd = match matches_to_command(&matches) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("(error) {}", e);
            return false;
        }
    };

    match state.execute(cmd) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            true
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            false
        }
    }
}

fn history_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".jsondoc_history"))
}

fn print_help(command: Option<&str>) {
    if let Some(cmd) = command {
        let cli = build_repl_cmd();
        if let Err(e) = cli.try_get_matches_from(vec![cmd, "--help"]) {
            println!("{}", e);
        }
    } else {
        println!("Available commands:");
        println!("  db          Database operations (create, connect, drop, list)");
        println!("  collection  Collection operations (create, list)");
        println!("  insert      Insert a record: insert <coll> <json | field=value ...>");
        println!("  select      Select records: select <coll> [json | field=value ...]");
        println!("  delete      Delete records: delete <coll> [json | field=value ...]");
        println!("  update      Update records: update <coll> <where-json> <patch-json>");
        println!();
        println!("Meta-commands:");
        println!("  use <db>               Connect to a database");
        println!("  help [command]         Show help");
        println!("  quit / exit            Exit REPL");
        println!("  clear                  Clear screen");
    }
}

// =========================================================================
// TAB Completion
// =========================================================================

/// Known top-level commands for TAB completion.
const TOP_LEVEL_COMMANDS: &[&str] = &[
    "db",
    "collection",
    "insert",
    "select",
    "delete",
    "update",
    "use",
    "help",
    "quit",
    "exit",
    "clear",
];

/// Known subcommands for each top-level command.
fn subcommands_for(cmd: &str) -> &'static [&'static str] {
    match cmd {
        "db" => &["create", "connect", "drop", "list"],
        "collection" => &["create", "list"],
        _ => &[],
    }
}

fn pairs<'a>(words: impl Iterator<Item = &'a &'a str>) -> Vec<Pair> {
    words
        .map(|w| Pair {
            display: w.to_string(),
            replacement: w.to_string(),
        })
        .collect()
}

struct JsondocHelper;

impl Helper for JsondocHelper {}
impl Validator for JsondocHelper {}
impl Highlighter for JsondocHelper {}
impl Hinter for JsondocHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for JsondocHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];
        let parts: Vec<&str> = line_to_pos.split_whitespace().collect();
        let trailing_space = line_to_pos.ends_with(' ');

        if parts.is_empty() || (parts.len() == 1 && !trailing_space) {
            let prefix = parts.first().copied().unwrap_or("");
            let start = pos - prefix.len();
            let candidates = pairs(TOP_LEVEL_COMMANDS.iter().filter(|c| c.starts_with(prefix)));
            Ok((start, candidates))
        } else if parts.len() == 1 && trailing_space {
            Ok((pos, pairs(subcommands_for(parts[0]).iter())))
        } else if parts.len() == 2 && !trailing_space {
            let prefix = parts[1];
            let start = pos - prefix.len();
            let candidates = pairs(
                subcommands_for(parts[0])
                    .iter()
                    .filter(|s| s.starts_with(prefix)),
            );
            Ok((start, candidates))
        } else {
            Ok((pos, vec![]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_top_level_command_is_known() {
        let cmd = build_repl_cmd();
        for name in TOP_LEVEL_COMMANDS {
            let is_meta = check_meta_command(&format!("{} x", name)).is_some();
            assert!(
                is_meta || cmd.find_subcommand(name).is_some(),
                "{} is neither a command nor a meta-command",
                name
            );
        }
    }

    #[test]
    fn test_subcommands_match_clap_tree() {
        let cmd = build_repl_cmd();
        for group in ["db", "collection"] {
            let sub = cmd.find_subcommand(group).unwrap();
            for name in subcommands_for(group) {
                assert!(sub.find_subcommand(name).is_some(), "{} {}", group, name);
            }
        }
    }
}
