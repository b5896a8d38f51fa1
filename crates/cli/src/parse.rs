//! ArgMatches → Command/MetaCommand conversion.
//!
//! Data commands go through clap and become a [`Command`]. REPL
//! meta-commands (`help`, `use`, `quit`, `clear`) are recognized before clap
//! sees the line.

use clap::ArgMatches;

use jsondoc_engine::Schema;

use crate::state::Command;
use crate::value::{parse_fields, parse_object, parse_schema, parse_where};

/// REPL meta-commands.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Use { database: String },
    Help { command: Option<String> },
    Quit,
    Clear,
}

/// Check for REPL meta-commands before delegating to clap.
///
/// Returns `Some(MetaCommand)` if the line is a meta-command, `None` otherwise.
pub fn check_meta_command(line: &str) -> Option<MetaCommand> {
    let trimmed = line.trim();
    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next()?;

    match cmd {
        "quit" | "exit" => Some(MetaCommand::Quit),
        "clear" => Some(MetaCommand::Clear),
        "help" => Some(MetaCommand::Help {
            command: parts.next().map(str::to_string),
        }),
        "use" => {
            let database = parts.next()?.to_string();
            Some(MetaCommand::Use { database })
        }
        _ => None,
    }
}

/// Convert clap ArgMatches into a Command.
pub fn matches_to_command(matches: &ArgMatches) -> Result<Command, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let cmd = match sub_name {
        "db" => parse_db(sub_matches)?,
        "collection" => parse_collection(sub_matches)?,
        "insert" => Command::Insert {
            collection: collection(sub_matches)?,
            fields: parse_fields(&many(sub_matches, "fields"))?,
        },
        "select" => Command::Select {
            collection: collection(sub_matches)?,
            predicate: parse_where(&many(sub_matches, "where"))?,
        },
        "delete" => Command::Delete {
            collection: collection(sub_matches)?,
            predicate: parse_where(&many(sub_matches, "where"))?,
        },
        "update" => Command::Update {
            collection: collection(sub_matches)?,
            predicate: parse_object(&required(sub_matches, "where")?)?.into(),
            patch: parse_object(&required(sub_matches, "patch")?)?,
        },
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(cmd)
}

// =========================================================================
// Helpers
// =========================================================================

fn required(matches: &ArgMatches, id: &str) -> Result<String, String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", id))
}

fn many(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

fn collection(matches: &ArgMatches) -> Result<String, String> {
    required(matches, "collection")
}

// =========================================================================
// Subcommand groups
// =========================================================================

fn parse_db(matches: &ArgMatches) -> Result<Command, String> {
    let (sub, m) = matches
        .subcommand()
        .ok_or_else(|| "Missing db subcommand".to_string())?;
    Ok(match sub {
        "create" => Command::DbCreate {
            name: required(m, "name")?,
        },
        "connect" => Command::DbConnect {
            name: required(m, "name")?,
        },
        "drop" => Command::DbDrop {
            name: required(m, "name")?,
        },
        "list" => Command::DbList,
        other => return Err(format!("Unknown db subcommand: {}", other)),
    })
}

fn parse_collection(matches: &ArgMatches) -> Result<Command, String> {
    let (sub, m) = matches
        .subcommand()
        .ok_or_else(|| "Missing collection subcommand".to_string())?;
    Ok(match sub {
        "create" => Command::CollectionCreate {
            name: required(m, "name")?,
            schema: match m.get_one::<String>("schema") {
                Some(s) => parse_schema(s)?,
                None => Schema::new(),
            },
        },
        "list" => Command::CollectionList,
        other => return Err(format!("Unknown collection subcommand: {}", other)),
    })
}
