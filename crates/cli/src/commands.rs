//! Clap command tree definition.
//!
//! Builds the full `clap::Command` tree used by both shell mode (directly)
//! and REPL mode (via `try_get_matches_from`).

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
///
/// This is shared between shell mode and REPL mode.
pub fn build_cli() -> Command {
    Command::new("jsondoc")
        .about("Interactive shell for jsondoc document databases")
        .subcommand_required(false)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory holding database files (default: ./data)")
                .global(true),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("NAME")
                .help("Database to connect to on start")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (one compact JSON record per line)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommands(data_commands())
}

/// Build a command tree for REPL mode (no global flags).
pub fn build_repl_cmd() -> Command {
    Command::new("repl")
        .multicall(true)
        .subcommand_required(true)
        .subcommands(data_commands())
}

fn data_commands() -> Vec<Command> {
    vec![
        build_db(),
        build_collection(),
        build_insert(),
        build_select(),
        build_delete(),
        build_update(),
    ]
}

// =========================================================================
// Databases
// =========================================================================

fn build_db() -> Command {
    let name = || Arg::new("name").required(true).help("Database name");
    Command::new("db")
        .about("Database operations")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a database (replaces an existing one) and connect to it")
                .arg(name()),
        )
        .subcommand(
            Command::new("connect")
                .about("Connect to an existing database")
                .arg(name()),
        )
        .subcommand(Command::new("drop").about("Delete a database file").arg(name()))
        .subcommand(Command::new("list").about("List databases in the data directory"))
}

// =========================================================================
// Collections
// =========================================================================

fn build_collection() -> Command {
    Command::new("collection")
        .about("Collection operations")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a collection (replaces an existing one)")
                .arg(Arg::new("name").required(true).help("Collection name"))
                .arg(
                    Arg::new("schema")
                        .value_name("SCHEMA_JSON")
                        .help("Schema, e.g. '{\"name\": {\"type\": \"string\", \"required\": true}}'"),
                ),
        )
        .subcommand(Command::new("list").about("List collections in the current database"))
}

// =========================================================================
// Records
// =========================================================================

fn collection_arg() -> Arg {
    Arg::new("collection").required(true).help("Collection name")
}

fn where_arg() -> Arg {
    Arg::new("where")
        .num_args(0..)
        .value_name("WHERE")
        .help("Predicate as a JSON object or field=value pairs (omit to match all)")
}

fn build_insert() -> Command {
    Command::new("insert")
        .about("Insert a record")
        .arg(collection_arg())
        .arg(
            Arg::new("fields")
                .required(true)
                .num_args(1..)
                .value_name("RECORD")
                .help("Record as a JSON object or field=value pairs"),
        )
}

fn build_select() -> Command {
    Command::new("select")
        .about("Select records")
        .arg(collection_arg())
        .arg(where_arg())
}

fn build_delete() -> Command {
    Command::new("delete")
        .about("Delete records")
        .arg(collection_arg())
        .arg(where_arg())
}

fn build_update() -> Command {
    Command::new("update")
        .about("Merge fields into matching records")
        .arg(collection_arg())
        .arg(
            Arg::new("where")
                .required(true)
                .value_name("WHERE_JSON")
                .help("Predicate as a JSON object (must not be empty)"),
        )
        .arg(
            Arg::new("patch")
                .required(true)
                .value_name("PATCH_JSON")
                .help("Fields to merge as a JSON object"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
        build_repl_cmd().debug_assert();
    }

    #[test]
    fn test_repl_parses_select_with_pairs() {
        let m = build_repl_cmd()
            .try_get_matches_from(["select", "users", "age=30", "name=Al"])
            .unwrap();
        let (name, sub) = m.subcommand().unwrap();
        assert_eq!(name, "select");
        let tokens: Vec<&String> = sub.get_many::<String>("where").unwrap().collect();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_update_requires_patch() {
        assert!(build_repl_cmd()
            .try_get_matches_from(["update", "users", "{\"_id\": 1}"])
            .is_err());
    }

    #[test]
    fn test_global_flags() {
        let m = build_cli()
            .try_get_matches_from(["jsondoc", "--data-dir", "/tmp/x", "--json", "db", "list"])
            .unwrap();
        assert_eq!(m.get_one::<String>("data-dir").unwrap(), "/tmp/x");
        assert!(m.get_flag("json"));
    }
}
