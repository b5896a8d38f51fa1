//! Session state: the store plus the currently connected database.
//!
//! The library has no ambient "current database"; the CLI keeps one here so
//! REPL users can `db connect` once and then work on collections.

use jsondoc_engine::{Database, Error, Map, Predicate, Record, Schema, Store, Value};
use thiserror::Error as ThisError;

/// A parsed command ready to run against the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DbCreate { name: String },
    DbConnect { name: String },
    DbDrop { name: String },
    DbList,
    CollectionCreate { name: String, schema: Schema },
    CollectionList,
    Insert { collection: String, fields: Map<String, Value> },
    Select { collection: String, predicate: Option<Predicate> },
    Delete { collection: String, predicate: Option<Predicate> },
    Update { collection: String, predicate: Predicate, patch: Map<String, Value> },
}

/// Result of running a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Database created and connected
    Created(String),
    /// Connected to an existing database
    Connected(String),
    /// Operation succeeded with nothing to show
    Unit,
    /// Database or collection names
    Names(Vec<String>),
    /// The stored record after an insert
    Inserted(Record),
    /// Selected records
    Records(Vec<Record>),
    /// Number of records deleted
    Deleted(usize),
    /// Number of records updated
    Updated(usize),
}

/// Errors surfaced by the session
#[derive(Debug, ThisError)]
pub enum SessionError {
    /// A record command ran before any database was connected
    #[error("no database selected (use 'db connect <name>' or --db)")]
    NoDatabase,

    /// Error from the store or database
    #[error(transparent)]
    Engine(#[from] Error),
}

/// Wraps the store and tracks the connected database.
pub struct SessionState {
    store: Store,
    current: Option<Database>,
}

impl SessionState {
    /// Create a session with no database connected.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Connect to `name`, replacing any current connection.
    pub fn connect(&mut self, name: &str) -> Result<(), SessionError> {
        self.current = Some(self.store.connect(name)?);
        Ok(())
    }

    /// Name of the connected database.
    pub fn database_name(&self) -> Option<&str> {
        self.current.as_ref().map(Database::name)
    }

    fn db(&self) -> Result<&Database, SessionError> {
        self.current.as_ref().ok_or(SessionError::NoDatabase)
    }

    /// Execute a command.
    pub fn execute(&mut self, cmd: Command) -> Result<Output, SessionError> {
        let output = match cmd {
            Command::DbCreate { name } => {
                self.current = Some(self.store.create_database(&name)?);
                Output::Created(name)
            }
            Command::DbConnect { name } => {
                self.connect(&name)?;
                Output::Connected(name)
            }
            Command::DbDrop { name } => {
                self.store.delete_database(&name)?;
                if self.database_name() == Some(name.as_str()) {
                    self.current = None;
                }
                Output::Unit
            }
            Command::DbList => Output::Names(self.store.list_databases()?),
            Command::CollectionCreate { name, schema } => {
                self.db()?.create_collection(&name, schema)?;
                Output::Unit
            }
            Command::CollectionList => Output::Names(self.db()?.collection_names()?),
            Command::Insert { collection, fields } => {
                Output::Inserted(self.db()?.insert(&collection, fields)?)
            }
            Command::Select {
                collection,
                predicate,
            } => Output::Records(self.db()?.select(&collection, predicate.as_ref())?),
            Command::Delete {
                collection,
                predicate,
            } => Output::Deleted(self.db()?.delete(&collection, predicate.as_ref())?),
            Command::Update {
                collection,
                predicate,
                patch,
            } => Output::Updated(self.db()?.update(&collection, Some(&predicate), &patch)?),
        };
        Ok(output)
    }

    /// Generate the REPL prompt string.
    pub fn prompt(&self) -> String {
        match self.database_name() {
            Some(name) => format!("jsondoc:{}> ", name),
            None => "jsondoc> ".to_string(),
        }
    }
}
