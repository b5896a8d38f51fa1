//! Name validation
//!
//! Database names become file names inside the data directory, so they are
//! restricted to a safe character set:
//! - 1-128 characters
//! - `[A-Za-z0-9_-]` only
//! - must not start with `-`
//!
//! Collection names are keys inside the catalog and only need to be non-empty.

use crate::error::{Error, Result};

/// Maximum length of a database name
pub const MAX_DATABASE_NAME_LENGTH: usize = 128;

/// Validate a database name.
pub fn validate_database_name(name: &str) -> Result<()> {
    let invalid = |reason: String| Error::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty".into()));
    }
    if name.len() > MAX_DATABASE_NAME_LENGTH {
        return Err(invalid(format!(
            "name is {} bytes, maximum is {}",
            name.len(),
            MAX_DATABASE_NAME_LENGTH
        )));
    }
    if name.starts_with('-') {
        return Err(invalid("name cannot start with '-'".into()));
    }
    if let Some((pos, c)) = name
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(format!("invalid character {:?} at position {}", c, pos)));
    }
    Ok(())
}

/// Validate a collection name.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: String::new(),
            reason: "collection name cannot be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_database_names() {
        for name in ["myfirstdb", "users_2024", "a", "prod-db", "_scratch"] {
            assert!(validate_database_name(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_invalid_database_names() {
        let too_long = "x".repeat(MAX_DATABASE_NAME_LENGTH + 1);
        for name in ["", "-db", "../etc", "a/b", "has space", "dot.json", too_long.as_str()] {
            assert!(
                matches!(validate_database_name(name), Err(Error::InvalidName { .. })),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_collection_names() {
        assert!(validate_collection_name("users").is_ok());
        assert!(validate_collection_name("with space").is_ok());
        assert!(validate_collection_name("").is_err());
    }
}
