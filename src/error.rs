use std::path::PathBuf;

use thiserror::Error;

/// A single provider event that could not be turned into a domain value.
///
/// Only the offending event is skipped; the rest of its batch is still processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid {field}: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
}

/// Failures of the franchise → chat user mapping store.
#[derive(Error, Debug)]
pub enum UserMapError {
    #[error("unknown franchise ID `{0}`")]
    UnknownFranchise(String),

    #[error("user map has no backing file")]
    NotPersisted,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Admin command misuse. Rendered back to whoever issued the command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("message is not a command")]
    NotACommand,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),

    #[error("unknown franchise ID `{0}` (see /franchises)")]
    UnknownFranchise(String),

    #[error("{0}")]
    Failed(String),
}

impl From<UserMapError> for CommandError {
    fn from(err: UserMapError) -> Self {
        match err {
            UserMapError::UnknownFranchise(id) => Self::UnknownFranchise(id),
            other => Self::Failed(other.to_string()),
        }
    }
}
