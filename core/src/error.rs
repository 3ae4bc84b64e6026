use thiserror::Error;

/// Hard failures of the engine. Expected "nothing found" outcomes (missing
/// word, absent configuration, unsatisfiable query) are `Option`s, not
/// errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A store insert did not behave as a single-row insert.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<sled::transaction::TransactionError<Error>> for Error {
    fn from(e: sled::transaction::TransactionError<Error>) -> Self {
        match e {
            sled::transaction::TransactionError::Abort(e) => e,
            sled::transaction::TransactionError::Storage(e) => Error::Store(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
