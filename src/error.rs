//! Error taxonomy for the ledger core.
//!
//! `AuthenticationFailure` and `DatabaseFailure` are collaborator-level
//! concerns (session/auth layer, persistence layer) and are not modeled here.

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid transaction {identifier}: {reason}")]
    InvalidTransaction { identifier: String, reason: String },

    #[error("chain validation failed: {0}")]
    ChainValidation(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
