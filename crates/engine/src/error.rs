//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`DuplicateTerm`] thrown when a [`Term`] already exists for a `(year, semester)` pair.
//! - [`TermNotFound`] thrown when no [`Term`] matches a `(year, semester)` pair.
//!
//!  [`DuplicateTerm`]: EngineError::DuplicateTerm
//!  [`TermNotFound`]: EngineError::TermNotFound
//!  [`Term`]: super::terms::Term
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("term \"{0}\" already present!")]
    DuplicateTerm(String),
    #[error("term \"{0}\" not found!")]
    TermNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("operation deadline exceeded")]
    Timeout,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateTerm(a), Self::DuplicateTerm(b)) => a == b,
            (Self::TermNotFound(a), Self::TermNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Timeout, Self::Timeout) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
