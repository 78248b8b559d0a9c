//! The module contains the errors the engine can throw.
//!
//! Report builders never surface [`SiteNotFound`]: a missing site produces an
//! empty report. Every other error aborts the whole request.
//!
//!  [`SiteNotFound`]: EngineError::SiteNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Site \"{0}\" not found")]
    SiteNotFound(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SiteNotFound(a), Self::SiteNotFound(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidData(a), Self::InvalidData(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
