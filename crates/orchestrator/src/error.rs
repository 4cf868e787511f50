//! Engine error types.

use bot_core::ModelError;
use database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Outbound dispatch failed: {0}")]
    Dispatch(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
