//! Error types for FinTwin

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Advisor error: {0}")]
    Advisor(String),

    #[error("Advisor is still answering the previous request")]
    AdvisorBusy,

    #[error("Login error: {0}")]
    Login(String),
}

pub type Result<T> = std::result::Result<T, Error>;
