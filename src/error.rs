//! Error types for ccdroutes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resolution failed: {0}")]
    Resolution(String),

    #[error("ASN lookup failed: {0}")]
    Lookup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
