//! Error handling utilities for the crate
use thiserror::Error;

use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

/// All errors raised by this crate will be instances of RackspaceError
///
/// Transport and decode failures are reported as they happen.  The HTTP status
/// of an authentication or listing response is not inspected, only container
/// creation turns an unexpected status into an error.
#[derive(Error, Debug)]
pub enum RackspaceError {
    #[error("Internal HTTP error: {0}")]
    HttpError(#[from] ReqwestError),
    #[error("Invalid JSON response: {0}")]
    DecodeError(#[from] JsonError),
    #[error("Error: cannot create container: {name}: {status}")]
    CreateContainerFailed { name: String, status: u16 },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RackspaceError {
    pub fn create_failed(name: &str, status_code: reqwest::StatusCode) -> Self {
        RackspaceError::CreateContainerFailed {
            name: name.to_string(),
            status: status_code.as_u16(),
        }
    }

    pub fn required(field_name: &str) -> Self {
        RackspaceError::InvalidInput(format!("{} is required", field_name))
    }
}

pub(crate) type Result<T> = std::result::Result<T, RackspaceError>;
