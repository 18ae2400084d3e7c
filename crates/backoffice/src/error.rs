//! Errors surfaced by the gateway and the list controller.
//!
//! Gateway failures follow the remote-call taxonomy:
//!
//! - [`Auth`] no bearer token, or the server rejected it.
//! - [`Validation`] the server refused the payload.
//! - [`NotFound`] the id no longer exists.
//! - [`Transport`] network failure or timeout.
//! - [`Server`] any other non-2xx answer.
//!
//! Client-side guard failures live in [`ControllerError`] and never reach the
//! network.
//!
//!  [`Auth`]: GatewayError::Auth
//!  [`Validation`]: GatewayError::Validation
//!  [`NotFound`]: GatewayError::NotFound
//!  [`Transport`]: GatewayError::Transport
//!  [`Server`]: GatewayError::Server
use thiserror::Error;

use api_types::RecordId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("not authenticated")]
    Auth,
    #[error("rejected: {0}")]
    Validation(String),
    #[error("record not found")]
    NotFound,
    #[error("server unreachable: {0}")]
    Transport(String),
    #[error("server error: {0}")]
    Server(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl GatewayError {
    /// Message shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth => "Session expired or missing, sign in again.".to_string(),
            Self::Validation(message) => message.clone(),
            Self::NotFound => "The record no longer exists.".to_string(),
            Self::Transport(message) => format!("Server unreachable: {message}"),
            Self::Server(message) => format!("Server error: {message}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("fill all fields: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    #[error("unknown field \"{0}\"")]
    UnknownField(String),
    #[error("record {0} is not in the list")]
    UnknownRecord(RecordId),
    #[error("nothing selected")]
    NothingSelected,
    #[error("a request is already in flight")]
    Busy,
}
