// src/error.rs

//! # Error types
//!
//! `SessionError` is the boundary around every vendor session call.
//! `EmsxError` is what order submission hands back to callers.

use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`Session`](crate::session::Session) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Service not open: {0}")]
    ServiceNotOpen(String),

    #[error("Unknown operation {operation} on {service}")]
    UnknownOperation { service: String, operation: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Session disconnected")]
    Disconnected,
}

/// Errors surfaced by order submission.
#[derive(Error, Debug)]
pub enum EmsxError {
    #[error("Failed to open {service}")]
    ServiceOpen {
        service: String,
        #[source]
        source: SessionError,
    },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("No full response from {service} within {elapsed:?}")]
    Timeout { service: String, elapsed: Duration },

    #[error("Order submission cancelled")]
    Cancelled,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures inside the in-process [`EventBus`](crate::bus::EventBus).
#[derive(Error, Debug)]
pub enum BusError {
    #[error("Channel type mismatch for {0}")]
    TypeMismatch(&'static str),
}
