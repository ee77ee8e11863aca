// src/session.rs

//! # Session trait
//!
//! The seam between order submission and whatever actually talks to the
//! venue. Every call returns a `Result`, so vendor failures never cross into
//! caller code unmediated.

use crate::error::SessionError;
use crate::message::{CorrelationId, Event};
use crate::request::{Request, Service};

/// ## `Session`
///
/// An established, caller-owned connection to the venue gateway.
/// Implementations are shared by reference and use interior mutability.
#[async_trait::async_trait]
pub trait Session: Send + Sync {
    /// Open `name` so that [`get_service`](Session::get_service) can return it.
    async fn open_service(&self, name: &str) -> Result<(), SessionError>;

    async fn get_service(&self, name: &str) -> Result<Service, SessionError>;

    async fn send_request(
        &self,
        request: Request,
        correlation_id: CorrelationId,
    ) -> Result<(), SessionError>;

    /// Wait for the next event. May wait forever; callers bound it.
    async fn next_event(&self) -> Result<Event, SessionError>;
}
