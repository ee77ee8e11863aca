// src/client.rs

//! # Client (client)
//!
//! Pairs a caller-owned session with its configuration.

use crate::config::EmsxConfig;
use crate::create_order::{create_order, OrderReport};
use crate::error::EmsxError;
use crate::order::OrderTicket;
use crate::session::Session;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// ## `EmsxClient`
pub struct EmsxClient<S: Session> {
    session: Arc<S>,
    config: EmsxConfig,
}

impl<S: Session> EmsxClient<S> {
    pub fn new(session: Arc<S>, config: EmsxConfig) -> Self {
        Self { session, config }
    }

    pub fn config(&self) -> &EmsxConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// Bounded only by the configured response timeout.
    pub async fn create_order(&self, ticket: &OrderTicket) -> Result<OrderReport, EmsxError> {
        self.create_order_with_cancel(ticket, &CancellationToken::new())
            .await
    }

    pub async fn create_order_with_cancel(
        &self,
        ticket: &OrderTicket,
        cancel: &CancellationToken,
    ) -> Result<OrderReport, EmsxError> {
        create_order(self.session.as_ref(), &self.config, ticket, cancel).await
    }
}
