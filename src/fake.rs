// src/fake.rs

//! # Scripted session (fake)
//!
//! A [`Session`] that replays a fixed list of events and records what was
//! asked of it. Used to exercise order submission without a venue.

use crate::error::SessionError;
use crate::message::{CorrelationId, Event};
use crate::request::{Request, Service};
use crate::session::Session;
use std::collections::VecDeque;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    events: VecDeque<Event>,
    opened: Vec<String>,
    sent: Vec<(Request, CorrelationId)>,
    fetches: usize,
}

/// ## `ScriptedSession`
///
/// Scripted messages without a correlation id are stamped with the id of the
/// most recently sent request. Once the script runs out `next_event` never
/// completes.
pub struct ScriptedSession {
    services: Vec<Service>,
    open_failure: Option<SessionError>,
    inner: Mutex<Inner>,
}

impl ScriptedSession {
    pub fn new(services: Vec<Service>, events: Vec<Event>) -> Self {
        Self {
            services,
            open_failure: None,
            inner: Mutex::new(Inner {
                events: events.into(),
                ..Inner::default()
            }),
        }
    }

    /// Every `open_service` call fails with `error`.
    pub fn failing_open(mut self, error: SessionError) -> Self {
        self.open_failure = Some(error);
        self
    }

    pub async fn opened_services(&self) -> Vec<String> {
        self.inner.lock().await.opened.clone()
    }

    pub async fn sent_requests(&self) -> Vec<(Request, CorrelationId)> {
        self.inner.lock().await.sent.clone()
    }

    /// Number of completed `next_event` calls.
    pub async fn fetches(&self) -> usize {
        self.inner.lock().await.fetches
    }
}

#[async_trait::async_trait]
impl Session for ScriptedSession {
    async fn open_service(&self, name: &str) -> Result<(), SessionError> {
        self.inner.lock().await.opened.push(name.to_string());
        if let Some(error) = &self.open_failure {
            return Err(error.clone());
        }
        if self.services.iter().any(|s| s.name() == name) {
            Ok(())
        } else {
            Err(SessionError::ServiceNotFound(name.to_string()))
        }
    }

    async fn get_service(&self, name: &str) -> Result<Service, SessionError> {
        let inner = self.inner.lock().await;
        if !inner.opened.iter().any(|s| s == name) {
            return Err(SessionError::ServiceNotOpen(name.to_string()));
        }
        self.services
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| SessionError::ServiceNotFound(name.to_string()))
    }

    async fn send_request(
        &self,
        request: Request,
        correlation_id: CorrelationId,
    ) -> Result<(), SessionError> {
        self.inner.lock().await.sent.push((request, correlation_id));
        Ok(())
    }

    async fn next_event(&self) -> Result<Event, SessionError> {
        let next = {
            let mut inner = self.inner.lock().await;
            let last_sent = inner.sent.last().map(|(_, id)| *id);
            let mut event = inner.events.pop_front();
            if let Some(event) = event.as_mut() {
                inner.fetches += 1;
                if let Some(id) = last_sent {
                    for msg in &mut event.messages {
                        msg.correlation_id.get_or_insert(id);
                    }
                }
            }
            event
        };
        match next {
            Some(event) => Ok(event),
            None => std::future::pending().await,
        }
    }
}
