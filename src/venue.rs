// src/venue.rs

//! # Simulated venue (venue)
//!
//! An in-process stand-in for the EMSX gateway. `BusSession` speaks the
//! [`Session`] trait over the [`EventBus`]; `SimulatedVenue` consumes the
//! submitted requests and answers with session events.

use crate::actor::Actor;
use crate::bus::EventBus;
use crate::config::{BETA_SERVICE, PRODUCTION_SERVICE};
use crate::error::{BusError, SessionError};
use crate::message::{BusMessage, CorrelationId, Event, EventKind, Message};
use crate::order::{CREATE_ORDER, EMSX_AMOUNT, EMSX_SIDE, EMSX_TICKER};
use crate::request::{Request, Service};
use crate::session::Session;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const VALID_SIDES: [&str; 4] = ["BUY", "SELL", "SHRT", "COVR"];

/// A request handed from a session to the venue.
#[derive(Clone, Debug)]
pub struct RequestSubmitted {
    pub correlation_id: CorrelationId,
    pub request: Request,
}
impl BusMessage for RequestSubmitted {}

/// The EMSX services the simulated venue exposes.
pub fn emsx_services() -> Vec<Service> {
    vec![
        Service::new(BETA_SERVICE, [CREATE_ORDER]),
        Service::new(PRODUCTION_SERVICE, [CREATE_ORDER]),
    ]
}

/// ## `BusSession`
pub struct BusSession {
    bus: EventBus,
    services: Vec<Service>,
    opened: Mutex<HashSet<String>>,
    events: Mutex<broadcast::Receiver<Event>>,
}

impl BusSession {
    /// Subscribes to venue events immediately so nothing published after
    /// this returns is missed.
    pub async fn connect(bus: EventBus, services: Vec<Service>) -> Result<Self, BusError> {
        let events = bus.subscribe::<Event>().await?;
        Ok(Self {
            bus,
            services,
            opened: Mutex::new(HashSet::new()),
            events: Mutex::new(events),
        })
    }
}

#[async_trait::async_trait]
impl Session for BusSession {
    async fn open_service(&self, name: &str) -> Result<(), SessionError> {
        if !self.services.iter().any(|s| s.name() == name) {
            return Err(SessionError::ServiceNotFound(name.to_string()));
        }
        self.opened.lock().await.insert(name.to_string());
        Ok(())
    }

    async fn get_service(&self, name: &str) -> Result<Service, SessionError> {
        if !self.opened.lock().await.contains(name) {
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
        let reached = self
            .bus
            .publish(RequestSubmitted {
                correlation_id,
                request,
            })
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        if reached == 0 {
            return Err(SessionError::Transport("no venue is listening".to_string()));
        }
        Ok(())
    }

    async fn next_event(&self) -> Result<Event, SessionError> {
        let mut events = self.events.lock().await;
        loop {
            match events.recv().await {
                Ok(event) => return Ok(event),
                Err(RecvError::Lagged(n)) => warn!(target: "VENUE", "Session lagged by {} events", n),
                Err(RecvError::Closed) => return Err(SessionError::Disconnected),
            }
        }
    }
}

/// ## `SimulatedVenue`
///
/// - Consumes `RequestSubmitted`.
/// - Publishes a `PartialResponse` acknowledgement, then a `Response` with
///   either an `EMSX_SEQUENCE` or an `ErrorInfo`.
pub struct SimulatedVenue {
    bus: EventBus,
    next_sequence: AtomicI64,
}

impl SimulatedVenue {
    pub fn new(bus: EventBus, first_sequence: i64) -> Self {
        Self {
            bus,
            next_sequence: AtomicI64::new(first_sequence),
        }
    }

    /// The events answering one submitted request.
    fn answer(&self, submitted: &RequestSubmitted) -> Vec<Event> {
        let id = submitted.correlation_id;
        let request = &submitted.request;

        if request.operation() != CREATE_ORDER {
            return vec![Event::new(
                EventKind::Response,
                vec![error_info(id, 1, &format!("Unsupported operation {}", request.operation()))],
            )];
        }

        let ack = Event::new(
            EventKind::PartialResponse,
            vec![Message::new(CREATE_ORDER)
                .with_correlation_id(id)
                .with_field("MESSAGE", "Order received")],
        );

        let reply = match validate(request) {
            Err((code, reason)) => error_info(id, code, &reason),
            Ok(()) => {
                let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
                Message::new(CREATE_ORDER)
                    .with_correlation_id(id)
                    .with_field("EMSX_SEQUENCE", sequence)
                    .with_field("MESSAGE", "Order created")
            }
        };

        vec![ack, Event::new(EventKind::Response, vec![reply])]
    }
}

fn error_info(id: CorrelationId, code: i64, reason: &str) -> Message {
    Message::new("ErrorInfo")
        .with_correlation_id(id)
        .with_field("ERROR_CODE", code)
        .with_field("ERROR_MESSAGE", reason)
}

fn validate(request: &Request) -> Result<(), (i64, String)> {
    let ticker = request.get(EMSX_TICKER).and_then(|v| v.as_str()).unwrap_or_default();
    if ticker.trim().is_empty() {
        return Err((2, "Missing ticker".to_string()));
    }
    match request.get(EMSX_AMOUNT).and_then(|v| v.as_int()) {
        Some(amount) if amount > 0 => {}
        _ => return Err((3, "Amount must be positive".to_string())),
    }
    let side = request.get(EMSX_SIDE).and_then(|v| v.as_str()).unwrap_or_default();
    if !VALID_SIDES.contains(&side) {
        return Err((4, format!("Invalid side {side}")));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Actor for SimulatedVenue {
    async fn start(self: Arc<Self>, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut request_rx = match self.bus.subscribe::<RequestSubmitted>().await {
            Ok(rx) => rx,
            Err(e) => {
                error!(target: "VENUE", "Failed to subscribe to requests: {}", e);
                return Vec::new();
            }
        };

        let handle = tokio::spawn(async move {
            loop {
                let submitted = tokio::select! {
                    () = shutdown.cancelled() => break,
                    received = request_rx.recv() => match received {
                        Ok(submitted) => submitted,
                        Err(RecvError::Lagged(n)) => {
                            warn!(target: "VENUE", "Lagged by {} requests", n);
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    },
                };

                info!(
                    target: "VENUE",
                    correlation_id = %submitted.correlation_id,
                    "Received {} request",
                    submitted.request.operation()
                );
                for event in self.answer(&submitted) {
                    if let Err(e) = self.bus.publish(event).await {
                        error!(target: "VENUE", "Failed to publish event: {}", e);
                    }
                }
            }
        });

        vec![handle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FieldValue;

    fn create_order(fields: &[(&str, FieldValue)]) -> RequestSubmitted {
        let mut request = Service::new(BETA_SERVICE, [CREATE_ORDER])
            .create_request(CREATE_ORDER)
            .unwrap();
        for (name, value) in fields {
            request.set(name, value.clone());
        }
        RequestSubmitted {
            correlation_id: CorrelationId::new(),
            request,
        }
    }

    #[test]
    fn valid_order_gets_increasing_sequences() {
        let venue = SimulatedVenue::new(EventBus::new(8), 100);
        let submitted = create_order(&[
            (EMSX_TICKER, "IBM US Equity".into()),
            (EMSX_AMOUNT, FieldValue::Int(10)),
            (EMSX_SIDE, "BUY".into()),
        ]);

        let first = venue.answer(&submitted);
        let second = venue.answer(&submitted);

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, EventKind::PartialResponse);
        assert_eq!(first[1].kind, EventKind::Response);
        assert_eq!(first[1].messages[0].get("EMSX_SEQUENCE"), Some(&FieldValue::Int(100)));
        assert_eq!(second[1].messages[0].get("EMSX_SEQUENCE"), Some(&FieldValue::Int(101)));
    }

    #[test]
    fn invalid_side_is_rejected() {
        let venue = SimulatedVenue::new(EventBus::new(8), 1);
        let submitted = create_order(&[
            (EMSX_TICKER, "IBM US Equity".into()),
            (EMSX_AMOUNT, FieldValue::Int(10)),
            (EMSX_SIDE, "HOLD".into()),
        ]);

        let events = venue.answer(&submitted);
        let reply = &events[1].messages[0];
        assert_eq!(reply.message_type, "ErrorInfo");
        assert_eq!(reply.get("ERROR_CODE"), Some(&FieldValue::Int(4)));
    }

    #[tokio::test]
    async fn send_without_venue_is_a_transport_error() {
        let bus = EventBus::new(8);
        let session = BusSession::connect(bus, emsx_services()).await.unwrap();
        let submitted = create_order(&[]);

        let err = session
            .send_request(submitted.request, submitted.correlation_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
    }
}
