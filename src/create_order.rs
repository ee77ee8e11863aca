// src/create_order.rs

//! # CreateOrder (create_order)
//!
//! Open the EMSX service, send one CreateOrder request, and drain session
//! events until the full response for that request arrives.

use crate::config::EmsxConfig;
use crate::error::EmsxError;
use crate::message::{CorrelationId, Event, EventKind, Message};
use crate::order::{OrderTicket, CREATE_ORDER};
use crate::session::Session;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const ERROR_INFO: &str = "ErrorInfo";
const ERROR_CODE: &str = "ERROR_CODE";
const ERROR_MESSAGE: &str = "ERROR_MESSAGE";
const EMSX_SEQUENCE: &str = "EMSX_SEQUENCE";
const MESSAGE: &str = "MESSAGE";

/// Venue accepted the order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderAck {
    /// EMSX order sequence number.
    pub sequence: i64,
    pub message: Option<String>,
}

/// Venue rejected the order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRejection {
    pub code: i64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderOutcome {
    Accepted(OrderAck),
    Rejected(OrderRejection),
}

impl OrderOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn sequence(&self) -> Option<i64> {
        match self {
            Self::Accepted(ack) => Some(ack.sequence),
            Self::Rejected(_) => None,
        }
    }
}

/// Everything learned from one CreateOrder round trip.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderReport {
    pub correlation_id: CorrelationId,
    pub outcome: OrderOutcome,
    /// Events fetched, terminal one included.
    pub events_seen: usize,
    /// Every message received while waiting, in arrival order.
    pub transcript: Vec<Message>,
}

/// Submit `ticket` on `session` and wait for the venue's full response.
///
/// The wait is bounded by `config.response_timeout` (when set) and by
/// `cancel`. A venue rejection is `Ok` with [`OrderOutcome::Rejected`].
pub async fn create_order<S: Session + ?Sized>(
    session: &S,
    config: &EmsxConfig,
    ticket: &OrderTicket,
    cancel: &CancellationToken,
) -> Result<OrderReport, EmsxError> {
    let service_name = config.service.as_str();

    info!(target: "EMSX", "Attempting to open service: {}", service_name);
    if let Err(source) = session.open_service(service_name).await {
        error!(target: "EMSX", "Failed to open {}: {}", service_name, source);
        return Err(EmsxError::ServiceOpen {
            service: service_name.to_string(),
            source,
        });
    }

    let service = session.get_service(service_name).await?;
    let mut request = service.create_request(CREATE_ORDER)?;
    ticket.apply_to(&mut request, &config.hand_instruction);

    let correlation_id = CorrelationId::new();
    info!(target: "EMSX", %correlation_id, "Attempting to send request: {}", request);
    session.send_request(request, correlation_id).await?;

    let started = Instant::now();
    let deadline = config.response_timeout.map(|timeout| started + timeout);
    let mut drain = Drain::new(correlation_id);

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!(target: "EMSX", %correlation_id, "Cancelled after {} events", drain.events_seen);
                return Err(EmsxError::Cancelled);
            }
            () = sleep_until(deadline) => {
                warn!(target: "EMSX", %correlation_id, "No full response after {:?}", started.elapsed());
                return Err(EmsxError::Timeout {
                    service: service_name.to_string(),
                    elapsed: started.elapsed(),
                });
            }
            event = session.next_event() => event?,
        };

        if drain.observe(event) {
            break;
        }
    }

    let outcome = interpret_response(drain.terminal_messages(), correlation_id)?;
    debug!(target: "EMSX", %correlation_id, "Outcome {:?}", outcome);

    Ok(OrderReport {
        correlation_id,
        outcome,
        events_seen: drain.events_seen,
        transcript: drain.transcript,
    })
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Event drain state: WAITING until [`observe`](Drain::observe) sees the
/// terminal response.
struct Drain {
    correlation_id: CorrelationId,
    events_seen: usize,
    transcript: Vec<Message>,
    terminal_start: usize,
}

impl Drain {
    fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            events_seen: 0,
            transcript: Vec::new(),
            terminal_start: 0,
        }
    }

    /// Log and record `event`; true once it is the full response for us.
    fn observe(&mut self, event: Event) -> bool {
        self.events_seen += 1;
        info!(target: "EMSX", "Received event type: {}", event.kind);

        let terminal = event.kind == EventKind::Response
            && event.messages.iter().any(|m| m.belongs_to(self.correlation_id));

        let start = self.transcript.len();
        for msg in event.messages {
            info!(target: "EMSX", "Received message: {}", msg);
            self.transcript.push(msg);
        }
        if terminal {
            self.terminal_start = start;
        }
        terminal
    }

    fn terminal_messages(&self) -> &[Message] {
        &self.transcript[self.terminal_start..]
    }
}

fn interpret_response(
    messages: &[Message],
    correlation_id: CorrelationId,
) -> Result<OrderOutcome, EmsxError> {
    let ours = || messages.iter().filter(move |m| m.belongs_to(correlation_id));

    if let Some(msg) = ours().find(|m| m.message_type == ERROR_INFO) {
        return Ok(OrderOutcome::Rejected(OrderRejection {
            code: msg.get(ERROR_CODE).and_then(|v| v.as_int()).unwrap_or_default(),
            message: msg
                .get(ERROR_MESSAGE)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }));
    }

    for msg in ours() {
        if let Some(sequence) = msg.get(EMSX_SEQUENCE).and_then(|v| v.as_int()) {
            return Ok(OrderOutcome::Accepted(OrderAck {
                sequence,
                message: msg.get(MESSAGE).and_then(|v| v.as_str()).map(str::to_string),
            }));
        }
    }

    Err(EmsxError::MalformedResponse(format!(
        "no {EMSX_SEQUENCE} or {ERROR_INFO} in {} response message(s)",
        ours().count()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_info_is_a_rejection() {
        let id = CorrelationId::new();
        let messages = vec![Message::new("ErrorInfo")
            .with_correlation_id(id)
            .with_field("ERROR_CODE", 5i64)
            .with_field("ERROR_MESSAGE", "Invalid side")];

        let outcome = interpret_response(&messages, id).unwrap();
        assert_eq!(
            outcome,
            OrderOutcome::Rejected(OrderRejection {
                code: 5,
                message: "Invalid side".to_string()
            })
        );
        assert!(!outcome.is_accepted());
    }

    #[test]
    fn sequence_is_an_acceptance() {
        let id = CorrelationId::new();
        let messages = vec![Message::new("CreateOrder")
            .with_correlation_id(id)
            .with_field("EMSX_SEQUENCE", 1234i64)
            .with_field("MESSAGE", "Order created")];

        let outcome = interpret_response(&messages, id).unwrap();
        assert_eq!(outcome.sequence(), Some(1234));
    }

    #[test]
    fn other_requests_answers_are_ignored() {
        let id = CorrelationId::new();
        let messages = vec![Message::new("CreateOrder")
            .with_correlation_id(CorrelationId::new())
            .with_field("EMSX_SEQUENCE", 1i64)];

        let err = interpret_response(&messages, id).unwrap_err();
        assert!(matches!(err, EmsxError::MalformedResponse(_)));
    }

    #[test]
    fn drain_waits_for_our_response() {
        let id = CorrelationId::new();
        let mut drain = Drain::new(id);

        assert!(!drain.observe(Event::new(
            EventKind::PartialResponse,
            vec![Message::new("CreateOrder").with_correlation_id(id)],
        )));
        assert!(!drain.observe(Event::new(
            EventKind::Response,
            vec![Message::new("CreateOrder").with_correlation_id(CorrelationId::new())],
        )));
        assert!(drain.observe(Event::new(
            EventKind::Response,
            vec![Message::new("CreateOrder").with_correlation_id(id)],
        )));

        assert_eq!(drain.events_seen, 3);
        assert_eq!(drain.transcript.len(), 3);
        assert_eq!(drain.terminal_messages().len(), 1);
    }
}
