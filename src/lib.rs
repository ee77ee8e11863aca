// src/lib.rs

//! # emsx-order
//!
//! Submits EMSX `CreateOrder` requests over a caller-owned session and waits
//! for the venue's full response.

pub mod actor;
pub mod bus;
pub mod client;
pub mod config;
pub mod create_order;
pub mod error;
pub mod fake;
pub mod message;
pub mod order;
pub mod request;
pub mod session;
pub mod venue;

pub use client::EmsxClient;
pub use config::{EmsxConfig, EmsxEnvironment};
pub use create_order::{create_order, OrderAck, OrderOutcome, OrderRejection, OrderReport};
pub use error::{BusError, EmsxError, SessionError};
pub use message::{CorrelationId, Event, EventKind, FieldValue, Message};
pub use order::{OptionalField, OrderTicket};
pub use request::{Request, Service};
pub use session::Session;
