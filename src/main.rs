// src/main.rs

//! # Demo (main)
//!
//! Starts the simulated venue, connects a session to it, and submits one
//! accepted and one rejected order.

use emsx_order::actor::Actor;
use emsx_order::bus::EventBus;
use emsx_order::venue::{emsx_services, BusSession, SimulatedVenue};
use emsx_order::{EmsxClient, EmsxConfig, OptionalField, OrderOutcome, OrderTicket};

use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=info,EMSX=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = EmsxConfig::from_env()?;
    info!(target: "MAIN", "Using service {}", config.service);

    let bus = EventBus::new(1024);
    let shutdown = CancellationToken::new();

    let venue = Arc::new(SimulatedVenue::new(bus.clone(), 1));
    let handles = venue.start(shutdown.clone()).await;

    let session = Arc::new(BusSession::connect(bus.clone(), emsx_services()).await?);
    let client = EmsxClient::new(session, config);

    let tickets = [
        OrderTicket::new("IBM US Equity", 100, "BUY", "LMT", "DAY")
            .with_limit_price(123.45)
            .with(OptionalField::Broker, "BMTB"),
        OrderTicket::new("IBM US Equity", 100, "HOLD", "MKT", "DAY"),
    ];

    for ticket in &tickets {
        match client.create_order(ticket).await {
            Ok(report) => match report.outcome {
                OrderOutcome::Accepted(ack) => {
                    info!(target: "MAIN", "Order accepted, sequence {}", ack.sequence)
                }
                OrderOutcome::Rejected(rejection) => info!(
                    target: "MAIN",
                    "Order rejected ({}): {}",
                    rejection.code,
                    rejection.message
                ),
            },
            Err(e) => error!(target: "MAIN", "Order submission failed: {}", e),
        }
    }

    info!(target: "MAIN", "Shutting down...");
    shutdown.cancel();
    let _ = join_all(handles).await;

    Ok(())
}
