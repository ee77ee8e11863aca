// src/actor.rs

//! # Actor
//!
//! Lifecycle for long-running background components such as the simulated
//! venue.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// ## `Actor` Trait
#[async_trait::async_trait]
pub trait Actor: Send + Sync {
    /// Subscribe to whatever the actor consumes, spawn its tasks, and hand
    /// back their handles. Tasks exit once `shutdown` is cancelled.
    async fn start(self: Arc<Self>, shutdown: CancellationToken) -> Vec<JoinHandle<()>>;
}
