// src/bus.rs

//! # Event bus (bus)
//!
//! In-process async publish/subscribe used to wire the simulated venue to
//! its sessions. One `tokio::sync::broadcast` channel per message type,
//! keyed by `TypeId`.

use crate::error::BusError;
use crate::message::BusMessage;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::trace;

/// Type-erased view of a `broadcast::Sender<M>` so senders for different
/// message types can share one map.
trait AnyChannel: Send + Sync {
    fn send_any(&self, msg: &dyn Any) -> Result<usize, BusError>;

    fn subscribe_any(&self) -> Box<dyn Any + Send>;
}

impl<M: BusMessage> AnyChannel for broadcast::Sender<M> {
    fn send_any(&self, msg: &dyn Any) -> Result<usize, BusError> {
        let concrete = msg
            .downcast_ref::<M>()
            .ok_or(BusError::TypeMismatch(type_name::<M>()))?;
        // No receivers is not a failure for pub/sub.
        Ok(self.send(concrete.clone()).unwrap_or(0))
    }

    fn subscribe_any(&self) -> Box<dyn Any + Send> {
        Box::new(self.subscribe())
    }
}

fn downcast_receiver<M: BusMessage>(
    channel: &dyn AnyChannel,
) -> Result<broadcast::Receiver<M>, BusError> {
    channel
        .subscribe_any()
        .downcast::<broadcast::Receiver<M>>()
        .map(|boxed| *boxed)
        .map_err(|_| BusError::TypeMismatch(type_name::<M>()))
}

/// ## `EventBus`
///
/// Cheap to clone; all clones share the same channels.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<TypeId, Box<dyn AnyChannel>>>>,
    capacity: usize,
}

impl EventBus {
    /// `capacity` is the buffer size of each per-type broadcast channel.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish `msg` to every current subscriber of `M`.
    ///
    /// Returns the number of receivers reached; `Ok(0)` when nobody has
    /// subscribed to `M` yet.
    pub async fn publish<M: BusMessage>(&self, msg: M) -> Result<usize, BusError> {
        let channels = self.channels.read().await;
        match channels.get(&TypeId::of::<M>()) {
            Some(channel) => {
                let reached = channel.send_any(&msg)?;
                trace!(target: "BUS", "Published {} to {} receivers", type_name::<M>(), reached);
                Ok(reached)
            }
            None => Ok(0),
        }
    }

    /// Subscribe to `M`, creating its channel on first use.
    pub async fn subscribe<M: BusMessage>(&self) -> Result<broadcast::Receiver<M>, BusError> {
        let type_id = TypeId::of::<M>();

        {
            let channels = self.channels.read().await;
            if let Some(channel) = channels.get(&type_id) {
                return downcast_receiver(&**channel);
            }
        }

        let mut channels = self.channels.write().await;
        // Another task may have created it while we waited for the write lock.
        if let Some(channel) = channels.get(&type_id) {
            return downcast_receiver(&**channel);
        }

        let (sender, receiver) = broadcast::channel::<M>(self.capacity);
        channels.insert(type_id, Box::new(sender));
        Ok(receiver)
    }
}
