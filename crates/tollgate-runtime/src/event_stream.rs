//! Tollgate event streaming

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tollgate::TollgateEvent;
use tracing::debug;

/// Runtime event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeEvent {
    /// Instance configured
    Initialized {
        instance: String,
        fee_token: String,
        fee_amount: u128,
        fee_destination: String,
    },

    /// Fee amount changed by an authorized sender
    FeeAmountChanged {
        instance: String,
        previous_amount: u128,
        new_amount: u128,
    },

    /// Fee destination changed by an authorized sender
    FeeDestinationChanged {
        instance: String,
        previous_destination: String,
        new_destination: String,
    },

    /// Action forwarded after the fee (if any) was collected
    Forwarded {
        instance: String,
        sender: String,
        fee_paid: u128,
    },

    /// Forward attempt rejected
    ForwardRejected {
        instance: String,
        sender: String,
        code: String,
    },
}

impl RuntimeEvent {
    pub fn from_tollgate(instance: String, event: &TollgateEvent) -> Self {
        match event {
            TollgateEvent::ChangeFeeAmount {
                previous_amount,
                new_amount,
            } => RuntimeEvent::FeeAmountChanged {
                instance,
                previous_amount: *previous_amount,
                new_amount: *new_amount,
            },
            TollgateEvent::ChangeFeeDestination {
                previous_destination,
                new_destination,
            } => RuntimeEvent::FeeDestinationChanged {
                instance,
                previous_destination: previous_destination.to_string(),
                new_destination: new_destination.to_string(),
            },
        }
    }
}

/// Event stream for broadcasting runtime events
pub struct EventStream {
    sender: broadcast::Sender<RuntimeEvent>,
    emitted: AtomicUsize,
}

impl EventStream {
    /// Create a new event stream buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        Self {
            sender,
            emitted: AtomicUsize::new(0),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.sender.subscribe()
    }

    /// Emit an event
    pub fn emit(&self, event: RuntimeEvent) {
        debug!("Emitting event: {:?}", event);
        self.emitted.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(count) => {
                debug!("Event sent to {} receivers", count);
            }
            Err(e) => {
                // No receivers, event is dropped
                debug!("No receivers for event: {:?}", e);
            }
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events emitted, delivered or not
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new(1000)
    }
}
