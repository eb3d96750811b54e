//! # Generation Events
//!
//! Fire-and-forget notifications about chunk phases.
//!
//! ```text
//! ┌──────────────┐      ┌─────────────┐      ┌──────────────┐
//! │ ChunkProvider│─────>│   Event     │─────>│  Host (log,  │
//! │  (generate,  │      │   Channel   │      │  plugins)    │
//! │   populate)  │      └─────────────┘      └──────────────┘
//! └──────────────┘
//! ```
//!
//! The provider never waits on listeners: a full or disconnected channel
//! drops the event with a warning and generation carries on.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::chunk::ChunkCoord;

/// Events emitted by the chunk provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationEvent {
    /// The generate phase assembled a chunk.
    ChunkGenerated {
        /// The chunk.
        coord: ChunkCoord,
    },

    /// The populate phase is about to run.
    PopulateChunkPre {
        /// The chunk.
        coord: ChunkCoord,
        /// Names of the populators about to run, in order.
        populators: Vec<String>,
    },

    /// The populate phase finished.
    PopulateChunkPost {
        /// The chunk.
        coord: ChunkCoord,
        /// Flags set during the phase, in order.
        flags: Vec<String>,
    },
}

impl GenerationEvent {
    /// The chunk this event is about.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        match self {
            Self::ChunkGenerated { coord }
            | Self::PopulateChunkPre { coord, .. }
            | Self::PopulateChunkPost { coord, .. } => *coord,
        }
    }
}

/// Bounded event channel.
pub struct EventBus {
    sender: Sender<GenerationEvent>,
    receiver: Receiver<GenerationEvent>,
}

impl EventBus {
    /// Creates a new event bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a connected sender and receiver.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for sending events.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<GenerationEvent>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: GenerationEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(coord = %event.coord(), "event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::warn!(coord = %event.coord(), "event receiver gone, dropping event");
                false
            }
        }
    }
}

/// Handle for receiving events.
#[derive(Clone, Debug)]
pub struct EventReceiver {
    receiver: Receiver<GenerationEvent>,
}

impl EventReceiver {
    /// Receives all pending events without blocking.
    #[inline]
    pub fn drain(&self) -> Vec<GenerationEvent> {
        let mut events = Vec::with_capacity(self.receiver.len());
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Receives one event, if any is pending.
    #[inline]
    pub fn try_recv(&self) -> Option<GenerationEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Whether any event is pending.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_send_receive() {
        let bus = EventBus::new(8);
        let sender = bus.sender();
        let receiver = bus.receiver();

        assert!(sender.send(GenerationEvent::ChunkGenerated {
            coord: ChunkCoord::new(1, -2),
        }));
        assert!(receiver.has_events());

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.coord(), ChunkCoord::new(1, -2));
    }

    #[test]
    fn test_event_drain() {
        let (sender, receiver) = EventBus::create_pair(16);
        for i in 0..10 {
            let _ = sender.send(GenerationEvent::PopulateChunkPost {
                coord: ChunkCoord::new(i, 0),
                flags: Vec::new(),
            });
        }
        let events = receiver.drain();
        assert_eq!(events.len(), 10);
        assert!(!receiver.has_events());
    }

    #[test]
    fn test_full_channel_drops() {
        let (sender, receiver) = EventBus::create_pair(1);
        let event = GenerationEvent::ChunkGenerated {
            coord: ChunkCoord::new(0, 0),
        };
        assert!(sender.send(event.clone()));
        assert!(!sender.send(event));
        assert_eq!(receiver.pending_count(), 1);
    }
}
