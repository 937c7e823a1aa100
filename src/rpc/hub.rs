//! Broadcast hub: fan-out of server messages to every connected observer.
//!
//! Each observer owns a bounded `embassy-sync` channel. `broadcast` never
//! blocks: it serializes the message once, then `try_send`s the shared text
//! into every queue. A full queue loses its oldest entry.
//!
//! ```text
//!                 ┌──────────────┐   ┌─────────┐
//!  broadcast() ──▶│ serialize ×1 │──▶│ queue 1 │──▶ session 1
//!                 └──────────────┘ │ ├─────────┤
//!                                  ├▶│ queue 2 │──▶ session 2
//!                                  │ ├─────────┤
//!                                  └▶│ queue n │──▶ session n
//!                                    └─────────┘
//! ```
//!
//! Observers are removed by their own session (see
//! [`run_session`](super::session::run_session)), never by `broadcast`.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::{debug, info, warn};

use crate::app::events::ServerMessage;
use crate::error::HubError;

/// Messages buffered per observer before the oldest is dropped.
pub const OBSERVER_QUEUE_DEPTH: usize = 32;

/// Identifies one registered observer for the lifetime of its session.
pub type ObserverId = u32;

/// Serialized message text, shared by every queue it lands in.
pub type Outbound = Arc<str>;

struct ObserverSlot {
    id: ObserverId,
    queue: Channel<CriticalSectionRawMutex, Outbound, OBSERVER_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl ObserverSlot {
    fn push(&self, msg: Outbound) {
        if let Err(TrySendError::Full(msg)) = self.queue.try_send(msg) {
            // Drop-oldest: make room, then retry once.
            let _ = self.queue.try_receive();
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if self.queue.try_send(msg).is_err() {
                warn!("HUB: observer {} queue still full after eviction", self.id);
            }
            debug!("HUB: observer {} lagging, {} dropped", self.id, dropped);
        }
    }
}

/// The receiving half handed to a session on registration.
pub struct Observer {
    slot: Arc<ObserverSlot>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.slot.id
    }

    /// Wait for the next queued message.
    pub async fn next(&self) -> Outbound {
        self.slot.queue.receive().await
    }

    /// Take a queued message without waiting.
    pub fn try_next(&self) -> Option<Outbound> {
        self.slot.queue.try_receive().ok()
    }

    /// Messages lost to queue overflow so far.
    pub fn dropped(&self) -> u32 {
        self.slot.dropped.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.slot.queue.len()
    }
}

/// Registry of connected observers.
pub struct BroadcastHub {
    max_observers: usize,
    next_id: AtomicU32,
    observers: Mutex<CriticalSectionRawMutex, RefCell<Vec<Arc<ObserverSlot>>>>,
}

impl BroadcastHub {
    pub fn new(max_observers: usize) -> Self {
        Self {
            max_observers,
            next_id: AtomicU32::new(1),
            observers: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Add an observer. Refused once `max_observers` are registered.
    pub fn register(&self) -> Result<Observer, HubError> {
        self.observers.lock(|cell| {
            let mut observers = cell.borrow_mut();
            if observers.len() >= self.max_observers {
                warn!("HUB: refusing observer, {} already connected", observers.len());
                return Err(HubError::Full);
            }
            let slot = Arc::new(ObserverSlot {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                queue: Channel::new(),
                dropped: AtomicU32::new(0),
            });
            observers.push(slot.clone());
            info!("HUB: observer {} registered ({} total)", slot.id, observers.len());
            Ok(Observer { slot })
        })
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn unregister(&self, id: ObserverId) {
        self.observers.lock(|cell| {
            let mut observers = cell.borrow_mut();
            let before = observers.len();
            observers.retain(|slot| slot.id != id);
            if observers.len() != before {
                info!("HUB: observer {} unregistered ({} left)", id, observers.len());
            }
        });
    }

    /// Queue `msg` for every registered observer. Returns how many
    /// observers it was queued for.
    pub fn broadcast(&self, msg: &ServerMessage) -> usize {
        let Some(text) = serialize(msg) else {
            return 0;
        };
        self.observers.lock(|cell| {
            let observers = cell.borrow();
            for slot in observers.iter() {
                slot.push(text.clone());
            }
            debug!("HUB: {} → {} observer(s)", msg.kind(), observers.len());
            observers.len()
        })
    }

    /// Queue `msg` for one observer only. Returns `false` when `id` is not
    /// registered.
    pub fn send_to(&self, id: ObserverId, msg: &ServerMessage) -> bool {
        let Some(text) = serialize(msg) else {
            return false;
        };
        self.observers.lock(|cell| {
            match cell.borrow().iter().find(|slot| slot.id == id) {
                Some(slot) => {
                    slot.push(text);
                    true
                }
                None => false,
            }
        })
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock(|cell| cell.borrow().len())
    }
}

fn serialize(msg: &ServerMessage) -> Option<Outbound> {
    match msg.to_json() {
        Ok(text) => Some(Arc::from(text)),
        Err(e) => {
            warn!("HUB: failed to serialize {}: {}", msg.kind(), e);
            None
        }
    }
}
