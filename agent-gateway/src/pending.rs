use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use agent_gateway_types::MessageId;

use crate::timeout::Timeout;

/// Correlates outgoing control requests (agent/service discovery, subscribe
/// acknowledgement) with their replies.
///
/// `send` does not go through this table: it has no reply to wait for, and
/// is not expected to be tracked here.
pub(crate) struct PendingTable {
    slots: Mutex<HashMap<MessageId, Arc<Slot>>>,
}

pub(crate) struct Slot {
    state: Mutex<SlotState>,
    cond: Condvar,
}

enum SlotState {
    Waiting,
    Ready(serde_json::Map<String, serde_json::Value>),
    Failed,
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new correlation id, returning the slot to wait on.
    pub fn register(&self, id: MessageId) -> Arc<Slot> {
        let slot = Arc::new(Slot {
            state: Mutex::new(SlotState::Waiting),
            cond: Condvar::new(),
        });
        self.slots.lock().unwrap().insert(id, Arc::clone(&slot));
        slot
    }

    /// Deliver a reply to the slot registered under `id`. Returns `false`
    /// if no such slot exists (the request already timed out, or this reply
    /// is simply untracked), in which case the reply is dropped.
    pub fn complete(&self, id: &MessageId, result: serde_json::Map<String, serde_json::Value>) -> bool {
        let slot = self.slots.lock().unwrap().remove(id);
        match slot {
            Some(slot) => {
                *slot.state.lock().unwrap() = SlotState::Ready(result);
                slot.cond.notify_all();
                true
            }
            None => false,
        }
    }

    /// Stop tracking `id`. Called after a timeout so a late reply is
    /// dropped instead of waking a waiter that already gave up.
    pub fn forget(&self, id: &MessageId) {
        self.slots.lock().unwrap().remove(id);
    }

    /// Mark every outstanding slot as failed, e.g. because the connection
    /// dropped. Wakes every waiter with `None`.
    pub fn fail_all(&self) {
        let slots = std::mem::take(&mut *self.slots.lock().unwrap());
        for slot in slots.into_values() {
            *slot.state.lock().unwrap() = SlotState::Failed;
            slot.cond.notify_all();
        }
    }
}

impl Slot {
    pub fn wait(&self, timeout: Timeout) -> Option<serde_json::Map<String, serde_json::Value>> {
        let deadline = match timeout {
            Timeout::After(d) => Some(Instant::now() + d),
            _ => None,
        };

        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                SlotState::Ready(result) => return Some(result.clone()),
                SlotState::Failed => return None,
                SlotState::Waiting => {}
            }
            match timeout {
                Timeout::Immediate => return None,
                Timeout::Forever => {
                    state = self.cond.wait(state).unwrap();
                }
                Timeout::After(_) => {
                    let remaining = deadline.unwrap().saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    let (s, _) = self.cond.wait_timeout(state, remaining).unwrap();
                    state = s;
                }
            }
        }
    }
}
