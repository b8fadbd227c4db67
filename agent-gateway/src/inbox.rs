use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Instant;

use agent_gateway_types::{InboundMessage, MessageId};

use crate::timeout::Timeout;

/// The queue of inbound messages not yet claimed by `receive`/`request`.
///
/// Bounded at `capacity`; once full, the oldest message that is not a topic
/// delivery is evicted to make room. If every queued message is a topic
/// delivery, the oldest overall is evicted instead and a warning is logged,
/// since there is then no way to make room without losing a broadcast.
pub(crate) struct Inbox {
    state: Mutex<State>,
    cond: Condvar,
    capacity: usize,
}

struct State {
    queue: VecDeque<InboundMessage>,
    closed: bool,
}

fn is_topic_delivery(msg: &InboundMessage) -> bool {
    msg.recipient().map_or(false, |aid| aid.is_topic())
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                closed: false,
            }),
            cond: Condvar::new(),
            capacity,
        }
    }

    pub fn push(&self, msg: InboundMessage) {
        let mut state = self.state.lock().unwrap();
        if state.queue.len() >= self.capacity {
            match state.queue.iter().position(|m| !is_topic_delivery(m)) {
                Some(pos) => {
                    state.queue.remove(pos);
                }
                None => {
                    log::warn!(
                        "inbox full ({} messages) and every queued message is a topic delivery; \
                         dropping the oldest to make room",
                        self.capacity
                    );
                    state.queue.pop_front();
                }
            }
        }
        state.queue.push_back(msg);
        self.cond.notify_all();
    }

    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.cond.notify_all();
    }

    /// Remove and return the first queued message matching `clazz` (if
    /// given) and `in_reply_to` (if given), waiting according to `timeout`
    /// if none is queued yet.
    pub fn receive(
        &self,
        clazz: Option<&str>,
        in_reply_to: Option<&MessageId>,
        timeout: Timeout,
    ) -> Option<InboundMessage> {
        let matches = |m: &InboundMessage| {
            clazz.map_or(true, |c| m.clazz() == c)
                && in_reply_to.map_or(true, |id| m.in_reply_to() == Some(id))
        };

        let deadline = match timeout {
            Timeout::After(d) => Some(Instant::now() + d),
            _ => None,
        };

        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(pos) = state.queue.iter().position(|m| matches(m)) {
                return state.queue.remove(pos);
            }
            if state.closed {
                return None;
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
