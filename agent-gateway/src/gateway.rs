use std::collections::HashSet;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::thread;

use agent_gateway_types::{Aid, InboundMessage, MessageId, OutboundMessage};

use crate::codec::{self, InboundFrame};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::inbox::Inbox;
use crate::pending::PendingTable;
use crate::timeout::Timeout;
use crate::transport::LineTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Closing,
    Closed,
}

struct Shared {
    agent_id: Aid,
    write_stream: Mutex<TcpStream>,
    inbox: Inbox,
    pending: PendingTable,
    subscriptions: Mutex<HashSet<Aid>>,
    state: Mutex<State>,
    control_timeout: std::time::Duration,
}

fn write_line(shared: &Shared, line: &str) -> Result<(), GatewayError> {
    let mut stream = shared.write_stream.lock().unwrap();
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    Ok(())
}

/// A connection to a master container's agent framework.
///
/// Every blocking call (`send`, `receive`, `request`, subscribe/unsubscribe,
/// discovery, `close`) takes `&self` and is internally synchronized, so a
/// `Gateway` can be shared (e.g. via `Arc<Gateway>`) and driven from
/// multiple threads concurrently. A single background thread owns the read
/// half of the socket and feeds deliveries into the inbox and replies into
/// the pending table.
pub struct Gateway {
    shared: Arc<Shared>,
    reader_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Gateway {
    /// Connect to `host:port` using default configuration.
    pub fn open(host: &str, port: u16) -> Result<Self, GatewayError> {
        Self::open_with_config(host, port, GatewayConfig::default())
    }

    /// Connect to `host:port`, tuning buffering, timeouts, and the inbox
    /// capacity via `config`.
    pub fn open_with_config(host: &str, port: u16, config: GatewayConfig) -> Result<Self, GatewayError> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| GatewayError::InvalidArgument(format!("no address found for {host}:{port}")))?;
        let stream = TcpStream::connect(addr)?;
        let read_stream = stream.try_clone()?;

        let agent_id = Aid::agent(format!("GatewayAgent-{}", MessageId::new()))
            .expect("a freshly generated hex message id is always a valid AID name");

        let shared = Arc::new(Shared {
            agent_id,
            write_stream: Mutex::new(stream),
            inbox: Inbox::new(config.inbox_capacity),
            pending: PendingTable::new(),
            subscriptions: Mutex::new(HashSet::new()),
            state: Mutex::new(State::Ready),
            control_timeout: config.control_timeout,
        });

        let reader_shared = Arc::clone(&shared);
        let read_chunk = config.read_chunk_size;
        let reader_handle = thread::Builder::new()
            .name("agent-gateway-reader".to_owned())
            .spawn(move || reader_loop(reader_shared, read_stream, read_chunk))?;

        Ok(Self {
            shared,
            reader_handle: Mutex::new(Some(reader_handle)),
        })
    }

    /// The synthetic AID this gateway presents to the master container.
    pub fn agent_id(&self) -> &Aid {
        &self.shared.agent_id
    }

    /// Subscribe to a topic, so future deliveries addressed to it land in
    /// the inbox. Idempotent.
    pub fn subscribe(&self, topic: &Aid) -> Result<(), GatewayError> {
        if !topic.is_topic() {
            return Err(GatewayError::InvalidArgument(
                "subscribe requires a topic AID".to_owned(),
            ));
        }
        self.shared.subscriptions.lock().unwrap().insert(topic.clone());
        self.sync_subscriptions()
    }

    /// Unsubscribe from a topic. Idempotent; unsubscribing from a topic
    /// never subscribed to is not an error.
    pub fn unsubscribe(&self, topic: &Aid) -> Result<(), GatewayError> {
        self.shared.subscriptions.lock().unwrap().remove(topic);
        self.sync_subscriptions()
    }

    pub fn is_subscribed(&self, topic: &Aid) -> bool {
        self.shared.subscriptions.lock().unwrap().contains(topic)
    }

    fn sync_subscriptions(&self) -> Result<(), GatewayError> {
        let topics: Vec<String> = self
            .shared
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .map(Aid::to_wire)
            .collect();
        self.control_request("wantsMessagesFor", serde_json::json!({ "topics": topics }))?;
        Ok(())
    }

    /// Ask the master container which agent provides `service`.
    pub fn agent_for_service(&self, service: &str) -> Result<Option<Aid>, GatewayError> {
        let result = self.control_request("agentForService", serde_json::json!({ "service": service }))?;
        let Some(result) = result else { return Ok(None) };
        match result.get("agentID").and_then(|v| v.as_str()) {
            Some(s) => Ok(Some(
                Aid::parse(s).map_err(|e| GatewayError::InvalidArgument(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Ask the master container for every agent providing `service`.
    pub fn agents_for_service(&self, service: &str) -> Result<Vec<Aid>, GatewayError> {
        let result = self.control_request("agentsForService", serde_json::json!({ "service": service }))?;
        let Some(result) = result else { return Ok(Vec::new()) };
        let ids = result
            .get("agentIDs")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()))
            .into_iter()
            .flatten();

        let mut agents = Vec::new();
        for id in ids {
            match Aid::parse(id) {
                Ok(aid) => agents.push(aid),
                Err(e) => log::warn!("dropping malformed AID {id:?} in agentsForService reply: {e}"),
            }
        }
        Ok(agents)
    }

    /// Send `msg`, stamping it with this gateway's own AID as sender if it
    /// has none. Does not wait for any reply.
    pub fn send(&self, mut msg: OutboundMessage) -> Result<(), GatewayError> {
        self.ensure_ready()?;
        if msg.sender().is_none() {
            msg.set_sender(self.shared.agent_id.clone());
        }
        let line = codec::encode_send(&msg)?;
        write_line(&self.shared, &line)
    }

    /// Remove and return the first inbox message matching `clazz` (if
    /// given) and `in_reply_to` (if given), waiting according to `timeout`
    /// if no match is currently queued. `clazz` matches by exact equality
    /// only; there is no subclass or prefix matching.
    pub fn receive(
        &self,
        clazz: Option<&str>,
        in_reply_to: Option<&MessageId>,
        timeout: Timeout,
    ) -> Option<InboundMessage> {
        self.shared.inbox.receive(clazz, in_reply_to, timeout)
    }

    /// Send `msg` and wait for a reply correlated by `inReplyTo`, i.e. the
    /// request/response pattern built on top of `send`/`receive`.
    pub fn request(&self, msg: OutboundMessage, timeout: Timeout) -> Option<InboundMessage> {
        let id = msg.id().clone();
        self.send(msg).ok()?;
        self.receive(None, Some(&id), timeout)
    }

    /// Close the connection. Idempotent and safe to call concurrently with
    /// any other operation, including from a different thread than the one
    /// blocked in `receive`/`request`.
    pub fn close(&self) {
        let was_ready = {
            let mut state = self.shared.state.lock().unwrap();
            let was_ready = *state == State::Ready;
            if was_ready {
                *state = State::Closing;
            }
            was_ready
        };
        if !was_ready {
            return;
        }

        if let Ok(line) = codec::encode_action_request("shutdown", &MessageId::new(), serde_json::json!({})) {
            let _ = write_line(&self.shared, &line);
        }
        if let Ok(stream) = self.shared.write_stream.lock() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        if let Some(handle) = self.reader_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn ensure_ready(&self) -> Result<(), GatewayError> {
        if *self.shared.state.lock().unwrap() == State::Ready {
            Ok(())
        } else {
            Err(GatewayError::Closed)
        }
    }

    /// Send a control action and block for its correlated reply, bounded by
    /// this gateway's configured control timeout. `Ok(None)` means the
    /// gateway is alive but no reply arrived in time; the slot is then
    /// forgotten so a later, stray reply is dropped rather than delivered
    /// to a since-abandoned waiter.
    fn control_request(
        &self,
        action: &str,
        extra: serde_json::Value,
    ) -> Result<Option<serde_json::Map<String, serde_json::Value>>, GatewayError> {
        self.ensure_ready()?;
        let id = MessageId::new();
        let slot = self.shared.pending.register(id.clone());
        let line = codec::encode_action_request(action, &id, extra)?;
        write_line(&self.shared, &line)?;

        let result = slot.wait(Timeout::After(self.shared.control_timeout));
        if result.is_none() {
            self.shared.pending.forget(&id);
        }
        Ok(result)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.close();
    }
}

fn reader_loop(shared: Arc<Shared>, stream: TcpStream, read_chunk: usize) {
    let mut transport = LineTransport::with_chunk_size(stream, read_chunk);
    loop {
        match transport.read_line() {
            Ok(Some(line)) => {
                if let Err(e) = dispatch_line(&shared, &line) {
                    log::warn!("dropping malformed frame: {e}");
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("connection read error, closing: {e}");
                break;
            }
        }
    }

    shared.inbox.close();
    shared.pending.fail_all();
    *shared.state.lock().unwrap() = State::Closed;
}

fn dispatch_line(shared: &Shared, line: &str) -> Result<(), crate::error::DecodeError> {
    if line.is_empty() {
        return Ok(());
    }
    match codec::decode_line(line)? {
        InboundFrame::Message(msg) => {
            if message_is_for_us(shared, &msg) {
                shared.inbox.push(msg);
            } else {
                log::debug!("dropping message addressed to {:?}, not ours", msg.recipient());
            }
        }
        InboundFrame::ActionResponse { id, result, .. } => {
            if !shared.pending.complete(&id, result) {
                log::debug!("dropping untracked or late reply for id {id}");
            }
        }
        InboundFrame::ActionRequest { id, action, params } => {
            respond_to_query(shared, &id, &action, &params);
        }
    }
    Ok(())
}

fn message_is_for_us(shared: &Shared, msg: &InboundMessage) -> bool {
    match msg.recipient() {
        Some(aid) if *aid == shared.agent_id => true,
        Some(aid) if aid.is_topic() => shared.subscriptions.lock().unwrap().contains(aid),
        Some(_) => false,
        None => false,
    }
}

fn respond_to_query(
    shared: &Shared,
    id: &MessageId,
    action: &str,
    params: &serde_json::Map<String, serde_json::Value>,
) {
    let extra = match action {
        "agents" => serde_json::json!({ "agentIDs": [shared.agent_id.to_wire()] }),
        "containsAgent" => {
            let target = params.get("agentID").and_then(|v| v.as_str());
            let answer = target.map_or(false, |t| {
                Aid::parse(t).map(|aid| aid == shared.agent_id).unwrap_or(false)
            });
            serde_json::json!({ "answer": answer })
        }
        "services" => serde_json::json!({ "services": Vec::<String>::new() }),
        _ => serde_json::json!({}),
    };

    let reply_action = if matches!(action, "agents" | "containsAgent" | "services") {
        action
    } else {
        "notUnderstood"
    };

    if let Ok(line) = codec::encode_action_response(reply_action, id, extra) {
        let _ = write_line(shared, &line);
    }
}
