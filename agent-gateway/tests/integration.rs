//! Drives a `Gateway` against a minimal hand-rolled master: a loopback
//! `TcpListener` that speaks just enough of the wire protocol to exercise
//! one behavior per test.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use agent_gateway::{Aid, Gateway, GatewayConfig, OutboundMessage, Performative, Timeout};

fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn read_json_line(reader: &mut BufReader<TcpStream>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read line from client");
    serde_json::from_str(line.trim()).expect("client line is valid JSON")
}

fn write_line(stream: &mut TcpStream, value: &serde_json::Value) {
    let mut line = serde_json::to_string(value).unwrap();
    line.push('\n');
    stream.write_all(line.as_bytes()).unwrap();
}

fn spawn_master<F>(listener: TcpListener, body: F) -> JoinHandle<Result<(), String>>
where
    F: FnOnce(TcpStream) -> Result<(), String> + Send + 'static,
{
    thread::spawn(move || {
        let (stream, _) = listener.accept().map_err(|e| e.to_string())?;
        body(stream)
    })
}

#[test]
fn message_frame_addressed_to_our_aid_reaches_receive() {
    let (listener, port) = listen();
    let (recipient_tx, recipient_rx) = mpsc::channel::<String>();
    let master = spawn_master(listener, move |mut stream| {
        let recipient = recipient_rx.recv().map_err(|e| e.to_string())?;
        write_line(
            &mut stream,
            &serde_json::json!({
                "message": {
                    "id": "m1",
                    "clazz": "org.x.Greeting",
                    "perf": "INFORM",
                    "recipient": recipient,
                    "data": { "text": "hi" }
                }
            }),
        );
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    recipient_tx.send(gw.agent_id().to_wire()).unwrap();
    let msg = gw
        .receive(Some("org.x.Greeting"), None, Timeout::After(Duration::from_secs(2)))
        .expect("message should arrive");
    assert_eq!(msg.get_string("text", ""), "hi");

    gw.close();
    master.join().unwrap().unwrap();
}

#[test]
fn message_frame_with_no_recipient_is_dropped() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |mut stream| {
        write_line(
            &mut stream,
            &serde_json::json!({
                "message": {
                    "id": "m1",
                    "clazz": "org.x.Unaddressed",
                    "perf": "INFORM",
                    "data": {}
                }
            }),
        );
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    let result = gw.receive(
        Some("org.x.Unaddressed"),
        None,
        Timeout::After(Duration::from_millis(200)),
    );
    assert!(result.is_none(), "a recipient-less frame must not be delivered");

    gw.close();
    master.join().unwrap().unwrap();
}

#[test]
fn send_transmits_a_send_action_frame() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |stream| {
        let mut reader = BufReader::new(stream);
        let value = read_json_line(&mut reader);
        if value["action"] != "send" {
            return Err(format!("expected send action, got {value}"));
        }
        let data = &value["message"]["data"];
        if data["n"] != 7 {
            return Err(format!("expected n=7, got {data}"));
        }
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    let mut msg = OutboundMessage::new("org.x.Ping", Performative::Request);
    msg.add_int("n", 7);
    gw.send(msg).expect("send should succeed");

    gw.close();
    master.join().unwrap().unwrap();
}

#[test]
fn subscribe_acks_then_topic_delivery_reaches_the_inbox() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |stream| {
        let mut reader = BufReader::new(stream);
        let request = read_json_line(&mut reader);
        if request["action"] != "wantsMessagesFor" {
            return Err(format!("expected wantsMessagesFor, got {request}"));
        }
        let topics = request["topics"]
            .as_array()
            .ok_or_else(|| "topics must be an array".to_string())?;
        if !topics.iter().any(|t| t == "#news") {
            return Err(format!("expected #news in topics, got {topics:?}"));
        }

        let mut stream = reader.into_inner();
        write_line(
            &mut stream,
            &serde_json::json!({ "id": request["id"], "inResponseTo": "wantsMessagesFor" }),
        );
        write_line(
            &mut stream,
            &serde_json::json!({
                "message": {
                    "id": "m2",
                    "clazz": "org.x.Headline",
                    "perf": "INFORM",
                    "recipient": "#news",
                    "data": {}
                }
            }),
        );
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    let news = Aid::topic("news").unwrap();
    gw.subscribe(&news).expect("subscribe should be acked");
    assert!(gw.is_subscribed(&news));

    let delivered = gw.receive(None, None, Timeout::After(Duration::from_secs(2)));
    assert!(delivered.is_some());

    gw.close();
    master.join().unwrap().unwrap();
}

#[test]
fn agent_for_service_correlates_reply_by_id() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |stream| {
        let mut reader = BufReader::new(stream);
        let request = read_json_line(&mut reader);
        if request["action"] != "agentForService" || request["service"] != "nav" {
            return Err(format!("unexpected request {request}"));
        }
        let mut stream = reader.into_inner();
        write_line(
            &mut stream,
            &serde_json::json!({
                "id": request["id"],
                "inResponseTo": "agentForService",
                "agentID": "navigator"
            }),
        );
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    let found = gw.agent_for_service("nav").expect("request should not error");
    assert_eq!(found.map(|a| a.name().to_owned()), Some("navigator".to_owned()));

    gw.close();
    master.join().unwrap().unwrap();
}

#[test]
fn server_initiated_agents_query_is_answered() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |mut stream| {
        write_line(&mut stream, &serde_json::json!({ "action": "agents", "id": "srv1" }));
        let mut reader = BufReader::new(stream);
        let reply = read_json_line(&mut reader);
        if reply["inResponseTo"] != "agents" {
            return Err(format!("expected an agents reply, got {reply}"));
        }
        let agent_ids = reply["agentIDs"]
            .as_array()
            .ok_or_else(|| "agentIDs must be an array".to_string())?;
        if agent_ids.len() != 1 {
            return Err(format!("expected exactly one agent id, got {agent_ids:?}"));
        }
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    // give the reader thread a moment to answer before the connection drops
    thread::sleep(Duration::from_millis(100));
    drop(gw);

    master.join().unwrap().unwrap();
}

#[test]
fn server_initiated_contains_agent_query_is_answered() {
    let (listener, port) = listen();
    let (aid_tx, aid_rx) = mpsc::channel::<String>();
    let master = spawn_master(listener, move |stream| {
        let our_aid = aid_rx.recv().map_err(|e| e.to_string())?;
        let mut reader = BufReader::new(stream.try_clone().map_err(|e| e.to_string())?);
        let mut stream = stream;

        write_line(
            &mut stream,
            &serde_json::json!({ "action": "containsAgent", "id": "srv1", "agentID": our_aid }),
        );
        let reply = read_json_line(&mut reader);
        if reply["inResponseTo"] != "containsAgent" {
            return Err(format!("expected a containsAgent reply, got {reply}"));
        }
        if reply["answer"] != true {
            return Err(format!("expected answer=true for our own AID, got {reply}"));
        }

        write_line(
            &mut stream,
            &serde_json::json!({ "action": "containsAgent", "id": "srv2", "agentID": "agent-someone-else" }),
        );
        let reply = read_json_line(&mut reader);
        if reply["inResponseTo"] != "containsAgent" {
            return Err(format!("expected a containsAgent reply, got {reply}"));
        }
        if reply["answer"] != false {
            return Err(format!("expected answer=false for a mismatching AID, got {reply}"));
        }

        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    aid_tx.send(gw.agent_id().to_wire()).unwrap();
    // give the reader thread a moment to answer both queries before the connection drops
    thread::sleep(Duration::from_millis(100));
    drop(gw);

    master.join().unwrap().unwrap();
}

#[test]
fn a_dropped_connection_unblocks_a_pending_blocking_receive() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |stream| {
        thread::sleep(Duration::from_millis(50));
        drop(stream);
        Ok(())
    });

    let gw = Gateway::open("127.0.0.1", port).expect("connect");
    let result = gw.receive(None, None, Timeout::Forever);
    assert!(result.is_none());

    master.join().unwrap().unwrap();
}

#[test]
fn custom_inbox_capacity_evicts_oldest_non_topic_message() {
    let (listener, port) = listen();
    let master = spawn_master(listener, |mut stream| {
        for i in 0..3 {
            write_line(
                &mut stream,
                &serde_json::json!({
                    "message": {
                        "id": format!("m{i}"),
                        "clazz": format!("org.x.M{i}"),
                        "perf": "INFORM",
                        "data": {}
                    }
                }),
            );
        }
        Ok(())
    });

    let config = GatewayConfig {
        inbox_capacity: 2,
        ..GatewayConfig::default()
    };
    let gw = Gateway::open_with_config("127.0.0.1", port, config).expect("connect");
    thread::sleep(Duration::from_millis(100));

    let first = gw.receive(None, None, Timeout::Immediate).expect("first survivor");
    assert_eq!(first.clazz(), "org.x.M1");
    let second = gw.receive(None, None, Timeout::Immediate).expect("second survivor");
    assert_eq!(second.clazz(), "org.x.M2");
    assert!(gw.receive(None, None, Timeout::Immediate).is_none());

    gw.close();
    master.join().unwrap().unwrap();
}
