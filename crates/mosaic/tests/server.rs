//! End-to-end tests: a real server on a random port and raw TCP clients
//! speaking newline-delimited JSON.

use std::time::Duration;

use mosaic::prelude::*;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port. Dropping the returned sender (or
/// sending on it) shuts it down.
async fn start_server() -> (String, oneshot::Sender<()>) {
    start_server_with(MosaicServer::builder()).await
}

/// Like [`start_server`], with the caller's settings.
async fn start_server_with(builder: MosaicServerBuilder) -> (String, oneshot::Sender<()>) {
    let server = builder
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should bind");
    let addr = server.local_addr().unwrap().to_string();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(server.run_until(async {
        let _ = stop_rx.await;
    }));
    (addr, stop_tx)
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("should connect");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    /// Next message from the server, failing after two seconds.
    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for server")
            .expect("read failed")
            .expect("server closed the connection");
        serde_json::from_str(&line).expect("server sent invalid JSON")
    }

    /// Skips messages until one of type `kind` arrives.
    async fn recv_type(&mut self, kind: &str) -> Value {
        loop {
            let msg = self.recv().await;
            if msg["type"] == kind {
                return msg;
            }
        }
    }

    /// Asserts the server closes the connection.
    async fn expect_closed(&mut self) {
        let next = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for close");
        match next {
            Ok(None) | Err(_) => {}
            Ok(Some(line)) => panic!("expected close, got {line}"),
        }
    }

    async fn login(addr: &str, room: &str, nick: &str) -> Self {
        let (client, reply) = Self::try_login(addr, room, nick).await;
        assert_eq!(reply["type"], "login success", "login of {nick}: {reply}");
        client
    }

    /// Connects and logs in, returning the server's reply whatever it is.
    async fn try_login(addr: &str, room: &str, nick: &str) -> (Self, Value) {
        let mut client = Self::connect(addr).await;
        client
            .send(json!({"type": "login", "nick": nick, "room name": room}))
            .await;
        let reply = client.recv().await;
        (client, reply)
    }
}

/// Two logged-in, ready users with a running game.
async fn started_pair(addr: &str, room: &str) -> (Client, Client) {
    let mut ana = Client::login(addr, room, "ana").await;
    let mut bo = Client::login(addr, room, "bo").await;
    assert_eq!(ana.recv().await, json!({"type": "user joined", "nick": "bo"}));

    ana.send(json!({"type": "ready for game"})).await;
    bo.send(json!({"type": "ready for game"})).await;
    ana.recv_type("game start").await;
    bo.recv_type("game start").await;
    (ana, bo)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_login_ready_and_start() {
    let (addr, _stop) = start_server().await;

    let mut ana = Client::connect(&addr).await;
    ana.send(json!({"type": "login", "nick": "ana", "room name": "blue"}))
        .await;
    assert_eq!(
        ana.recv().await,
        json!({"type": "login success", "logged users": []})
    );

    let mut bo = Client::connect(&addr).await;
    bo.send(json!({"type": "login", "nick": "bo", "room name": "blue"}))
        .await;
    assert_eq!(
        bo.recv().await,
        json!({
            "type": "login success",
            "logged users": [{"nick": "ana", "is ready for game": false}]
        })
    );
    assert_eq!(ana.recv().await, json!({"type": "user joined", "nick": "bo"}));

    ana.send(json!({"type": "ready for game"})).await;
    assert_eq!(ana.recv().await, json!({"type": "ready for game", "nick": "ana"}));
    assert_eq!(bo.recv().await, json!({"type": "ready for game", "nick": "ana"}));

    bo.send(json!({"type": "ready for game"})).await;
    assert_eq!(bo.recv().await, json!({"type": "ready for game", "nick": "bo"}));

    let start = bo.recv().await;
    assert_eq!(start["type"], "game start");
    let displays = start["factory displays"].as_array().unwrap();
    assert_eq!(displays.len(), 5);
    for display in displays {
        assert_eq!(display.as_array().unwrap().len(), 4);
    }
    let current = start["current player"].as_u64().unwrap();
    assert!(current < 2);

    ana.recv_type("game start").await;
}

#[tokio::test]
async fn test_login_refusal_keeps_connection_open() {
    let (addr, _stop) = start_server().await;
    let _ana = Client::login(&addr, "blue", "ana").await;

    let mut imposter = Client::connect(&addr).await;
    imposter
        .send(json!({"type": "login", "nick": "ana", "room name": "blue"}))
        .await;
    assert_eq!(
        imposter.recv().await,
        json!({"type": "login failed", "cause": "The nickname has been used in room."})
    );

    // Same connection, different nickname.
    imposter
        .send(json!({"type": "login", "nick": "cy", "room name": "blue"}))
        .await;
    assert_eq!(imposter.recv().await["type"], "login success");
}

#[tokio::test]
async fn test_concurrent_logins_to_new_room_meet() {
    let (addr, _stop) = start_server().await;

    let ((mut ana, ana_reply), (mut bo, bo_reply)) = tokio::join!(
        Client::try_login(&addr, "fresh", "ana"),
        Client::try_login(&addr, "fresh", "bo"),
    );
    assert_eq!(ana_reply["type"], "login success");
    assert_eq!(bo_reply["type"], "login success");

    // Exactly one of them found the other already in the room.
    let ana_saw = ana_reply["logged users"].as_array().unwrap().clone();
    let bo_saw = bo_reply["logged users"].as_array().unwrap().clone();
    if ana_saw.is_empty() {
        assert_eq!(bo_saw, vec![json!({"nick": "ana", "is ready for game": false})]);
        assert_eq!(ana.recv().await, json!({"type": "user joined", "nick": "bo"}));
    } else {
        assert!(bo_saw.is_empty());
        assert_eq!(ana_saw, vec![json!({"nick": "bo", "is ready for game": false})]);
        assert_eq!(bo.recv().await, json!({"type": "user joined", "nick": "ana"}));
    }

    ana.send(json!({"type": "ready for game"})).await;
    bo.send(json!({"type": "ready for game"})).await;
    ana.recv_type("game start").await;
    bo.recv_type("game start").await;

    let (_late, reply) = Client::try_login(&addr, "fresh", "cy").await;
    assert_eq!(
        reply,
        json!({
            "type": "login failed",
            "cause": "The room name is used and the game in the corresponding room has started."
        })
    );
}

#[tokio::test]
async fn test_login_into_running_game_fails() {
    let (addr, _stop) = start_server().await;
    let (_ana, _bo) = started_pair(&addr, "blue").await;

    let mut late = Client::connect(&addr).await;
    late.send(json!({"type": "login", "nick": "cy", "room name": "blue"}))
        .await;
    assert_eq!(
        late.recv().await,
        json!({
            "type": "login failed",
            "cause": "The room name is used and the game in the corresponding room has started."
        })
    );
}

#[tokio::test]
async fn test_malformed_line_closes_only_that_connection() {
    let (addr, _stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;
    let mut bo = Client::login(&addr, "blue", "bo").await;
    ana.recv_type("user joined").await;

    bo.send_raw("this is not json").await;
    bo.expect_closed().await;
    assert_eq!(ana.recv().await, json!({"type": "user left room", "nick": "bo"}));

    ana.send(json!({"type": "ready for game"})).await;
    assert_eq!(ana.recv().await, json!({"type": "ready for game", "nick": "ana"}));
}

#[tokio::test]
async fn test_unknown_type_closes_connection() {
    let (addr, _stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;

    ana.send(json!({"type": "fly to the moon"})).await;
    ana.expect_closed().await;
}

#[tokio::test]
async fn test_game_message_before_login_closes_connection() {
    let (addr, _stop) = start_server().await;
    let mut stranger = Client::connect(&addr).await;

    stranger.send(json!({"type": "ready for game"})).await;
    stranger.expect_closed().await;
}

#[tokio::test]
async fn test_disconnect_mid_game_resets_room() {
    let (addr, _stop) = start_server().await;
    let (mut ana, bo) = started_pair(&addr, "blue").await;

    drop(bo);
    assert_eq!(ana.recv().await, json!({"type": "user left game", "nick": "bo"}));

    // The room is back to waiting: a newcomer may join.
    let _cy = Client::login(&addr, "blue", "cy").await;
    assert_eq!(ana.recv().await, json!({"type": "user joined", "nick": "cy"}));
}

#[tokio::test]
async fn test_quit_game_leaves_room() {
    let (addr, _stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;
    let mut bo = Client::login(&addr, "blue", "bo").await;
    ana.recv_type("user joined").await;

    bo.send(json!({"type": "quit game"})).await;
    bo.expect_closed().await;
    assert_eq!(ana.recv().await, json!({"type": "user left room", "nick": "bo"}));
}

#[tokio::test]
async fn test_quitter_can_log_back_in_at_once() {
    let (addr, _stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;
    let mut bo = Client::login(&addr, "blue", "bo").await;
    ana.recv_type("user joined").await;

    bo.send(json!({"type": "quit game"})).await;
    bo.expect_closed().await;

    // The nickname is free by the time the old socket is closed.
    let _bo = Client::login(&addr, "blue", "bo").await;
    assert_eq!(ana.recv().await, json!({"type": "user left room", "nick": "bo"}));
    assert_eq!(ana.recv().await, json!({"type": "user joined", "nick": "bo"}));
}

#[tokio::test]
async fn test_stalled_reader_is_evicted_from_game() {
    let (addr, _stop) = start_server_with(
        MosaicServer::builder()
            .write_timeout(Duration::from_millis(200))
            .room_config(RoomConfig {
                outbound_queue: 2048,
                ..RoomConfig::default()
            }),
    )
    .await;

    // Every restart request carries this nickname to the other player.
    let loud = "x".repeat(16 * 1024);
    let mut talker = Client::login(&addr, "blue", &loud).await;
    let mut stalled = Client::connect(&addr).await;
    stalled
        .send(json!({"type": "login", "nick": "zed", "room name": "blue"}))
        .await;
    talker.recv_type("user joined").await;

    talker.send(json!({"type": "ready for game"})).await;
    stalled.send(json!({"type": "ready for game"})).await;
    talker.recv_type("game start").await;

    // `stalled` never reads again. Its socket buffers fill up and the
    // server's writes to it stop making progress.
    let Client { mut lines, mut writer } = talker;
    let flood = tokio::spawn(async move {
        let request = format!("{}\n", json!({"type": "restart request"}));
        for _ in 0..4096 {
            if writer.write_all(request.as_bytes()).await.is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
        writer
    });

    let left = tokio::time::timeout(Duration::from_secs(20), async {
        loop {
            let line = lines
                .next_line()
                .await
                .expect("read failed")
                .expect("server closed the connection");
            let msg: Value = serde_json::from_str(&line).expect("server sent invalid JSON");
            if msg["type"] == "user left game" {
                return msg;
            }
        }
    })
    .await
    .expect("stalled reader was never evicted");
    assert_eq!(left, json!({"type": "user left game", "nick": "zed"}));

    flood.abort();
    drop(stalled);
}

#[tokio::test]
async fn test_out_of_turn_collect_is_invalid_move() {
    let (addr, _stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;
    let mut bo = Client::login(&addr, "blue", "bo").await;
    ana.recv_type("user joined").await;

    ana.send(json!({"type": "ready for game"})).await;
    bo.send(json!({"type": "ready for game"})).await;
    let start = ana.recv_type("game start").await;
    bo.recv_type("game start").await;

    let current = start["current player"].as_u64().unwrap();
    let (mut actor, mut waiting) = if current == 0 { (ana, bo) } else { (bo, ana) };

    waiting
        .send(json!({"type": "collect tiles", "collect place": 0, "tile index": 0}))
        .await;
    assert_eq!(waiting.recv().await, json!({"type": "invalid move"}));

    actor
        .send(json!({"type": "collect tiles", "collect place": 0, "tile index": 0}))
        .await;
    let seen = waiting.recv().await;
    assert_eq!(seen["type"], "somebody collected tiles");
    assert_eq!(seen["collect place"], 0);
    assert_eq!(seen["tile index"], 0);

    actor
        .send(json!({"type": "place tiles request", "place location": -1}))
        .await;
    let valid = actor.recv().await;
    assert_eq!(valid["type"], "valid move");
    assert_eq!(valid["place location"], -1);
    assert_eq!(waiting.recv().await["type"], "somebody placed tiles");
    assert_eq!(
        actor.recv().await,
        json!({"type": "turn", "current player": 1 - current})
    );
}

#[tokio::test]
async fn test_negative_tile_index_is_invalid_move() {
    let (addr, _stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;
    let mut bo = Client::login(&addr, "blue", "bo").await;
    ana.recv_type("user joined").await;

    ana.send(json!({"type": "ready for game"})).await;
    bo.send(json!({"type": "ready for game"})).await;
    let start = ana.recv_type("game start").await;
    bo.recv_type("game start").await;

    let current = start["current player"].as_u64().unwrap();
    let (mut actor, mut waiting) = if current == 0 { (ana, bo) } else { (bo, ana) };

    actor
        .send(json!({"type": "collect tiles", "collect place": 0, "tile index": -1}))
        .await;
    assert_eq!(actor.recv().await, json!({"type": "invalid move"}));

    // Connection and game both survive; the same turn goes on.
    actor
        .send(json!({"type": "collect tiles", "collect place": 0, "tile index": 0}))
        .await;
    let seen = waiting.recv().await;
    assert_eq!(seen["type"], "somebody collected tiles");
    assert_eq!(seen["tile index"], 0);
}

#[tokio::test]
async fn test_rooms_are_independent() {
    let (addr, _stop) = start_server().await;
    let (_ana, _bo) = started_pair(&addr, "blue").await;

    // Same nicknames, different room.
    let mut ana2 = Client::login(&addr, "green", "ana").await;
    ana2.send(json!({"type": "ready for game"})).await;
    assert_eq!(ana2.recv().await, json!({"type": "ready for game", "nick": "ana"}));
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let (addr, stop) = start_server().await;
    let mut ana = Client::login(&addr, "blue", "ana").await;

    stop.send(()).unwrap();
    ana.expect_closed().await;
}
