use std::path::PathBuf;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use maze_chase_server::config::GameConfig;
use maze_chase_server::server_protocol::{parse_client_message, ParsedClientMessage};
use maze_chase_server::server_utils::{parse_seed, sanitize_name};
use maze_chase_server::session::GameSession;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower_http::services::{ServeDir, ServeFile};

/// Driver cadence. The session's own enemy-tick period rides on top of
/// this logical clock, so it only needs to divide the enemy tick evenly.
const DRIVER_TICK_MS: u64 = 250;

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler));

    let app = if let Some(static_dir) = resolve_static_dir() {
        println!(
            "[server] static file root: {}",
            static_dir.to_string_lossy()
        );
        let index_file = static_dir.join("index.html");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        eprintln!("[server] static file root not found. serving the websocket API only.");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("client"), PathBuf::from("../client")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    seed: Option<String>,
}

async fn ws_handler(ws: WebSocketUpgrade, Query(query): Query<WsQuery>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, query))
}

/// One connection, one single-player session. The interval drives the
/// session clock; inbound messages are applied between ticks, so every
/// event is processed fully before the next.
async fn handle_socket(socket: WebSocket, query: WsQuery) {
    let env_seed = std::env::var("SESSION_SEED").ok();
    let seed = parse_seed(query.seed.as_deref())
        .or_else(|| parse_seed(env_seed.as_deref()))
        .unwrap_or_else(|| rand::rng().random());
    let mut session = match GameSession::new(GameConfig::default(), seed) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("[server] rejected session: {err}");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(256);
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    queue_json(
        &tx,
        &json!({
            "type": "welcome",
            "seed": seed,
            "maze": session.maze_view(),
        }),
    );

    let mut interval = tokio::time::interval(Duration::from_millis(DRIVER_TICK_MS));
    let mut last_round = session.round();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session.step(DRIVER_TICK_MS);
                if session.round() != last_round {
                    last_round = session.round();
                    queue_json(&tx, &json!({
                        "type": "maze",
                        "maze": session.maze_view(),
                    }));
                }
                if !send_state(&mut session, &tx) {
                    break;
                }
            }
            received = ws_receiver.next() => {
                let Some(Ok(message)) = received else {
                    break;
                };
                match message {
                    Message::Text(raw) => {
                        handle_client_message(&mut session, &tx, raw.to_string());
                    }
                    Message::Binary(raw) => {
                        if let Ok(text) = String::from_utf8(raw.to_vec()) {
                            handle_client_message(&mut session, &tx, text);
                        } else {
                            queue_json(&tx, &json!({
                                "type": "error",
                                "message": "invalid utf8 message",
                            }));
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    }

    drop(tx);
    let _ = writer.await;
}

fn handle_client_message(session: &mut GameSession, tx: &mpsc::Sender<String>, raw: String) {
    let Some(message) = parse_client_message(&raw) else {
        queue_json(
            tx,
            &json!({
                "type": "error",
                "message": "invalid message",
            }),
        );
        return;
    };

    match message {
        ParsedClientMessage::Hello { name } => {
            let name = sanitize_name(&name);
            println!("[server] {name} connected");
            queue_json(
                tx,
                &json!({
                    "type": "hello_ack",
                    "name": name,
                }),
            );
        }
        ParsedClientMessage::Input { dir } => {
            session.handle_move(dir);
            // Push the result right away instead of waiting for the
            // next driver tick.
            send_state(session, tx);
        }
        ParsedClientMessage::Ping { t } => {
            queue_json(
                tx,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
            );
        }
    }
}

fn send_state(session: &mut GameSession, tx: &mpsc::Sender<String>) -> bool {
    let snapshot = session.build_snapshot(true);
    for event in &snapshot.events {
        queue_json(
            tx,
            &json!({
                "type": "status",
                "message": event.status_line(),
            }),
        );
    }
    queue_json(
        tx,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
    )
}

/// Queues a payload for the writer task. Returns false once the writer
/// is gone; a full queue just drops the frame, the next tick resends
/// fresher state anyway.
fn queue_json(tx: &mpsc::Sender<String>, message: &Value) -> bool {
    match tx.try_send(message.to_string()) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => true,
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}
