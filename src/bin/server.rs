use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use arena_rust_server::config::ServerConfig;
use arena_rust_server::gateway::{dispatch_binary, dispatch_text, Gateway};
use arena_rust_server::sink::{outbound_channel, OutboundMessage};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};

const OUTBOUND_QUEUE_CAPACITY: usize = 256;

type SharedState = Arc<Mutex<Gateway>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::parse();
    let world_config = config
        .world_config()
        .context("invalid world configuration")?;
    info!(
        port = config.port,
        tick_rate = world_config.tick_rate,
        max_players = world_config.max_players,
        food_target = world_config.food_target,
        width = world_config.bounds.width,
        height = world_config.bounds.height,
        seed = world_config.seed,
        "starting arena server"
    );

    let state = Arc::new(Mutex::new(Gateway::from_config(
        &world_config,
        Instant::now(),
    )));
    start_tick_loop(
        state.clone(),
        Duration::from_secs_f64(world_config.tick_period_secs()),
    );

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stats", get(stats_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir(config.static_dir.as_deref()) {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.display(), "serving static files");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        debug!("no static file root configured");
        app
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "listening");
    axum::serve(listener, app)
        .await
        .context("server runtime failed")?;
    Ok(())
}

fn resolve_static_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.join("index.html").is_file() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "static dir has no index.html; ignoring");
    }

    [PathBuf::from("public"), PathBuf::from("static")]
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn stats_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(guard.stats())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (sink, mut queue) = outbound_channel(OUTBOUND_QUEUE_CAPACITY);
    let sink = Arc::new(sink);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = queue.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    let admitted = {
        let mut guard = state.lock().await;
        guard.admit(sink.clone())
    };
    let Ok(player_id) = admitted else {
        drop(sink);
        let _ = writer.await;
        return;
    };

    let mut writer_done = false;
    loop {
        let received = tokio::select! {
            received = ws_receiver.next() => received,
            _ = &mut writer => {
                writer_done = true;
                break;
            }
        };
        let Some(Ok(message)) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                dispatch_text(&state, player_id, sink.as_ref(), raw.as_str()).await;
            }
            Message::Binary(bytes) => {
                dispatch_binary(&state, player_id, sink.as_ref(), &bytes).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.lock().await.disconnect(player_id);
    drop(sink);
    if !writer_done {
        let _ = writer.await;
    }
}

fn start_tick_loop(state: SharedState, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            guard.tick(Instant::now());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_static_dir_is_ignored() {
        let missing = PathBuf::from("definitely/not/here");
        let resolved = resolve_static_dir(Some(&missing));
        assert_ne!(resolved, Some(missing));
    }
}
