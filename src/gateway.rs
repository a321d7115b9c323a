use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::WorldConfig;
use crate::constants::REJECT_REASON_SESSION_LIMIT;
use crate::engine::TickEngine;
use crate::error::AdmissionError;
use crate::protocol::{parse_client_command, ClientCommand, ServerMessage};
use crate::server_utils::{CLOSE_CODE_ELIMINATED, CLOSE_CODE_REJECTED};
use crate::sink::OutboundSink;
use crate::types::{EngineStats, PlayerId, TickReport};

pub struct Gateway {
    engine: TickEngine,
    sessions: BTreeMap<PlayerId, Arc<dyn OutboundSink>>,
    max_sessions: usize,
}

impl Gateway {
    pub fn new(engine: TickEngine, max_sessions: usize) -> Self {
        Self {
            engine,
            sessions: BTreeMap::new(),
            max_sessions,
        }
    }

    pub fn from_config(config: &WorldConfig, started_at: Instant) -> Self {
        Self::new(
            TickEngine::from_config(config, started_at),
            config.max_players,
        )
    }

    pub fn engine(&self) -> &TickEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TickEngine {
        &mut self.engine
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    pub fn admit(&mut self, sink: Arc<dyn OutboundSink>) -> Result<PlayerId, AdmissionError> {
        if self.engine.world().player_count() >= self.max_sessions {
            let err = AdmissionError::SessionLimitReached {
                limit: self.max_sessions,
            };
            warn!(%err, "rejecting connection");
            sink.send(&ServerMessage::Error {
                reason: REJECT_REASON_SESSION_LIMIT.to_string(),
            });
            sink.close(CLOSE_CODE_REJECTED, REJECT_REASON_SESSION_LIMIT);
            return Err(err);
        }

        let player_id = self.engine.admit_player(sink.clone());
        self.sessions.insert(player_id, sink);
        info!(
            player_id,
            players = self.engine.world().player_count(),
            "connection admitted"
        );
        Ok(player_id)
    }

    pub fn handle_raw(&mut self, player_id: PlayerId, raw: &str) {
        match parse_client_command(raw) {
            Some(command) => self.handle_command(player_id, command),
            None => debug!(player_id, len = raw.len(), "dropping malformed message"),
        }
    }

    pub fn handle_command(&mut self, player_id: PlayerId, command: ClientCommand) {
        match command {
            ClientCommand::Move { dir } => {
                self.engine.set_direction(player_id, dir);
            }
            ClientCommand::Spawn { name } => {
                if self.engine.spawn_player(player_id, &name) {
                    let name = self
                        .engine
                        .world()
                        .player(player_id)
                        .map(|player| player.name.as_str())
                        .unwrap_or_default();
                    info!(player_id, name, "player spawned");
                }
            }
            ClientCommand::Ping => {
                if let Some(sink) = self.sessions.get(&player_id) {
                    sink.send(&ServerMessage::Pong);
                }
            }
        }
    }

    pub fn disconnect(&mut self, player_id: PlayerId) {
        self.sessions.remove(&player_id);
        if self.engine.remove_player(player_id).is_some() {
            info!(
                player_id,
                players = self.engine.world().player_count(),
                "connection closed"
            );
        }
    }

    pub fn tick(&mut self, now: Instant) -> TickReport {
        let report = self.engine.tick(now);
        self.close_eliminated(&report);
        report
    }

    pub fn step(&mut self, delta_seconds: f64) -> TickReport {
        let report = self.engine.step(delta_seconds);
        self.close_eliminated(&report);
        report
    }

    fn close_eliminated(&mut self, report: &TickReport) {
        for elimination in &report.eliminations {
            if let Some(sink) = self.sessions.remove(&elimination.victim_id) {
                sink.close(CLOSE_CODE_ELIMINATED, "eliminated");
            }
            info!(
                victim_id = elimination.victim_id,
                eater_id = elimination.eater_id,
                victim_radius = elimination.victim_radius,
                "player eliminated"
            );
        }
    }
}

/// Routes one inbound text frame from a connection task. `ping` is answered
/// straight into `reply` without taking the lock.
pub async fn dispatch_text(
    shared: &Mutex<Gateway>,
    player_id: PlayerId,
    reply: &dyn OutboundSink,
    raw: &str,
) {
    let Some(command) = parse_client_command(raw) else {
        debug!(player_id, len = raw.len(), "dropping malformed message");
        return;
    };
    if matches!(command, ClientCommand::Ping) {
        reply.send(&ServerMessage::Pong);
        return;
    }
    shared.lock().await.handle_command(player_id, command);
}

pub async fn dispatch_binary(
    shared: &Mutex<Gateway>,
    player_id: PlayerId,
    reply: &dyn OutboundSink,
    bytes: &[u8],
) {
    match std::str::from_utf8(bytes) {
        Ok(raw) => dispatch_text(shared, player_id, reply, raw).await,
        Err(_) => debug!(player_id, len = bytes.len(), "dropping non-utf8 binary message"),
    }
}
