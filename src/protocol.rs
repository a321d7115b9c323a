use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, FoodId, FoodView, PlayerId, PlayerView, Vec2};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Move { dir: Vec2 },
    Spawn { name: String },
    Ping,
}

pub fn parse_client_command(raw: &str) -> Option<ClientCommand> {
    let command: ClientCommand = serde_json::from_str(raw).ok()?;
    if let ClientCommand::Move { dir } = &command {
        if !dir.x.is_finite() || !dir.y.is_finite() {
            return None;
        }
    }
    Some(command)
}

#[derive(Clone, Debug, Serialize)]
pub struct InitState {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub players: BTreeMap<PlayerId, PlayerView>,
    #[serde(rename = "foodParticles")]
    pub food_particles: BTreeMap<FoodId, FoodView>,
    #[serde(rename = "worldBounds")]
    pub world_bounds: Bounds,
}

#[derive(Clone, Debug, Serialize)]
pub struct UpdateState {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub players: BTreeMap<PlayerId, PlayerView>,
    #[serde(rename = "addedFood")]
    pub added_food: BTreeMap<FoodId, FoodView>,
    #[serde(rename = "removedFood")]
    pub removed_food: Vec<FoodId>,
    #[serde(rename = "worldBounds")]
    pub world_bounds: Bounds,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Init { state: InitState },
    Update { state: UpdateState },
    Dead,
    Pong,
    Error { reason: String },
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Update { .. } => "update",
            Self::Dead => "dead",
            Self::Pong => "pong",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> String {
        // Every payload is plain maps of numbers and strings.
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"type":"{}"}}"#, self.kind()))
    }
}
