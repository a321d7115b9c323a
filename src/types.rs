use serde::{Deserialize, Serialize};

pub type PlayerId = u64;
pub type FoodId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_squared(self, other: Vec2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Vec2) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains_circle(&self, center: Vec2, radius: f64) -> bool {
        center.x - radius >= self.x
            && center.x + radius <= self.right()
            && center.y - radius >= self.y
            && center.y + radius <= self.bottom()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub pos: Vec2,
    pub r: f64,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FoodView {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Elimination {
    pub victim_id: PlayerId,
    pub eater_id: PlayerId,
    pub victim_radius: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub delta_seconds: f64,
    pub added_food: Vec<FoodId>,
    pub removed_food: Vec<FoodId>,
    pub eliminations: Vec<Elimination>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EngineStats {
    pub tick: u64,
    #[serde(rename = "playerCount")]
    pub player_count: usize,
    #[serde(rename = "alivePlayers")]
    pub alive_players: usize,
    #[serde(rename = "foodCount")]
    pub food_count: usize,
}
