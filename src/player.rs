use std::fmt;
use std::sync::Arc;

use crate::constants::{
    MAX_GROWTH_RATE, MAX_RADIUS, MAX_SPEED, MIN_RADIUS, MIN_SPEED, SHRINK_RADIUS, SHRINK_RATE,
};
use crate::protocol::ServerMessage;
use crate::server_utils::truncate_name;
use crate::sink::OutboundSink;
use crate::types::{Bounds, PlayerId, PlayerView, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    Unspawned,
    Alive,
}

#[derive(Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub pos: Vec2,
    pub r: f64,
    pub grow_to_r: f64,
    pub dir: Vec2,
    status: PlayerStatus,
    sink: Arc<dyn OutboundSink>,
}

impl Player {
    pub fn new(id: PlayerId, pos: Vec2, sink: Arc<dyn OutboundSink>) -> Self {
        Self {
            id,
            name: String::new(),
            pos,
            r: MIN_RADIUS,
            grow_to_r: MIN_RADIUS,
            dir: Vec2::ZERO,
            status: PlayerStatus::Unspawned,
            sink,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    pub fn spawn(&mut self, name: &str, pos: Vec2, max_name_length: usize) {
        self.status = PlayerStatus::Alive;
        self.name = truncate_name(name, max_name_length);
        self.pos = pos;
        self.r = MIN_RADIUS;
        self.grow_to_r = self.r;
        self.dir = Vec2::ZERO;
    }

    pub fn set_direction(&mut self, dir: Vec2) {
        self.dir = dir;
        let magnitude = dir.length();
        if magnitude > 1.0 {
            self.dir.x /= magnitude;
            self.dir.y /= magnitude;
        }
    }

    pub fn max_speed(&self) -> f64 {
        MIN_SPEED + (MAX_SPEED - MIN_SPEED) * (MAX_RADIUS - self.r) / (MAX_RADIUS - MIN_RADIUS)
    }

    pub fn advance(&mut self, delta_seconds: f64) {
        let max_speed = self.max_speed();
        self.pos.x += self.dir.x * max_speed * delta_seconds;
        self.pos.y += self.dir.y * max_speed * delta_seconds;

        if self.r < self.grow_to_r {
            self.r = self
                .grow_to_r
                .min(self.r + MAX_GROWTH_RATE * delta_seconds);
        }

        if self.r > SHRINK_RADIUS {
            let shrink = (self.r - SHRINK_RADIUS).min(SHRINK_RATE * delta_seconds);
            self.r -= shrink;
            self.grow_to_r -= shrink;
        }
    }

    pub fn grow(&mut self, other_radius: f64) {
        let summed = self.grow_to_r * self.grow_to_r + other_radius * other_radius;
        self.grow_to_r = summed.sqrt().min(MAX_RADIUS);
    }

    pub fn clamp_to_bounds(&mut self, bounds: &Bounds) {
        self.pos.x = self.pos.x.max(bounds.x + self.r).min(bounds.right() - self.r);
        self.pos.y = self.pos.y.max(bounds.y + self.r).min(bounds.bottom() - self.r);
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            name: self.name.clone(),
            pos: self.pos,
            r: self.r,
            alive: self.is_alive(),
        }
    }

    pub fn send(&self, message: &ServerMessage) -> bool {
        self.sink.send(message)
    }

    pub fn close(&self, code: u16, reason: &str) {
        self.sink.close(code, reason);
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("pos", &self.pos)
            .field("r", &self.r)
            .field("grow_to_r", &self.grow_to_r)
            .field("dir", &self.dir)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
