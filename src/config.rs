use std::path::PathBuf;

use clap::Parser;

use crate::constants::{
    FOOD_TARGET_LIMIT, MAX_FOOD, MAX_NAME_LENGTH, MAX_PLAYERS, MAX_RADIUS, TICK_RATE,
    WORLD_HEIGHT, WORLD_WIDTH, WORLD_X, WORLD_Y,
};
use crate::error::ConfigError;
use crate::types::Bounds;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Authoritative arena game server")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    #[arg(long, env = "MAX_PLAYERS", default_value_t = MAX_PLAYERS)]
    pub max_players: usize,
    #[arg(long, env = "FOOD_TARGET", default_value_t = MAX_FOOD)]
    pub food_target: usize,
    #[arg(long, env = "TICK_RATE", default_value_t = TICK_RATE)]
    pub tick_rate: u32,
    #[arg(long, env = "MAX_NAME_LENGTH", default_value_t = MAX_NAME_LENGTH)]
    pub max_name_length: usize,
    #[arg(long, env = "WORLD_WIDTH", default_value_t = WORLD_WIDTH)]
    pub world_width: f64,
    #[arg(long, env = "WORLD_HEIGHT", default_value_t = WORLD_HEIGHT)]
    pub world_height: f64,
    /// Seed for spawn and food placement. Random when omitted.
    #[arg(long, env = "WORLD_SEED")]
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn world_config(&self) -> Result<WorldConfig, ConfigError> {
        let config = WorldConfig {
            bounds: Bounds {
                x: WORLD_X,
                y: WORLD_Y,
                width: self.world_width,
                height: self.world_height,
            },
            food_target: self.food_target,
            tick_rate: self.tick_rate,
            max_players: self.max_players,
            max_name_length: self.max_name_length,
            seed: self.seed.unwrap_or_else(rand::random),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    pub bounds: Bounds,
    pub food_target: usize,
    pub tick_rate: u32,
    pub max_players: usize,
    pub max_name_length: usize,
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds {
                x: WORLD_X,
                y: WORLD_Y,
                width: WORLD_WIDTH,
                height: WORLD_HEIGHT,
            },
            food_target: MAX_FOOD,
            tick_rate: TICK_RATE,
            max_players: MAX_PLAYERS,
            max_name_length: MAX_NAME_LENGTH,
            seed: 0,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Bounds { width, height, .. } = self.bounds;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidWorldSize { width, height });
        }
        let min_side = MAX_RADIUS * 2.0;
        if width < min_side || height < min_side {
            return Err(ConfigError::WorldTooSmall { min_side });
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.max_name_length == 0 {
            return Err(ConfigError::ZeroNameLength);
        }
        if self.max_players == 0 {
            return Err(ConfigError::ZeroMaxPlayers);
        }
        if self.food_target > FOOD_TARGET_LIMIT {
            return Err(ConfigError::FoodTargetTooLarge {
                target: self.food_target,
                limit: FOOD_TARGET_LIMIT,
            });
        }
        Ok(())
    }

    pub fn tick_period_secs(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }
}
