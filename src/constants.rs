pub const TICK_RATE: u32 = 60;

pub const WORLD_X: f64 = 0.0;
pub const WORLD_Y: f64 = 0.0;
pub const WORLD_WIDTH: f64 = 2000.0;
pub const WORLD_HEIGHT: f64 = 1200.0;

pub const MAX_PLAYERS: usize = 100;
pub const MAX_FOOD: usize = 200;
pub const FOOD_TARGET_LIMIT: usize = 10_000;
pub const MAX_NAME_LENGTH: usize = 25;

pub const FOOD_RADIUS: f64 = 5.0;

pub const MIN_RADIUS: f64 = 50.0;
pub const MAX_RADIUS: f64 = 500.0;
pub const MAX_GROWTH_RATE: f64 = 50.0;
pub const SHRINK_RADIUS: f64 = 300.0;
pub const SHRINK_RATE: f64 = 3.0;

pub const MIN_SPEED: f64 = 50.0;
pub const MAX_SPEED: f64 = 100.0;

pub const REJECT_REASON_SESSION_LIMIT: &str = "Too many concurrent players.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_range_is_ordered() {
        assert!(MIN_SPEED < MAX_SPEED);
        assert!(MIN_RADIUS < SHRINK_RADIUS && SHRINK_RADIUS < MAX_RADIUS);
    }
}
