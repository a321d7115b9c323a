use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use crate::config::WorldConfig;
use crate::player::Player;
use crate::sink::OutboundSink;
use crate::sync::{broadcast_update, build_init, FoodDelta};
use crate::types::{EngineStats, PlayerId, TickReport, Vec2};
use crate::world::WorldState;

pub mod collision_system;
pub mod food_system;
mod utils;

use self::collision_system::{resolve_food_consumption, resolve_player_consumption};
use self::food_system::replenish_food;

#[derive(Clone, Debug)]
pub struct TickEngineOptions {
    pub food_target: usize,
    pub max_name_length: usize,
}

impl From<&WorldConfig> for TickEngineOptions {
    fn from(config: &WorldConfig) -> Self {
        Self {
            food_target: config.food_target,
            max_name_length: config.max_name_length,
        }
    }
}

/// Commands mutate the world directly between ticks; callers must serialize
/// them with `tick`.
pub struct TickEngine {
    world: WorldState,
    options: TickEngineOptions,
    last_tick_at: Instant,
    tick_counter: u64,
}

impl TickEngine {
    pub fn new(world: WorldState, options: TickEngineOptions, started_at: Instant) -> Self {
        Self {
            world,
            options,
            last_tick_at: started_at,
            tick_counter: 0,
        }
    }

    pub fn from_config(config: &WorldConfig, started_at: Instant) -> Self {
        Self::new(WorldState::from_config(config), config.into(), started_at)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn options(&self) -> &TickEngineOptions {
        &self.options
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            tick: self.tick_counter,
            player_count: self.world.player_count(),
            alive_players: self.world.alive_count(),
            food_count: self.world.food_count(),
        }
    }

    pub fn admit_player(&mut self, sink: Arc<dyn OutboundSink>) -> PlayerId {
        let id = self.world.allocate_player_id();
        let pos = self.world.random_position();
        self.world.insert_player(Player::new(id, pos, sink));
        if let Some(player) = self.world.player(id) {
            player.send(&build_init(&self.world, id));
        }
        id
    }

    pub fn spawn_player(&mut self, id: PlayerId, name: &str) -> bool {
        if self.world.player(id).is_none() {
            return false;
        }
        let pos = self.world.random_position();
        let max_name_length = self.options.max_name_length;
        let Some(player) = self.world.player_mut(id) else {
            return false;
        };
        player.spawn(name, pos, max_name_length);
        true
    }

    pub fn set_direction(&mut self, id: PlayerId, dir: Vec2) -> bool {
        let Some(player) = self.world.player_mut(id) else {
            return false;
        };
        player.set_direction(dir);
        true
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.world.remove_player(id)
    }

    pub fn tick(&mut self, now: Instant) -> TickReport {
        let delta_seconds = now
            .saturating_duration_since(self.last_tick_at)
            .as_secs_f64();
        self.last_tick_at = now;
        self.step(delta_seconds)
    }

    pub fn step(&mut self, delta_seconds: f64) -> TickReport {
        self.tick_counter += 1;

        let added_food = replenish_food(&mut self.world, self.options.food_target);
        let mut delta = FoodDelta::from_added(&self.world, &added_food);

        let bounds = *self.world.bounds();
        for player in self.world.players_mut() {
            if !player.is_alive() {
                continue;
            }
            player.advance(delta_seconds);
            player.clamp_to_bounds(&bounds);
        }

        let removed_food = resolve_food_consumption(&mut self.world);
        delta.removed = removed_food.clone();

        let eliminations = resolve_player_consumption(&mut self.world);

        let refused = broadcast_update(&self.world, delta);
        trace!(
            tick = self.tick_counter,
            delta_seconds,
            added = added_food.len(),
            removed = removed_food.len(),
            eliminated = eliminations.len(),
            refused,
            "tick"
        );

        TickReport {
            tick: self.tick_counter,
            delta_seconds,
            added_food,
            removed_food,
            eliminations,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::constants::{MAX_RADIUS, MIN_RADIUS, SHRINK_RADIUS, SHRINK_RATE};
    use crate::protocol::ServerMessage;
    use crate::sink::RecordingSink;
    use crate::types::FoodId;
    use crate::world::Food;

    fn make_engine(food_target: usize) -> TickEngine {
        let config = WorldConfig {
            food_target,
            seed: 1234,
            ..WorldConfig::default()
        };
        TickEngine::from_config(&config, Instant::now())
    }

    fn admit_spawned(engine: &mut TickEngine, name: &str) -> (PlayerId, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let id = engine.admit_player(sink.clone());
        assert!(engine.spawn_player(id, name));
        (id, sink)
    }

    fn place(engine: &mut TickEngine, id: PlayerId, pos: Vec2, r: f64) {
        let player = engine.world_mut().player_mut(id).expect("player exists");
        player.pos = pos;
        player.r = r;
        player.grow_to_r = r;
    }

    #[test]
    fn admission_sends_init_and_keeps_player_unspawned() {
        let mut engine = make_engine(200);
        engine.step(0.0);
        let sink = Arc::new(RecordingSink::new());
        let id = engine.admit_player(sink.clone());

        let player = engine.world().player(id).expect("player inserted");
        assert!(!player.is_alive());
        assert!(engine.world().bounds().contains_circle(player.pos, 0.0));
        match sink.last() {
            Some(ServerMessage::Init { state }) => {
                assert_eq!(state.player_id, id);
                assert_eq!(state.food_particles.len(), 200);
                assert!(state.players.contains_key(&id));
            }
            other => panic!("expected init, got {other:?}"),
        }
    }

    #[test]
    fn first_tick_fills_food_to_target() {
        let mut engine = make_engine(200);
        let report = engine.step(1.0 / 60.0);
        assert_eq!(report.tick, 1);
        assert_eq!(report.added_food.len(), 200);
        assert_eq!(engine.world().food_count(), 200);
    }

    #[test]
    fn steady_state_tick_adds_no_food() {
        let mut engine = make_engine(200);
        engine.step(1.0 / 60.0);
        let ids_before: Vec<FoodId> = engine.world().food().map(|f| f.id).collect();
        let report = engine.step(1.0 / 60.0);
        assert!(report.added_food.is_empty());
        assert!(report.removed_food.is_empty());
        let ids_after: Vec<FoodId> = engine.world().food().map(|f| f.id).collect();
        assert_eq!(ids_before, ids_after);
        assert_eq!(engine.world().food_count(), 200);
    }

    #[test]
    fn eaten_food_is_restored_next_tick() {
        let mut engine = make_engine(20);
        let (id, sink) = admit_spawned(&mut engine, "eater");
        place(&mut engine, id, Vec2::new(1000.0, 600.0), MIN_RADIUS);

        // Exactly the target amount, one crumb under the player.
        let far: Vec<Vec2> = (0..19).map(|i| Vec2::new(10.0 + i as f64, 10.0)).collect();
        for pos in far.into_iter().chain([Vec2::new(1000.0, 600.0)]) {
            let food_id = engine.world_mut().allocate_food_id();
            engine.world_mut().insert_food(Food { id: food_id, pos });
        }
        let crumb = engine.world().food().map(|f| f.id).max().unwrap_or_default();
        assert_eq!(engine.world().food_count(), 20);

        let report = engine.step(0.0);
        assert!(report.added_food.is_empty());
        assert_eq!(report.removed_food, vec![crumb]);
        assert_eq!(engine.world().food_count(), 19);
        match sink.last() {
            Some(ServerMessage::Update { state }) => {
                assert_eq!(state.removed_food, vec![crumb]);
                assert!(state.added_food.is_empty());
            }
            other => panic!("expected update, got {other:?}"),
        }

        engine.remove_player(id);
        let report = engine.step(0.0);
        assert_eq!(report.added_food.len(), 1);
        assert!(report.added_food[0] > crumb);
        assert_eq!(engine.world().food_count(), 20);
    }

    #[test]
    fn tick_measures_elapsed_time() {
        let start = Instant::now();
        let config = WorldConfig {
            food_target: 0,
            ..WorldConfig::default()
        };
        let mut engine = TickEngine::from_config(&config, start);
        let (id, _) = admit_spawned(&mut engine, "mover");
        place(&mut engine, id, Vec2::new(1000.0, 600.0), MIN_RADIUS);
        engine.set_direction(id, Vec2::new(1.0, 0.0));

        let report = engine.tick(start + Duration::from_millis(250));
        assert!((report.delta_seconds - 0.25).abs() < 1e-9);
        let x = engine.world().player(id).map(|p| p.pos.x).unwrap_or_default();
        assert!((x - 1025.0).abs() < 1e-9);

        // A late tick is applied in one go.
        let report = engine.tick(start + Duration::from_millis(1250));
        assert!((report.delta_seconds - 1.0).abs() < 1e-9);
        let x = engine.world().player(id).map(|p| p.pos.x).unwrap_or_default();
        assert!((x - 1125.0).abs() < 1e-9);
    }

    #[test]
    fn movement_is_clamped_before_collisions() {
        let mut engine = make_engine(0);
        let (id, _) = admit_spawned(&mut engine, "runner");
        place(&mut engine, id, Vec2::new(1990.0, 10.0), MAX_RADIUS);
        engine.set_direction(id, Vec2::new(5.0, -5.0));
        for _ in 0..10 {
            engine.step(0.5);
            let player = engine.world().player(id).expect("still present");
            assert!(engine.world().bounds().contains_circle(player.pos, player.r));
        }
    }

    #[test]
    fn unspawned_players_do_not_move() {
        let mut engine = make_engine(0);
        let sink = Arc::new(RecordingSink::new());
        let id = engine.admit_player(sink.clone());
        let before = engine.world().player(id).map(|p| p.pos);
        engine.set_direction(id, Vec2::new(1.0, 1.0));
        engine.step(1.0);
        assert_eq!(engine.world().player(id).map(|p| p.pos), before);
        assert_eq!(sink.count_kind("update"), 1);
    }

    #[test]
    fn contained_player_is_eliminated_and_removed() {
        let mut engine = make_engine(0);
        let (a, a_sink) = admit_spawned(&mut engine, "big");
        let (b, b_sink) = admit_spawned(&mut engine, "small");
        place(&mut engine, a, Vec2::new(600.0, 600.0), 500.0);
        place(&mut engine, b, Vec2::new(700.0, 600.0), 50.0);

        let report = engine.step(0.0);
        assert_eq!(report.eliminations.len(), 1);
        assert_eq!(report.eliminations[0].victim_id, b);
        assert_eq!(report.eliminations[0].eater_id, a);
        assert!(engine.world().player(b).is_none());
        assert_eq!(b_sink.count_kind("dead"), 1);
        assert_eq!(b_sink.count_kind("update"), 0);

        match a_sink.last() {
            Some(ServerMessage::Update { state }) => {
                assert!(!state.players.contains_key(&b));
                assert!(state.players.contains_key(&a));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn shrinking_runs_through_the_tick() {
        let mut engine = make_engine(0);
        let (id, _) = admit_spawned(&mut engine, "whale");
        place(&mut engine, id, Vec2::new(1000.0, 600.0), SHRINK_RADIUS + 6.0);
        engine.step(1.0);
        let r = engine.world().player(id).map(|p| p.r).unwrap_or_default();
        assert!((r - (SHRINK_RADIUS + 6.0 - SHRINK_RATE)).abs() < 1e-9);
        engine.step(5.0);
        let r = engine.world().player(id).map(|p| p.r).unwrap_or_default();
        assert!((r - SHRINK_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn commands_for_unknown_players_are_ignored() {
        let mut engine = make_engine(0);
        assert!(!engine.spawn_player(42, "ghost"));
        assert!(!engine.set_direction(42, Vec2::new(1.0, 0.0)));
        assert!(engine.remove_player(42).is_none());
    }

    #[test]
    fn stats_track_counts() {
        let mut engine = make_engine(10);
        admit_spawned(&mut engine, "a");
        let sink = Arc::new(RecordingSink::new());
        engine.admit_player(sink);
        engine.step(0.0);
        let stats = engine.stats();
        assert_eq!(stats.tick, 1);
        assert_eq!(stats.player_count, 2);
        assert_eq!(stats.alive_players, 1);
        assert!(stats.food_count <= 10);
    }
}
