use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WorldConfig;
use crate::player::Player;
use crate::types::{Bounds, FoodId, FoodView, PlayerId, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Food {
    pub id: FoodId,
    pub pos: Vec2,
}

impl Food {
    pub fn view(&self) -> FoodView {
        FoodView {
            x: self.pos.x,
            y: self.pos.y,
        }
    }
}

// Ordered maps give every pass a stable visiting order; the collision
// tie-break relies on it.
pub struct WorldState {
    bounds: Bounds,
    players: BTreeMap<PlayerId, Player>,
    food: BTreeMap<FoodId, Food>,
    next_player_id: PlayerId,
    next_food_id: FoodId,
    rng: StdRng,
}

impl WorldState {
    pub fn new(bounds: Bounds, seed: u64) -> Self {
        Self {
            bounds,
            players: BTreeMap::new(),
            food: BTreeMap::new(),
            next_player_id: 1,
            next_food_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.bounds, config.seed)
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn allocate_player_id(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    pub fn allocate_food_id(&mut self) -> FoodId {
        let id = self.next_food_id;
        self.next_food_id += 1;
        id
    }

    pub fn insert_player(&mut self, player: Player) -> bool {
        if self.players.contains_key(&player.id) {
            return false;
        }
        self.players.insert(player.id, player);
        true
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.is_alive()).count()
    }

    pub fn insert_food(&mut self, food: Food) -> bool {
        if self.food.contains_key(&food.id) {
            return false;
        }
        self.food.insert(food.id, food);
        true
    }

    pub fn remove_food(&mut self, id: FoodId) -> Option<Food> {
        self.food.remove(&id)
    }

    pub fn food(&self) -> impl Iterator<Item = &Food> {
        self.food.values()
    }

    pub fn food_by_id(&self, id: FoodId) -> Option<&Food> {
        self.food.get(&id)
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    pub fn random_position(&mut self) -> Vec2 {
        Vec2 {
            x: self.bounds.x + self.rng.random::<f64>() * self.bounds.width,
            y: self.bounds.y + self.rng.random::<f64>() * self.bounds.height,
        }
    }
}
