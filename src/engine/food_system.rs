use crate::types::FoodId;
use crate::world::{Food, WorldState};

use super::utils::floor_position;

pub fn replenish_food(world: &mut WorldState, target: usize) -> Vec<FoodId> {
    let mut added = Vec::new();
    while world.food_count() < target {
        let pos = floor_position(world.random_position());
        let id = world.allocate_food_id();
        if world.insert_food(Food { id, pos }) {
            added.push(id);
        }
    }
    added
}
