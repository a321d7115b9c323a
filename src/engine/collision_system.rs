use std::collections::{BTreeMap, BTreeSet};

use crate::constants::FOOD_RADIUS;
use crate::protocol::ServerMessage;
use crate::types::{Elimination, FoodId, PlayerId};
use crate::world::WorldState;

use super::utils::{circle_contains_circle, circle_contains_point};

// Eaten food leaves the world at once so later players cannot eat it again.
pub fn resolve_food_consumption(world: &mut WorldState) -> Vec<FoodId> {
    let mut removed = Vec::new();
    for player_id in world.player_ids() {
        let Some(player) = world.player(player_id) else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }
        let (center, radius) = (player.pos, player.r);
        let eaten: Vec<FoodId> = world
            .food()
            .filter(|food| circle_contains_point(center, radius, food.pos))
            .map(|food| food.id)
            .collect();
        if eaten.is_empty() {
            continue;
        }

        for food_id in &eaten {
            world.remove_food(*food_id);
        }
        if let Some(player) = world.player_mut(player_id) {
            for _ in &eaten {
                player.grow(FOOD_RADIUS);
            }
        }
        removed.extend(eaten);
    }
    removed
}

/// First phase: decide who eats whom from the radii at the start of the
/// pass. Returns victim id -> eater id.
///
/// A player already taken as a victim can no longer eat, and a player
/// already credited with a victim can no longer be eaten, so no id ends up
/// on both sides.
pub fn assign_victims(world: &WorldState) -> BTreeMap<PlayerId, PlayerId> {
    let alive: Vec<_> = world
        .players()
        .filter(|player| player.is_alive())
        .map(|player| (player.id, player.pos, player.r))
        .collect();

    let mut victims: BTreeMap<PlayerId, PlayerId> = BTreeMap::new();
    let mut eaters: BTreeSet<PlayerId> = BTreeSet::new();
    for &(eater_id, eater_pos, eater_r) in &alive {
        if victims.contains_key(&eater_id) {
            continue;
        }
        for &(victim_id, victim_pos, victim_r) in &alive {
            if victim_id == eater_id
                || victims.contains_key(&victim_id)
                || eaters.contains(&victim_id)
            {
                continue;
            }
            if circle_contains_circle(eater_pos, eater_r, victim_pos, victim_r) {
                victims.insert(victim_id, eater_id);
                eaters.insert(eater_id);
            }
        }
    }
    victims
}

pub fn apply_eliminations(
    world: &mut WorldState,
    victims: &BTreeMap<PlayerId, PlayerId>,
) -> Vec<Elimination> {
    let mut eliminations = Vec::with_capacity(victims.len());
    for (&victim_id, &eater_id) in victims {
        let Some(victim_radius) = world.player(victim_id).map(|victim| victim.r) else {
            continue;
        };
        if let Some(eater) = world.player_mut(eater_id) {
            eater.grow(victim_radius);
        }
        if let Some(victim) = world.remove_player(victim_id) {
            victim.send(&ServerMessage::Dead);
        }
        eliminations.push(Elimination {
            victim_id,
            eater_id,
            victim_radius,
        });
    }
    eliminations
}

pub fn resolve_player_consumption(world: &mut WorldState) -> Vec<Elimination> {
    let victims = assign_victims(world);
    if victims.is_empty() {
        return Vec::new();
    }
    apply_eliminations(world, &victims)
}
