use std::collections::BTreeMap;

use crate::protocol::{InitState, ServerMessage, UpdateState};
use crate::types::{FoodId, FoodView, PlayerId, PlayerView};
use crate::world::WorldState;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoodDelta {
    pub added: BTreeMap<FoodId, FoodView>,
    pub removed: Vec<FoodId>,
}

impl FoodDelta {
    /// Resolves added ids against the world as it was right after
    /// replenishment, before anything was eaten.
    pub fn from_added(world: &WorldState, added: &[FoodId]) -> Self {
        let added = added
            .iter()
            .filter_map(|id| world.food_by_id(*id).map(|food| (*id, food.view())))
            .collect();
        Self {
            added,
            removed: Vec::new(),
        }
    }
}

pub fn project_players(world: &WorldState) -> BTreeMap<PlayerId, PlayerView> {
    world.players().map(|player| (player.id, player.view())).collect()
}

pub fn project_food(world: &WorldState) -> BTreeMap<FoodId, FoodView> {
    world.food().map(|food| (food.id, food.view())).collect()
}

pub fn build_init(world: &WorldState, player_id: PlayerId) -> ServerMessage {
    ServerMessage::Init {
        state: InitState {
            player_id,
            players: project_players(world),
            food_particles: project_food(world),
            world_bounds: *world.bounds(),
        },
    }
}

pub struct UpdateEncoder {
    template: UpdateState,
}

impl UpdateEncoder {
    pub fn new(world: &WorldState, delta: FoodDelta) -> Self {
        Self {
            template: UpdateState {
                player_id: 0,
                players: project_players(world),
                added_food: delta.added,
                removed_food: delta.removed,
                world_bounds: *world.bounds(),
            },
        }
    }

    pub fn for_player(&self, player_id: PlayerId) -> ServerMessage {
        let mut state = self.template.clone();
        state.player_id = player_id;
        ServerMessage::Update { state }
    }
}

pub fn broadcast_update(world: &WorldState, delta: FoodDelta) -> usize {
    let encoder = UpdateEncoder::new(world, delta);
    world
        .players()
        .filter(|player| !player.send(&encoder.for_player(player.id)))
        .count()
}
