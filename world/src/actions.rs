//! Handlers for the actions a player may take.
//!
//! Handlers never fail: illegal or unaffordable actions are reported through
//! [`Event::CommandFailed`], sometimes paired with a punishment.

use pirate_maze_core::{
    ActorType, CommandKind, Coordinate, Direction, Event, FieldEffect, FieldType, LOST_SCORE,
};
use rand::Rng;

use crate::{grid::Grid, grid::Tile, ship::Ship, World};

const INVALID_MOVE_DAMAGE: u32 = 2;
const SWIRL_DAMAGE: u32 = 1;
const STORM_PENALTY: u32 = 2;
const UNLOADED_FIRE_DAMAGE: u32 = 2;
const UNAFFORDABLE_REPAIR_DAMAGE: u32 = 1;
const PLUNDER_DAMAGE: u32 = 1;
const HARBOR_REPAIR_COST: u32 = 5;
const SEA_REPAIR_COST: u32 = 27;
const TREASURE_SALE_MULTIPLIER: u32 = 3;
const AMMUNITION_PRICE: u32 = 2;
const MAX_RESTOCK_AMOUNT: i32 = i32::MAX / 5;

fn fail(command: CommandKind, out_events: &mut Vec<Event>) {
    out_events.push(Event::CommandFailed { command });
}

fn push_loss_if_sunk(ship: &Ship, out_events: &mut Vec<Event>) {
    if ship.is_sunk() {
        out_events.push(Event::GameEnd { score: LOST_SCORE });
    }
}

/// Failure paired with damage, followed by the loss check.
fn punish(command: CommandKind, ship: &mut Ship, damage: u32, out_events: &mut Vec<Event>) {
    ship.take_damage(damage);
    fail(command, out_events);
    out_events.push(Event::Damaged { amount: damage });
    push_loss_if_sunk(ship, out_events);
}

/// A pirate boards the ship: the hold is emptied and the hull takes a hit.
pub(crate) fn plunder(ship: &mut Ship, out_events: &mut Vec<Event>) {
    out_events.push(Event::Robbed);
    ship.forfeit_cargo();
    out_events.push(Event::Damaged {
        amount: PLUNDER_DAMAGE,
    });
    ship.take_damage(PLUNDER_DAMAGE);
}

/// Runs after every admitted command unless it already ended the game.
pub(crate) fn plunder_if_boarded(world: &mut World, out_events: &mut Vec<Event>) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        return;
    };
    if grid.tile(ship.position()).is_some_and(Tile::has_pirate) {
        plunder(ship, out_events);
        push_loss_if_sunk(ship, out_events);
    }
}

pub(crate) fn register(
    world: &mut World,
    name: String,
    actor: ActorType,
    out_events: &mut Vec<Event>,
) {
    if world.started {
        fail(CommandKind::Register, out_events);
        return;
    }

    log::info!("registered {name:?} sailing a {actor:?}");
    world.ship = Some(Ship::new(name, actor, world.start));
    world.cycle = 1;
    world.started = true;

    out_events.push(Event::GameStarted {
        start: world.start,
        max_cycles: world.max_cycles,
        treasures: world.treasures,
        pirates: u32::try_from(world.pirates.len()).unwrap_or(u32::MAX),
        harbors: world.harbors,
    });
    world.grid.push_vision(world.start, out_events);
}

pub(crate) fn move_ship<R: Rng>(
    world: &mut World,
    direction: Direction,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::Move, out_events);
        return;
    };

    let open = grid
        .tile(ship.position())
        .is_some_and(|tile| tile.connections().allows(direction));
    if !open {
        punish(CommandKind::Move, ship, INVALID_MOVE_DAMAGE, out_events);
        return;
    }

    let destination = ship.position().step(direction);
    ship.set_position(destination);
    out_events.push(Event::Moved {
        position: destination,
    });
    grid.push_vision(destination, out_events);

    match grid.effect_at(destination) {
        Some(FieldEffect::Swirl) => resolve_swirl(grid, ship, rng, out_events),
        Some(FieldEffect::Storm) => resolve_storm(grid, ship, out_events),
        _ => {}
    }
}

/// Hurls the ship along random connections until it rests off any swirl.
fn resolve_swirl<R: Rng>(
    grid: &mut Grid,
    ship: &mut Ship,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) {
    while grid.effect_at(ship.position()) == Some(FieldEffect::Swirl) {
        let here = ship.position();
        let Some(tile) = grid.tile_mut(here) else {
            return;
        };
        tile.set_effect(FieldEffect::None);
        let exits: Vec<Coordinate> = tile
            .connections()
            .directions()
            .map(|direction| here.step(direction))
            .collect();
        if exits.is_empty() {
            return;
        }

        ship.take_damage(SWIRL_DAMAGE);
        let landing = exits[rng.gen_range(0..exits.len())];
        ship.set_position(landing);
        log::debug!("swirl carried the ship from {here} to {landing}");

        out_events.push(Event::SwirlEffect { position: landing });
        out_events.push(Event::Damaged {
            amount: SWIRL_DAMAGE,
        });
        grid.push_vision(landing, out_events);

        if ship.is_sunk() {
            out_events.push(Event::GameEnd { score: LOST_SCORE });
            return;
        }

        if grid.effect_at(landing) == Some(FieldEffect::Storm) {
            resolve_storm(grid, ship, out_events);
        }
    }
}

fn resolve_storm(grid: &mut Grid, ship: &mut Ship, out_events: &mut Vec<Event>) {
    let here = ship.position();
    if let Some(tile) = grid.tile_mut(here) {
        tile.set_effect(FieldEffect::None);
    }
    ship.set_storm_penalty(STORM_PENALTY);
    out_events.push(Event::StormEffect);
    grid.push_update(here, out_events);
}

pub(crate) fn fire(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
    let World {
        grid, ship, pirates, ..
    } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::Fire, out_events);
        return;
    };

    if !ship.is_loaded() {
        if ship.penalises_unloaded_fire() {
            punish(CommandKind::Fire, ship, UNLOADED_FIRE_DAMAGE, out_events);
        } else {
            fail(CommandKind::Fire, out_events);
        }
        return;
    }

    ship.set_loaded(false);
    let origin = ship.position();
    let in_line = grid
        .tile(origin)
        .is_some_and(|tile| tile.connections().allows(direction));
    let target = origin.step(direction);
    let occupied = grid.tile(target).is_some_and(Tile::has_pirate);

    let victim = if in_line && occupied {
        pirates
            .iter_mut()
            .find(|pirate| !pirate.is_dead() && pirate.position() == target)
    } else {
        None
    };
    let Some(victim) = victim else {
        fail(CommandKind::Fire, out_events);
        return;
    };

    victim.wound();
    out_events.push(Event::Hit);
    if victim.is_dead() {
        log::debug!("pirate {} sank at {target}", victim.id().get());
        if let Some(tile) = grid.tile_mut(target) {
            tile.set_pirate(false);
        }
        grid.push_update(target, out_events);
    }
}

pub(crate) fn reload(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(ship) = world.ship.as_mut() else {
        fail(CommandKind::Reload, out_events);
        return;
    };

    if !ship.ammunition_mut().take_round() {
        fail(CommandKind::Reload, out_events);
        return;
    }
    if ship.is_loaded() {
        // The round is spent regardless.
        fail(CommandKind::Reload, out_events);
        return;
    }
    ship.set_loaded(true);
    out_events.push(Event::Reloaded);
}

pub(crate) fn pick_up(world: &mut World, out_events: &mut Vec<Event>) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::PickUp, out_events);
        return;
    };
    let here = ship.position();

    let treasure = grid.tile(here).and_then(Tile::treasure);
    let stowed = match (ship.cargo_mut(), treasure) {
        (Some(cargo), Some(value)) => cargo.stow(value),
        _ => false,
    };
    let Some(value) = treasure.filter(|_| stowed) else {
        fail(CommandKind::PickUp, out_events);
        return;
    };

    if let Some(tile) = grid.tile_mut(here) {
        tile.clear_treasure();
    }
    out_events.push(Event::PickedUp { value });
    grid.push_update(here, out_events);
}

pub(crate) fn drop_treasure(world: &mut World, slot: i32, out_events: &mut Vec<Event>) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::Drop, out_events);
        return;
    };
    let here = ship.position();

    let Some(cargo) = ship.cargo_mut() else {
        fail(CommandKind::Drop, out_events);
        return;
    };
    let Some(value) = cargo.peek(slot) else {
        fail(CommandKind::Drop, out_events);
        return;
    };

    out_events.push(Event::Dropped { value });
    let placed = match grid.tile_mut(here) {
        Some(tile) if tile.treasure().is_none() => {
            tile.place_treasure(value);
            true
        }
        _ => false,
    };
    if placed {
        grid.push_update(here, out_events);
    }
    cargo.discard(slot);
}

pub(crate) fn sell(world: &mut World, out_events: &mut Vec<Event>) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::Sell, out_events);
        return;
    };

    if grid.field_type_at(ship.position()) != Some(FieldType::Harbor) {
        ship.forfeit_cargo();
        fail(CommandKind::Sell, out_events);
        return;
    }

    let Some(cargo) = ship.cargo_mut().filter(|cargo| !cargo.is_empty()) else {
        fail(CommandKind::Sell, out_events);
        return;
    };
    let proceeds = cargo
        .total_value()
        .saturating_mul(TREASURE_SALE_MULTIPLIER);
    cargo.clear();
    ship.earn_gold(proceeds);
    out_events.push(Event::Sold {
        gold: ship.gold().unwrap_or_default(),
    });
}

pub(crate) fn repair(world: &mut World, out_events: &mut Vec<Event>) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::Repair, out_events);
        return;
    };

    let cost = if grid.field_type_at(ship.position()) == Some(FieldType::Harbor) {
        HARBOR_REPAIR_COST
    } else {
        SEA_REPAIR_COST
    };
    if !ship.gold().is_some_and(|gold| gold >= cost) {
        punish(
            CommandKind::Repair,
            ship,
            UNAFFORDABLE_REPAIR_DAMAGE,
            out_events,
        );
        return;
    }

    ship.repair();
    ship.spend_gold(cost);
    out_events.push(Event::Repaired { cost });
}

pub(crate) fn restock(world: &mut World, amount: i32, out_events: &mut Vec<Event>) {
    let World { grid, ship, .. } = world;
    let Some(ship) = ship.as_mut() else {
        fail(CommandKind::Restock, out_events);
        return;
    };

    if grid.field_type_at(ship.position()) != Some(FieldType::Harbor) {
        fail(CommandKind::Restock, out_events);
        return;
    }
    if amount < 0 {
        ship.ammunition_mut().clear();
        fail(CommandKind::Restock, out_events);
        return;
    }
    if amount == 0 {
        out_events.push(Event::Restocked { amount: 0 });
        return;
    }
    if amount > MAX_RESTOCK_AMOUNT {
        ship.set_gold(0);
        fail(CommandKind::Restock, out_events);
        return;
    }

    let requested = amount.unsigned_abs();
    let price = requested.saturating_mul(AMMUNITION_PRICE);
    if !ship.gold().is_some_and(|gold| gold >= price) {
        ship.set_gold(0);
        fail(CommandKind::Restock, out_events);
        return;
    }

    ship.spend_gold(price);
    let loaded = ship.ammunition_mut().add(requested);
    out_events.push(Event::Restocked { amount: loaded });
}

pub(crate) fn leave(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(position) = world.ship.as_ref().map(Ship::position) else {
        fail(CommandKind::Leave, out_events);
        return;
    };

    if world.grid.field_type_at(position) == Some(FieldType::Exit) {
        let score = world.score();
        log::info!("ship left the maze with a score of {score}");
        out_events.push(Event::GameEnd { score });
        return;
    }

    let penalty = world.grid.width().min(world.grid.height());
    world.max_cycles = world.max_cycles.saturating_sub(penalty);
    fail(CommandKind::Leave, out_events);
    if world.max_cycles < world.cycle {
        out_events.push(Event::GameEnd { score: LOST_SCORE });
    }
}
