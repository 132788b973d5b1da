#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pirate Maze.
//!
//! The world owns the maze, the player's ship and the pirate roster. Player
//! commands enter through [`apply`], system directives through [`enact`];
//! both report their consequences as ordered [`Event`] batches. Everything
//! else reads the world through the [`query`] module.

mod actions;
mod grid;
mod pirate;
mod ship;
mod storage;

use pirate_maze_core::{
    ActorType, Command, Coordinate, Direction, Directive, Event, FieldType, PirateId, LOST_SCORE,
};
use rand::Rng;

pub use grid::Tile;

use grid::Grid;
use pirate::Pirate;
use ship::Ship;

/// Treasure held at the end of the game is worth this many points per piece.
const TREASURE_SCORE: i64 = 9;
/// Every remaining cycle is worth a tenth of a point.
const CYCLE_SCORE_DIVISOR: i64 = 10;

/// Validated maze description handed to the world at startup.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Tiles in row-major order.
    pub tiles: Vec<Tile>,
    /// Harbor tile the ship starts on.
    pub start: Coordinate,
    /// Tile through which the ship may leave the maze.
    pub exit: Coordinate,
    /// Starting positions of the pirates, in roster order.
    pub pirates: Vec<Coordinate>,
}

/// Represents the authoritative Pirate Maze world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    start: Coordinate,
    exit: Coordinate,
    ship: Option<Ship>,
    pirates: Vec<Pirate>,
    cycle: u32,
    max_cycles: u32,
    started: bool,
    treasures: u32,
    harbors: u32,
}

impl World {
    /// Creates a world awaiting registration from a validated layout.
    ///
    /// The cycle budget is twice the number of tiles.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        let Layout {
            width,
            height,
            tiles,
            start,
            exit,
            pirates,
        } = layout;

        let mut grid = Grid::new(width, height, tiles);
        let pirates: Vec<Pirate> = pirates
            .into_iter()
            .zip(0u32..)
            .map(|(position, id)| Pirate::new(PirateId::new(id), position))
            .collect();
        for pirate in &pirates {
            if let Some(tile) = grid.tile_mut(pirate.position()) {
                tile.set_pirate(true);
            }
        }

        let treasures = count_u32(grid.tiles().filter(|tile| tile.treasure().is_some()));
        let harbors = count_u32(
            grid.tiles()
                .filter(|tile| tile.field_type() == FieldType::Harbor),
        );

        Self {
            grid,
            start,
            exit,
            ship: None,
            pirates,
            cycle: 0,
            max_cycles: width.saturating_mul(height).saturating_mul(2),
            started: false,
            treasures,
            harbors,
        }
    }

    fn is_game_over(&self) -> bool {
        self.max_cycles < self.cycle || self.ship.as_ref().is_some_and(Ship::is_sunk)
    }

    fn score(&self) -> i32 {
        let Some(ship) = self.ship.as_ref() else {
            return LOST_SCORE;
        };
        let cycles_left = i64::from(self.max_cycles) - i64::from(self.cycle);
        let cycle_score = cycles_left.div_euclid(CYCLE_SCORE_DIVISOR);
        let score = match ship.actor() {
            ActorType::Barque => {
                let held = ship.cargo().map_or(0, |cargo| cargo.len());
                i64::from(ship.gold().unwrap_or_default())
                    + cycle_score
                    + i64::try_from(held).unwrap_or_default() * TREASURE_SCORE
            }
            ActorType::Cutter => cycle_score,
        };
        i32::try_from(score).unwrap_or(i32::MAX)
    }

    fn visible_coordinates(&self) -> Vec<Coordinate> {
        self.ship
            .as_ref()
            .map(|ship| self.grid.visible_from(ship.position()))
            .unwrap_or_default()
    }
}

fn count_u32<I: Iterator>(items: I) -> u32 {
    u32::try_from(items.count()).unwrap_or(u32::MAX)
}

/// Applies a player command to the world and reports its action cost.
///
/// `actions_left` is the remaining budget of the current cycle; ending the
/// turn consumes all of it. Commands that require a started game are
/// answered with [`Event::RegistrationAborted`] before registration. Once the
/// game is over, commands change nothing and cost nothing.
pub fn apply<R: Rng>(
    world: &mut World,
    command: Command,
    rng: &mut R,
    actions_left: i32,
    out_events: &mut Vec<Event>,
) -> i32 {
    if command.requires_game_started() && !world.started {
        log::debug!("rejecting {} before registration", command.kind());
        out_events.push(Event::RegistrationAborted);
        return 0;
    }
    if world.is_game_over() {
        log::debug!("ignoring {} after the game ended", command.kind());
        return 0;
    }

    let first_new = out_events.len();
    let cost = match command {
        Command::Register { name, actor } => {
            actions::register(world, name, actor, out_events);
            1
        }
        Command::Move { direction } => {
            actions::move_ship(world, direction, rng, out_events);
            1
        }
        Command::EndTurn => actions_left,
        Command::Repair => {
            actions::repair(world, out_events);
            1
        }
        Command::Fire { direction } => {
            actions::fire(world, direction, out_events);
            1
        }
        Command::PickUp => {
            actions::pick_up(world, out_events);
            1
        }
        Command::Sell => {
            actions::sell(world, out_events);
            1
        }
        Command::Drop { slot } => {
            actions::drop_treasure(world, slot, out_events);
            1
        }
        Command::Reload => {
            actions::reload(world, out_events);
            1
        }
        Command::Restock { amount } => {
            actions::restock(world, amount, out_events);
            1
        }
        Command::Leave => {
            actions::leave(world, out_events);
            1
        }
    };

    let concluded = out_events[first_new..]
        .iter()
        .any(|event| matches!(event, Event::GameEnd { .. }));
    if !concluded {
        actions::plunder_if_boarded(world, out_events);
    }
    cost
}

/// Executes a directive issued by a system.
pub fn enact(world: &mut World, directive: Directive, out_events: &mut Vec<Event>) {
    match directive {
        Directive::MovePirate { pirate, direction } => {
            move_pirate(world, pirate, direction, out_events);
        }
        Directive::PlaceEffect { position, effect } => {
            if let Some(tile) = world.grid.tile_mut(position) {
                log::debug!("{effect:?} forms at {position}");
                tile.set_effect(effect);
            }
        }
    }
}

fn move_pirate(
    world: &mut World,
    id: PirateId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    let visible = world.visible_coordinates();
    let World {
        grid, ship, pirates, ..
    } = &mut *world;

    let Some(pirate) = pirates
        .iter_mut()
        .find(|pirate| pirate.id() == id && !pirate.is_dead())
    else {
        return;
    };
    let from = pirate.position();
    let to = from.step(direction);
    if !grid.contains(to) {
        return;
    }

    if let Some(tile) = grid.tile_mut(from) {
        tile.set_pirate(false);
    }
    if visible.contains(&from) {
        grid.push_update(from, out_events);
    }

    pirate.relocate(to);
    if let Some(tile) = grid.tile_mut(to) {
        tile.set_pirate(true);
    }
    if visible.contains(&to) {
        grid.push_update(to, out_events);
    }

    let boarded = match ship.as_mut() {
        Some(ship) if ship.position() == to => {
            log::debug!("pirate {} boarded the ship at {to}", id.get());
            actions::plunder(ship, out_events);
            true
        }
        _ => false,
    };
    if boarded && world.is_game_over() {
        out_events.push(Event::GameEnd { score: LOST_SCORE });
    }
}

/// Deducts the outstanding storm penalty from `available` actions.
///
/// Any shortfall becomes the new penalty, carried into later budgets.
pub fn draw_action_budget(world: &mut World, available: i32) -> i32 {
    let Some(ship) = world.ship.as_mut() else {
        return available;
    };
    let penalty = i32::try_from(ship.storm_penalty()).unwrap_or(i32::MAX);
    let budget = available.saturating_sub(penalty);
    ship.set_storm_penalty(budget.min(0).unsigned_abs());
    budget
}

/// Advances the elapsed-cycle counter by one.
pub fn advance_cycle(world: &mut World) {
    world.cycle = world.cycle.saturating_add(1);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use pirate_maze_core::{ActorType, Coordinate, PirateId, TileSnapshot};

    use super::{grid::Grid, World};

    /// Width and height of the maze in tiles.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.width(), world.grid.height())
    }

    /// Harbor tile the ship starts on.
    #[must_use]
    pub fn start(world: &World) -> Coordinate {
        world.start
    }

    /// Tile through which the ship may leave.
    #[must_use]
    pub fn exit(world: &World) -> Coordinate {
        world.exit
    }

    /// Whether a player has registered.
    #[must_use]
    pub fn is_started(world: &World) -> bool {
        world.started
    }

    /// Elapsed-cycle counter.
    #[must_use]
    pub fn cycle(world: &World) -> u32 {
        world.cycle
    }

    /// Total cycle budget, reduced by failed attempts to leave.
    #[must_use]
    pub fn max_cycles(world: &World) -> u32 {
        world.max_cycles
    }

    /// Whether the budget is exhausted or the ship has sunk.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.is_game_over()
    }

    /// Score the player would receive by leaving now.
    #[must_use]
    pub fn score(world: &World) -> i32 {
        world.score()
    }

    /// Snapshot of the tile at `position`, if it lies inside the maze.
    #[must_use]
    pub fn tile(world: &World, position: Coordinate) -> Option<TileSnapshot> {
        world.grid.tile(position).map(super::Tile::snapshot)
    }

    /// Read-only view over every tile of the maze.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        TileView { grid: &world.grid }
    }

    /// Tiles currently visible to the ship, in reading order.
    #[must_use]
    pub fn visible_coordinates(world: &World) -> Vec<Coordinate> {
        world.visible_coordinates()
    }

    /// Captures the ship's state, if a player has registered.
    #[must_use]
    pub fn ship(world: &World) -> Option<ShipSnapshot> {
        world.ship.as_ref().map(|ship| ShipSnapshot {
            name: ship.name().to_owned(),
            actor: ship.actor(),
            position: ship.position(),
            health: ship.health(),
            max_health: ship.max_health(),
            gold: ship.gold(),
            loaded: ship.is_loaded(),
            storm_penalty: ship.storm_penalty(),
            ammunition: ship.ammunition().rounds(),
            cargo: ship.cargo().map(|cargo| cargo.slots().to_vec()),
        })
    }

    /// Captures a read-only view of the pirate roster.
    #[must_use]
    pub fn pirate_view(world: &World) -> PirateView {
        let snapshots = world
            .pirates
            .iter()
            .map(|pirate| PirateSnapshot {
                id: pirate.id(),
                position: pirate.position(),
                alive: !pirate.is_dead(),
            })
            .collect();
        PirateView { snapshots }
    }

    /// Read-only view over the maze tiles.
    #[derive(Clone, Copy, Debug)]
    pub struct TileView<'a> {
        grid: &'a Grid,
    }

    impl TileView<'_> {
        /// Snapshot of the tile at `position`.
        #[must_use]
        pub fn tile(&self, position: Coordinate) -> Option<TileSnapshot> {
            self.grid.tile(position).map(super::Tile::snapshot)
        }

        /// Width and height of the maze in tiles.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            (self.grid.width(), self.grid.height())
        }
    }

    /// Read-only snapshot of all pirates in roster order.
    #[derive(Clone, Debug)]
    pub struct PirateView {
        snapshots: Vec<PirateSnapshot>,
    }

    impl PirateView {
        /// Iterator over the captured snapshots in roster order.
        pub fn iter(&self) -> impl Iterator<Item = &PirateSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<PirateSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single pirate.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PirateSnapshot {
        /// Identifier assigned in roster order.
        pub id: PirateId,
        /// Tile the pirate stands on.
        pub position: Coordinate,
        /// Whether the pirate still has life left.
        pub alive: bool,
    }

    /// Immutable representation of the player's ship.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ShipSnapshot {
        /// Name chosen at registration.
        pub name: String,
        /// Ship variant.
        pub actor: ActorType,
        /// Tile the ship occupies.
        pub position: Coordinate,
        /// Current hit points.
        pub health: u32,
        /// Hit points restored by a repair.
        pub max_health: u32,
        /// Gold held, absent for cutters.
        pub gold: Option<u32>,
        /// Whether a round sits in the cannon.
        pub loaded: bool,
        /// Outstanding action penalty.
        pub storm_penalty: u32,
        /// Rounds left in the ammunition store.
        pub ammunition: u32,
        /// Cargo slots by index, absent for cutters.
        pub cargo: Option<Vec<Option<u32>>>,
    }
}
