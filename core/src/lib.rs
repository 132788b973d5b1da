#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pirate Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and systems. Adapters submit [`Command`] values on
//! behalf of the remote player, the world executes them via its `apply` entry
//! point and reports the outcome as an ordered batch of [`Event`] values.
//! Systems observe read-only world views and respond exclusively with
//! [`Directive`] values that the world enacts on their behalf.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Score reported by a game-end event when the player lost.
pub const LOST_SCORE: i32 = -1;

/// Location of a single maze tile expressed as column (`x`) and row (`y`).
///
/// Coordinates are signed so that offsets past the grid edge remain
/// representable; the world rejects them when resolving tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring coordinate reached by travelling one step.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::North => Self::new(self.x, self.y - 1),
            Direction::East => Self::new(self.x + 1, self.y),
            Direction::South => Self::new(self.x, self.y + 1),
            Direction::West => Self::new(self.x - 1, self.y),
            Direction::Here => self,
        }
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Directions understood by movement and firing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Travel toward decreasing row indices.
    North,
    /// Travel toward increasing column indices.
    East,
    /// Travel toward increasing row indices.
    South,
    /// Travel toward decreasing column indices.
    West,
    /// Remain on the current tile.
    Here,
}

impl Direction {
    /// Cardinal directions in the canonical evaluation order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing back toward the origin of a step.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Here => Direction::Here,
        }
    }
}

/// Ship variants a player may register with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    /// Large vessel that carries treasure, gold and a penalised cannon.
    #[default]
    Barque,
    /// Small vessel with a single hit point and no cargo.
    Cutter,
}

/// Static role a tile plays within the maze.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Ordinary open water.
    #[default]
    Normal,
    /// Safe port enabling trade and repairs; hostiles never enter it.
    Harbor,
    /// Tile from which the player may leave the maze.
    Exit,
}

/// Transient hazard laid over a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldEffect {
    /// No hazard is active.
    #[default]
    None,
    /// Imposes an action penalty on the ship that enters the tile.
    Storm,
    /// Hurls the ship toward a random neighbouring tile.
    Swirl,
}

/// Boundary openings of a tile toward its four neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connections {
    north: bool,
    east: bool,
    south: bool,
    west: bool,
}

impl Connections {
    /// Creates a connection set from explicit flags.
    #[must_use]
    pub const fn new(north: bool, east: bool, south: bool, west: bool) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    /// Reports whether the tile opens toward the provided direction.
    ///
    /// [`Direction::Here`] is always open.
    #[must_use]
    pub const fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
            Direction::Here => true,
        }
    }

    /// Iterates the open cardinal directions in canonical order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::CARDINAL
            .into_iter()
            .filter(move |direction| self.allows(*direction))
    }
}

/// Immutable copy of a tile's observable state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileSnapshot {
    /// Openings toward the neighbouring tiles.
    pub connections: Connections,
    /// Static role of the tile.
    pub field_type: FieldType,
    /// Hazard currently active on the tile.
    pub effect: FieldEffect,
    /// Whether a living pirate occupies the tile.
    pub pirate: bool,
    /// Value of the treasure resting on the tile, if any.
    pub treasure: Option<u32>,
}

/// Unique identifier assigned to a pirate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PirateId(u32);

impl PirateId {
    /// Creates a new pirate identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands a connected player may issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Joins the game with a freshly built ship.
    Register {
        /// Display name chosen by the player.
        name: String,
        /// Ship variant to construct.
        actor: ActorType,
    },
    /// Moves the ship one tile.
    Move {
        /// Direction of travel.
        direction: Direction,
    },
    /// Forfeits all remaining actions of the current cycle.
    EndTurn,
    /// Restores the ship to full health in exchange for gold.
    Repair,
    /// Fires the loaded cannon toward a neighbouring tile.
    Fire {
        /// Direction of the shot.
        direction: Direction,
    },
    /// Picks up the treasure resting on the current tile.
    PickUp,
    /// Sells the held treasure at a harbor.
    Sell,
    /// Drops the treasure stored in a specific cargo slot.
    Drop {
        /// Zero-based cargo slot index.
        slot: i32,
    },
    /// Loads the cannon from the ammunition store.
    Reload,
    /// Buys ammunition at a harbor.
    Restock {
        /// Requested number of rounds.
        amount: i32,
    },
    /// Attempts to leave the maze through the exit.
    Leave,
}

impl Command {
    /// Fieldless discriminant of the command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Command::Register { .. } => CommandKind::Register,
            Command::Move { .. } => CommandKind::Move,
            Command::EndTurn => CommandKind::EndTurn,
            Command::Repair => CommandKind::Repair,
            Command::Fire { .. } => CommandKind::Fire,
            Command::PickUp => CommandKind::PickUp,
            Command::Sell => CommandKind::Sell,
            Command::Drop { .. } => CommandKind::Drop,
            Command::Reload => CommandKind::Reload,
            Command::Restock { .. } => CommandKind::Restock,
            Command::Leave => CommandKind::Leave,
        }
    }

    /// Reports whether the command may only run after registration.
    #[must_use]
    pub const fn requires_game_started(&self) -> bool {
        !matches!(self, Command::Register { .. })
    }
}

/// Discriminant of [`Command`] used when reporting failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// See [`Command::Register`].
    Register,
    /// See [`Command::Move`].
    Move,
    /// See [`Command::EndTurn`].
    EndTurn,
    /// See [`Command::Repair`].
    Repair,
    /// See [`Command::Fire`].
    Fire,
    /// See [`Command::PickUp`].
    PickUp,
    /// See [`Command::Sell`].
    Sell,
    /// See [`Command::Drop`].
    Drop,
    /// See [`Command::Reload`].
    Reload,
    /// See [`Command::Restock`].
    Restock,
    /// See [`Command::Leave`].
    Leave,
}

impl CommandKind {
    /// Name reported to clients when a command of this kind fails.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CommandKind::Register => "RegisterCommand",
            CommandKind::Move => "MoveCommand",
            CommandKind::EndTurn => "EndTurnCommand",
            CommandKind::Repair => "RepairCommand",
            CommandKind::Fire => "FireCommand",
            CommandKind::PickUp => "PickUpCommand",
            CommandKind::Sell => "SellCommand",
            CommandKind::Drop => "DropCommand",
            CommandKind::Reload => "ReloadCommand",
            CommandKind::Restock => "RestockCommand",
            CommandKind::Leave => "LeaveCommand",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Notifications emitted by the world and the scheduler, in delivery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Rejects a session whose first command was not a registration.
    RegistrationAborted,
    /// Confirms registration and announces the starting conditions.
    GameStarted {
        /// Tile the ship starts on.
        start: Coordinate,
        /// Cycle budget at the time of registration.
        max_cycles: u32,
        /// Number of treasures placed in the maze.
        treasures: u32,
        /// Number of pirates roaming the maze.
        pirates: u32,
        /// Number of harbor tiles.
        harbors: u32,
    },
    /// Confirms that the ship moved to a new tile.
    Moved {
        /// Tile the ship now occupies.
        position: Coordinate,
    },
    /// Describes the current state of a single tile.
    MapUpdate {
        /// Location of the tile.
        position: Coordinate,
        /// Observable tile state.
        tile: TileSnapshot,
    },
    /// Requests the next command and reports the remaining action budget.
    ActNow {
        /// Actions left in the current cycle.
        actions_left: i32,
    },
    /// Concludes the game.
    GameEnd {
        /// Final score, or [`LOST_SCORE`] on a loss.
        score: i32,
    },
    /// Announces the start of a new cycle.
    NextCycle {
        /// Cycles left including the one starting now.
        cycles_left: u32,
    },
    /// Reports damage taken by the ship.
    Damaged {
        /// Hit points lost.
        amount: u32,
    },
    /// Reports that a pirate plundered the ship's cargo.
    Robbed,
    /// Confirms a repair.
    Repaired {
        /// Gold spent on the repair.
        cost: u32,
    },
    /// Confirms that a treasure was stowed.
    PickedUp {
        /// Value of the treasure.
        value: u32,
    },
    /// Confirms that a cannon shot struck a pirate.
    Hit,
    /// Confirms a sale.
    Sold {
        /// Gold held after the sale.
        gold: u32,
    },
    /// Confirms that a treasure left the cargo hold.
    Dropped {
        /// Value of the treasure.
        value: u32,
    },
    /// Confirms that the cannon is loaded.
    Reloaded,
    /// Confirms an ammunition purchase.
    Restocked {
        /// Rounds actually added to the store.
        amount: u32,
    },
    /// Reports that a swirl hurled the ship to a new tile.
    SwirlEffect {
        /// Tile the ship landed on.
        position: Coordinate,
    },
    /// Reports that the ship sailed into a storm.
    StormEffect,
    /// Rejects a command without aborting the game.
    CommandFailed {
        /// Kind of command that failed.
        command: CommandKind,
    },
}

impl Event {
    /// Reports whether delivering the event ends the session.
    #[must_use]
    pub const fn should_terminate(&self) -> bool {
        matches!(self, Event::GameEnd { .. } | Event::RegistrationAborted)
    }
}

/// Mutations requested by systems and enacted by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Moves a pirate one tile in the given direction.
    MovePirate {
        /// Pirate to relocate.
        pirate: PirateId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Lays a hazard over a tile.
    PlaceEffect {
        /// Tile receiving the hazard.
        position: Coordinate,
        /// Hazard to place.
        effect: FieldEffect,
    },
}
