//! JSON frames exchanged with the client, one per line.

use pirate_maze_core::{Command, Coordinate, Direction, Event, FieldEffect, FieldType, TileSnapshot};
use serde::{Deserialize, Serialize};

/// Command frame sent by the client.
#[derive(Debug, Deserialize)]
pub(crate) struct Inbound {
    pub(crate) client: i64,
    pub(crate) command: Command,
}

/// Event frame sent to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outbound {
    RegistrationAborted,
    GameStarted {
        start: Coordinate,
        max_cycles: u32,
        treasures: u32,
        pirates: u32,
        harbors: u32,
    },
    Moved {
        position: Coordinate,
    },
    MapUpdate(TileFrame),
    ActNow {
        actions_left: i32,
    },
    GameEnd {
        score: i32,
    },
    NextCycle {
        cycles_left: u32,
    },
    Damaged {
        amount: u32,
    },
    Robbed,
    Repaired {
        cost: u32,
    },
    PickedUp {
        value: u32,
    },
    Hit,
    Sold {
        gold: u32,
    },
    Dropped {
        value: u32,
    },
    Reloaded,
    Restocked {
        amount: u32,
    },
    SwirlEffect {
        position: Coordinate,
    },
    StormEffect,
    CommandFailed {
        command: &'static str,
    },
}

/// Flat description of a single tile; a treasure of 0 means none.
#[derive(Debug, Serialize)]
pub(crate) struct TileFrame {
    x: i32,
    y: i32,
    pirate: bool,
    treasure: u32,
    north: bool,
    east: bool,
    south: bool,
    west: bool,
    field_type: FieldType,
    field_effect: FieldEffect,
}

impl TileFrame {
    fn new(position: Coordinate, tile: &TileSnapshot) -> Self {
        let open = |direction| tile.connections.allows(direction);
        Self {
            x: position.x(),
            y: position.y(),
            pirate: tile.pirate,
            treasure: tile.treasure.unwrap_or(0),
            north: open(Direction::North),
            east: open(Direction::East),
            south: open(Direction::South),
            west: open(Direction::West),
            field_type: tile.field_type,
            field_effect: tile.effect,
        }
    }
}

impl From<&Event> for Outbound {
    fn from(event: &Event) -> Self {
        match *event {
            Event::RegistrationAborted => Self::RegistrationAborted,
            Event::GameStarted {
                start,
                max_cycles,
                treasures,
                pirates,
                harbors,
            } => Self::GameStarted {
                start,
                max_cycles,
                treasures,
                pirates,
                harbors,
            },
            Event::Moved { position } => Self::Moved { position },
            Event::MapUpdate { position, ref tile } => {
                Self::MapUpdate(TileFrame::new(position, tile))
            }
            Event::ActNow { actions_left } => Self::ActNow { actions_left },
            Event::GameEnd { score } => Self::GameEnd { score },
            Event::NextCycle { cycles_left } => Self::NextCycle { cycles_left },
            Event::Damaged { amount } => Self::Damaged { amount },
            Event::Robbed => Self::Robbed,
            Event::Repaired { cost } => Self::Repaired { cost },
            Event::PickedUp { value } => Self::PickedUp { value },
            Event::Hit => Self::Hit,
            Event::Sold { gold } => Self::Sold { gold },
            Event::Dropped { value } => Self::Dropped { value },
            Event::Reloaded => Self::Reloaded,
            Event::Restocked { amount } => Self::Restocked { amount },
            Event::SwirlEffect { position } => Self::SwirlEffect { position },
            Event::StormEffect => Self::StormEffect,
            Event::CommandFailed { command } => Self::CommandFailed {
                command: command.name(),
            },
        }
    }
}
