//! Hostile crews roaming the maze.

use pirate_maze_core::{Coordinate, PirateId};

const PIRATE_LIFE: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pirate {
    id: PirateId,
    position: Coordinate,
    life: u32,
}

impl Pirate {
    pub(crate) const fn new(id: PirateId, position: Coordinate) -> Self {
        Self {
            id,
            position,
            life: PIRATE_LIFE,
        }
    }

    pub(crate) const fn id(&self) -> PirateId {
        self.id
    }

    pub(crate) const fn position(&self) -> Coordinate {
        self.position
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.life == 0
    }

    /// Removes one life point.
    pub(crate) fn wound(&mut self) {
        self.life = self.life.saturating_sub(1);
    }

    pub(crate) fn relocate(&mut self, position: Coordinate) {
        self.position = position;
    }
}
