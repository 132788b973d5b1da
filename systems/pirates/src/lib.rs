#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hostile AI that steers the pirate roster at the end of every cycle.
//!
//! Each living pirate first looks for a legal step onto the player's ship and
//! boards it; failing that it wanders to a random free neighbour. Decisions
//! are taken in roster order and every decision observes the moves planned
//! before it, exactly as if the world had already enacted them.

use pirate_maze_core::{Coordinate, Direction, Directive, FieldEffect, FieldType, PirateId};
use pirate_maze_world::query::{PirateView, TileView};
use rand::Rng;

/// Pure system that plans one pirate phase at a time.
#[derive(Debug, Default)]
pub struct Pirates {
    occupancy: Occupancy,
}

impl Pirates {
    /// Plans the moves of every living pirate and emits them as directives.
    pub fn handle<R: Rng>(
        &mut self,
        pirates: &PirateView,
        tiles: TileView<'_>,
        ship: Coordinate,
        rng: &mut R,
        out: &mut Vec<Directive>,
    ) {
        self.occupancy.capture(tiles);

        for pirate in pirates.iter() {
            if !pirate.alive || pirate.position == ship {
                continue;
            }

            let legal = legal_directions(tiles, pirate.position);
            let mut resolved = false;
            for &direction in &legal {
                if pirate.position.step(direction) != ship {
                    continue;
                }
                resolved = true;
                let harbor = is_harbor(tiles, ship);
                if self.occupancy.is_occupied(ship) || harbor {
                    log::trace!(
                        "pirate {} holds position next to the ship",
                        pirate.id.get()
                    );
                    continue;
                }
                self.plan(pirate.id, pirate.position, direction, out);
            }

            if resolved || legal.is_empty() {
                continue;
            }

            let candidates: Vec<Direction> = legal
                .into_iter()
                .filter(|direction| {
                    let destination = pirate.position.step(*direction);
                    !is_harbor(tiles, destination) && !self.occupancy.is_occupied(destination)
                })
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let direction = candidates[rng.gen_range(0..candidates.len())];
            self.plan(pirate.id, pirate.position, direction, out);
        }
    }

    fn plan(
        &mut self,
        pirate: PirateId,
        from: Coordinate,
        direction: Direction,
        out: &mut Vec<Directive>,
    ) {
        self.occupancy.set(from, false);
        self.occupancy.set(from.step(direction), true);
        out.push(Directive::MovePirate { pirate, direction });
    }
}

/// Directions, in canonical order, leading through an opening onto a calm tile.
fn legal_directions(tiles: TileView<'_>, position: Coordinate) -> Vec<Direction> {
    let Some(tile) = tiles.tile(position) else {
        return Vec::new();
    };
    tile.connections
        .directions()
        .filter(|direction| {
            tiles
                .tile(position.step(*direction))
                .is_some_and(|destination| destination.effect == FieldEffect::None)
        })
        .collect()
}

fn is_harbor(tiles: TileView<'_>, position: Coordinate) -> bool {
    tiles
        .tile(position)
        .is_some_and(|tile| tile.field_type == FieldType::Harbor)
}

/// Pirate flags of the maze, updated as moves are planned.
#[derive(Debug, Default)]
struct Occupancy {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Occupancy {
    fn capture(&mut self, tiles: TileView<'_>) {
        let (width, height) = tiles.dimensions();
        self.width = width;
        self.height = height;
        self.cells.clear();
        for y in 0..height {
            for x in 0..width {
                let occupied = coordinate(x, y)
                    .and_then(|position| tiles.tile(position))
                    .is_some_and(|tile| tile.pirate);
                self.cells.push(occupied);
            }
        }
    }

    fn index(&self, position: Coordinate) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column < self.width && row < self.height {
            usize::try_from(u64::from(row) * u64::from(self.width) + u64::from(column)).ok()
        } else {
            None
        }
    }

    fn is_occupied(&self, position: Coordinate) -> bool {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    fn set(&mut self, position: Coordinate, occupied: bool) {
        if let Some(cell) = self
            .index(position)
            .and_then(|index| self.cells.get_mut(index))
        {
            *cell = occupied;
        }
    }
}

fn coordinate(x: u32, y: u32) -> Option<Coordinate> {
    Some(Coordinate::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_ignores_out_of_bounds_writes() {
        let mut occupancy = Occupancy {
            width: 2,
            height: 2,
            cells: vec![false; 4],
        };
        occupancy.set(Coordinate::new(-1, 0), true);
        occupancy.set(Coordinate::new(2, 1), true);
        occupancy.set(Coordinate::new(1, 1), true);

        assert_eq!(occupancy.cells, vec![false, false, false, true]);
        assert!(!occupancy.is_occupied(Coordinate::new(5, 5)));
    }
}
