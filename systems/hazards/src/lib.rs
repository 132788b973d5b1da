#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic hazard system that scatters storms and swirls across the maze.

use pirate_maze_core::{Coordinate, Directive, FieldEffect, FieldType};
use pirate_maze_world::query::TileView;
use rand::Rng;

/// Number of cycles between hazard waves.
pub const DEFAULT_INTERVAL: u32 = 21;

/// Effects drawn on every hazard wave, in draw order.
const WAVE: [FieldEffect; 2] = [FieldEffect::Storm, FieldEffect::Swirl];

/// Configuration parameters required to construct the hazard system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: u32,
}

impl Config {
    /// Creates a configuration that spawns hazards every `interval` cycles.
    #[must_use]
    pub const fn new(interval: u32) -> Self {
        Self { interval }
    }

    /// Cycles between hazard waves.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

/// Pure system that emits effect placements on hazard cycles.
#[derive(Debug)]
pub struct Hazards {
    interval: u32,
}

impl Hazards {
    /// Creates a new hazard system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
        }
    }

    /// Reports whether `cycle` triggers a hazard wave.
    #[must_use]
    pub fn is_due(&self, cycle: u32) -> bool {
        self.interval != 0 && cycle % self.interval == 0
    }

    /// Draws one random tile per effect and places the effect where allowed.
    ///
    /// Both draws are taken even when the first placement is rejected, so the
    /// random stream advances identically on every wave. Tiles visible to the
    /// ship never change under the player's eyes.
    pub fn handle<R: Rng>(
        &mut self,
        cycle: u32,
        tiles: TileView<'_>,
        visible: &[Coordinate],
        rng: &mut R,
        out: &mut Vec<Directive>,
    ) {
        if !self.is_due(cycle) {
            return;
        }

        let (width, height) = tiles.dimensions();
        let area = width.saturating_mul(height);
        if area == 0 {
            return;
        }

        let mut placed: Option<Coordinate> = None;
        for effect in WAVE {
            let roll = rng.gen_range(0..area);
            let Some(position) = coordinate(roll % width, roll / width) else {
                continue;
            };
            if placed == Some(position) || visible.contains(&position) {
                continue;
            }
            let eligible = tiles.tile(position).is_some_and(|tile| {
                tile.field_type != FieldType::Harbor
                    && !tile.pirate
                    && tile.effect == FieldEffect::None
            });
            if !eligible {
                log::trace!("{effect:?} draw at {position} rejected");
                continue;
            }
            log::debug!("cycle {cycle}: {effect:?} placed at {position}");
            placed = Some(position);
            out.push(Directive::PlaceEffect { position, effect });
        }
    }
}

fn coordinate(x: u32, y: u32) -> Option<Coordinate> {
    Some(Coordinate::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?))
}
