#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map adapter that turns JSON maze documents into validated world layouts.
//!
//! A document lists the maze as rows of box-drawing characters together with
//! the start, exit, harbors, pirates and treasures. Every structural rule is
//! checked before a [`Layout`] is produced, so the world never has to cope
//! with broken mazes.

mod glyph;
mod regions;

use std::collections::HashSet;

use pirate_maze_core::{Connections, Coordinate, Direction, FieldType};
use pirate_maze_world::{Layout, Tile};
use serde::Deserialize;
use thiserror::Error;

/// Smallest accepted width or height.
pub const MIN_SIDE: u32 = 3;
/// Largest accepted width or height.
pub const MAX_SIDE: u32 = 50;
/// Smallest treasure value.
pub const MIN_TREASURE: i32 = 1;
/// Largest treasure value.
pub const MAX_TREASURE: i32 = 9;

/// Reasons a map document is rejected.
#[derive(Debug, Error)]
pub enum MapError {
    /// The document is not valid JSON or lacks required fields.
    #[error("malformed map document")]
    Json(#[from] serde_json::Error),
    /// Width or height lies outside the accepted range.
    #[error("{axis} {value} is outside 3..=50")]
    Dimension {
        /// Either `"width"` or `"height"`.
        axis: &'static str,
        /// Declared size.
        value: u32,
    },
    /// The number of rows differs from the declared height.
    #[error("expected {expected} rows, found {found}")]
    RowCount {
        /// Declared height.
        expected: u32,
        /// Rows present in the document.
        found: usize,
    },
    /// A row holds a different number of tiles than the declared width.
    #[error("row {row} holds {found} tiles, expected {expected}")]
    RowWidth {
        /// Index of the offending row.
        row: usize,
        /// Declared width.
        expected: u32,
        /// Tiles present in the row.
        found: usize,
    },
    /// A row contains a character outside the tile alphabet.
    #[error("unknown tile {glyph:?} at {position}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Location of the character.
        position: Coordinate,
    },
    /// A listed coordinate lies outside the maze.
    #[error("{what} at {position} lies outside the maze")]
    OutOfBounds {
        /// Kind of entry that was listed.
        what: &'static str,
        /// Listed coordinate.
        position: Coordinate,
    },
    /// The same coordinate is listed twice.
    #[error("{what} at {position} is listed twice")]
    Duplicate {
        /// Kind of entry that was listed.
        what: &'static str,
        /// Repeated coordinate.
        position: Coordinate,
    },
    /// A treasure value lies outside the accepted range.
    #[error("treasure at {position} is worth {value}, expected 1..=9")]
    TreasureValue {
        /// Location of the treasure.
        position: Coordinate,
        /// Declared value.
        value: i32,
    },
    /// An opening leads off the maze or into a tile that does not open back.
    #[error("tile {position} opens {direction:?} without a matching neighbour")]
    BrokenConnection {
        /// Tile holding the opening.
        position: Coordinate,
        /// Direction of the opening.
        direction: Direction,
    },
    /// Some tiles cannot be reached from the others.
    #[error("the maze splits into {regions} disconnected regions")]
    Disconnected {
        /// Number of separate regions.
        regions: usize,
    },
    /// A pirate starts on a harbor.
    #[error("pirate at {0} starts on a harbor")]
    PirateOnHarbor(Coordinate),
    /// Start and exit share a tile.
    #[error("start and exit share the tile {0}")]
    StartIsExit(Coordinate),
    /// The start tile is not a harbor.
    #[error("start {0} is not a harbor")]
    StartNotHarbor(Coordinate),
    /// The exit tile is a harbor.
    #[error("exit {0} must not be a harbor")]
    ExitIsHarbor(Coordinate),
}

/// Serialized form of a maze document.
#[derive(Debug, Deserialize)]
struct Document {
    width: u32,
    height: u32,
    map: Vec<String>,
    start: [i32; 2],
    exit: [i32; 2],
    #[serde(default)]
    pirates: Vec<[i32; 2]>,
    harbors: Vec<[i32; 2]>,
    #[serde(default)]
    treasures: Vec<[i32; 3]>,
}

/// Parses and validates a JSON map document.
pub fn parse(json: &str) -> Result<Layout, MapError> {
    let document: Document = serde_json::from_str(json)?;
    build(document)
}

/// Renders the maze of `layout` as rows of box-drawing characters.
#[must_use]
pub fn render(layout: &Layout) -> String {
    let width = usize::try_from(layout.width).unwrap_or(usize::MAX).max(1);
    layout
        .tiles
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|tile| glyph::glyph(tile.connections()))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build(document: Document) -> Result<Layout, MapError> {
    let Document {
        width,
        height,
        map,
        start,
        exit,
        pirates,
        harbors,
        treasures,
    } = document;

    for (axis, value) in [("width", width), ("height", height)] {
        if !(MIN_SIDE..=MAX_SIDE).contains(&value) {
            return Err(MapError::Dimension { axis, value });
        }
    }
    let bounds = Bounds { width, height };

    let openings = decode_rows(&map, bounds)?;

    let start = bounds.check("start", start)?;
    let exit = bounds.check("exit", exit)?;
    let pirates = bounds.check_all("pirate", &pirates)?;
    let harbors = bounds.check_all("harbor", &harbors)?;
    let mut treasure_sites = Vec::with_capacity(treasures.len());
    for [x, y, value] in treasures {
        let position = bounds.check("treasure", [x, y])?;
        let value = u32::try_from(value)
            .ok()
            .filter(|_| (MIN_TREASURE..=MAX_TREASURE).contains(&value))
            .ok_or(MapError::TreasureValue { position, value })?;
        treasure_sites.push((position, value));
    }
    ensure_unique(
        "treasure",
        treasure_sites.iter().map(|(position, _)| *position),
    )?;

    check_openings(&openings, bounds)?;
    let regions = regions::count(bounds.columns(), bounds.rows(), &openings);
    if regions > 1 {
        return Err(MapError::Disconnected { regions });
    }

    if let Some(pirate) = pirates.iter().find(|pirate| harbors.contains(pirate)) {
        return Err(MapError::PirateOnHarbor(*pirate));
    }
    if start == exit {
        return Err(MapError::StartIsExit(start));
    }
    if !harbors.contains(&start) {
        return Err(MapError::StartNotHarbor(start));
    }
    if harbors.contains(&exit) {
        return Err(MapError::ExitIsHarbor(exit));
    }

    let mut tiles: Vec<Tile> = openings
        .into_iter()
        .map(|connections| Tile::new(connections, FieldType::Normal))
        .collect();
    let mut retype = |position: Coordinate, field_type: FieldType| {
        let tile = &mut tiles[bounds.index(position)];
        *tile = Tile::new(tile.connections(), field_type);
    };
    retype(exit, FieldType::Exit);
    for harbor in &harbors {
        retype(*harbor, FieldType::Harbor);
    }
    for (position, value) in treasure_sites {
        let tile = &mut tiles[bounds.index(position)];
        *tile = tile.clone().with_treasure(value);
    }

    log::debug!(
        "loaded {width}x{height} map with {} pirates and {} harbors",
        pirates.len(),
        harbors.len()
    );
    Ok(Layout {
        width,
        height,
        tiles,
        start,
        exit,
        pirates,
    })
}

fn decode_rows(rows: &[String], bounds: Bounds) -> Result<Vec<Connections>, MapError> {
    if rows.len() != bounds.rows() {
        return Err(MapError::RowCount {
            expected: bounds.height,
            found: rows.len(),
        });
    }

    let mut openings = Vec::with_capacity(bounds.columns() * bounds.rows());
    for (row, (text, y)) in rows.iter().zip(0i32..).enumerate() {
        let found = text.chars().count();
        if found != bounds.columns() {
            return Err(MapError::RowWidth {
                row,
                expected: bounds.width,
                found,
            });
        }
        for (glyph, x) in text.chars().zip(0i32..) {
            let connections = glyph::connections(glyph).ok_or(MapError::UnknownGlyph {
                glyph,
                position: Coordinate::new(x, y),
            })?;
            openings.push(connections);
        }
    }
    Ok(openings)
}

/// Every opening must lead onto the maze and be mirrored by the neighbour.
fn check_openings(openings: &[Connections], bounds: Bounds) -> Result<(), MapError> {
    for (index, connections) in openings.iter().enumerate() {
        let position = bounds.coordinate(index);
        for direction in connections.directions() {
            let neighbour = position.step(direction);
            let mirrored = bounds
                .contains(neighbour)
                .then(|| openings[bounds.index(neighbour)])
                .is_some_and(|other| other.allows(direction.opposite()));
            if !mirrored {
                return Err(MapError::BrokenConnection {
                    position,
                    direction,
                });
            }
        }
    }
    Ok(())
}

fn ensure_unique(
    what: &'static str,
    positions: impl IntoIterator<Item = Coordinate>,
) -> Result<(), MapError> {
    let mut seen = HashSet::new();
    for position in positions {
        if !seen.insert(position) {
            return Err(MapError::Duplicate { what, position });
        }
    }
    Ok(())
}

/// Declared maze size, used to validate and index coordinates.
#[derive(Clone, Copy, Debug)]
struct Bounds {
    width: u32,
    height: u32,
}

impl Bounds {
    fn columns(self) -> usize {
        self.width as usize
    }

    fn rows(self) -> usize {
        self.height as usize
    }

    fn contains(self, position: Coordinate) -> bool {
        u32::try_from(position.x()).is_ok_and(|x| x < self.width)
            && u32::try_from(position.y()).is_ok_and(|y| y < self.height)
    }

    fn check(self, what: &'static str, [x, y]: [i32; 2]) -> Result<Coordinate, MapError> {
        let position = Coordinate::new(x, y);
        if self.contains(position) {
            Ok(position)
        } else {
            Err(MapError::OutOfBounds { what, position })
        }
    }

    fn check_all(self, what: &'static str, raw: &[[i32; 2]]) -> Result<Vec<Coordinate>, MapError> {
        let positions = raw
            .iter()
            .map(|pair| self.check(what, *pair))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique(what, positions.iter().copied())?;
        Ok(positions)
    }

    /// Index of an in-bounds coordinate in reading order.
    fn index(self, position: Coordinate) -> usize {
        position.y().unsigned_abs() as usize * self.columns() + position.x().unsigned_abs() as usize
    }

    fn coordinate(self, index: usize) -> Coordinate {
        let x = index % self.columns();
        let y = index / self.columns();
        Coordinate::new(
            i32::try_from(x).unwrap_or(i32::MAX),
            i32::try_from(y).unwrap_or(i32::MAX),
        )
    }
}
