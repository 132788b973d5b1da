//! Dense tile storage backing the maze.

use pirate_maze_core::{Connections, Coordinate, Event, FieldEffect, FieldType, TileSnapshot};

/// Radius of the diamond-shaped area the ship can observe.
const VISION_RADIUS: i32 = 2;

/// Single maze tile owned by the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    connections: Connections,
    field_type: FieldType,
    effect: FieldEffect,
    pirate: bool,
    treasure: Option<u32>,
}

impl Tile {
    /// Creates a hazard-free tile without treasure or occupants.
    #[must_use]
    pub const fn new(connections: Connections, field_type: FieldType) -> Self {
        Self {
            connections,
            field_type,
            effect: FieldEffect::None,
            pirate: false,
            treasure: None,
        }
    }

    /// Places a treasure of the provided value on the tile.
    #[must_use]
    pub fn with_treasure(self, value: u32) -> Self {
        Self {
            treasure: Some(value),
            ..self
        }
    }

    /// Lays the provided hazard over the tile.
    #[must_use]
    pub fn with_effect(self, effect: FieldEffect) -> Self {
        Self { effect, ..self }
    }

    /// Openings toward the neighbouring tiles.
    #[must_use]
    pub const fn connections(&self) -> Connections {
        self.connections
    }

    /// Static role of the tile.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Hazard currently active on the tile.
    #[must_use]
    pub const fn effect(&self) -> FieldEffect {
        self.effect
    }

    /// Whether a living pirate occupies the tile.
    #[must_use]
    pub const fn has_pirate(&self) -> bool {
        self.pirate
    }

    /// Value of the treasure resting on the tile.
    #[must_use]
    pub const fn treasure(&self) -> Option<u32> {
        self.treasure
    }

    /// Captures the observable tile state.
    #[must_use]
    pub const fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            connections: self.connections,
            field_type: self.field_type,
            effect: self.effect,
            pirate: self.pirate,
            treasure: self.treasure,
        }
    }

    pub(crate) fn set_effect(&mut self, effect: FieldEffect) {
        self.effect = effect;
    }

    pub(crate) fn set_pirate(&mut self, pirate: bool) {
        self.pirate = pirate;
    }

    pub(crate) fn place_treasure(&mut self, value: u32) {
        self.treasure = Some(value);
    }

    pub(crate) fn clear_treasure(&mut self) {
        self.treasure = None;
    }
}

/// Row-major tile array addressed by [`Coordinate`].
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Wraps a row-major tile array. Missing tiles are filled with closed water.
    pub(crate) fn new(width: u32, height: u32, mut tiles: Vec<Tile>) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        tiles.resize(capacity, Tile::new(Connections::default(), FieldType::Normal));
        Self {
            width,
            height,
            tiles,
        }
    }

    pub(crate) const fn width(&self) -> u32 {
        self.width
    }

    pub(crate) const fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn index(&self, position: Coordinate) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column < self.width && row < self.height {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, position: Coordinate) -> bool {
        self.index(position).is_some()
    }

    pub(crate) fn tile(&self, position: Coordinate) -> Option<&Tile> {
        self.index(position).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, position: Coordinate) -> Option<&mut Tile> {
        self.index(position).and_then(move |index| self.tiles.get_mut(index))
    }

    pub(crate) fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub(crate) fn effect_at(&self, position: Coordinate) -> Option<FieldEffect> {
        self.tile(position).map(Tile::effect)
    }

    pub(crate) fn field_type_at(&self, position: Coordinate) -> Option<FieldType> {
        self.tile(position).map(Tile::field_type)
    }

    /// Builds a map-update notification for the tile, if it exists.
    pub(crate) fn map_update(&self, position: Coordinate) -> Option<Event> {
        self.tile(position).map(|tile| Event::MapUpdate {
            position,
            tile: tile.snapshot(),
        })
    }

    /// Coordinates observable from `center`, in reading order.
    pub(crate) fn visible_from(&self, center: Coordinate) -> Vec<Coordinate> {
        let mut visible = Vec::with_capacity(13);
        for dy in -VISION_RADIUS..=VISION_RADIUS {
            let reach = VISION_RADIUS - dy.abs();
            for dx in -reach..=reach {
                let position = Coordinate::new(center.x() + dx, center.y() + dy);
                if self.contains(position) {
                    visible.push(position);
                }
            }
        }
        visible
    }

    /// Appends one map update per tile visible from `center`.
    pub(crate) fn push_vision(&self, center: Coordinate, out_events: &mut Vec<Event>) {
        for position in self.visible_from(center) {
            if let Some(update) = self.map_update(position) {
                out_events.push(update);
            }
        }
    }

    /// Appends a map update for a single tile.
    pub(crate) fn push_update(&self, position: Coordinate, out_events: &mut Vec<Event>) {
        if let Some(update) = self.map_update(position) {
            out_events.push(update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: u32, height: u32) -> Grid {
        let tile = Tile::new(Connections::new(true, true, true, true), FieldType::Normal);
        let count = usize::try_from(width * height).expect("grid fits in memory");
        Grid::new(width, height, vec![tile; count])
    }

    #[test]
    fn vision_is_a_clipped_diamond_in_reading_order() {
        let grid = open_grid(5, 5);
        let visible = grid.visible_from(Coordinate::new(0, 1));

        assert_eq!(
            visible,
            vec![
                Coordinate::new(0, 0),
                Coordinate::new(1, 0),
                Coordinate::new(0, 1),
                Coordinate::new(1, 1),
                Coordinate::new(2, 1),
                Coordinate::new(0, 2),
                Coordinate::new(1, 2),
                Coordinate::new(0, 3),
            ]
        );
    }

    #[test]
    fn vision_in_open_water_covers_thirteen_tiles() {
        let grid = open_grid(7, 7);
        assert_eq!(grid.visible_from(Coordinate::new(3, 3)).len(), 13);
    }

    #[test]
    fn out_of_bounds_coordinates_have_no_index() {
        let grid = open_grid(3, 4);
        assert_eq!(grid.index(Coordinate::new(-1, 0)), None);
        assert_eq!(grid.index(Coordinate::new(3, 0)), None);
        assert_eq!(grid.index(Coordinate::new(0, 4)), None);
        assert_eq!(grid.index(Coordinate::new(2, 3)), Some(11));
    }

    #[test]
    fn short_tile_arrays_are_padded() {
        let grid = Grid::new(3, 3, Vec::new());
        assert_eq!(grid.tiles().count(), 9);
        assert!(grid
            .tile(Coordinate::new(2, 2))
            .is_some_and(|tile| tile.connections() == Connections::default()));
    }
}
