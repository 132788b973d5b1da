//! Box-drawing characters used to describe tile openings.

use pirate_maze_core::Connections;

const GLYPHS: [(char, Connections); 15] = [
    ('─', Connections::new(false, true, false, true)),
    ('│', Connections::new(true, false, true, false)),
    ('└', Connections::new(true, true, false, false)),
    ('┌', Connections::new(false, true, true, false)),
    ('┐', Connections::new(false, false, true, true)),
    ('┘', Connections::new(true, false, false, true)),
    ('┬', Connections::new(false, true, true, true)),
    ('┤', Connections::new(true, false, true, true)),
    ('┴', Connections::new(true, true, false, true)),
    ('├', Connections::new(true, true, true, false)),
    ('┼', Connections::new(true, true, true, true)),
    ('╴', Connections::new(false, false, false, true)),
    ('╵', Connections::new(true, false, false, false)),
    ('╶', Connections::new(false, true, false, false)),
    ('╷', Connections::new(false, false, true, false)),
];

/// Placeholder for a tile without any opening.
const SEALED: char = ' ';

/// Decodes the openings described by a box-drawing character.
pub(crate) fn connections(glyph: char) -> Option<Connections> {
    GLYPHS
        .iter()
        .find(|(candidate, _)| *candidate == glyph)
        .map(|(_, connections)| *connections)
}

/// Encodes openings back into their box-drawing character.
pub(crate) fn glyph(connections: Connections) -> char {
    GLYPHS
        .iter()
        .find(|(_, candidate)| *candidate == connections)
        .map_or(SEALED, |(glyph, _)| *glyph)
}
