//! Connected-region counting over a validated tile grid.

use pirate_maze_core::{Connections, Direction};

/// Disjoint-set forest over tile indices.
#[derive(Debug)]
struct Forest {
    parent: Vec<usize>,
}

impl Forest {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn root(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            let grandparent = self.parent[self.parent[index]];
            self.parent[index] = grandparent;
            index = grandparent;
        }
        index
    }

    fn join(&mut self, a: usize, b: usize) {
        let (a, b) = (self.root(a), self.root(b));
        if a != b {
            self.parent[b] = a;
        }
    }
}

/// Counts the regions reachable from one another through open boundaries.
///
/// Each row is first collapsed into bands of east-west runs, then bands are
/// merged with the row below through southward openings. `tiles` must hold
/// `width * height` entries in reading order.
pub(crate) fn count(width: usize, height: usize, tiles: &[Connections]) -> usize {
    let mut forest = Forest::new(tiles.len());
    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            if x + 1 < width && tiles[index].allows(Direction::East) {
                forest.join(index, index + 1);
            }
        }
        if y + 1 < height {
            for x in 0..width {
                let index = y * width + x;
                if tiles[index].allows(Direction::South) {
                    forest.join(index, index + width);
                }
            }
        }
    }

    (0..tiles.len())
        .filter(|&index| forest.root(index) == index)
        .count()
}
