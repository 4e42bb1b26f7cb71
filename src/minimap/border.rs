//! Edge classification and neighbour reconciliation.

use serde::{Deserialize, Serialize};

use super::occupancy::OccupancyGrid;

/// Gap tolerance, in tiles, below a full wall that still counts as a passage.
pub const PASSAGE_SLACK: i64 = 5;

pub const RIGHT: usize = 0;
pub const DOWN: usize = 1;
pub const LEFT: usize = 2;
pub const UP: usize = 3;

/// Classification of one room edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    #[default]
    Empty,
    Wall,
    Passage,
    /// Never derived from occupancy; reserved for hand-authored data.
    Door,
}

/// Borders in `[right, down, left, up]` order.
pub type Borders = [Border; 4];

/// Classify an edge of `length` tiles with `occupied` of them filled.
pub fn classify_edge(length: u32, occupied: u32) -> Border {
    if occupied == length {
        Border::Wall
    } else if i64::from(occupied) >= i64::from(length) - PASSAGE_SLACK {
        Border::Passage
    } else {
        Border::Empty
    }
}

/// Occupied tile counts along each edge of the room whose top-left tile is
/// `(x0, y0)`, in `[right, down, left, up]` order.
pub fn edge_counts(grid: &OccupancyGrid, x0: i64, y0: i64, width: u32, height: u32) -> [u32; 4] {
    let (w, h) = (i64::from(width), i64::from(height));
    let column = |x: i64| (y0..y0 + h).filter(|&y| grid.is_occupied(x, y)).count() as u32;
    let row = |y: i64| (x0..x0 + w).filter(|&x| grid.is_occupied(x, y)).count() as u32;

    [column(x0 + w - 1), row(y0 + h - 1), column(x0), row(y0)]
}

/// Classify a room, or `None` when every edge is empty.
pub fn classify_room(counts: [u32; 4], width: u32, height: u32) -> Option<Borders> {
    if counts.iter().all(|&c| c == 0) {
        return None;
    }
    let lengths = [height, width, height, width];
    Some(std::array::from_fn(|side| {
        classify_edge(lengths[side], counts[side])
    }))
}

/// Resolve the two sides of an edge shared by classified rooms.
///
/// Disagreeing sides, and agreeing sides that are not empty, both open up.
pub fn reconcile(a: Border, b: Border) -> (Border, Border) {
    if a != b || a != Border::Empty {
        (Border::Empty, Border::Empty)
    } else {
        (a, b)
    }
}
