//! A single node inside one static k-d tree (§4.C).

use crate::geometry::Coord;

/// One stored point. `payload` is the flat pixel index this point stands
/// in for; `left`/`right` are indices into the same tree's node array.
/// `deleted` is the tombstone bit: the node stays in place (so sibling
/// indices remain valid) but is skipped by searches and no longer counts
/// toward the tree's live total.
#[derive(Debug, Clone)]
pub struct Node {
    pub point: Coord,
    pub payload: usize,
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub deleted: bool,
}

/// Reads one of a `Coord`'s three components by cycling k-d split axis
/// (`0 => x, 1 => y, 2 => z`), used when the axis is only known at
/// runtime (as the recursion depth mod 3).
pub fn axis_value(point: &Coord, axis: usize) -> f64 {
    match axis {
        0 => point.x,
        1 => point.y,
        2 => point.z,
        _ => unreachable!("k-d trees here are always 3-dimensional"),
    }
}
