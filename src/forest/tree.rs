//! One static, balanced k-d tree: the building block the forest
//! recombines on every insert and every compaction (§4.C).

use fnv::FnvHashSet;

use crate::geometry::{dist_squared, Coord};

use super::node::{axis_value, Node};

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<u32>,
    tombstones: usize,
}

impl Tree {
    /// Builds a balanced tree over `points`, splitting on the median of
    /// the current depth's axis at every level. The three axis-sorted
    /// index arrays are maintained in parallel and partitioned by set
    /// membership at each split, which keeps the whole build at
    /// `O(n log n)` instead of re-sorting a shrinking slice at every
    /// level. Returns the tree alongside the `(payload, node index)` of
    /// every point it holds, so callers can hand out fresh
    /// [`super::NodeHandle`]s without a second pass over the tree.
    pub fn build(points: Vec<(Coord, usize)>) -> (Tree, Vec<(usize, usize)>) {
        let n = points.len();
        let mut nodes = Vec::with_capacity(n);
        let mut handles = Vec::with_capacity(n);
        if n == 0 {
            return (
                Tree {
                    nodes,
                    root: None,
                    tombstones: 0,
                },
                handles,
            );
        }
        let mut sorted: [Vec<usize>; 3] = [
            (0..n).collect(),
            (0..n).collect(),
            (0..n).collect(),
        ];
        for (axis, order) in sorted.iter_mut().enumerate() {
            order.sort_by(|&a, &b| {
                axis_value(&points[a].0, axis)
                    .partial_cmp(&axis_value(&points[b].0, axis))
                    .expect("color coordinates are never NaN")
            });
        }
        let root = Self::build_rec(&points, sorted, 0, &mut nodes, &mut handles);
        (
            Tree {
                nodes,
                root,
                tombstones: 0,
            },
            handles,
        )
    }

    fn build_rec(
        points: &[(Coord, usize)],
        sorted: [Vec<usize>; 3],
        depth: usize,
        nodes: &mut Vec<Node>,
        handles: &mut Vec<(usize, usize)>,
    ) -> Option<u32> {
        let n = sorted[0].len();
        if n == 0 {
            return None;
        }
        let axis = depth % 3;
        let mid = n / 2;
        let median = sorted[axis][mid];

        let in_left: FnvHashSet<usize> = sorted[axis][..mid].iter().copied().collect();
        let mut left_sorted: [Vec<usize>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut right_sorted: [Vec<usize>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for a in 0..3 {
            for &i in &sorted[a] {
                if i == median {
                    continue;
                }
                if in_left.contains(&i) {
                    left_sorted[a].push(i);
                } else {
                    right_sorted[a].push(i);
                }
            }
        }

        let node_idx = nodes.len();
        nodes.push(Node {
            point: points[median].0,
            payload: points[median].1,
            left: None,
            right: None,
            deleted: false,
        });
        handles.push((points[median].1, node_idx));

        let left = Self::build_rec(points, left_sorted, depth + 1, nodes, handles);
        let right = Self::build_rec(points, right_sorted, depth + 1, nodes, handles);
        nodes[node_idx].left = left;
        nodes[node_idx].right = right;
        Some(node_idx as u32)
    }

    pub fn tombstone_count(&self) -> usize {
        self.tombstones
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn payload_at(&self, idx: usize) -> usize {
        self.nodes[idx].payload
    }

    /// Tombstones the node at `idx`. The node's slot and children stay
    /// put; only `nearest` and `live_points` start skipping it.
    pub fn mark_deleted(&mut self, idx: usize) {
        let node = &mut self.nodes[idx];
        if !node.deleted {
            node.deleted = true;
            self.tombstones += 1;
        }
    }

    /// Every non-tombstoned `(point, payload)` pair, in node-array order.
    pub fn live_points(&self) -> Vec<(Coord, usize)> {
        self.nodes
            .iter()
            .filter(|n| !n.deleted)
            .map(|n| (n.point, n.payload))
            .collect()
    }

    /// Nearest live point to `query`, as `(node index, squared distance)`.
    pub fn nearest(&self, query: &Coord) -> Option<(usize, f64)> {
        let mut best = None;
        self.nearest_rec(self.root, query, 0, &mut best);
        best
    }

    fn nearest_rec(
        &self,
        node: Option<u32>,
        query: &Coord,
        depth: usize,
        best: &mut Option<(usize, f64)>,
    ) {
        let idx = match node {
            Some(i) => i as usize,
            None => return,
        };
        let entry = &self.nodes[idx];
        if !entry.deleted {
            let d = dist_squared(&entry.point, query);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                *best = Some((idx, d));
            }
        }
        let axis = depth % 3;
        let diff = axis_value(query, axis) - axis_value(&entry.point, axis);
        let (near, far) = if diff <= 0.0 {
            (entry.left, entry.right)
        } else {
            (entry.right, entry.left)
        };
        self.nearest_rec(near, query, depth + 1, best);
        let best_d = best.map_or(f64::INFINITY, |(_, d)| d);
        if diff * diff < best_d {
            self.nearest_rec(far, query, depth + 1, best);
        }
    }
}
