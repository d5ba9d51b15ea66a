//! The dynamic nearest-neighbor driver: decides, for each incoming
//! color, which pixel receives it, and keeps the k-d forest in sync with
//! which pixels currently count as the frontier (§4.D).
//!
//! MIN mode's frontier is the set of *filled* pixels that still touch an
//! unfilled one; placing a color finds the nearest such pixel and drops
//! the new color on a random unfilled Moore neighbor of it. MEAN mode's
//! frontier is the set of *unfilled* pixels that touch a filled one, each
//! keyed by the mean color of its filled neighbors; placing a color finds
//! the nearest such mean and fills that pixel directly.

use arrayvec::ArrayVec;

use crate::color::{to_coord, Color};
use crate::config::{ColorSpace, Selection};
use crate::error::Result;
use crate::forest::{KdForest, NodeHandle};
use crate::geometry::Coord;
use crate::rng::KdRng;

pub struct Frontier {
    width: i64,
    height: i64,
    selection: Selection,
    color_space: ColorSpace,
    filled: Vec<bool>,
    colors: Vec<Color>,
    handles: Vec<Option<NodeHandle>>,
    forest: KdForest,
}

impl Frontier {
    pub fn new(width: u32, height: u32, selection: Selection, color_space: ColorSpace) -> Self {
        let n = (width as usize) * (height as usize);
        Frontier {
            width: width as i64,
            height: height as i64,
            selection,
            color_space,
            filled: vec![false; n],
            colors: vec![0; n],
            handles: vec![None; n],
            forest: KdForest::new(),
        }
    }

    pub fn is_filled(&self, idx: usize) -> bool {
        self.filled[idx]
    }

    fn xy(&self, idx: usize) -> (i64, i64) {
        let idx = idx as i64;
        (idx % self.width, idx / self.width)
    }

    fn idx(&self, x: i64, y: i64) -> usize {
        (y * self.width + x) as usize
    }

    /// Every in-bounds 8-connected neighbor of `idx`.
    pub fn moore_neighbors(&self, idx: usize) -> ArrayVec<[usize; 8]> {
        let (x, y) = self.xy(idx);
        let mut out = ArrayVec::new();
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx >= 0 && ny >= 0 && nx < self.width && ny < self.height {
                    out.push(self.idx(nx, ny));
                }
            }
        }
        out
    }

    fn unfilled_neighbors(&self, idx: usize) -> ArrayVec<[usize; 8]> {
        self.moore_neighbors(idx)
            .into_iter()
            .filter(|&n| !self.filled[n])
            .collect()
    }

    fn filled_neighbors(&self, idx: usize) -> ArrayVec<[usize; 8]> {
        self.moore_neighbors(idx)
            .into_iter()
            .filter(|&n| self.filled[n])
            .collect()
    }

    /// Fills `idx` with `color` without touching the forest. Used for the
    /// first placement, which the driver seeds directly.
    pub fn place_color(&mut self, idx: usize, color: Color) {
        self.filled[idx] = true;
        self.colors[idx] = color;
    }

    /// A uniformly random unfilled neighbor of `idx`, or `None` if every
    /// neighbor is already filled.
    pub fn random_unfilled_neighbor(&self, idx: usize, rng: &mut KdRng) -> Option<usize> {
        let candidates = self.unfilled_neighbors(idx);
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_index(candidates.len())])
        }
    }

    fn apply_relocations(&mut self, relocated: Vec<(usize, NodeHandle)>) {
        for (payload, handle) in relocated {
            self.handles[payload] = Some(handle);
        }
    }

    fn forest_insert(&mut self, idx: usize, coord: Coord) {
        let report = self.forest.insert(coord, idx);
        self.handles[idx] = Some(report.handle);
        self.apply_relocations(report.relocated);
    }

    fn forest_remove(&mut self, idx: usize) {
        if let Some(handle) = self.handles[idx].take() {
            if let Some(relocated) = self.forest.remove(handle) {
                self.apply_relocations(relocated);
            }
        }
    }

    fn mean_of_filled_neighbors(&self, idx: usize) -> Coord {
        let neighbors = self.filled_neighbors(idx);
        let mut acc = nalgebra::Vector3::<f64>::zeros();
        for n in &neighbors {
            acc += to_coord(self.color_space, self.colors[*n]).coords;
        }
        let count = neighbors.len().max(1) as f64;
        Coord::from(acc / count)
    }

    fn post_update_min(&mut self, idx: usize) {
        if !self.unfilled_neighbors(idx).is_empty() && self.handles[idx].is_none() {
            let coord = to_coord(self.color_space, self.colors[idx]);
            self.forest_insert(idx, coord);
        }
        for n in self.filled_neighbors(idx) {
            if self.unfilled_neighbors(n).is_empty() {
                self.forest_remove(n);
            }
        }
    }

    fn post_update_mean(&mut self, idx: usize) {
        // idx just got filled: it can no longer be a MEAN frontier member.
        self.forest_remove(idx);
        for n in self.unfilled_neighbors(idx) {
            self.forest_remove(n);
            let coord = self.mean_of_filled_neighbors(n);
            self.forest_insert(n, coord);
        }
    }

    /// Call after `idx` has just been filled (by either
    /// [`Self::place_color`] or [`Self::place_next`]) to keep the
    /// forest's frontier membership in sync.
    pub fn post_update(&mut self, idx: usize) {
        match self.selection {
            Selection::Min => self.post_update_min(idx),
            Selection::Mean => self.post_update_mean(idx),
        }
    }

    /// The normal-case driver step: finds the frontier member nearest to
    /// `color`, resolves it to an actual pixel (a random unfilled
    /// neighbor in MIN mode, or the member itself in MEAN mode), fills
    /// it, and updates the frontier. Returns the pixel that was filled.
    pub fn place_next(&mut self, color: Color, rng: &mut KdRng) -> Result<usize> {
        let query = to_coord(self.color_space, color);
        let (_, payload, _) = self.forest.nearest(&query)?;
        let target = match self.selection {
            Selection::Min => self
                .random_unfilled_neighbor(payload, rng)
                .expect("a MIN frontier member always has an unfilled neighbor"),
            Selection::Mean => payload,
        };
        self.place_color(target, color);
        self.post_update(target);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_mode_seed_and_second_pixel_need_no_forest_query() {
        let mut frontier = Frontier::new(4, 4, Selection::Min, ColorSpace::Rgb);
        frontier.place_color(0, 0x00_0000);
        frontier.post_update(0);
        let mut rng = KdRng::seed_from_u32(1);
        let second = frontier.random_unfilled_neighbor(0, &mut rng).unwrap();
        frontier.place_color(second, 0x10_1010);
        frontier.post_update(second);
        assert!(frontier.is_filled(0));
        assert!(frontier.is_filled(second));
        assert_ne!(second, 0);
    }

    #[test]
    fn min_mode_place_next_fills_a_neighbor_of_the_nearest_frontier_pixel() {
        let mut frontier = Frontier::new(4, 4, Selection::Min, ColorSpace::Rgb);
        frontier.place_color(0, 0x00_0000);
        frontier.post_update(0);
        let mut rng = KdRng::seed_from_u32(7);
        let idx = frontier.place_next(0x01_0000, &mut rng).unwrap();
        assert!(frontier.is_filled(idx));
        assert_ne!(idx, 0);
    }

    #[test]
    fn mean_mode_fills_the_frontier_pixel_itself() {
        let mut frontier = Frontier::new(4, 4, Selection::Mean, ColorSpace::Rgb);
        frontier.place_color(5, 0x00_0000);
        frontier.post_update(5);
        let mut rng = KdRng::seed_from_u32(3);
        let idx = frontier.place_next(0x01_0000, &mut rng).unwrap();
        assert!(frontier.moore_neighbors(5).contains(&idx));
    }
}
