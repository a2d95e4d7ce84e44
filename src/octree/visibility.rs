//! Frustum-driven selection of visible cells

use log::trace;

use crate::math::{Containment, Frustum};
use super::layout::{DepthFirst, Visit};
use super::{CellIndex, Octree};

impl Octree {
    /// Select the cells to draw for `frustum`.
    ///
    /// Cells fully inside the frustum, or reached at `target_level`, are taken
    /// whole; cells outside are pruned; straddling cells above the target level
    /// are refined. `target_level` is clamped to the deepest level.
    pub fn update_visibility(&mut self, frustum: &Frustum, target_level: u32) -> &[CellIndex] {
        let target = target_level.min(self.max_level);
        let mut visibles = std::mem::take(&mut self.visibles);
        visibles.clear();

        let cells = &self.cells;
        let mut tested = 0usize;
        DepthFirst::new(&self.layout).walk(|index, level, _| {
            let Some(cell) = cells.get(index.index()) else {
                return Visit::Prune;
            };
            tested += 1;
            match frustum.classify_aabb(cell.min, cell.max) {
                Containment::Outside => Visit::Prune,
                Containment::Inside => {
                    visibles.push(index);
                    Visit::Prune
                }
                Containment::Intersecting if level >= target => {
                    visibles.push(index);
                    Visit::Prune
                }
                Containment::Intersecting => Visit::Descend,
            }
        });

        trace!("Visibility: {} of {} cells tested, {} visible at target level {}", tested, cells.len(), visibles.len(), target);
        self.visibles = visibles;
        &self.visibles
    }

    /// Forget the last visibility result
    pub fn clear_visibility(&mut self) {
        self.visibles.clear();
    }
}
