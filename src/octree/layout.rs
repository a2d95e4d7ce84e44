//! Flat cell layout of a complete octree and its depth-first walker.
//!
//! Cells are stored level by level: level `l` occupies `8^l` consecutive slots
//! starting at `level_base(l)`. Within a level, cells appear in depth-first
//! visiting order, so the children of the `p`-th cell of level `l` are the
//! cells `8p .. 8p + 7` of level `l + 1`.

use super::CellIndex;

/// Number of cells on one level
pub fn cells_at_level(level: u32) -> usize {
    1usize << (3 * level)
}

/// Number of cells in a complete tree with levels `0..=max_level`
pub fn cell_count(max_level: u32) -> usize {
    (0..=max_level).map(cells_at_level).sum()
}

/// Per-level offset table of the flat cell array
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellLayout {
    max_level: u32,
    /// `bases[l]` is the first index of level `l`; the last entry is the total cell count
    bases: Vec<usize>,
}

impl CellLayout {
    pub fn new(max_level: u32) -> Self {
        let mut bases = Vec::with_capacity(max_level as usize + 2);
        let mut offset = 0;
        for level in 0..=max_level {
            bases.push(offset);
            offset += cells_at_level(level);
        }
        bases.push(offset);
        Self { max_level, bases }
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn cell_count(&self) -> usize {
        self.bases[self.max_level as usize + 1]
    }

    /// First flat index of `level`
    pub fn level_base(&self, level: u32) -> usize {
        self.bases[level as usize]
    }

    /// Index range of one level
    pub fn level_range(&self, level: u32) -> std::ops::Range<usize> {
        self.bases[level as usize]..self.bases[level as usize + 1]
    }

    /// Level of a flat index
    pub fn level_of(&self, index: CellIndex) -> u32 {
        let i = index.index();
        (0..=self.max_level)
            .find(|&l| i < self.bases[l as usize + 1])
            .unwrap_or(self.max_level)
    }

    /// Children of a cell, None at the deepest level
    pub fn children(&self, index: CellIndex) -> Option<[CellIndex; 8]> {
        let level = self.level_of(index);
        if level >= self.max_level {
            return None;
        }
        let position = index.index() - self.level_base(level);
        let first = self.level_base(level + 1) + position * 8;
        Some(std::array::from_fn(|k| CellIndex((first + k) as u32)))
    }

    /// Parent of a cell and the octant it occupies in it
    pub fn parent(&self, index: CellIndex) -> Option<(CellIndex, u8)> {
        let level = self.level_of(index);
        if level == 0 {
            return None;
        }
        let position = index.index() - self.level_base(level);
        let parent = self.level_base(level - 1) + position / 8;
        Some((CellIndex(parent as u32), (position % 8) as u8))
    }
}

/// What the walker does after visiting a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Descend,
    /// Skip the whole subtree
    Prune,
}

/// Depth-first traversal driven by per-level offset counters.
///
/// Each visit consumes the next slot of its level; pruning a subtree advances
/// every deeper level by the number of cells the subtree would have used.
pub struct DepthFirst<'a> {
    layout: &'a CellLayout,
    cursor: Vec<usize>,
}

impl<'a> DepthFirst<'a> {
    pub fn new(layout: &'a CellLayout) -> Self {
        let cursor = (0..=layout.max_level).map(|l| layout.level_base(l)).collect();
        Self { layout, cursor }
    }

    /// Reset every level counter to the start of its level
    pub fn reset(&mut self) {
        for (level, slot) in self.cursor.iter_mut().enumerate() {
            *slot = self.layout.level_base(level as u32);
        }
    }

    /// Walk from the root; the visitor receives (cell, level, parent and octant)
    pub fn walk<F>(&mut self, mut visitor: F)
    where
        F: FnMut(CellIndex, u32, Option<(CellIndex, u8)>) -> Visit,
    {
        self.reset();
        self.visit(0, None, &mut visitor);
    }

    fn visit<F>(&mut self, level: u32, parent: Option<(CellIndex, u8)>, visitor: &mut F)
    where
        F: FnMut(CellIndex, u32, Option<(CellIndex, u8)>) -> Visit,
    {
        let slot = &mut self.cursor[level as usize];
        let index = CellIndex(*slot as u32);
        *slot += 1;

        let decision = visitor(index, level, parent);
        if level >= self.layout.max_level {
            return;
        }
        match decision {
            Visit::Descend => {
                for octant in 0..8u8 {
                    self.visit(level + 1, Some((index, octant)), visitor);
                }
            }
            Visit::Prune => self.skip_below(level),
        }
    }

    fn skip_below(&mut self, level: u32) {
        for deeper in level + 1..=self.layout.max_level {
            self.cursor[deeper as usize] += cells_at_level(deeper - level);
        }
    }
}
