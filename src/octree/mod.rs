//! Static scene octree: flat cell array, clipped primitives, visibility and buckets

pub mod bucket;
pub mod builder;
pub mod cell;
pub mod collision;
pub mod config;
pub mod io;
pub mod layout;
pub mod primitive;
pub mod split;
pub mod visibility;

pub use bucket::{BucketList, PrimitiveBucket};
pub use builder::{MIN_HALF_SIZE, OctreeBuilder};
pub use cell::Cell;
pub use collision::{Contact, SphereCollision};
pub use io::{FINGERPRINT, verify_round_trip};
pub use layout::{CellLayout, DepthFirst, Visit};
pub use primitive::{Primitive, Winding};
pub use config::{BuildConfig, MAX_SUPPORTED_LEVEL, OctreeOptions};

use serde::Serialize;

use crate::core::error::Error;
use crate::core::types::{Mat4, Result, Vec3};
use crate::math::Aabb;

/// Position of a cell in the flat cell array
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(pub u32);

impl CellIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a clipped primitive in the octree primitive array
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveIndex(pub u32);

impl PrimitiveIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque or blended geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderPass {
    Opaque,
    Transparent,
}

/// A built octree
#[derive(Clone, Debug)]
pub struct Octree {
    pub center: Vec3,
    /// Root half extents
    pub size: Vec3,
    pub min: Vec3,
    pub max: Vec3,
    pub max_level: u32,
    pub world: Mat4,
    /// Node world transforms of the source model
    pub transforms: Vec<Mat4>,
    /// Data kept when the octree was built or loaded
    pub options: OctreeOptions,
    pub(crate) cells: Vec<Cell>,
    pub(crate) primitives: Vec<Primitive>,
    layout: CellLayout,
    visibles: Vec<CellIndex>,
    opaque_buckets: BucketList,
    transparent_buckets: BucketList,
}

impl Octree {
    /// Octree with a fixed root box and no cells yet
    pub(crate) fn with_root(center: Vec3, size: Vec3, max_level: u32, world: Mat4, transforms: Vec<Mat4>) -> Self {
        Self {
            center,
            size,
            min: center - size,
            max: center + size,
            max_level,
            world,
            transforms,
            options: OctreeOptions::default(),
            cells: Vec::new(),
            primitives: Vec::new(),
            layout: CellLayout::new(max_level),
            visibles: Vec::new(),
            opaque_buckets: BucketList::default(),
            transparent_buckets: BucketList::default(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index.index())
    }

    pub fn root(&self) -> Option<&Cell> {
        self.cells.first()
    }

    /// Cells of one level
    pub fn level(&self, level: u32) -> &[Cell] {
        if level > self.max_level {
            return &[];
        }
        &self.cells[self.layout.level_range(level)]
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn primitive(&self, index: PrimitiveIndex) -> Option<&Primitive> {
        self.primitives.get(index.index())
    }

    /// Cells selected by the last visibility update
    pub fn visibles(&self) -> &[CellIndex] {
        &self.visibles
    }

    /// Buckets of the last sort for a pass
    pub fn buckets(&self, pass: RenderPass) -> &BucketList {
        match pass {
            RenderPass::Opaque => &self.opaque_buckets,
            RenderPass::Transparent => &self.transparent_buckets,
        }
    }

    /// Regroup the clipped primitives of the visible cells by material key
    pub fn sort_buckets(&mut self, pass: RenderPass) -> &BucketList {
        let buckets = match pass {
            RenderPass::Opaque => &mut self.opaque_buckets,
            RenderPass::Transparent => &mut self.transparent_buckets,
        };
        buckets.sort(&self.cells, &self.primitives, &self.visibles, pass);
        buckets
    }

    /// Check structural and per-cell invariants
    pub fn check_invariants(&self) -> Result<()> {
        let expected = self.layout.cell_count();
        if self.cells.len() != expected {
            return Err(Error::invariant(format!(
                "{} cells stored, {} expected for max level {}",
                self.cells.len(),
                expected,
                self.max_level
            )));
        }
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.index.index() != i {
                return Err(Error::invariant(format!("cell at {} has index {}", i, cell.index.0)));
            }
            if cell.children != self.layout.children(cell.index) {
                return Err(Error::invariant(format!("cell {} has misplaced children", i)));
            }
            cell.check_invariants()?;
            for index in cell.opaques.iter().chain(&cell.transparents).flatten() {
                if index.index() >= self.primitives.len() {
                    return Err(Error::invariant(format!(
                        "cell {} references primitive {} of {}",
                        i,
                        index.0,
                        self.primitives.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Summary counts for reports
    pub fn stats(&self) -> OctreeStats {
        let cells_per_level = (0..=self.max_level).map(|l| self.level(l).len()).collect();
        let non_empty_cells_per_level = (0..=self.max_level)
            .map(|l| self.level(l).iter().filter(|c| !c.is_empty()).count())
            .collect();
        let leaves = self.level(self.max_level);
        OctreeStats {
            max_level: self.max_level,
            cell_count: self.cells.len(),
            cells_per_level,
            non_empty_cells_per_level,
            primitive_count: self.primitives.len(),
            leaf_opaque_triangles: leaves.iter().map(|c| c.opaque_triangle_count as u64).sum(),
            leaf_transparent_triangles: leaves.iter().map(|c| c.transparent_triangle_count as u64).sum(),
            collision_triangles: self.cells.iter().map(|c| c.collision_triangle_count() as u64).sum(),
            vertex_bytes: self.primitives.iter().map(|p| p.vertices.len() as u64).sum(),
            index_bytes: self.primitives.iter().map(|p| p.indices.bytes().len() as u64).sum(),
            options: self.options.0,
        }
    }
}

/// Counts reported by `Octree::stats`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OctreeStats {
    pub max_level: u32,
    pub cell_count: usize,
    pub cells_per_level: Vec<usize>,
    pub non_empty_cells_per_level: Vec<usize>,
    pub primitive_count: usize,
    pub leaf_opaque_triangles: u64,
    pub leaf_transparent_triangles: u64,
    pub collision_triangles: u64,
    pub vertex_bytes: u64,
    pub index_bytes: u64,
    pub options: u32,
}
