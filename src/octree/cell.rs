//! One node of the flat octree

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::geometry::box_half_spaces;
use crate::math::{Aabb, Plane};
use crate::math::triangle::face_normal;
use super::{CellIndex, PrimitiveIndex, RenderPass};

/// Octree cell with its bounds, candidate and clipped primitive lists and
/// optional collision triangles
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub index: CellIndex,
    pub level: u32,
    pub center: Vec3,
    /// Half extents
    pub size: Vec3,
    pub min: Vec3,
    pub max: Vec3,
    /// Corners in octant order
    pub points: [Vec3; 8],
    /// Inward-facing half-spaces of the cell box
    pub planes: [Plane; 6],
    /// Source primitives overlapping the cell before clipping
    pub opaque_primitives: Vec<u32>,
    pub transparent_primitives: Vec<u32>,
    /// Clipped primitives; None marks a cell primitive that ended empty
    pub opaques: Vec<Option<PrimitiveIndex>>,
    pub transparents: Vec<Option<PrimitiveIndex>>,
    pub opaque_triangle_count: u32,
    pub transparent_triangle_count: u32,
    pub triangle_count: u32,
    /// Collision triangles, 9 floats each
    pub positions: Vec<f32>,
    /// Collision face normals, 3 floats each
    pub normals: Vec<f32>,
    /// None only at the deepest level
    pub children: Option<[CellIndex; 8]>,
}

impl Cell {
    pub fn new(index: CellIndex, level: u32, center: Vec3, size: Vec3) -> Self {
        let mut cell = Self {
            index,
            level,
            center,
            size,
            min: center - size,
            max: center + size,
            ..Default::default()
        };
        cell.derive_geometry();
        cell
    }

    /// Recompute corners and half-spaces from `min`/`max`
    pub fn derive_geometry(&mut self) {
        let aabb = self.aabb();
        self.points = aabb.corners();
        self.planes = box_half_spaces(self.min, self.max);
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count == 0
    }

    /// Clipped primitives of one pass
    pub fn primitives(&self, pass: RenderPass) -> &[Option<PrimitiveIndex>] {
        match pass {
            RenderPass::Opaque => &self.opaques,
            RenderPass::Transparent => &self.transparents,
        }
    }

    /// Candidate source primitives of one pass
    pub fn candidates(&self, pass: RenderPass) -> &[u32] {
        match pass {
            RenderPass::Opaque => &self.opaque_primitives,
            RenderPass::Transparent => &self.transparent_primitives,
        }
    }

    /// Number of stored collision triangles
    pub fn collision_triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    /// Corners of collision triangle `i`
    pub fn collision_triangle(&self, i: usize) -> Option<[Vec3; 3]> {
        let p = self.positions.get(i * 9..i * 9 + 9)?;
        Some([
            Vec3::new(p[0], p[1], p[2]),
            Vec3::new(p[3], p[4], p[5]),
            Vec3::new(p[6], p[7], p[8]),
        ])
    }

    /// Stored face normal of collision triangle `i`
    pub fn collision_normal(&self, i: usize) -> Option<Vec3> {
        let n = self.normals.get(i * 3..i * 3 + 3)?;
        Some(Vec3::new(n[0], n[1], n[2]))
    }

    /// Append one collision triangle and its flat normal
    pub fn push_collision_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        for p in [a, b, c] {
            self.positions.extend_from_slice(&p.to_array());
        }
        self.normals.extend_from_slice(&face_normal(a, b, c).to_array());
    }

    /// Check the per-cell counting and collision array invariants
    pub fn check_invariants(&self) -> Result<()> {
        let sum = self.opaque_triangle_count as u64 + self.transparent_triangle_count as u64;
        if self.triangle_count as u64 != sum {
            return Err(Error::invariant(format!(
                "cell {}: triangle count {} != {} opaque + {} transparent",
                self.index.0, self.triangle_count, self.opaque_triangle_count, self.transparent_triangle_count
            )));
        }
        if self.positions.len() % 9 != 0 {
            return Err(Error::invariant(format!(
                "cell {}: {} collision floats is not a multiple of 9",
                self.index.0,
                self.positions.len()
            )));
        }
        if self.normals.len() * 3 != self.positions.len() {
            return Err(Error::invariant(format!(
                "cell {}: {} normal floats for {} position floats",
                self.index.0,
                self.normals.len(),
                self.positions.len()
            )));
        }
        Ok(())
    }
}
