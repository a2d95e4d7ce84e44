//! Sphere queries against the collision triangles stored in leaf cells

use crate::core::types::Vec3;
use crate::math::Aabb;
use crate::math::triangle::closest_point;
use super::layout::{DepthFirst, Visit};
use super::{CellIndex, Octree};

/// A sphere touching one stored triangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub cell: CellIndex,
    /// Triangle index within the cell collision arrays
    pub triangle: usize,
    /// Closest point on the triangle
    pub point: Vec3,
    /// Stored face normal of the triangle
    pub normal: Vec3,
    /// How far the sphere reaches past the triangle surface
    pub depth: f32,
}

/// Sphere overlap query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereCollision {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereCollision {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extent(self.center, Vec3::splat(self.radius))
    }

    /// Contacts with the collision triangles of every overlapping leaf cell.
    ///
    /// Triangles crossing cell borders were clipped per cell, so one source
    /// triangle can report a contact from each cell it spans.
    pub fn query(&self, octree: &Octree) -> Vec<Contact> {
        let mut contacts = Vec::new();
        if !octree.options.collisions() || self.radius < 0.0 {
            return contacts;
        }

        let bounds = self.bounds();
        let cells = octree.cells();
        let radius_sq = self.radius * self.radius;
        DepthFirst::new(octree.layout()).walk(|index, _level, _| {
            let Some(cell) = cells.get(index.index()) else {
                return Visit::Prune;
            };
            if !cell.aabb().intersects(&bounds) {
                return Visit::Prune;
            }
            if !cell.is_leaf() {
                return Visit::Descend;
            }
            for triangle in 0..cell.collision_triangle_count() {
                let (Some([a, b, c]), Some(normal)) = (cell.collision_triangle(triangle), cell.collision_normal(triangle))
                else {
                    continue;
                };
                let point = closest_point(self.center, a, b, c);
                let distance_sq = point.distance_squared(self.center);
                if distance_sq > radius_sq {
                    continue;
                }
                contacts.push(Contact {
                    cell: index,
                    triangle,
                    point,
                    normal,
                    depth: self.radius - distance_sq.sqrt(),
                });
            }
            Visit::Prune
        });
        contacts
    }

    /// Contact with the largest penetration depth
    pub fn deepest(&self, octree: &Octree) -> Option<Contact> {
        self.query(octree)
            .into_iter()
            .max_by(|a, b| a.depth.total_cmp(&b.depth))
    }
}
