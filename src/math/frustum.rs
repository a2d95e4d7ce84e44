//! View frustum for culling

use crate::core::types::{Mat4, Vec3, Vec4};
use super::aabb::Aabb;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through `origin` facing `normal` (normal is expected unit length)
    pub fn from_point_normal(origin: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            distance: -normal.dot(origin),
        }
    }

    /// Plane through three points, normal = normalize(cross(b - a, c - a))
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self::from_point_normal(a, normal)
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Point on the plane closest to the world origin
    pub fn origin(&self) -> Vec3 {
        -self.normal * self.distance
    }

    /// Same plane facing the other way
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }
}

/// Result of classifying a box against the frustum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    /// Completely inside every plane
    Inside,
    /// Straddles at least one plane
    Intersecting,
    /// Completely behind at least one plane
    Outside,
}

impl Containment {
    /// Integer code: -1 inside, 0 intersecting, +1 outside
    pub fn code(self) -> i32 {
        match self {
            Containment::Inside => -1,
            Containment::Intersecting => 0,
            Containment::Outside => 1,
        }
    }
}

/// NDC depth convention of the projection the frustum is built from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthRange {
    /// OpenGL style, z in [-1, 1]
    #[default]
    NegOneToOne,
    /// wgpu / Vulkan / D3D style, z in [0, 1]
    ZeroToOne,
}

impl DepthRange {
    fn near_far(self) -> (f32, f32) {
        match self {
            DepthRange::NegOneToOne => (-1.0, 1.0),
            DepthRange::ZeroToOne => (0.0, 1.0),
        }
    }
}

pub const PLANE_NEAR: usize = 0;
pub const PLANE_FAR: usize = 1;
pub const PLANE_LEFT: usize = 2;
pub const PLANE_RIGHT: usize = 3;
pub const PLANE_TOP: usize = 4;
pub const PLANE_BOTTOM: usize = 5;

/// Corner triples spanning each plane (corner bit 0 = x, bit 1 = y, bit 2 = z)
const PLANE_CORNERS: [[usize; 3]; 6] = [
    [0, 1, 2], // near
    [4, 5, 6], // far
    [0, 2, 4], // left
    [1, 3, 5], // right
    [2, 3, 6], // top
    [0, 1, 4], // bottom
];

/// View frustum with 6 inward-facing planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
    corners: [Vec3; 8],
}

impl Frustum {
    /// Build from an inverse view-projection matrix by unprojecting the NDC cube corners
    pub fn from_inverse_view_projection(inv_view_proj: &Mat4, depth: DepthRange) -> Self {
        let mut frustum = Self {
            planes: [Plane::new(Vec3::ZERO, 0.0); 6],
            corners: [Vec3::ZERO; 8],
        };
        frustum.update(inv_view_proj, depth);
        frustum
    }

    /// Build from a view-projection matrix
    pub fn from_view_projection(view_proj: &Mat4, depth: DepthRange) -> Self {
        Self::from_inverse_view_projection(&view_proj.inverse(), depth)
    }

    /// Recompute corners and planes in place
    pub fn update(&mut self, inv_view_proj: &Mat4, depth: DepthRange) {
        let (near_z, far_z) = depth.near_far();

        for (i, corner) in self.corners.iter_mut().enumerate() {
            let clip = Vec4::new(
                if i & 1 != 0 { 1.0 } else { -1.0 },
                if i & 2 != 0 { 1.0 } else { -1.0 },
                if i & 4 != 0 { far_z } else { near_z },
                1.0,
            );
            let world = *inv_view_proj * clip;
            *corner = world.truncate() / world.w;
        }

        let centroid = self.corners.iter().copied().sum::<Vec3>() / 8.0;

        for (plane, [a, b, c]) in self.planes.iter_mut().zip(PLANE_CORNERS) {
            let p = Plane::from_points(self.corners[a], self.corners[b], self.corners[c]);
            // Keep normals pointing into the volume regardless of handedness
            *plane = if p.distance_to_point(centroid) < 0.0 { p.flipped() } else { p };
        }
    }

    /// World-space corners (same indexing as the NDC cube corners)
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Classify an AABB against all six planes.
    ///
    /// The first plane with the box entirely behind it returns `Outside`.
    pub fn classify_aabb(&self, min: Vec3, max: Vec3) -> Containment {
        let mut result = Containment::Inside;

        for plane in &self.planes {
            let n = plane.normal;
            // Corner furthest along the normal (p-vertex) and its opposite (n-vertex)
            let p = Vec3::new(
                if n.x >= 0.0 { max.x } else { min.x },
                if n.y >= 0.0 { max.y } else { min.y },
                if n.z >= 0.0 { max.z } else { min.z },
            );
            let q = Vec3::new(
                if n.x >= 0.0 { min.x } else { max.x },
                if n.y >= 0.0 { min.y } else { max.y },
                if n.z >= 0.0 { min.z } else { max.z },
            );

            if plane.distance_to_point(p) < 0.0 {
                return Containment::Outside;
            }
            if plane.distance_to_point(q) < 0.0 {
                result = Containment::Intersecting;
            }
        }

        result
    }

    /// Check if AABB intersects frustum (conservative test)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.classify_aabb(aabb.min, aabb.max) != Containment::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gl_frustum() -> Frustum {
        let proj = Mat4::perspective_rh_gl(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        Frustum::from_view_projection(&(proj * view), DepthRange::NegOneToOne)
    }

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vec3::Y, 0.0); // XZ plane
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)), 5.0);
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, -3.0, 0.0)), -3.0);
    }

    #[test]
    fn test_plane_from_point_normal() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        assert_eq!(plane.distance_to_point(Vec3::new(7.0, 2.0, -1.0)), 0.0);
        assert_eq!(plane.origin(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_corners_unprojected() {
        let frustum = gl_frustum();
        // Near plane corners sit at z = -0.1, far at z = -100
        for c in &frustum.corners()[0..4] {
            assert!((c.z + 0.1).abs() < 1e-4, "near corner {c:?}");
        }
        for c in &frustum.corners()[4..8] {
            assert!((c.z + 100.0).abs() < 0.1, "far corner {c:?}");
        }
    }

    #[test]
    fn test_frustum_contains_point() {
        let frustum = gl_frustum();
        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -5.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_classify_inside() {
        let frustum = gl_frustum();
        let c = frustum.classify_aabb(Vec3::new(-1.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0));
        assert_eq!(c, Containment::Inside);
        assert_eq!(c.code(), -1);
    }

    #[test]
    fn test_classify_outside() {
        let frustum = gl_frustum();
        let behind = frustum.classify_aabb(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(behind, Containment::Outside);
        assert_eq!(behind.code(), 1);

        let beyond_far = frustum.classify_aabb(Vec3::new(-1.0, -1.0, -200.0), Vec3::new(1.0, 1.0, -150.0));
        assert_eq!(beyond_far, Containment::Outside);
    }

    #[test]
    fn test_classify_intersecting() {
        let frustum = gl_frustum();
        // Box containing the camera straddles the near plane
        let c = frustum.classify_aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(c, Containment::Intersecting);
        assert_eq!(c.code(), 0);
    }

    #[test]
    fn test_zero_to_one_depth() {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
        let frustum = Frustum::from_view_projection(&proj, DepthRange::ZeroToOne);
        assert!(frustum.intersects_aabb(&Aabb::new(Vec3::new(-1.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0))));
        assert!(!frustum.intersects_aabb(&Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 10.0))));
        for plane in &frustum.planes {
            assert!((plane.normal.length() - 1.0).abs() < 1e-4, "plane normal should be normalized");
        }
    }
}
