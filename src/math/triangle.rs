//! Triangle queries: box overlap (separating axes) and closest point

use crate::core::types::Vec3;

/// Slack for boundary contact, relative to the box half extent
const SAT_EPSILON: f32 = 1e-5;

/// Triangle vs. axis-aligned box overlap using the separating axis theorem.
///
/// Tests the 3 box face normals, the triangle normal and the 9 cross products
/// of box axes with triangle edges. Touching counts as overlapping.
pub fn triangle_intersects_aabb(a: Vec3, b: Vec3, c: Vec3, min: Vec3, max: Vec3) -> bool {
    let center = (min + max) * 0.5;
    let half = (max - min) * 0.5;
    let eps = SAT_EPSILON * half.max_element().max(1.0);

    // Work relative to the box center
    let v0 = a - center;
    let v1 = b - center;
    let v2 = c - center;

    // Box face normals: plain interval overlap per axis
    let tri_min = v0.min(v1).min(v2);
    let tri_max = v0.max(v1).max(v2);
    if tri_min.cmpgt(half + eps).any() || tri_max.cmplt(-half - eps).any() {
        return false;
    }

    let e0 = v1 - v0;
    let e1 = v2 - v1;
    let e2 = v0 - v2;

    // Triangle normal
    let normal = e0.cross(e1);
    if normal.length_squared() > 0.0 {
        let r = half.dot(normal.abs());
        let s = normal.dot(v0);
        if s.abs() > r + eps * normal.length() {
            return false;
        }
    }

    // Edge cross products
    let axes = [Vec3::X, Vec3::Y, Vec3::Z];
    for edge in [e0, e1, e2] {
        for box_axis in axes {
            let axis = box_axis.cross(edge);
            let len_sq = axis.length_squared();
            if len_sq <= f32::EPSILON * f32::EPSILON {
                continue;
            }
            let p0 = axis.dot(v0);
            let p1 = axis.dot(v1);
            let p2 = axis.dot(v2);
            let r = half.dot(axis.abs());
            let lo = p0.min(p1).min(p2);
            let hi = p0.max(p1).max(p2);
            let slack = eps * len_sq.sqrt();
            if lo > r + slack || hi < -r - slack {
                return false;
            }
        }
    }

    true
}

/// Twice the triangle area
pub fn double_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length()
}

/// Unit face normal following the a -> b -> c winding (zero for degenerate triangles)
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Closest point on triangle `abc` to `p` (Ericson, Real-Time Collision Detection 5.1.5)
pub fn closest_point(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Vec3 = Vec3::splat(-1.0);
    const MAX: Vec3 = Vec3::splat(1.0);

    #[test]
    fn test_triangle_inside_box() {
        assert!(triangle_intersects_aabb(
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            MIN, MAX,
        ));
    }

    #[test]
    fn test_triangle_far_away() {
        assert!(!triangle_intersects_aabb(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(6.0, 5.0, 5.0),
            Vec3::new(5.0, 6.0, 5.0),
            MIN, MAX,
        ));
    }

    #[test]
    fn test_triangle_spanning_box() {
        // Big triangle whose vertices are all outside but which cuts through the box
        assert!(triangle_intersects_aabb(
            Vec3::new(-10.0, -10.0, 0.0),
            Vec3::new(10.0, -10.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            MIN, MAX,
        ));
    }

    #[test]
    fn test_triangle_separated_by_plane_axis() {
        // Bounding intervals overlap on all three box axes, but the triangle's
        // plane (x + y = 2.5) passes outside the box corner
        assert!(!triangle_intersects_aabb(
            Vec3::new(2.5, 0.0, 0.0),
            Vec3::new(0.0, 2.5, 0.0),
            Vec3::new(0.0, 2.5, 1.0),
            MIN, MAX,
        ));
    }

    #[test]
    fn test_triangle_touching_face() {
        // Lies exactly on the +x face
        assert!(triangle_intersects_aabb(
            Vec3::new(1.0, -0.5, -0.5),
            Vec3::new(1.0, 0.5, -0.5),
            Vec3::new(1.0, 0.0, 0.5),
            MIN, MAX,
        ));
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;
        // Above the face
        assert_eq!(closest_point(Vec3::new(0.25, 0.25, 1.0), a, b, c), Vec3::new(0.25, 0.25, 0.0));
        // Vertex region
        assert_eq!(closest_point(Vec3::new(-1.0, -1.0, 0.0), a, b, c), a);
        // Edge region ab
        assert_eq!(closest_point(Vec3::new(0.5, -1.0, 0.0), a, b, c), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_face_normal_winding() {
        assert_eq!(face_normal(Vec3::ZERO, Vec3::X, Vec3::Y), Vec3::Z);
        assert_eq!(face_normal(Vec3::ZERO, Vec3::Y, Vec3::X), Vec3::NEG_Z);
        assert_eq!(face_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0), Vec3::ZERO);
    }
}
