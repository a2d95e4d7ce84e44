//! Sutherland–Hodgman polygon clipping against cell half-spaces

use crate::core::types::Vec3;
use crate::math::Plane;
use super::channel::ChannelSet;

/// Vertices closer than this behind a plane still count as inside
pub const CLIP_EPSILON: f32 = 1e-6;

/// The 6 inward-facing half-spaces of an axis-aligned box: -x, +x, -y, +y, -z, +z faces
pub fn box_half_spaces(min: Vec3, max: Vec3) -> [Plane; 6] {
    [
        Plane::from_point_normal(min, Vec3::X),
        Plane::from_point_normal(max, Vec3::NEG_X),
        Plane::from_point_normal(min, Vec3::Y),
        Plane::from_point_normal(max, Vec3::NEG_Y),
        Plane::from_point_normal(min, Vec3::Z),
        Plane::from_point_normal(max, Vec3::NEG_Z),
    ]
}

/// Inclusive test of all three corners against the box
pub fn triangle_inside_aabb(a: Vec3, b: Vec3, c: Vec3, min: Vec3, max: Vec3) -> bool {
    [a, b, c]
        .iter()
        .all(|p| p.cmpge(min).all() && p.cmple(max).all())
}

/// Clip a convex polygon against each half-space in turn.
///
/// Returns the clipped polygon; fewer than 3 vertices means nothing survived.
pub fn clip_polygon(polygon: &ChannelSet, planes: &[Plane]) -> ChannelSet {
    let mut current = polygon.clone();
    let mut scratch = polygon.empty_like();
    let mut distances = Vec::with_capacity(polygon.len() + planes.len());

    for plane in planes {
        if current.len() < 3 {
            current.clear();
            break;
        }
        clip_against_plane(&current, plane, &mut scratch, &mut distances);
        std::mem::swap(&mut current, &mut scratch);
    }

    if current.len() < 3 {
        current.clear();
    }
    current
}

/// One Sutherland–Hodgman pass; `output` is cleared first
fn clip_against_plane(input: &ChannelSet, plane: &Plane, output: &mut ChannelSet, distances: &mut Vec<f32>) {
    output.clear();
    let n = input.len();

    distances.clear();
    distances.extend((0..n).map(|i| plane.distance_to_point(input.position(i))));

    if distances.iter().all(|&d| d >= -CLIP_EPSILON) {
        for i in 0..n {
            output.push_copy(input, i);
        }
        return;
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let (di, dj) = (distances[i], distances[j]);
        let i_inside = di >= -CLIP_EPSILON;
        let j_inside = dj >= -CLIP_EPSILON;

        if i_inside {
            output.push_copy(input, i);
        }
        // A crossing whose inside end lies on the plane would only duplicate that vertex
        if i_inside != j_inside && di.max(dj) > CLIP_EPSILON {
            let t = di / (di - dj);
            output.push_lerp(input, i, j, t);
        }
    }
}

/// Fan triangulation of an n-gon from vertex 0
pub fn fan_triangles(count: usize) -> impl Iterator<Item = [usize; 3]> {
    (1..count.saturating_sub(1)).map(|i| [0, i, i + 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layout::{AttributeSemantic, ChannelFormat, VertexLayout};

    fn layout() -> VertexLayout {
        VertexLayout::packed(&[
            (AttributeSemantic::Position, ChannelFormat::F32, 3),
            (AttributeSemantic::TexCoord, ChannelFormat::F32, 2),
        ])
    }

    fn triangle(verts: [([f32; 3], [f32; 2]); 3]) -> ChannelSet {
        let layout = layout();
        let mut bytes = Vec::new();
        for (p, uv) in verts {
            bytes.extend_from_slice(bytemuck::cast_slice(&p));
            bytes.extend_from_slice(bytemuck::cast_slice(&uv));
        }
        let mut set = ChannelSet::for_layout(&layout).expect("valid layout");
        for i in 0..3 {
            set.gather(&layout, &bytes, i).expect("vertex in range");
        }
        set
    }

    #[test]
    fn test_inside_triangle_unchanged() {
        let tri = triangle([
            ([0.1, 0.1, 0.5], [0.0, 0.0]),
            ([0.9, 0.1, 0.5], [1.0, 0.0]),
            ([0.5, 0.9, 0.5], [0.5, 1.0]),
        ]);
        let planes = box_half_spaces(Vec3::ZERO, Vec3::ONE);
        let clipped = clip_polygon(&tri, &planes);
        assert_eq!(clipped, tri);
    }

    #[test]
    fn test_outside_triangle_rejected() {
        let tri = triangle([
            ([2.0, 0.1, 0.5], [0.0, 0.0]),
            ([3.0, 0.1, 0.5], [1.0, 0.0]),
            ([2.5, 0.9, 0.5], [0.5, 1.0]),
        ]);
        let planes = box_half_spaces(Vec3::ZERO, Vec3::ONE);
        assert!(clip_polygon(&tri, &planes).is_empty());
    }

    #[test]
    fn test_clip_interpolates_uv() {
        // Edge from x = -1 to x = 1 crosses the x = 0 plane at t = 0.5
        let tri = triangle([
            ([-1.0, 0.2, 0.5], [0.0, 0.0]),
            ([1.0, 0.2, 0.5], [1.0, 0.5]),
            ([0.5, 0.8, 0.5], [0.5, 1.0]),
        ]);
        let planes = box_half_spaces(Vec3::ZERO, Vec3::ONE);
        let clipped = clip_polygon(&tri, &planes);
        assert!(clipped.len() >= 3);

        let uv = clipped.channel(AttributeSemantic::TexCoord).expect("uv channel");
        let mut found = false;
        for i in 0..clipped.len() {
            let p = clipped.position(i);
            assert!(p.x >= -CLIP_EPSILON, "vertex {p:?} outside the x = 0 plane");
            if p.x.abs() < 1e-6 && (p.y - 0.2).abs() < 1e-6 {
                // lerp((0,0), (1,0.5), 0.5)
                assert_eq!(uv.component(i, 0), Some(0.5));
                assert_eq!(uv.component(i, 1), Some(0.25));
                found = true;
            }
        }
        assert!(found, "expected a synthesized vertex on the x = 0 edge crossing");
    }

    #[test]
    fn test_clip_corner_makes_polygon() {
        // Triangle poking through two faces yields more than 3 vertices
        let tri = triangle([
            ([0.5, 0.5, 0.5], [0.0, 0.0]),
            ([1.5, 0.5, 0.5], [1.0, 0.0]),
            ([0.5, 1.5, 0.5], [0.0, 1.0]),
        ]);
        let planes = box_half_spaces(Vec3::ZERO, Vec3::ONE);
        let clipped = clip_polygon(&tri, &planes);
        assert_eq!(clipped.len(), 4);
        assert_eq!(fan_triangles(clipped.len()).count(), 2);
    }

    #[test]
    fn test_fan_triangles() {
        assert_eq!(fan_triangles(5).collect::<Vec<_>>(), vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
        assert_eq!(fan_triangles(2).count(), 0);
        assert_eq!(fan_triangles(0).count(), 0);
    }

    #[test]
    fn test_inside_aabb_inclusive() {
        assert!(triangle_inside_aabb(Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::ZERO, Vec3::ONE));
        assert!(!triangle_inside_aabb(Vec3::ZERO, Vec3::X * 1.5, Vec3::ONE, Vec3::ZERO, Vec3::ONE));
    }
}
