//! Per-cell mesh splitting.
//!
//! Every candidate source primitive is transformed to world space, clipped
//! against the cell box and appended to a cell-local primitive shared by all
//! sources with the same layout and shading.

use log::debug;

use crate::core::types::{Mat3, Mat4, Result, Vec3};
use crate::geometry::{ChannelSet, IndexType, clip_polygon, fan_triangles, triangle_inside_aabb};
use crate::math::Aabb;
use crate::math::triangle::{double_area, triangle_intersects_aabb};
use crate::model::{Material, Model, SourcePrimitive, VertexLayout};
use crate::core::error::Error;
use super::cell::Cell;
use super::primitive::{Primitive, Winding};

/// Clipped fan triangles with a smaller doubled area are dropped
pub const MIN_DOUBLE_AREA: f32 = 1e-12;

/// A validated source primitive resolved to world space
#[derive(Clone, Debug)]
pub struct PreparedPrimitive {
    /// Index into `Model::primitives`
    pub source: usize,
    pub matrix: Mat4,
    /// Inverse transpose of the upper 3x3 of `matrix`
    pub normal_matrix: Mat3,
    pub bounds: Aabb,
    pub material: Material,
}

impl PreparedPrimitive {
    pub fn prepare(model: &Model, world: &Mat4, source: usize) -> Result<Self> {
        let primitive = model
            .primitives
            .get(source)
            .ok_or_else(|| Error::config(format!("primitive {} does not exist", source)))?;
        primitive.validate()?;
        let material = *model.material_of(primitive)?;
        let matrix = model.world_matrix(world, primitive)?;
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        if !normal_matrix.is_finite() {
            return Err(Error::config(format!("primitive {} has a singular transform", source)));
        }
        Ok(Self {
            source,
            matrix,
            normal_matrix,
            bounds: primitive.local_bounds().transformed(&matrix),
            material,
        })
    }

    pub fn is_transparent(&self) -> bool {
        self.material.is_transparent()
    }
}

/// Shared read-only inputs of every cell split
pub struct SplitContext<'a> {
    pub model: &'a Model,
    /// Indexed by source primitive; None for skipped primitives
    pub prepared: &'a [Option<PreparedPrimitive>],
    pub collisions: bool,
}

impl<'a> SplitContext<'a> {
    fn resolve(&self, candidate: u32) -> Option<(&'a SourcePrimitive, &'a PreparedPrimitive)> {
        let prepared = self.prepared.get(candidate as usize)?.as_ref()?;
        let source = self.model.primitives.get(prepared.source)?;
        Some((source, prepared))
    }
}

/// Cell-local primitives of one pass
#[derive(Clone, Debug, Default)]
pub struct MeshSplit {
    /// May contain primitives that ended empty
    pub primitives: Vec<Primitive>,
    /// Accepted geometric triangles
    pub triangle_count: u32,
}

/// Result of splitting one cell
#[derive(Clone, Debug, Default)]
pub struct CellSplit {
    pub opaque: MeshSplit,
    pub transparent: MeshSplit,
    /// Collision triangles, only collected when requested
    pub triangles: Vec<[Vec3; 3]>,
}

/// Split both candidate lists of a cell
pub fn split_cell(cell: &Cell, ctx: &SplitContext) -> Result<CellSplit> {
    let mut triangles = Vec::new();
    let opaque = split_meshes(cell, &cell.opaque_primitives, ctx, &mut triangles)?;
    let transparent = split_meshes(cell, &cell.transparent_primitives, ctx, &mut triangles)?;
    debug!(
        "Cell {} (level {}): {} opaque / {} transparent triangles in {} + {} primitives",
        cell.index.0,
        cell.level,
        opaque.triangle_count,
        transparent.triangle_count,
        opaque.primitives.len(),
        transparent.primitives.len()
    );
    Ok(CellSplit {
        opaque,
        transparent,
        triangles,
    })
}

/// Clip every triangle of `candidates` against the cell box.
///
/// Accepted triangles land in the cell-local primitive matching their layout
/// and material; with collisions enabled each one is also pushed to `triangles`.
pub fn split_meshes(
    cell: &Cell,
    candidates: &[u32],
    ctx: &SplitContext,
    triangles: &mut Vec<[Vec3; 3]>,
) -> Result<MeshSplit> {
    let mut split = MeshSplit::default();
    let cell_box = cell.aabb();

    for &candidate in candidates {
        let Some((source, prepared)) = ctx.resolve(candidate) else {
            continue;
        };
        if !prepared.bounds.intersects(&cell_box) {
            continue;
        }

        let index_type = source.indices.as_ref().map(|i| i.index_type()).unwrap_or_default();
        let slot = primitive_index(&mut split.primitives, &source.layout, &prepared.material, index_type);
        let winding = Winding::for_material(&prepared.material);
        let mut triangle = ChannelSet::for_layout(&source.layout)?;

        for corners in source.triangles() {
            triangle.clear();
            for &vertex in &corners {
                triangle.gather(&source.layout, &source.vertices, vertex as usize)?;
            }
            triangle.transform(&prepared.matrix, &prepared.normal_matrix);

            let (a, b, c) = (triangle.position(0), triangle.position(1), triangle.position(2));
            if triangle_inside_aabb(a, b, c, cell.min, cell.max) {
                split.primitives[slot].append_triangle(&triangle, [0, 1, 2], winding);
                split.triangle_count += 1;
                if ctx.collisions {
                    triangles.push([a, b, c]);
                }
                continue;
            }

            if !Aabb::from_points([a, b, c]).intersects(&cell_box) {
                continue;
            }
            let polygon = clip_polygon(&triangle, &cell.planes);
            for fan in fan_triangles(polygon.len()) {
                let [pa, pb, pc] = fan.map(|i| polygon.position(i));
                if double_area(pa, pb, pc) <= MIN_DOUBLE_AREA {
                    continue;
                }
                if !triangle_intersects_aabb(pa, pb, pc, cell.min, cell.max) {
                    continue;
                }
                split.primitives[slot].append_triangle(&polygon, fan, winding);
                split.triangle_count += 1;
                if ctx.collisions {
                    triangles.push([pa, pb, pc]);
                }
            }
        }
    }

    Ok(split)
}

/// Find the cell-local primitive for (layout, material), creating it if needed
pub fn primitive_index(
    primitives: &mut Vec<Primitive>,
    layout: &VertexLayout,
    material: &Material,
    index_type: IndexType,
) -> usize {
    if let Some(i) = primitives.iter().position(|p| p.matches(layout, material)) {
        return i;
    }
    primitives.push(Primitive::new(layout.clone(), *material, index_type));
    primitives.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IndexBuffer;
    use crate::model::{AttributeSemantic, ChannelFormat, CullFace};
    use crate::octree::CellIndex;

    fn layout() -> VertexLayout {
        VertexLayout::packed(&[
            (AttributeSemantic::Position, ChannelFormat::F32, 3),
            (AttributeSemantic::TexCoord, ChannelFormat::F32, 2),
        ])
    }

    fn model_with(triangles: &[[[f32; 3]; 3]], material: Material) -> Model {
        let layout = layout();
        let mut bytes = Vec::new();
        let mut indices = Vec::new();
        for (t, tri) in triangles.iter().enumerate() {
            for (k, p) in tri.iter().enumerate() {
                bytes.extend_from_slice(bytemuck::cast_slice(p));
                bytes.extend_from_slice(bytemuck::cast_slice(&[k as f32, 0.0f32]));
                indices.push((t * 3 + k) as u16);
            }
        }
        let mut model = Model::new();
        model.add_node(Mat4::IDENTITY);
        model.add_material(material);
        model.add_primitive(SourcePrimitive::new(0, 0, layout, bytes, IndexBuffer::from_u16(&indices)));
        model
    }

    fn prepare_all(model: &Model) -> Vec<Option<PreparedPrimitive>> {
        (0..model.primitives.len())
            .map(|i| PreparedPrimitive::prepare(model, &Mat4::IDENTITY, i).ok())
            .collect()
    }

    fn unit_cell() -> Cell {
        Cell::new(CellIndex(0), 0, Vec3::splat(0.5), Vec3::splat(0.5))
    }

    #[test]
    fn test_inside_triangle_fast_path() {
        let model = model_with(&[[[0.1, 0.1, 0.5], [0.9, 0.1, 0.5], [0.5, 0.9, 0.5]]], Material::default());
        let prepared = prepare_all(&model);
        let ctx = SplitContext { model: &model, prepared: &prepared, collisions: true };
        let mut triangles = Vec::new();
        let split = split_meshes(&unit_cell(), &[0], &ctx, &mut triangles).expect("split");

        assert_eq!(split.triangle_count, 1);
        assert_eq!(split.primitives.len(), 1);
        assert_eq!(split.primitives[0].vertex_count, 3);
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0][0], Vec3::new(0.1, 0.1, 0.5));
    }

    #[test]
    fn test_straddling_triangle_is_clipped() {
        let model = model_with(&[[[0.5, 0.5, 0.5], [1.5, 0.5, 0.5], [0.5, 1.5, 0.5]]], Material::default());
        let prepared = prepare_all(&model);
        let ctx = SplitContext { model: &model, prepared: &prepared, collisions: true };
        let mut triangles = Vec::new();
        let cell = unit_cell();
        let split = split_meshes(&cell, &[0], &ctx, &mut triangles).expect("split");

        assert_eq!(split.triangle_count, 2);
        let prim = &split.primitives[0];
        assert!(prim.max.cmple(cell.max + Vec3::splat(1e-5)).all());
        assert!(prim.min.cmpge(cell.min - Vec3::splat(1e-5)).all());
        for tri in &triangles {
            for p in tri {
                assert!(cell.aabb().contains_point(*p) || (p.max_element() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_outside_triangle_creates_no_primitive() {
        let model = model_with(&[[[2.0, 2.0, 2.0], [3.0, 2.0, 2.0], [2.0, 3.0, 2.0]]], Material::default());
        let prepared = prepare_all(&model);
        let ctx = SplitContext { model: &model, prepared: &prepared, collisions: false };
        let mut triangles = Vec::new();
        let split = split_meshes(&unit_cell(), &[0], &ctx, &mut triangles).expect("split");
        assert_eq!(split.triangle_count, 0);
        assert!(split.primitives.is_empty());
        assert!(triangles.is_empty());
    }

    #[test]
    fn test_double_sided_emits_both_windings() {
        let material = Material { cull_face: CullFace::None, ..Default::default() };
        let model = model_with(&[[[0.1, 0.1, 0.5], [0.9, 0.1, 0.5], [0.5, 0.9, 0.5]]], material);
        let prepared = prepare_all(&model);
        let ctx = SplitContext { model: &model, prepared: &prepared, collisions: false };
        let split = split_meshes(&unit_cell(), &[0], &ctx, &mut Vec::new()).expect("split");
        assert_eq!(split.triangle_count, 1);
        assert_eq!(split.primitives[0].triangle_count, 2);
        assert_eq!(split.primitives[0].indices.len(), 6);
    }

    #[test]
    fn test_same_layout_and_material_share_primitive() {
        let mut model = model_with(&[[[0.1, 0.1, 0.5], [0.9, 0.1, 0.5], [0.5, 0.9, 0.5]]], Material::default());
        let again = model.primitives[0].clone();
        model.add_primitive(again);
        let prepared = prepare_all(&model);
        let ctx = SplitContext { model: &model, prepared: &prepared, collisions: false };
        let split = split_meshes(&unit_cell(), &[0, 1], &ctx, &mut Vec::new()).expect("split");
        assert_eq!(split.primitives.len(), 1);
        assert_eq!(split.triangle_count, 2);
        assert_eq!(split.primitives[0].indices.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_node_transform_applied() {
        let mut model = model_with(&[[[0.1, 0.1, 0.5], [0.9, 0.1, 0.5], [0.5, 0.9, 0.5]]], Material::default());
        model.nodes[0] = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let prepared = prepare_all(&model);
        let ctx = SplitContext { model: &model, prepared: &prepared, collisions: false };
        assert_eq!(split_meshes(&unit_cell(), &[0], &ctx, &mut Vec::new()).expect("split").triangle_count, 0);

        let moved = Cell::new(CellIndex(0), 0, Vec3::new(10.5, 0.5, 0.5), Vec3::splat(0.5));
        let split = split_meshes(&moved, &[0], &ctx, &mut Vec::new()).expect("split");
        assert_eq!(split.triangle_count, 1);
        assert!((split.primitives[0].min.x - 10.1).abs() < 1e-5);
    }

    #[test]
    fn test_prepare_rejects_bad_material() {
        let mut model = model_with(&[[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]], Material::default());
        model.primitives[0].material = 5;
        let err = PreparedPrimitive::prepare(&model, &Mat4::IDENTITY, 0).unwrap_err();
        assert!(!err.is_fatal());
    }
}
