//! Input model handed over by the asset/animation side.
//!
//! A model is already loaded and posed: per-node world matrices, per-primitive
//! interleaved vertex bytes with a described layout, and material identities.

pub mod layout;
pub mod material;

pub use layout::{AttributeSemantic, ChannelFlags, ChannelFormat, VertexAttribute, VertexLayout};
pub use material::{AlphaMode, CullFace, Material, MaterialKey, TextureId, NO_TEXTURE};

use bytemuck::pod_read_unaligned;

use crate::core::error::Error;
use crate::core::types::{Mat4, Result, Vec3};
use crate::geometry::{IndexBuffer, Topology};
use crate::math::Aabb;

/// One source draw: vertices, optional indices and a material reference
#[derive(Clone, Debug)]
pub struct SourcePrimitive {
    /// Index into `Model::nodes`
    pub node: usize,
    /// Index into `Model::materials`
    pub material: usize,
    pub layout: VertexLayout,
    pub vertices: Vec<u8>,
    /// None for non-indexed geometry
    pub indices: Option<IndexBuffer>,
    pub topology: Topology,
}

impl SourcePrimitive {
    /// Indexed triangle list
    pub fn new(node: usize, material: usize, layout: VertexLayout, vertices: Vec<u8>, indices: IndexBuffer) -> Self {
        Self {
            node,
            material,
            layout,
            vertices,
            indices: Some(indices),
            topology: Topology::Triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.layout.vertex_count(self.vertices.len())
    }

    fn element_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertex_count(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.element_count() / 3
    }

    /// Vertex indices of triangle `t`
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        match &self.indices {
            Some(indices) => [indices.get(base), indices.get(base + 1), indices.get(base + 2)],
            None => [base as u32, base as u32 + 1, base as u32 + 2],
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).map(|t| self.triangle(t))
    }

    /// Check layout, topology and index ranges
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if self.topology != Topology::Triangles {
            return Err(Error::config(format!("unsupported topology {:?}", self.topology)));
        }
        if self.vertices.len() % self.layout.stride as usize != 0 {
            return Err(Error::config(format!(
                "vertex buffer of {} bytes is not a multiple of stride {}",
                self.vertices.len(),
                self.layout.stride
            )));
        }
        if self.element_count() % 3 != 0 {
            return Err(Error::config(format!(
                "{} indices do not form whole triangles",
                self.element_count()
            )));
        }
        if let Some(indices) = &self.indices {
            let vertex_count = self.vertex_count() as u32;
            if let Some(bad) = indices.iter().find(|&i| i >= vertex_count) {
                return Err(Error::config(format!(
                    "index {} out of range for {} vertices",
                    bad, vertex_count
                )));
            }
        }
        Ok(())
    }

    /// Position of vertex `i` in model space
    pub fn position(&self, i: usize) -> Option<Vec3> {
        let attr = self.layout.position()?;
        let start = i * self.layout.stride as usize + attr.offset as usize;
        let raw = self.vertices.get(start..start + 12)?;
        Some(Vec3::new(
            pod_read_unaligned::<f32>(&raw[0..4]),
            pod_read_unaligned::<f32>(&raw[4..8]),
            pod_read_unaligned::<f32>(&raw[8..12]),
        ))
    }

    /// Bounds of all vertex positions in model space
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points((0..self.vertex_count()).filter_map(|i| self.position(i)))
    }
}

/// A posed model: node world matrices, materials and source primitives
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub nodes: Vec<Mat4>,
    pub materials: Vec<Material>,
    pub primitives: Vec<SourcePrimitive>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node transform, returning its index
    pub fn add_node(&mut self, transform: Mat4) -> usize {
        self.nodes.push(transform);
        self.nodes.len() - 1
    }

    /// Add a material, returning its index
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a primitive, returning its index
    pub fn add_primitive(&mut self, primitive: SourcePrimitive) -> usize {
        self.primitives.push(primitive);
        self.primitives.len() - 1
    }

    /// Material of a primitive
    pub fn material_of(&self, primitive: &SourcePrimitive) -> Result<&Material> {
        self.materials.get(primitive.material).ok_or_else(|| {
            Error::config(format!("material {} does not exist", primitive.material))
        })
    }

    /// `world * node` matrix of a primitive
    pub fn world_matrix(&self, world: &Mat4, primitive: &SourcePrimitive) -> Result<Mat4> {
        let node = self.nodes.get(primitive.node).ok_or_else(|| {
            Error::config(format!("node {} does not exist", primitive.node))
        })?;
        Ok(*world * *node)
    }

    /// World-space bounds of every primitive (EMPTY for primitives with a bad node)
    pub fn primitive_bounds(&self, world: &Mat4) -> Vec<Aabb> {
        self.primitives
            .iter()
            .map(|p| match self.world_matrix(world, p) {
                Ok(m) => p.local_bounds().transformed(&m),
                Err(_) => Aabb::EMPTY,
            })
            .collect()
    }

    /// Union of all primitive bounds in world space
    pub fn world_bounds(&self, world: &Mat4) -> Aabb {
        self.primitive_bounds(world)
            .iter()
            .filter(|b| b.is_valid())
            .fold(Aabb::EMPTY, |acc, b| acc.merged(b))
    }

    /// Total number of source triangles
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(SourcePrimitive::triangle_count).sum()
    }
}

/// UV sphere with position, normal and texcoord channels, for tests and benchmarks.
///
/// `segments` rings from pole to pole and `2 * segments` sectors around.
pub fn create_test_sphere(segments: u32, radius: f32, material: Material) -> Model {
    let segments = segments.max(2);
    let sectors = segments * 2;
    let layout = VertexLayout::packed(&[
        (AttributeSemantic::Position, ChannelFormat::F32, 3),
        (AttributeSemantic::Normal, ChannelFormat::F32, 3),
        (AttributeSemantic::TexCoord, ChannelFormat::F32, 2),
    ]);

    let mut vertices: Vec<f32> = Vec::new();
    for ring in 0..=segments {
        let v = ring as f32 / segments as f32;
        let theta = v * std::f32::consts::PI;
        for sector in 0..=sectors {
            let u = sector as f32 / sectors as f32;
            let phi = u * std::f32::consts::TAU;
            let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            vertices.extend_from_slice(&(normal * radius).to_array());
            vertices.extend_from_slice(&normal.to_array());
            vertices.extend_from_slice(&[u, v]);
        }
    }

    let row = sectors + 1;
    let mut indices: Vec<u32> = Vec::new();
    for ring in 0..segments {
        for sector in 0..sectors {
            let a = ring * row + sector;
            let b = a + row;
            if ring != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if ring != segments - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }
    let vertex_count = (segments + 1) * row;
    let indices = if vertex_count <= u16::MAX as u32 + 1 {
        IndexBuffer::from_u16(&indices.iter().map(|&i| i as u16).collect::<Vec<_>>())
    } else {
        IndexBuffer::from_u32(&indices)
    };

    let mut model = Model::new();
    let node = model.add_node(Mat4::IDENTITY);
    let material = model.add_material(material);
    model.add_primitive(SourcePrimitive::new(
        node,
        material,
        layout,
        bytemuck::cast_slice(&vertices).to_vec(),
        indices,
    ));
    model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions_only(points: &[[f32; 3]]) -> (VertexLayout, Vec<u8>) {
        let layout = VertexLayout::packed(&[(AttributeSemantic::Position, ChannelFormat::F32, 3)]);
        let bytes = bytemuck::cast_slice(points).to_vec();
        (layout, bytes)
    }

    #[test]
    fn test_validate_and_triangles() {
        let (layout, bytes) = positions_only(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let prim = SourcePrimitive::new(0, 0, layout, bytes, IndexBuffer::from_u16(&[0, 1, 2]));
        assert!(prim.validate().is_ok());
        assert_eq!(prim.triangle_count(), 1);
        assert_eq!(prim.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let (layout, bytes) = positions_only(&[[0.0; 3], [1.0; 3], [2.0; 3]]);
        let prim = SourcePrimitive::new(0, 0, layout, bytes, IndexBuffer::from_u16(&[0, 1, 3]));
        assert!(matches!(prim.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_topology() {
        let (layout, bytes) = positions_only(&[[0.0; 3], [1.0; 3], [2.0; 3]]);
        let mut prim = SourcePrimitive::new(0, 0, layout, bytes, IndexBuffer::from_u16(&[0, 1, 2]));
        prim.topology = Topology::Lines;
        assert!(prim.validate().is_err());
    }

    #[test]
    fn test_non_indexed_triangles() {
        let (layout, bytes) = positions_only(&[[0.0; 3]; 6]);
        let prim = SourcePrimitive {
            node: 0,
            material: 0,
            layout,
            vertices: bytes,
            indices: None,
            topology: Topology::Triangles,
        };
        assert_eq!(prim.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn test_create_test_sphere() {
        let model = create_test_sphere(8, 2.0, Material::default());
        let prim = &model.primitives[0];
        assert!(prim.validate().is_ok());
        assert_eq!(prim.vertex_count(), 9 * 17);
        // Pole rows emit one triangle per sector, the others two
        assert_eq!(prim.triangle_count(), 16 * (2 * 8 - 2));
        let bounds = model.world_bounds(&Mat4::IDENTITY);
        assert!((bounds.max.y - 2.0).abs() < 1e-5);
        assert!((bounds.min.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_world_bounds_uses_node_transform() {
        let (layout, bytes) = positions_only(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let mut model = Model::new();
        model.add_node(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        model.add_material(Material::default());
        model.add_primitive(SourcePrimitive::new(0, 0, layout, bytes, IndexBuffer::from_u16(&[0, 1, 2])));

        let bounds = model.world_bounds(&Mat4::IDENTITY);
        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 0.0));
    }
}
