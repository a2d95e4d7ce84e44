//! Cell-local render primitive produced by clipping

use crate::core::types::Vec3;
use crate::geometry::{ChannelSet, IndexBuffer, IndexType, Topology};
use crate::math::Aabb;
use crate::model::{ChannelFlags, CullFace, Material, MaterialKey, VertexLayout};

/// Which index orders are emitted for every accepted triangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    /// Source order, for back-face culling
    Source,
    /// Reversed order, for front-face culling
    Reversed,
    /// Both orders, for double-sided or unculled materials
    Both,
}

impl Winding {
    pub fn for_material(material: &Material) -> Self {
        if material.emits_both_windings() {
            return Self::Both;
        }
        match material.cull_face {
            CullFace::Front => Self::Reversed,
            _ => Self::Source,
        }
    }
}

/// Clipped geometry of one (layout, material) pair inside one cell
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub layout: VertexLayout,
    /// Interleaved world-space vertices
    pub vertices: Vec<u8>,
    pub indices: IndexBuffer,
    pub topology: Topology,
    pub material: Material,
    pub min: Vec3,
    pub max: Vec3,
    pub channels: ChannelFlags,
    pub material_key: MaterialKey,
    pub vertex_count: u32,
    /// Indexed triangles, both windings counted
    pub triangle_count: u32,
}

impl Primitive {
    pub fn new(layout: VertexLayout, material: Material, index_type: IndexType) -> Self {
        let bounds = Aabb::EMPTY;
        Self {
            channels: layout.channel_flags(),
            material_key: MaterialKey::from_material(&material),
            layout,
            vertices: Vec::new(),
            indices: IndexBuffer::new(index_type),
            topology: Topology::Triangles,
            material,
            min: bounds.min,
            max: bounds.max,
            vertex_count: 0,
            triangle_count: 0,
        }
    }

    /// True when this primitive accepts geometry of `layout` shaded by `material`
    pub fn matches(&self, layout: &VertexLayout, material: &Material) -> bool {
        self.layout.stride == layout.stride
            && self.layout.attributes.len() == layout.attributes.len()
            && self
                .layout
                .attributes
                .iter()
                .zip(&layout.attributes)
                .all(|(a, b)| {
                    a.semantic == b.semantic
                        && a.format == b.format
                        && a.components == b.components
                        && a.offset == b.offset
                })
            && self.material.same_shading(material)
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0 || self.indices.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    pub fn index_type(&self) -> IndexType {
        self.indices.index_type()
    }

    /// Append triangle `corners` of `polygon`, emitting the index orders of `winding`.
    ///
    /// Returns the number of indexed triangles added.
    pub fn append_triangle(&mut self, polygon: &ChannelSet, corners: [usize; 3], winding: Winding) -> u32 {
        let base = self.vertex_count;
        for &c in &corners {
            polygon.write_vertex(&self.layout, c, &mut self.vertices);
            let p = polygon.position(c);
            self.min = self.min.min(p);
            self.max = self.max.max(p);
        }
        self.vertex_count += 3;

        let (a, b, c) = (base, base + 1, base + 2);
        let added = match winding {
            Winding::Source => {
                self.push_indices([a, b, c]);
                1
            }
            Winding::Reversed => {
                self.push_indices([a, c, b]);
                1
            }
            Winding::Both => {
                self.push_indices([a, b, c]);
                self.push_indices([a, c, b]);
                2
            }
        };
        self.triangle_count += added;
        added
    }

    fn push_indices(&mut self, indices: [u32; 3]) {
        for i in indices {
            self.indices.push(i);
        }
    }

    /// Bytes held by vertex and index buffers
    pub fn byte_size(&self) -> usize {
        self.vertices.len() + self.indices.bytes().len()
    }
}
