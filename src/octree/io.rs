//! Binary octree files.
//!
//! Little-endian scalars in a fixed field order with u64 length prefixes on
//! every sequence, terminated by `FINGERPRINT`. Vertex and index bytes are
//! stored as the raw GPU-ready buffers. Collision arrays, planes and points
//! are only written with `OctreeOptions::COLLISIONS`, vertex and index bytes
//! only with `OctreeOptions::GRAPHICS`; otherwise empty sequences keep the
//! stream shape unchanged.
//!
//! The option bits used for writing are stored as one u32 between the
//! primitives and the fingerprint, so a reader learns which ranges were
//! dropped without inspecting them.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use log::info;

use super::config::OctreeOptions;
use crate::core::error::Error;
use crate::core::types::{Mat4, Result, Vec3, Vec4};
use crate::geometry::{IndexBuffer, IndexType, Topology};
use crate::math::Plane;
use crate::model::{
    AlphaMode, AttributeSemantic, ChannelFlags, ChannelFormat, CullFace, Material, MaterialKey, VertexAttribute,
    VertexLayout,
};
use super::cell::Cell;
use super::primitive::Primitive;
use super::{CellIndex, CellLayout, Octree, PrimitiveIndex};

/// Trailing constant of every octree file ("OCTCULL1")
pub const FINGERPRINT: u64 = 0x4F43_5443_554C_4C31;

/// Longest sequence accepted when reading
const MAX_SEQUENCE_LEN: u64 = 1 << 32;

impl Octree {
    /// Write the octree to `path`
    pub fn save(&self, path: impl AsRef<Path>, options: OctreeOptions) -> Result<()> {
        let start = Instant::now();
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, options)?;
        writer.flush()?;
        info!(
            "Saved octree to {}: {} cells, {} primitives in {:.2?}",
            path.as_ref().display(),
            self.cells.len(),
            self.primitives.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// Read an octree from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let start = Instant::now();
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let octree = Self::read_from(&mut reader)?;
        info!(
            "Loaded octree from {}: {} cells, {} primitives in {:.2?}",
            path.as_ref().display(),
            octree.cells.len(),
            octree.primitives.len(),
            start.elapsed()
        );
        Ok(octree)
    }

    /// Save, read the file back and compare every persisted field
    pub fn save_verified(&self, path: impl AsRef<Path>, options: OctreeOptions) -> Result<()> {
        self.save(path.as_ref(), options)?;
        let loaded = Self::load(path.as_ref())?;
        let diffs = verify_round_trip(self, &loaded);
        if !diffs.is_empty() {
            return Err(Error::invariant(format!(
                "round trip of {} differs: {}",
                path.as_ref().display(),
                diffs.join("; ")
            )));
        }
        Ok(())
    }

    /// Serialize to any writer
    pub fn write_to(&self, writer: &mut impl Write, options: OctreeOptions) -> Result<()> {
        if options.0 & !OctreeOptions::ALL.0 != 0 {
            return Err(Error::config(format!("unknown option bits {:#x}", options.0)));
        }

        write_vec3(writer, self.center)?;
        write_vec3(writer, self.size)?;
        write_vec3(writer, self.min)?;
        write_vec3(writer, self.max)?;
        write_u32(writer, self.max_level)?;
        write_mat4(writer, &self.world)?;

        write_len(writer, self.transforms.len())?;
        for transform in &self.transforms {
            write_mat4(writer, transform)?;
        }

        write_len(writer, self.cells.len())?;
        for cell in &self.cells {
            write_cell(writer, cell, options)?;
        }

        write_len(writer, self.primitives.len())?;
        for primitive in &self.primitives {
            write_vec3(writer, primitive.min)?;
            write_vec3(writer, primitive.max)?;
        }

        write_len(writer, self.primitives.len())?;
        for primitive in &self.primitives {
            write_primitive(writer, primitive, options)?;
        }

        write_u32(writer, options.0)?;
        write_u64(writer, FINGERPRINT)?;
        Ok(())
    }

    /// Deserialize from any reader, verifying structure and fingerprint
    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let center = read_vec3(reader)?;
        let size = read_vec3(reader)?;
        let min = read_vec3(reader)?;
        let max = read_vec3(reader)?;
        let max_level = read_u32(reader)?;
        if max_level > super::config::MAX_SUPPORTED_LEVEL {
            return Err(Error::format(format!("max level {} is not supported", max_level)));
        }
        let world = read_mat4(reader)?;

        let count = read_len(reader, "transforms")?;
        let mut transforms = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            transforms.push(read_mat4(reader)?);
        }

        let layout = CellLayout::new(max_level);
        let count = read_len(reader, "cells")?;
        if count != layout.cell_count() {
            return Err(Error::format(format!(
                "{} cells stored, {} expected for max level {}",
                count,
                layout.cell_count(),
                max_level
            )));
        }
        let mut cells = Vec::with_capacity(count);
        for i in 0..count {
            cells.push(read_cell(reader, &layout, i)?);
        }

        let count = read_len(reader, "primitive bounds")?;
        let mut bounds = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            bounds.push((read_vec3(reader)?, read_vec3(reader)?));
        }

        let count = read_len(reader, "primitives")?;
        if count != bounds.len() {
            return Err(Error::format(format!(
                "{} primitives but {} primitive bounds",
                count,
                bounds.len()
            )));
        }
        let mut primitives = Vec::with_capacity(count.min(4096));
        for (min, max) in bounds {
            let mut primitive = read_primitive(reader)?;
            primitive.min = min;
            primitive.max = max;
            primitives.push(primitive);
        }

        let options = OctreeOptions(read_u32(reader)?);
        let found = read_u64(reader)?;
        if found != FINGERPRINT {
            return Err(Error::FingerprintMismatch {
                expected: FINGERPRINT,
                found,
            });
        }

        let mut octree = Octree::with_root(center, size, max_level, world, transforms);
        octree.min = min;
        octree.max = max;
        octree.options = options;
        octree.cells = cells;
        octree.primitives = primitives;
        octree
            .check_invariants()
            .map_err(|e| Error::format(format!("inconsistent octree stream: {}", e)))?;
        Ok(octree)
    }
}

/// Field-by-field comparison of an octree with its reloaded copy.
///
/// Fields dropped by the options of `loaded` are not compared.
pub fn verify_round_trip(original: &Octree, loaded: &Octree) -> Vec<String> {
    let graphics = loaded.options.graphics();
    let collisions = loaded.options.collisions();
    let mut diffs = Vec::new();
    let mut check = |what: String, same: bool| {
        if !same {
            diffs.push(what);
        }
    };

    check("center".into(), original.center == loaded.center);
    check("size".into(), original.size == loaded.size);
    check("min".into(), original.min == loaded.min);
    check("max".into(), original.max == loaded.max);
    check("max_level".into(), original.max_level == loaded.max_level);
    check("world".into(), original.world == loaded.world);
    check("transforms".into(), original.transforms == loaded.transforms);
    check("cell count".into(), original.cells.len() == loaded.cells.len());
    check("primitive count".into(), original.primitives.len() == loaded.primitives.len());

    for (i, (a, b)) in original.cells.iter().zip(&loaded.cells).enumerate() {
        check(format!("cell {} index", i), a.index == b.index);
        check(format!("cell {} level", i), a.level == b.level);
        check(
            format!("cell {} bounds", i),
            a.center == b.center && a.size == b.size && a.min == b.min && a.max == b.max,
        );
        check(format!("cell {} points", i), a.points == b.points);
        check(format!("cell {} planes", i), a.planes == b.planes);
        check(
            format!("cell {} candidates", i),
            a.opaque_primitives == b.opaque_primitives && a.transparent_primitives == b.transparent_primitives,
        );
        check(
            format!("cell {} primitives", i),
            a.opaques == b.opaques && a.transparents == b.transparents,
        );
        check(
            format!("cell {} triangle counts", i),
            a.opaque_triangle_count == b.opaque_triangle_count
                && a.transparent_triangle_count == b.transparent_triangle_count
                && a.triangle_count == b.triangle_count,
        );
        check(format!("cell {} children", i), a.children == b.children);
        if collisions {
            check(
                format!("cell {} collision triangles", i),
                a.positions == b.positions && a.normals == b.normals,
            );
        }
    }

    for (i, (a, b)) in original.primitives.iter().zip(&loaded.primitives).enumerate() {
        check(format!("primitive {} layout", i), a.layout == b.layout);
        check(format!("primitive {} material", i), a.material.same_shading(&b.material));
        check(format!("primitive {} bounds", i), a.min == b.min && a.max == b.max);
        check(
            format!("primitive {} key", i),
            a.channels == b.channels && a.material_key == b.material_key,
        );
        check(
            format!("primitive {} counts", i),
            a.vertex_count == b.vertex_count && a.triangle_count == b.triangle_count,
        );
        check(
            format!("primitive {} types", i),
            a.topology == b.topology && a.index_type() == b.index_type(),
        );
        if graphics {
            check(
                format!("primitive {} buffers", i),
                a.vertices == b.vertices && a.indices == b.indices,
            );
        }
    }

    diffs
}

fn write_cell(writer: &mut impl Write, cell: &Cell, options: OctreeOptions) -> Result<()> {
    write_i32(writer, cell.index.0 as i32)?;
    write_u32(writer, cell.level)?;
    write_vec3(writer, cell.center)?;
    write_vec3(writer, cell.size)?;
    write_vec3(writer, cell.min)?;
    write_vec3(writer, cell.max)?;

    write_primitive_refs(writer, &cell.opaques)?;
    write_primitive_refs(writer, &cell.transparents)?;
    write_u32(writer, cell.opaque_triangle_count)?;
    write_u32(writer, cell.transparent_triangle_count)?;
    write_u32(writer, cell.triangle_count)?;
    write_candidates(writer, &cell.opaque_primitives)?;
    write_candidates(writer, &cell.transparent_primitives)?;

    if options.collisions() {
        write_floats(writer, &cell.positions)?;
        write_floats(writer, &cell.normals)?;
        write_len(writer, cell.planes.len())?;
        for plane in &cell.planes {
            write_vec3(writer, plane.origin())?;
            write_vec3(writer, plane.normal)?;
        }
        write_len(writer, cell.points.len())?;
        for point in &cell.points {
            write_vec3(writer, *point)?;
        }
    } else {
        for _ in 0..4 {
            write_len(writer, 0)?;
        }
    }

    let children = cell.children.map(|c| c.map(|i| i.0 as i32)).unwrap_or([-1; 8]);
    for child in children {
        write_i32(writer, child)?;
    }
    Ok(())
}

fn read_cell(reader: &mut impl Read, layout: &CellLayout, position: usize) -> Result<Cell> {
    let index = read_i32(reader)?;
    if index < 0 || index as usize != position {
        return Err(Error::format(format!("cell at {} has index {}", position, index)));
    }
    let index = CellIndex(index as u32);
    let level = read_u32(reader)?;
    if level != layout.level_of(index) {
        return Err(Error::format(format!("cell {} has level {}", position, level)));
    }

    let mut cell = Cell {
        index,
        level,
        center: read_vec3(reader)?,
        size: read_vec3(reader)?,
        min: read_vec3(reader)?,
        max: read_vec3(reader)?,
        ..Default::default()
    };
    cell.opaques = read_primitive_refs(reader)?;
    cell.transparents = read_primitive_refs(reader)?;
    cell.opaque_triangle_count = read_u32(reader)?;
    cell.transparent_triangle_count = read_u32(reader)?;
    cell.triangle_count = read_u32(reader)?;
    cell.opaque_primitives = read_candidates(reader)?;
    cell.transparent_primitives = read_candidates(reader)?;
    cell.positions = read_floats(reader)?;
    cell.normals = read_floats(reader)?;

    cell.derive_geometry();
    let planes = read_len(reader, "planes")?;
    match planes {
        0 => {}
        6 => {
            for plane in &mut cell.planes {
                let origin = read_vec3(reader)?;
                let normal = read_vec3(reader)?;
                *plane = Plane::from_point_normal(origin, normal);
            }
        }
        n => return Err(Error::format(format!("cell {} stores {} planes", position, n))),
    }
    let points = read_len(reader, "points")?;
    match points {
        0 => {}
        8 => {
            for point in &mut cell.points {
                *point = read_vec3(reader)?;
            }
        }
        n => return Err(Error::format(format!("cell {} stores {} points", position, n))),
    }

    let mut children = [0i32; 8];
    for child in &mut children {
        *child = read_i32(reader)?;
    }
    cell.children = if children.iter().all(|&c| c == -1) {
        None
    } else if children.iter().all(|&c| c >= 0 && (c as usize) < layout.cell_count()) {
        Some(children.map(|c| CellIndex(c as u32)))
    } else {
        return Err(Error::format(format!("cell {} has invalid children {:?}", position, children)));
    };
    Ok(cell)
}

fn write_primitive_refs(writer: &mut impl Write, refs: &[Option<PrimitiveIndex>]) -> Result<()> {
    write_len(writer, refs.len())?;
    for r in refs {
        write_i32(writer, r.map(|p| p.0 as i32).unwrap_or(-1))?;
    }
    Ok(())
}

fn read_primitive_refs(reader: &mut impl Read) -> Result<Vec<Option<PrimitiveIndex>>> {
    let count = read_len(reader, "primitive references")?;
    let mut refs = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        refs.push(match read_i32(reader)? {
            -1 => None,
            i if i >= 0 => Some(PrimitiveIndex(i as u32)),
            i => return Err(Error::format(format!("invalid primitive reference {}", i))),
        });
    }
    Ok(refs)
}

fn write_candidates(writer: &mut impl Write, candidates: &[u32]) -> Result<()> {
    write_len(writer, candidates.len())?;
    for &c in candidates {
        write_i32(writer, c as i32)?;
    }
    Ok(())
}

fn read_candidates(reader: &mut impl Read) -> Result<Vec<u32>> {
    let count = read_len(reader, "candidates")?;
    let mut candidates = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let c = read_i32(reader)?;
        if c < 0 {
            return Err(Error::format(format!("invalid candidate primitive {}", c)));
        }
        candidates.push(c as u32);
    }
    Ok(candidates)
}

fn write_material(writer: &mut impl Write, material: &Material) -> Result<()> {
    write_u8(writer, material.effect)?;
    write_u8(writer, material.base_color_texture)?;
    write_u8(writer, material.normal_texture)?;
    write_u8(writer, material.metallic_roughness_texture)?;
    write_u8(writer, material.emissive_texture)?;
    write_u8(writer, material.occlusion_texture)?;
    write_vec4(writer, material.base_color_factor)?;
    write_f32(writer, material.metallic_factor)?;
    write_f32(writer, material.roughness_factor)?;
    write_vec3(writer, material.emissive_factor)?;
    write_f32(writer, material.alpha_cutoff)?;
    write_u32(writer, material.alpha_mode as u32)?;
    write_u8(writer, material.double_sided as u8)?;
    write_u32(writer, material.cull_face as u32)?;
    Ok(())
}

fn read_material(reader: &mut impl Read) -> Result<Material> {
    let effect = read_u8(reader)?;
    let base_color_texture = read_u8(reader)?;
    let normal_texture = read_u8(reader)?;
    let metallic_roughness_texture = read_u8(reader)?;
    let emissive_texture = read_u8(reader)?;
    let occlusion_texture = read_u8(reader)?;
    let base_color_factor = read_vec4(reader)?;
    let metallic_factor = read_f32(reader)?;
    let roughness_factor = read_f32(reader)?;
    let emissive_factor = read_vec3(reader)?;
    let alpha_cutoff = read_f32(reader)?;
    let alpha_mode = read_tag(reader, "alpha mode", AlphaMode::from_u32)?;
    let double_sided = match read_u8(reader)? {
        0 => false,
        1 => true,
        v => return Err(Error::format(format!("invalid double-sided flag {}", v))),
    };
    let cull_face = read_tag(reader, "cull face", CullFace::from_u32)?;
    Ok(Material {
        effect,
        base_color_texture,
        normal_texture,
        metallic_roughness_texture,
        emissive_texture,
        occlusion_texture,
        base_color_factor,
        metallic_factor,
        roughness_factor,
        emissive_factor,
        alpha_cutoff,
        alpha_mode,
        double_sided,
        cull_face,
    })
}

fn write_primitive(writer: &mut impl Write, primitive: &Primitive, options: OctreeOptions) -> Result<()> {
    write_material(writer, &primitive.material)?;
    if options.graphics() {
        write_bytes(writer, &primitive.vertices)?;
        write_bytes(writer, primitive.indices.bytes())?;
    } else {
        write_len(writer, 0)?;
        write_len(writer, 0)?;
    }

    write_u32(writer, primitive.layout.stride)?;
    write_len(writer, primitive.layout.attributes.len())?;
    for attr in &primitive.layout.attributes {
        write_u32(writer, attr.semantic as u32)?;
        write_u32(writer, attr.format as u32)?;
        write_u32(writer, attr.components)?;
        write_u32(writer, attr.offset)?;
    }

    write_u32(writer, primitive.channels.0)?;
    write_u32(writer, primitive.triangle_count)?;
    write_u32(writer, primitive.vertex_count)?;
    write_u64(writer, primitive.material_key.0[0])?;
    write_u64(writer, primitive.material_key.0[1])?;
    write_u32(writer, primitive.index_type() as u32)?;
    write_u32(writer, primitive.topology as u32)?;
    Ok(())
}

fn read_primitive(reader: &mut impl Read) -> Result<Primitive> {
    let material = read_material(reader)?;
    let vertices = read_bytes(reader, "vertices")?;
    let indices = read_bytes(reader, "indices")?;

    let stride = read_u32(reader)?;
    let count = read_len(reader, "attributes")?;
    let mut attributes = Vec::with_capacity(count.min(16));
    for _ in 0..count {
        let semantic = read_tag(reader, "attribute semantic", AttributeSemantic::from_u32)?;
        let format = read_tag(reader, "channel format", ChannelFormat::from_u32)?;
        let components = read_u32(reader)?;
        let offset = read_u32(reader)?;
        attributes.push(VertexAttribute::new(semantic, format, components, offset));
    }
    let layout = VertexLayout::new(attributes, stride);
    layout
        .validate()
        .map_err(|e| Error::format(format!("invalid stored layout: {}", e)))?;

    let channels = ChannelFlags(read_u32(reader)?);
    let triangle_count = read_u32(reader)?;
    let vertex_count = read_u32(reader)?;
    let material_key = MaterialKey([read_u64(reader)?, read_u64(reader)?]);
    let index_type = read_tag(reader, "index type", IndexType::from_u32)?;
    let topology = read_tag(reader, "topology", Topology::from_u32)?;

    if !vertices.is_empty() && vertices.len() != vertex_count as usize * stride as usize {
        return Err(Error::format(format!(
            "{} vertex bytes for {} vertices of stride {}",
            vertices.len(),
            vertex_count,
            stride
        )));
    }
    let indices = IndexBuffer::from_bytes(indices, index_type).map_err(|e| Error::format(e.to_string()))?;

    Ok(Primitive {
        layout,
        vertices,
        indices,
        topology,
        material,
        min: Vec3::ZERO,
        max: Vec3::ZERO,
        channels,
        material_key,
        vertex_count,
        triangle_count,
    })
}

fn read_tag<T>(reader: &mut impl Read, what: &str, parse: impl Fn(u32) -> Option<T>) -> Result<T> {
    let value = read_u32(reader)?;
    parse(value).ok_or_else(|| Error::format(format!("invalid {} {}", what, value)))
}

fn write_len(writer: &mut impl Write, len: usize) -> Result<()> {
    write_u64(writer, len as u64)
}

fn read_len(reader: &mut impl Read, what: &str) -> Result<usize> {
    let len = read_u64(reader)?;
    if len > MAX_SEQUENCE_LEN {
        return Err(Error::format(format!("implausible {} length {}", what, len as i64)));
    }
    Ok(len as usize)
}

fn write_bytes(writer: &mut impl Write, bytes: &[u8]) -> Result<()> {
    write_len(writer, bytes.len())?;
    writer.write_all(bytes)?;
    Ok(())
}

fn read_bytes(reader: &mut impl Read, what: &str) -> Result<Vec<u8>> {
    let len = read_len(reader, what)?;
    let mut bytes = Vec::new();
    let read = reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if read != len {
        return Err(Error::format(format!("{} truncated: {} of {} bytes", what, read, len)));
    }
    Ok(bytes)
}

fn write_floats(writer: &mut impl Write, values: &[f32]) -> Result<()> {
    write_len(writer, values.len())?;
    for &v in values {
        write_f32(writer, v)?;
    }
    Ok(())
}

fn read_floats(reader: &mut impl Read) -> Result<Vec<f32>> {
    let count = read_len(reader, "floats")?;
    let mut values = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        values.push(read_f32(reader)?);
    }
    Ok(values)
}

fn write_u8(writer: &mut impl Write, v: u8) -> Result<()> {
    writer.write_all(&[v])?;
    Ok(())
}

fn read_u8(reader: &mut impl Read) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn write_u32(writer: &mut impl Write, v: u32) -> Result<()> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_i32(writer: &mut impl Write, v: i32) -> Result<()> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_i32(reader: &mut impl Read) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn write_u64(writer: &mut impl Write, v: u64) -> Result<()> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn write_f32(writer: &mut impl Write, v: f32) -> Result<()> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_f32(reader: &mut impl Read) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn write_vec3(writer: &mut impl Write, v: Vec3) -> Result<()> {
    writer.write_all(&v.x.to_le_bytes())?;
    writer.write_all(&v.y.to_le_bytes())?;
    writer.write_all(&v.z.to_le_bytes())?;
    Ok(())
}

fn read_vec3(reader: &mut impl Read) -> Result<Vec3> {
    let mut buf = [0u8; 12];
    reader.read_exact(&mut buf)?;
    Ok(Vec3::new(
        f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
    ))
}

fn write_vec4(writer: &mut impl Write, v: Vec4) -> Result<()> {
    for c in v.to_array() {
        write_f32(writer, c)?;
    }
    Ok(())
}

fn read_vec4(reader: &mut impl Read) -> Result<Vec4> {
    Ok(Vec4::new(read_f32(reader)?, read_f32(reader)?, read_f32(reader)?, read_f32(reader)?))
}

fn write_mat4(writer: &mut impl Write, m: &Mat4) -> Result<()> {
    for c in m.to_cols_array() {
        write_f32(writer, c)?;
    }
    Ok(())
}

fn read_mat4(reader: &mut impl Read) -> Result<Mat4> {
    let mut cols = [0f32; 16];
    for c in &mut cols {
        *c = read_f32(reader)?;
    }
    Ok(Mat4::from_cols_array(&cols))
}
