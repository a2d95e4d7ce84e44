//! Structure-of-arrays vertex channels used while clipping.
//!
//! Every attribute of a layout becomes one `Channel`; a `ChannelSet` holds all
//! channels of a polygon with a shared vertex count. Copy, interpolation and
//! interleaved conversion are written once, generic over the component type.

use bytemuck::{Pod, pod_read_unaligned};

use crate::core::error::Error;
use crate::core::types::{Mat3, Mat4, Result, Vec3};
use crate::model::layout::{AttributeSemantic, ChannelFormat, VertexAttribute, VertexLayout};

/// Scalar type storable in a channel
trait Component: Pod {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Component for f32 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Component for u16 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        let v = a as f32 + (b as f32 - a as f32) * t;
        v.round().clamp(0.0, u16::MAX as f32) as u16
    }
}

impl Component for u32 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        let v = a as f64 + (b as f64 - a as f64) * t as f64;
        v.round().clamp(0.0, u32::MAX as f64) as u32
    }
}

fn push_copy<T: Component>(dst: &mut Vec<T>, src: &[T], components: usize, i: usize) {
    dst.extend_from_slice(&src[i * components..(i + 1) * components]);
}

fn push_lerp<T: Component>(dst: &mut Vec<T>, src: &[T], components: usize, a: usize, b: usize, t: f32) {
    for c in 0..components {
        dst.push(T::lerp(src[a * components + c], src[b * components + c], t));
    }
}

fn push_read<T: Component>(dst: &mut Vec<T>, bytes: &[u8], components: usize) {
    let size = std::mem::size_of::<T>();
    for c in 0..components {
        dst.push(pod_read_unaligned::<T>(&bytes[c * size..(c + 1) * size]));
    }
}

fn write<T: Component>(src: &[T], components: usize, i: usize, out: &mut [u8]) {
    let values = &src[i * components..(i + 1) * components];
    out[..std::mem::size_of_val(values)].copy_from_slice(bytemuck::cast_slice(values));
}

/// Component storage of one channel
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelData {
    F32(Vec<f32>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl ChannelData {
    fn with_format(format: ChannelFormat) -> Self {
        match format {
            ChannelFormat::F32 => Self::F32(Vec::new()),
            ChannelFormat::U16 => Self::U16(Vec::new()),
            ChannelFormat::U32 => Self::U32(Vec::new()),
        }
    }

    fn raw_len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::F32(v) => v.clear(),
            Self::U16(v) => v.clear(),
            Self::U32(v) => v.clear(),
        }
    }
}

/// One attribute stream of a polygon
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub semantic: AttributeSemantic,
    pub components: usize,
    pub data: ChannelData,
}

impl Channel {
    pub fn new(attr: &VertexAttribute) -> Self {
        Self {
            semantic: attr.semantic,
            components: attr.components as usize,
            data: ChannelData::with_format(attr.format),
        }
    }

    /// Number of vertices stored
    pub fn len(&self) -> usize {
        self.data.raw_len() / self.components
    }

    pub fn is_empty(&self) -> bool {
        self.data.raw_len() == 0
    }

    /// Component `c` of vertex `i` as f32 (None if out of range)
    pub fn component(&self, i: usize, c: usize) -> Option<f32> {
        if c >= self.components {
            return None;
        }
        let k = i * self.components + c;
        match &self.data {
            ChannelData::F32(v) => v.get(k).copied(),
            ChannelData::U16(v) => v.get(k).map(|&x| x as f32),
            ChannelData::U32(v) => v.get(k).map(|&x| x as f32),
        }
    }

    fn push_copy(&mut self, src: &Channel, i: usize) {
        let n = self.components;
        match (&mut self.data, &src.data) {
            (ChannelData::F32(d), ChannelData::F32(s)) => push_copy(d, s, n, i),
            (ChannelData::U16(d), ChannelData::U16(s)) => push_copy(d, s, n, i),
            (ChannelData::U32(d), ChannelData::U32(s)) => push_copy(d, s, n, i),
            _ => unreachable!("channel sets built from different layouts"),
        }
    }

    fn push_lerp(&mut self, src: &Channel, a: usize, b: usize, t: f32) {
        let n = self.components;
        match (&mut self.data, &src.data) {
            (ChannelData::F32(d), ChannelData::F32(s)) => push_lerp(d, s, n, a, b, t),
            (ChannelData::U16(d), ChannelData::U16(s)) => push_lerp(d, s, n, a, b, t),
            (ChannelData::U32(d), ChannelData::U32(s)) => push_lerp(d, s, n, a, b, t),
            _ => unreachable!("channel sets built from different layouts"),
        }
    }

    fn push_read(&mut self, bytes: &[u8]) {
        let n = self.components;
        match &mut self.data {
            ChannelData::F32(d) => push_read(d, bytes, n),
            ChannelData::U16(d) => push_read(d, bytes, n),
            ChannelData::U32(d) => push_read(d, bytes, n),
        }
    }

    fn write(&self, i: usize, out: &mut [u8]) {
        let n = self.components;
        match &self.data {
            ChannelData::F32(s) => write(s, n, i, out),
            ChannelData::U16(s) => write(s, n, i, out),
            ChannelData::U32(s) => write(s, n, i, out),
        }
    }
}

/// A polygon: all channels of a layout with a common vertex count.
///
/// Channel `k` corresponds to attribute `k` of the layout it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSet {
    channels: Vec<Channel>,
    position: usize,
    len: usize,
}

impl ChannelSet {
    /// Empty set matching a validated layout
    pub fn for_layout(layout: &VertexLayout) -> Result<Self> {
        layout.validate()?;
        let position = layout
            .attributes
            .iter()
            .position(|a| a.semantic == AttributeSemantic::Position)
            .ok_or_else(|| Error::config("layout has no position attribute"))?;
        Ok(Self {
            channels: layout.attributes.iter().map(Channel::new).collect(),
            position,
            len: 0,
        })
    }

    /// Empty set with the same channel structure
    pub fn empty_like(&self) -> Self {
        let mut set = self.clone();
        set.clear();
        set
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.data.clear();
        }
        self.len = 0;
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// First channel with the given semantic
    pub fn channel(&self, semantic: AttributeSemantic) -> Option<&Channel> {
        self.channels.iter().find(|c| c.semantic == semantic)
    }

    /// Position of vertex `i`
    pub fn position(&self, i: usize) -> Vec3 {
        match &self.channels[self.position].data {
            ChannelData::F32(v) => Vec3::new(v[i * 3], v[i * 3 + 1], v[i * 3 + 2]),
            _ => unreachable!("position channel is validated as f32"),
        }
    }

    /// Overwrite the position of vertex `i`
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        if let ChannelData::F32(v) = &mut self.channels[self.position].data {
            v[i * 3..i * 3 + 3].copy_from_slice(&p.to_array());
        }
    }

    /// Append a copy of vertex `i` of `src`
    pub fn push_copy(&mut self, src: &ChannelSet, i: usize) {
        for (dst, s) in self.channels.iter_mut().zip(&src.channels) {
            dst.push_copy(s, i);
        }
        self.len += 1;
    }

    /// Append `lerp(src[a], src[b], t)` for every channel
    pub fn push_lerp(&mut self, src: &ChannelSet, a: usize, b: usize, t: f32) {
        for (dst, s) in self.channels.iter_mut().zip(&src.channels) {
            dst.push_lerp(s, a, b, t);
        }
        self.len += 1;
    }

    /// Append vertex `vertex` read from an interleaved buffer of `layout`
    pub fn gather(&mut self, layout: &VertexLayout, bytes: &[u8], vertex: usize) -> Result<()> {
        let stride = layout.stride as usize;
        let start = vertex * stride;
        let Some(raw) = bytes.get(start..start + stride) else {
            return Err(Error::config(format!(
                "vertex {} out of range ({} bytes, stride {})",
                vertex,
                bytes.len(),
                stride
            )));
        };
        for (channel, attr) in self.channels.iter_mut().zip(&layout.attributes) {
            let offset = attr.offset as usize;
            channel.push_read(&raw[offset..offset + attr.byte_size() as usize]);
        }
        self.len += 1;
        Ok(())
    }

    /// Append vertex `i` to `out` interleaved per `layout` (padding bytes are zero)
    pub fn write_vertex(&self, layout: &VertexLayout, i: usize, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + layout.stride as usize, 0);
        let raw = &mut out[start..];
        for (channel, attr) in self.channels.iter().zip(&layout.attributes) {
            channel.write(i, &mut raw[attr.offset as usize..]);
        }
    }

    /// Transform positions by `model` and normals/tangents by `normal_matrix`
    pub fn transform(&mut self, model: &Mat4, normal_matrix: &Mat3) {
        for channel in &mut self.channels {
            let n = channel.components;
            let ChannelData::F32(values) = &mut channel.data else {
                continue;
            };
            if n < 3 {
                continue;
            }
            match channel.semantic {
                AttributeSemantic::Position => {
                    for v in values.chunks_exact_mut(n) {
                        let p = model.transform_point3(Vec3::new(v[0], v[1], v[2]));
                        v[..3].copy_from_slice(&p.to_array());
                    }
                }
                s if s.is_direction() => {
                    for v in values.chunks_exact_mut(n) {
                        let d = (*normal_matrix * Vec3::new(v[0], v[1], v[2])).normalize_or_zero();
                        v[..3].copy_from_slice(&d.to_array());
                    }
                }
                _ => {}
            }
        }
    }
}
