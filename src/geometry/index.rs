//! Index buffers with 16-bit or 32-bit indices

use bytemuck::pod_read_unaligned;

use crate::core::error::Error;
use crate::core::types::Result;

/// Width of one index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IndexType {
    #[default]
    U16 = 0,
    U32 = 1,
}

impl IndexType {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::U16,
            1 => Self::U32,
            _ => return None,
        })
    }

    /// Bytes per index
    pub fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// How indices form primitives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Topology {
    Points = 0,
    Lines = 1,
    LineStrip = 2,
    #[default]
    Triangles = 3,
    TriangleStrip = 4,
}

impl Topology {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineStrip,
            3 => Self::Triangles,
            4 => Self::TriangleStrip,
            _ => return None,
        })
    }
}

/// Raw native-endian index bytes plus their width.
///
/// Pushing an index that does not fit in 16 bits widens the whole buffer to 32 bits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexBuffer {
    bytes: Vec<u8>,
    index_type: IndexType,
}

impl IndexBuffer {
    pub fn new(index_type: IndexType) -> Self {
        Self {
            bytes: Vec::new(),
            index_type,
        }
    }

    /// Wrap existing bytes; the length must be a multiple of the index size
    pub fn from_bytes(bytes: Vec<u8>, index_type: IndexType) -> Result<Self> {
        if bytes.len() % index_type.size() != 0 {
            return Err(Error::config(format!(
                "index buffer of {} bytes is not a multiple of {:?}",
                bytes.len(),
                index_type
            )));
        }
        Ok(Self { bytes, index_type })
    }

    pub fn from_u16(indices: &[u16]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(indices).to_vec(),
            index_type: IndexType::U16,
        }
    }

    pub fn from_u32(indices: &[u32]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(indices).to_vec(),
            index_type: IndexType::U32,
        }
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / self.index_type.size()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Index at position `i`
    pub fn get(&self, i: usize) -> u32 {
        let size = self.index_type.size();
        let raw = &self.bytes[i * size..(i + 1) * size];
        match self.index_type {
            IndexType::U16 => pod_read_unaligned::<u16>(raw) as u32,
            IndexType::U32 => pod_read_unaligned::<u32>(raw),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    /// Append one index, widening to 32 bits when needed
    pub fn push(&mut self, index: u32) {
        if self.index_type == IndexType::U16 && index > u16::MAX as u32 {
            self.widen();
        }
        match self.index_type {
            IndexType::U16 => self.bytes.extend_from_slice(bytemuck::bytes_of(&(index as u16))),
            IndexType::U32 => self.bytes.extend_from_slice(bytemuck::bytes_of(&index)),
        }
    }

    /// Convert every stored index to 32 bits
    pub fn widen(&mut self) {
        if self.index_type == IndexType::U32 {
            return;
        }
        let widened: Vec<u8> = self
            .bytes
            .chunks_exact(2)
            .flat_map(|c| (pod_read_unaligned::<u16>(c) as u32).to_ne_bytes())
            .collect();
        self.bytes = widened;
        self.index_type = IndexType::U32;
    }
}
