//! Vertex attribute layouts and channel flags

use std::ops::BitOr;

use crate::core::error::Error;
use crate::core::types::Result;

/// Meaning of one vertex attribute stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AttributeSemantic {
    Position = 0,
    Normal = 1,
    Color = 2,
    TexCoord = 3,
    Tangent = 4,
    Weights = 5,
    Joints = 6,
}

impl AttributeSemantic {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Position,
            1 => Self::Normal,
            2 => Self::Color,
            3 => Self::TexCoord,
            4 => Self::Tangent,
            5 => Self::Weights,
            6 => Self::Joints,
            _ => return None,
        })
    }

    /// Flag bit for this semantic
    pub fn flag(self) -> ChannelFlags {
        ChannelFlags(1 << self as u32)
    }

    /// Directions that follow the normal matrix rather than the model matrix
    pub fn is_direction(self) -> bool {
        matches!(self, Self::Normal | Self::Tangent)
    }
}

/// Scalar type of one attribute component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChannelFormat {
    F32 = 0,
    U16 = 1,
    U32 = 2,
}

impl ChannelFormat {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::F32,
            1 => Self::U16,
            2 => Self::U32,
            _ => return None,
        })
    }

    /// Bytes per component
    pub fn size(self) -> u32 {
        match self {
            Self::F32 | Self::U32 => 4,
            Self::U16 => 2,
        }
    }
}

/// One attribute inside an interleaved vertex
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub semantic: AttributeSemantic,
    pub format: ChannelFormat,
    /// 1 to 4
    pub components: u32,
    /// Byte offset from vertex start
    pub offset: u32,
}

impl VertexAttribute {
    pub fn new(semantic: AttributeSemantic, format: ChannelFormat, components: u32, offset: u32) -> Self {
        Self { semantic, format, components, offset }
    }

    /// Size in bytes inside a vertex
    pub fn byte_size(&self) -> u32 {
        self.format.size() * self.components
    }
}

/// Which vertex channels a primitive carries (bit per `AttributeSemantic`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelFlags(pub u32);

impl ChannelFlags {
    pub const POSITION: Self = Self(1 << 0);
    pub const NORMAL: Self = Self(1 << 1);
    pub const COLOR: Self = Self(1 << 2);
    pub const TEXCOORD: Self = Self(1 << 3);
    pub const TANGENT: Self = Self(1 << 4);
    pub const WEIGHTS: Self = Self(1 << 5);
    pub const JOINTS: Self = Self(1 << 6);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ChannelFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Interleaved vertex layout: attribute descriptors plus byte stride
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
    pub stride: u32,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>, stride: u32) -> Self {
        Self { attributes, stride }
    }

    /// Tightly packed layout of the given attributes, in order
    pub fn packed(attributes: &[(AttributeSemantic, ChannelFormat, u32)]) -> Self {
        let mut offset = 0;
        let attributes = attributes
            .iter()
            .map(|&(semantic, format, components)| {
                let attr = VertexAttribute::new(semantic, format, components, offset);
                offset += attr.byte_size();
                attr
            })
            .collect();
        Self { attributes, stride: offset }
    }

    /// Check that the layout is clippable
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(Error::config("vertex stride is zero"));
        }
        let mut positions = 0;
        for attr in &self.attributes {
            if !(1..=4).contains(&attr.components) {
                return Err(Error::config(format!(
                    "{:?} attribute has {} components",
                    attr.semantic, attr.components
                )));
            }
            if attr.offset + attr.byte_size() > self.stride {
                return Err(Error::config(format!(
                    "{:?} attribute at offset {} overruns stride {}",
                    attr.semantic, attr.offset, self.stride
                )));
            }
            if attr.semantic == AttributeSemantic::Position {
                if attr.format != ChannelFormat::F32 || attr.components != 3 {
                    return Err(Error::config("position must be 3 x f32"));
                }
                positions += 1;
            }
        }
        if positions != 1 {
            return Err(Error::config(format!("layout has {} position attributes", positions)));
        }
        Ok(())
    }

    /// The position attribute, if any
    pub fn position(&self) -> Option<&VertexAttribute> {
        self.attributes
            .iter()
            .find(|a| a.semantic == AttributeSemantic::Position)
    }

    /// Channel flags derived from the attribute semantics
    pub fn channel_flags(&self) -> ChannelFlags {
        self.attributes
            .iter()
            .fold(ChannelFlags::default(), |flags, a| flags | a.semantic.flag())
    }

    /// Number of whole vertices in a byte buffer of this layout
    pub fn vertex_count(&self, byte_len: usize) -> usize {
        if self.stride == 0 {
            0
        } else {
            byte_len / self.stride as usize
        }
    }
}
