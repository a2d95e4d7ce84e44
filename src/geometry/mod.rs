//! Vertex channels, index buffers and triangle clipping

pub mod channel;
pub mod clip;
pub mod index;

pub use channel::{Channel, ChannelData, ChannelSet};
pub use clip::{box_half_spaces, clip_polygon, fan_triangles, triangle_inside_aabb, CLIP_EPSILON};
pub use index::{IndexBuffer, IndexType, Topology};
