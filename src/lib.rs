//! Octcull - static scene octree with clipped geometry, frustum visibility
//! and material buckets

pub mod core;
pub mod math;
pub mod geometry;
pub mod model;
pub mod octree;
