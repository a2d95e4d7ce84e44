//! Mathematical utilities and data structures

pub mod aabb;
pub mod frustum;
pub mod triangle;

pub use aabb::{Aabb, octant_sign};
pub use frustum::{Containment, DepthRange, Frustum, Plane};
