//! Octree build configuration

use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Deepest octree level accepted by the builder (8^7 leaf cells)
pub const MAX_SUPPORTED_LEVEL: u32 = 7;

/// Which optional data ranges an octree carries.
///
/// `GRAPHICS` keeps vertex/index bytes of the clipped primitives,
/// `COLLISIONS` keeps per-cell triangle positions, face normals, planes and corners.
/// The serialized stream has the same shape for every combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OctreeOptions(pub u32);

impl OctreeOptions {
    pub const NONE: Self = Self(0);
    pub const GRAPHICS: Self = Self(1);
    pub const COLLISIONS: Self = Self(2);
    pub const ALL: Self = Self(3);

    /// True if every bit of `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn graphics(self) -> bool {
        self.contains(Self::GRAPHICS)
    }

    pub fn collisions(self) -> bool {
        self.contains(Self::COLLISIONS)
    }
}

impl Default for OctreeOptions {
    fn default() -> Self {
        Self::GRAPHICS
    }
}

impl BitOr for OctreeOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OctreeOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Parameters for building an octree from a model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Deepest level (root is level 0)
    pub max_level: u32,
    /// Optional data kept on the built octree
    pub options: OctreeOptions,
    /// Split cells on the rayon thread pool
    pub parallel: bool,
    /// Extra world-space margin added to the root half-size
    pub root_padding: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_level: 3,
            options: OctreeOptions::GRAPHICS,
            parallel: false,
            root_padding: 0.0,
        }
    }
}

impl BuildConfig {
    /// Create a config with the given depth and default everything else
    pub fn with_max_level(max_level: u32) -> Self {
        Self {
            max_level,
            ..Default::default()
        }
    }

    /// Builder-style option override
    pub fn options(mut self, options: OctreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder-style parallel toggle
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_level > MAX_SUPPORTED_LEVEL {
            return Err(Error::config(format!(
                "max_level {} exceeds supported maximum {}",
                self.max_level, MAX_SUPPORTED_LEVEL
            )));
        }
        if !self.root_padding.is_finite() || self.root_padding < 0.0 {
            return Err(Error::config(format!(
                "root_padding must be finite and non-negative, got {}",
                self.root_padding
            )));
        }
        if self.options.0 & !OctreeOptions::ALL.0 != 0 {
            return Err(Error::config(format!("unknown option bits {:#x}", self.options.0)));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("invalid build config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
