//! Material description and its bucket identity

use crate::core::types::{Vec3, Vec4};

/// Texture identifier; 0 means "no texture"
pub type TextureId = u8;

pub const NO_TEXTURE: TextureId = 0;

/// How alpha is interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AlphaMode {
    #[default]
    Opaque = 0,
    Mask = 1,
    Blend = 2,
}

impl AlphaMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Opaque,
            1 => Self::Mask,
            2 => Self::Blend,
            _ => return None,
        })
    }
}

/// Which faces the renderer culls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CullFace {
    /// Nothing culled: geometry is emitted in both windings
    None = 0,
    #[default]
    Back = 1,
    Front = 2,
}

impl CullFace {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::None,
            1 => Self::Back,
            2 => Self::Front,
            _ => return None,
        })
    }
}

/// PBR material state shared by a primitive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Shader effect identity
    pub effect: u8,
    pub base_color_texture: TextureId,
    pub normal_texture: TextureId,
    pub metallic_roughness_texture: TextureId,
    pub emissive_texture: TextureId,
    pub occlusion_texture: TextureId,
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: Vec3,
    pub alpha_cutoff: f32,
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
    pub cull_face: CullFace,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            effect: 0,
            base_color_texture: NO_TEXTURE,
            normal_texture: NO_TEXTURE,
            metallic_roughness_texture: NO_TEXTURE,
            emissive_texture: NO_TEXTURE,
            occlusion_texture: NO_TEXTURE,
            base_color_factor: Vec4::ONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: Vec3::ZERO,
            alpha_cutoff: 0.5,
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
            cull_face: CullFace::Back,
        }
    }
}

impl Material {
    /// Blended materials go to the transparent pass
    pub fn is_transparent(&self) -> bool {
        self.alpha_mode == AlphaMode::Blend
    }

    /// True when both windings of every triangle must be emitted
    pub fn emits_both_windings(&self) -> bool {
        self.double_sided || self.cull_face == CullFace::None
    }

    /// Bit-exact comparison of every texture id and factor.
    ///
    /// Floats compare by bit pattern so that NaN factors still match themselves.
    pub fn same_shading(&self, other: &Material) -> bool {
        self.effect == other.effect
            && self.base_color_texture == other.base_color_texture
            && self.normal_texture == other.normal_texture
            && self.metallic_roughness_texture == other.metallic_roughness_texture
            && self.emissive_texture == other.emissive_texture
            && self.occlusion_texture == other.occlusion_texture
            && bits4(self.base_color_factor) == bits4(other.base_color_factor)
            && self.metallic_factor.to_bits() == other.metallic_factor.to_bits()
            && self.roughness_factor.to_bits() == other.roughness_factor.to_bits()
            && bits3(self.emissive_factor) == bits3(other.emissive_factor)
            && self.alpha_cutoff.to_bits() == other.alpha_cutoff.to_bits()
            && self.alpha_mode == other.alpha_mode
            && self.double_sided == other.double_sided
            && self.cull_face == other.cull_face
    }
}

fn bits4(v: Vec4) -> [u32; 4] {
    v.to_array().map(f32::to_bits)
}

fn bits3(v: Vec3) -> [u32; 3] {
    v.to_array().map(f32::to_bits)
}

/// 128-bit material identity used to batch primitives into buckets.
///
/// Word 0 packs the effect and the five texture ids one byte each,
/// word 1 is reserved and currently always zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialKey(pub [u64; 2]);

impl MaterialKey {
    pub fn from_material(material: &Material) -> Self {
        let word = material.effect as u64
            | (material.base_color_texture as u64) << 8
            | (material.normal_texture as u64) << 16
            | (material.metallic_roughness_texture as u64) << 24
            | (material.emissive_texture as u64) << 32
            | (material.occlusion_texture as u64) << 40;
        Self([word, 0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_packing() {
        let material = Material {
            effect: 0x01,
            base_color_texture: 0x02,
            normal_texture: 0x03,
            metallic_roughness_texture: 0x04,
            emissive_texture: 0x05,
            occlusion_texture: 0x06,
            ..Default::default()
        };
        assert_eq!(MaterialKey::from_material(&material).0, [0x0605_0403_0201, 0]);
    }

    #[test]
    fn test_key_ignores_factors() {
        let a = Material::default();
        let b = Material { metallic_factor: 0.2, ..Default::default() };
        assert_eq!(MaterialKey::from_material(&a), MaterialKey::from_material(&b));
        assert!(!a.same_shading(&b));
    }

    #[test]
    fn test_transparency_and_winding() {
        let blend = Material { alpha_mode: AlphaMode::Blend, ..Default::default() };
        assert!(blend.is_transparent());
        assert!(!Material::default().is_transparent());
        assert!(Material { cull_face: CullFace::None, ..Default::default() }.emits_both_windings());
        assert!(Material { double_sided: true, ..Default::default() }.emits_both_windings());
        assert!(!Material::default().emits_both_windings());
    }
}
