//! Per-instance part adjustments applied on top of the curves.

use crate::util::{trs, Mat4, Vec2, Vec3, Vec4};

/// Renderer-side state for one part of one playing instance.
#[derive(Clone, Debug, PartialEq)]
pub struct PartOverride {
    /// Replacement texture path.
    pub texture: Option<String>,
    /// Replacement material name.
    pub material: Option<String>,
    pub prevent_draw: bool,
    /// Offset on the ground plane (x, z), in part space.
    pub local_offset: Vec2,
    /// Extra yaw in degrees.
    pub local_rotation: f32,
    /// Scale factor on the ground plane (x, z).
    pub local_scale_factor: Vec2,
    /// Multiplied into the sampled colour.
    pub color_tint: Vec4,
    /// Replaces the sampled colour entirely.
    pub color_override: Option<Vec4>,
    /// Toggles the curve-driven flip.
    pub flip_x: bool,
    pub flip_y: bool,
    pub use_default_transparent_material: bool,
}

impl Default for PartOverride {
    fn default() -> Self {
        Self {
            texture: None,
            material: None,
            prevent_draw: false,
            local_offset: Vec2::ZERO,
            local_rotation: 0.0,
            local_scale_factor: Vec2::ONE,
            color_tint: Vec4::ONE,
            color_override: None,
            flip_x: false,
            flip_y: false,
            use_default_transparent_material: false,
        }
    }
}

impl PartOverride {
    /// Whether this override changes nothing.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Local adjustment matrix for the given effective flips.
    ///
    /// The offset follows the flips; the extra yaw changes sign when exactly
    /// one axis is flipped.
    pub fn adjust_matrix(&self, flip_x: bool, flip_y: bool) -> Mat4 {
        if self.local_offset == Vec2::ZERO && self.local_rotation == 0.0 && self.local_scale_factor == Vec2::ONE {
            return Mat4::IDENTITY;
        }
        let offset = Vec3::new(
            if flip_x { -self.local_offset.x } else { self.local_offset.x },
            0.0,
            if flip_y { -self.local_offset.y } else { self.local_offset.y },
        );
        let yaw = if flip_x ^ flip_y {
            -self.local_rotation
        } else {
            self.local_rotation
        };
        let scale = Vec3::new(self.local_scale_factor.x, 1.0, self.local_scale_factor.y);
        trs(offset, Vec3::new(0.0, yaw, 0.0), scale)
    }
}
