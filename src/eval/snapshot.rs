//! Per-part, per-time sampled state.

use std::fmt;

use crate::clip::{CurveSlot, PartData};
use crate::util::{trs, yaw_degrees, Mat4, Seconds, Vec3, Vec4};

use super::overrides::PartOverride;

/// Sampled flags and scalars at or above this value read as `true`.
pub const FLAG_THRESHOLD: f32 = 0.5;

/// Sampled state of one part at one time.
///
/// A default snapshot has no part and carries no meaningful transform; it is
/// what lookups return when the part or its context is missing.
#[derive(Clone, Debug, PartialEq)]
pub struct PartSnapshot {
    /// Index of the sampled part, `None` for an empty snapshot.
    pub part: Option<usize>,
    pub part_name: Option<String>,
    pub texture_path: Option<String>,
    pub time: Seconds,

    pub local_position: Vec3,
    /// Euler angles in degrees.
    pub local_rotation: Vec3,
    pub local_scale: Vec3,
    /// RGBA.
    pub color: Vec4,
    pub data_a: f32,
    pub data_b: f32,
    pub data_c: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Own active flag after sampling; ancestor-reduced once composed.
    pub active: bool,

    pub local_matrix: Mat4,
    pub world_matrix: Mat4,
}

impl Default for PartSnapshot {
    fn default() -> Self {
        Self {
            part: None,
            part_name: None,
            texture_path: None,
            time: 0.0,
            local_position: Vec3::ZERO,
            local_rotation: Vec3::ZERO,
            local_scale: Vec3::ZERO,
            color: Vec4::ZERO,
            data_a: 0.0,
            data_b: 0.0,
            data_c: 0.0,
            flip_x: false,
            flip_y: false,
            active: false,
            local_matrix: Mat4::ZERO,
            world_matrix: Mat4::ZERO,
        }
    }
}

/// Sample every curve of `part` at `time`.
///
/// Empty curves read as `0`; flip and active channels compare against
/// [`FLAG_THRESHOLD`]. The world matrix is left equal to the local matrix
/// until the part is composed by an [`Animator`](super::Animator).
pub fn sample_part(part: &PartData, time: Seconds) -> PartSnapshot {
    let eval = |slot: CurveSlot| part.curve(slot).evaluate(time);
    let vec3 = |x, y, z| Vec3::new(eval(x), eval(y), eval(z));

    let local_position = vec3(CurveSlot::PosX, CurveSlot::PosY, CurveSlot::PosZ);
    let local_rotation = vec3(CurveSlot::RotX, CurveSlot::RotY, CurveSlot::RotZ);
    let local_scale = vec3(CurveSlot::ScaleX, CurveSlot::ScaleY, CurveSlot::ScaleZ);
    let local_matrix = trs(local_position, local_rotation, local_scale);

    PartSnapshot {
        part: Some(part.index()),
        part_name: Some(part.name().to_string()),
        texture_path: part.texture_path.clone(),
        time,
        local_position,
        local_rotation,
        local_scale,
        color: Vec4::new(
            eval(CurveSlot::ColorR),
            eval(CurveSlot::ColorG),
            eval(CurveSlot::ColorB),
            eval(CurveSlot::ColorA),
        ),
        data_a: eval(CurveSlot::DataA),
        data_b: eval(CurveSlot::DataB),
        data_c: eval(CurveSlot::DataC),
        flip_x: eval(CurveSlot::FlipX) >= FLAG_THRESHOLD,
        flip_y: eval(CurveSlot::FlipY) >= FLAG_THRESHOLD,
        active: eval(CurveSlot::Active) >= FLAG_THRESHOLD,
        local_matrix,
        world_matrix: local_matrix,
    }
}

impl PartSnapshot {
    /// Whether this snapshot belongs to a part.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.part.is_some()
    }

    /// Rebuild the local matrix from the local position, rotation and scale.
    pub fn update_local_matrix(&mut self) {
        self.local_matrix = trs(self.local_position, self.local_rotation, self.local_scale);
    }

    /// Height of the part origin in world space, used for draw ordering.
    pub fn depth(&self) -> f32 {
        self.world_matrix.transform_point3(Vec3::ZERO).y
    }

    /// World position of a point given in part space.
    pub fn world_position(&self, root: &Mat4, local: Vec3) -> Vec3 {
        (*root * self.world_matrix).transform_point3(local)
    }

    /// Yaw of the part in world space, in degrees.
    pub fn world_rotation(&self, root: &Mat4) -> f32 {
        yaw_degrees(&(*root * self.world_matrix))
    }

    /// Curve flips combined with an override: override flips toggle.
    pub fn effective_flip(&self, ov: &PartOverride) -> (bool, bool) {
        (self.flip_x ^ ov.flip_x, self.flip_y ^ ov.flip_y)
    }

    /// Colour after the override: a replacement colour wins, else the tint multiplies.
    pub fn final_color(&self, ov: &PartOverride) -> Vec4 {
        if !self.is_valid() {
            return Vec4::ZERO;
        }
        ov.color_override.unwrap_or(self.color * ov.color_tint)
    }
}

impl fmt::Display for PartSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.part_name {
            Some(name) => write!(f, "[{:.2}s] {}", self.time, name),
            None => f.write_str("<default-snapshot>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Curve, Keyframe};

    #[test]
    fn test_empty_part_samples_to_zero() {
        let snap = sample_part(&PartData::new("p"), 1.0);
        assert!(snap.is_valid());
        assert_eq!(snap.local_position, Vec3::ZERO);
        assert_eq!(snap.local_scale, Vec3::ZERO);
        assert_eq!(snap.color, Vec4::ZERO);
        assert!(!snap.active);
        assert!(!snap.flip_x && !snap.flip_y);
    }

    #[test]
    fn test_flag_threshold() {
        let part = PartData::new("p")
            .with_curve(CurveSlot::Active, Curve::constant(0.5))
            .with_curve(CurveSlot::FlipX, Curve::constant(0.49))
            .with_curve(
                CurveSlot::FlipY,
                Curve::new([Keyframe::with_tangents(0.0, 0.0, 1.0, 1.0), Keyframe::with_tangents(1.0, 1.0, 1.0, 1.0)]),
            );
        let snap = sample_part(&part, 0.75);
        assert!(snap.active);
        assert!(!snap.flip_x);
        assert!(snap.flip_y);
        assert!(!sample_part(&part, 0.25).flip_y);
    }

    #[test]
    fn test_local_matrix_is_trs() {
        let part = PartData::new("p")
            .with_curve(CurveSlot::PosX, Curve::constant(2.0))
            .with_curve(CurveSlot::RotY, Curve::constant(90.0))
            .with_curve(CurveSlot::ScaleX, Curve::constant(1.0))
            .with_curve(CurveSlot::ScaleY, Curve::constant(1.0))
            .with_curve(CurveSlot::ScaleZ, Curve::constant(1.0));
        let snap = sample_part(&part, 0.0);
        let p = snap.local_matrix.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_final_color() {
        let part = PartData::new("p")
            .with_curve(CurveSlot::ColorR, Curve::constant(1.0))
            .with_curve(CurveSlot::ColorG, Curve::constant(0.5))
            .with_curve(CurveSlot::ColorA, Curve::constant(1.0));
        let snap = sample_part(&part, 0.0);
        let mut ov = PartOverride::default();
        assert_eq!(snap.final_color(&ov), Vec4::new(1.0, 0.5, 0.0, 1.0));
        ov.color_tint = Vec4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(snap.final_color(&ov), Vec4::new(0.5, 0.25, 0.0, 1.0));
        ov.color_override = Some(Vec4::ONE);
        assert_eq!(snap.final_color(&ov), Vec4::ONE);
        assert_eq!(PartSnapshot::default().final_color(&ov), Vec4::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(PartSnapshot::default().to_string(), "<default-snapshot>");
        let snap = sample_part(&PartData::new("Arm"), 1.5);
        assert_eq!(snap.to_string(), "[1.50s] Arm");
    }
}
