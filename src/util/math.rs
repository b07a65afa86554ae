//! Math type re-exports and clip-specific transform helpers.
//!
//! This module re-exports types from `glam` and provides the transform
//! conventions used by the authoring tool: Euler angles in degrees applied
//! as Y, then X, then Z, and translate × rotate × scale composition.

// Re-export glam types
pub use glam::{EulerRot, IVec2, Mat4, Quat, Vec2, Vec3, Vec4};

/// Time value in seconds.
pub type Seconds = f32;

/// Build a rotation from Euler angles in degrees (x = pitch, y = yaw, z = roll).
#[inline]
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

/// Translate × rotate × scale matrix, rotation given as Euler degrees.
#[inline]
pub fn trs(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, euler_degrees(rotation), position)
}

/// Uniform mirror matrix flipping X and/or Z (the ground plane axes).
#[inline]
pub fn mirror(mirror_x: bool, mirror_y: bool) -> Mat4 {
    Mat4::from_scale(Vec3::new(
        if mirror_x { -1.0 } else { 1.0 },
        1.0,
        if mirror_y { -1.0 } else { 1.0 },
    ))
}

/// Yaw (rotation about Y) of a transform, in degrees.
pub fn yaw_degrees(m: &Mat4) -> f32 {
    let (_, rotation, _) = m.to_scale_rotation_translation();
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    yaw.to_degrees()
}
