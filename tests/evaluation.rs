//! Frame evaluation over decoded clips: parent chains, active flags, events.

use animdata::clip::{Clip, CurveSlot, Event, EventKind, EventRegistry, PartData};
use animdata::core::{Curve, Keyframe};
use animdata::eval::{sample_part, Animator};
use animdata::format::{decode_clip, encode_clip};
use animdata::util::{trs, Mat4, Vec2, Vec3};

fn constant_transform(path: &str, pos: Vec3, rot: Vec3, scale: Vec3) -> PartData {
    let values = [
        (CurveSlot::PosX, pos.x),
        (CurveSlot::PosY, pos.y),
        (CurveSlot::PosZ, pos.z),
        (CurveSlot::RotX, rot.x),
        (CurveSlot::RotY, rot.y),
        (CurveSlot::RotZ, rot.z),
        (CurveSlot::ScaleX, scale.x),
        (CurveSlot::ScaleY, scale.y),
        (CurveSlot::ScaleZ, scale.z),
        (CurveSlot::Active, 1.0),
    ];
    values
        .into_iter()
        .fold(PartData::new(path), |part, (slot, v)| part.with_curve(slot, Curve::constant(v)))
}

fn chain_clip() -> Clip {
    let root = constant_transform("root", Vec3::new(1.0, 0.0, 2.0), Vec3::new(0.0, 45.0, 0.0), Vec3::splat(2.0));
    let mid = constant_transform("root/mid", Vec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, 0.0, 20.0), Vec3::ONE)
        .with_parent(0);
    // Leaf comes before its parent in the part list.
    let leaf = constant_transform("root/mid/leaf", Vec3::new(0.5, 0.0, -0.5), Vec3::new(0.0, -30.0, 0.0), Vec3::new(1.0, 0.5, 1.0))
        .with_parent(3);
    let other = constant_transform("other", Vec3::ZERO, Vec3::ZERO, Vec3::ONE);
    let parts = vec![root, other, leaf, mid];
    let clip = Clip::new("chain", 1.0, parts, Vec::new()).unwrap();
    decode_clip(&encode_clip(&clip).unwrap(), &EventRegistry::default()).unwrap()
}

#[test]
fn test_three_level_chain_is_matrix_product() {
    let clip = chain_clip();
    let mut animator = Animator::new(&clip);
    animator.seek(0.5);

    let local = |i: usize| sample_part(&clip.parts()[i], 0.5).local_matrix;
    let expected = local(0) * local(3) * local(2);
    assert!(animator.world_matrix(2).abs_diff_eq(expected, 1e-5));

    let root_local = trs(Vec3::new(1.0, 0.0, 2.0), Vec3::new(0.0, 45.0, 0.0), Vec3::splat(2.0));
    assert!(animator.world_matrix(0).abs_diff_eq(root_local, 1e-5));

    // Repeated queries return the memoised value.
    let generation = animator.generation();
    assert_eq!(animator.world_matrix(2), animator.world_matrix(2));
    assert_eq!(animator.generation(), generation);
}

#[test]
fn test_mirror_wraps_whole_chain() {
    let clip = chain_clip();
    let mut animator = Animator::new(&clip);
    let plain = animator.world_matrix(2);

    animator.set_mirror(true, true);
    let m = Mat4::from_scale(Vec3::new(-1.0, 1.0, -1.0));
    assert!(animator.world_matrix(2).abs_diff_eq(m * plain * m, 1e-5));

    animator.set_mirror(false, false);
    assert!(animator.world_matrix(2).abs_diff_eq(plain, 1e-6));
}

#[test]
fn test_override_sits_between_chain_and_mirror() {
    let clip = chain_clip();
    let mut animator = Animator::new(&clip);
    let plain = animator.world_matrix(2);

    animator.set_mirror(true, false);
    {
        let ov = animator.override_mut(2);
        ov.local_offset = Vec2::new(1.0, 0.0);
        ov.local_rotation = 15.0;
    }
    let adjust = trs(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 15.0, 0.0), Vec3::ONE);
    let m = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
    assert!(animator.world_matrix(2).abs_diff_eq(m * plain * adjust * m, 1e-5));

    // A flip override negates the offset and, with one axis flipped, the rotation.
    animator.override_mut(2).flip_x = true;
    let adjust = trs(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, -15.0, 0.0), Vec3::ONE);
    assert!(animator.world_matrix(2).abs_diff_eq(m * plain * adjust * m, 1e-5));
}

#[test]
fn test_inactive_root_deactivates_descendants() {
    let mut parts = vec![
        constant_transform("root", Vec3::ZERO, Vec3::ZERO, Vec3::ONE),
        constant_transform("root/mid", Vec3::ZERO, Vec3::ZERO, Vec3::ONE).with_parent(0),
        constant_transform("root/mid/leaf", Vec3::ZERO, Vec3::ZERO, Vec3::ONE).with_parent(1),
        constant_transform("loose", Vec3::ZERO, Vec3::ZERO, Vec3::ONE),
    ];
    // Root switches off at t = 1.
    parts[0].set_curve(
        CurveSlot::Active,
        Curve::new([Keyframe::with_tangents(0.0, 1.0, 0.0, 0.0), Keyframe::with_tangents(1.0, 0.0, 0.0, 0.0)]),
    );
    let clip = Clip::new("active", 1.0, parts, Vec::new()).unwrap();
    let mut animator = Animator::new(&clip);

    assert!((0..4).all(|i| animator.is_active(i)));

    animator.seek(1.0);
    assert!(!animator.is_active(0));
    assert!(!animator.is_active(1));
    assert!(!animator.is_active(2));
    assert!(animator.is_active(3));
    // The leaf's own curve still reads active.
    assert!(animator.sampled(2).unwrap().active);
}

#[test]
fn test_events_in_window_inclusive_and_ordered() {
    let events = vec![
        Event::new(0.0, EventKind::Kill { pawn: 0 }),
        Event::new(1.5, EventKind::Sound { sound: "a".into(), volume: 1.0, pitch: 1.0 }),
        Event::new(1.5, EventKind::Sound { sound: "b".into(), volume: 1.0, pitch: 1.0 }),
        Event::new(3.0, EventKind::Kill { pawn: 1 }),
    ];
    let clip = Clip::new("events", 3.0, Vec::new(), events).unwrap();
    let clip = decode_clip(&encode_clip(&clip).unwrap(), &EventRegistry::default()).unwrap();

    let hits: Vec<_> = clip.events_in_window(1.0, 1.5).collect();
    assert_eq!(hits.len(), 2);
    assert!(matches!(&hits[0].kind, EventKind::Sound { sound, .. } if sound == "a"));
    assert!(matches!(&hits[1].kind, EventKind::Sound { sound, .. } if sound == "b"));

    assert_eq!(clip.events_in_window(0.0, 3.0).count(), 4);
    assert_eq!(clip.events_in_window(3.0, 3.0).count(), 1);
    assert_eq!(clip.events_in_window(1.6, 2.9).count(), 0);
}

#[test]
fn test_frame_and_named_lookup() {
    let clip = chain_clip();
    let mut animator = Animator::new(&clip);
    let frame = animator.frame();
    assert_eq!(frame.len(), clip.parts().len());
    assert_eq!(frame[3].part_name.as_deref(), Some("root/mid"));
    assert_eq!(animator.snapshot_named("root/mid/leaf").world_matrix, frame[2].world_matrix);
    assert!(!animator.snapshot_named("missing").is_valid());
}
