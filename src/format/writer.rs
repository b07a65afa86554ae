//! Clip encoding.
//!
//! The writer is the exact inverse of [`read_clip`](super::read_clip): curves
//! with the shape of [`Curve::constant`] go to the per-part default-value
//! table, all other curves that differ from an unset slot are written in full.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::{MAX_PARTS, NO_PARENT};
use super::read_util::*;
use crate::clip::{Clip, CurveSlot};
use crate::core::Curve;
use crate::util::{Error, Result};

/// Encode a clip into a new buffer.
pub fn encode_clip(clip: &Clip) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_clip(&mut buf, clip)?;
    Ok(buf)
}

/// Write a clip to a stream.
pub fn write_clip(w: &mut impl Write, clip: &Clip) -> Result<()> {
    let parts = clip.parts();

    write_string(w, clip.name())?;
    w.write_f32::<LittleEndian>(clip.duration())?;
    write_count(w, parts.len(), "parts")?;

    write_count(w, clip.events().len(), "events")?;
    for event in clip.events() {
        write_string(w, &event.save_data())?;
        w.write_f32::<LittleEndian>(event.time)?;
    }

    for part in parts {
        write_string(w, &part.path)?;
        let parent = match part.parent() {
            Some(i) => i16::try_from(i).map_err(|_| Error::invalid(format!("parent index {i} too large")))?,
            None => NO_PARENT,
        };
        w.write_i16::<LittleEndian>(parent)?;

        write_optional_string(w, part.custom_name.as_deref())?;
        write_optional_string(w, part.texture_path.as_deref())?;
        write_bool(w, part.transparent_by_default)?;
    }

    let animated: Vec<(usize, CurveSlot, &Curve)> = parts
        .iter()
        .enumerate()
        .flat_map(|(i, part)| part.curves().map(move |(slot, curve)| (i, slot, curve)))
        .filter(|(_, _, curve)| is_written_in_full(curve))
        .collect();
    write_count(w, animated.len(), "curves")?;
    for (part_index, slot, curve) in animated {
        // Only curve records address parts by a single byte.
        if part_index >= MAX_PARTS {
            return Err(Error::invalid(format!(
                "part {part_index} has an animated curve, the format addresses at most {MAX_PARTS} animated parts"
            )));
        }
        let (group, field) = slot.address();
        w.write_u8(group as u8)?;
        w.write_u8(field)?;
        w.write_u8(part_index as u8)?;
        write_curve(w, curve)?;
    }

    for part in parts {
        let defaults: Vec<(CurveSlot, f32)> = part
            .curves()
            .filter_map(|(slot, curve)| curve.as_constant().map(|v| (slot, v)))
            .collect();
        // At most one entry per slot, so the count always fits a byte.
        w.write_u8(defaults.len() as u8)?;
        for (slot, value) in defaults {
            let (group, field) = slot.address();
            w.write_u8(group as u8)?;
            w.write_u8(field)?;
            w.write_f32::<LittleEndian>(value)?;
        }
    }
    Ok(())
}

/// Write one curve body.
pub fn write_curve(w: &mut impl Write, curve: &Curve) -> Result<()> {
    w.write_u8(curve.pre_wrap.to_u8())?;
    w.write_u8(curve.post_wrap.to_u8())?;
    write_count(w, curve.key_count(), "keys")?;
    for key in curve.keys() {
        w.write_f32::<LittleEndian>(key.time)?;
        w.write_f32::<LittleEndian>(key.value)?;
        w.write_f32::<LittleEndian>(key.in_tangent)?;
        w.write_f32::<LittleEndian>(key.out_tangent)?;
        w.write_f32::<LittleEndian>(key.in_weight)?;
        w.write_f32::<LittleEndian>(key.out_weight)?;
        w.write_u8(key.weighted_mode.to_u8())?;
    }
    Ok(())
}

/// Whether a curve needs a full curve record: not constant, and not an unset slot.
fn is_written_in_full(curve: &Curve) -> bool {
    curve.as_constant().is_none() && *curve != Curve::default()
}

fn write_optional_string(w: &mut impl Write, value: Option<&str>) -> Result<()> {
    write_bool(w, value.is_some())?;
    if let Some(s) = value {
        write_string(w, s)?;
    }
    Ok(())
}
