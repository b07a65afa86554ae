//! Clip decoding.

use std::io::{Cursor, Read};

use tracing::{debug, warn};

use super::format::PREALLOC_LIMIT;
use super::read_util::*;
use crate::clip::{Clip, Event, EventRegistry, PartData};
use crate::core::{Curve, Keyframe, WeightedMode, WrapMode};
use crate::util::{Error, Result};

/// Decode a clip from an in-memory buffer.
///
/// Trailing bytes after the default-value table are ignored.
pub fn decode_clip(bytes: &[u8], registry: &EventRegistry) -> Result<Clip> {
    read_clip(&mut Cursor::new(bytes), registry)
}

/// Read a clip from a stream.
pub fn read_clip(r: &mut impl Read, registry: &EventRegistry) -> Result<Clip> {
    let name = read_string(r, "clip name")?;
    let duration = read_f32(r, "clip duration")?;
    let part_count = read_count(r, "part count")?;

    let events = read_events(r, registry)?;
    debug!(clip = %name, parts = part_count, events = events.len(), "read clip header");

    // Parents are linked by index once every part exists; a parent may come
    // later in the list than its child.
    let mut parts = Vec::with_capacity(part_count.min(PREALLOC_LIMIT));
    for i in 0..part_count {
        let part = read_part(r, part_count)?;
        debug!(
            index = i,
            path = %part.path,
            parent = ?part.parent(),
            custom_name = ?part.custom_name,
            texture = ?part.texture_path,
            "read part"
        );
        parts.push(part);
    }

    let curve_count = read_count(r, "curve count")?;
    for _ in 0..curve_count {
        let group = read_u8(r, "curve group")?;
        let field = read_u8(r, "curve field")?;
        let part_index = read_u8(r, "curve part index")? as usize;
        let curve = read_curve(r)?;

        let part = parts.get_mut(part_index).ok_or_else(|| {
            Error::invalid(format!("curve addresses part {part_index}, clip has {part_count} parts"))
        })?;
        if !part.set_curve_at(group, field, curve) {
            warn!(part = %part.path, group, field, "ignoring curve with unknown channel address");
        }
    }

    // Default values overwrite whatever was assigned above.
    for part in parts.iter_mut() {
        let default_count = read_u8(r, "default value count")?;
        for _ in 0..default_count {
            let group = read_u8(r, "default value group")?;
            let field = read_u8(r, "default value field")?;
            let value = read_f32(r, "default value")?;
            if !part.set_curve_at(group, field, Curve::constant(value)) {
                warn!(part = %part.path, group, field, "ignoring default value with unknown channel address");
            }
        }
    }

    let clip = Clip::new(name, duration, parts, events)?;
    clip.validate();
    Ok(clip)
}

fn read_events(r: &mut impl Read, registry: &EventRegistry) -> Result<Vec<Event>> {
    let count = read_count(r, "event count")?;
    let mut events = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for _ in 0..count {
        let save_data = read_string(r, "event data")?;
        let time = read_f32(r, "event time")?;
        let kind = registry.decode(&save_data)?;
        debug!(time, data = %save_data, "read event");
        events.push(Event::new(time, kind));
    }
    Ok(events)
}

fn read_part(r: &mut impl Read, part_count: usize) -> Result<PartData> {
    let mut part = PartData::new(read_string(r, "part path")?);

    let parent = read_i16(r, "part parent index")?;
    if parent >= 0 {
        let parent = parent as usize;
        if parent < part_count {
            part.set_parent(Some(parent));
        } else {
            warn!(part = %part.path, parent, part_count, "parent index out of range, treating part as root");
        }
    }

    if read_bool(r, "part custom name flag")? {
        part.custom_name = Some(read_string(r, "part custom name")?);
    }
    if read_bool(r, "part texture flag")? {
        part.texture_path = Some(read_string(r, "part texture path")?);
    }
    part.transparent_by_default = read_bool(r, "part transparency flag")?;
    Ok(part)
}

/// Read one curve body.
pub fn read_curve(r: &mut impl Read) -> Result<Curve> {
    let pre_wrap = WrapMode::from_u8(read_u8(r, "curve pre-wrap")?);
    let post_wrap = WrapMode::from_u8(read_u8(r, "curve post-wrap")?);
    let count = read_count(r, "key count")?;

    let mut keys = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for _ in 0..count {
        keys.push(Keyframe {
            time: read_f32(r, "key time")?,
            value: read_f32(r, "key value")?,
            in_tangent: read_f32(r, "key in-tangent")?,
            out_tangent: read_f32(r, "key out-tangent")?,
            in_weight: read_f32(r, "key in-weight")?,
            out_weight: read_f32(r, "key out-weight")?,
            weighted_mode: WeightedMode::from_u8(read_u8(r, "key weighted mode")?),
        });
    }
    Ok(Curve::new(keys).with_wrap(pre_wrap, post_wrap))
}
