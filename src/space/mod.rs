//! Grid space requirements of a clip and their 6-byte record codec.
//!
//! # Record layout
//!
//! ```text
//! +------+------+-------+-------+-------+--------+
//! | role | pawn | min x | min y | width | height |
//! |  u8  |  u8  |  i8   |  i8   |  u8   |   u8   |
//! +------+------+-------+-------+-------+--------+
//! ```
//!
//! Encoding casts each field to its byte width without checking; call
//! [`SpaceRequirement::check_range`] first to reject values that would wrap.

mod placement;

pub use placement::{PlacementDef, PlacementKind};

use std::io::{Cursor, Read, Write};

use serde::{Deserialize, Serialize};

use crate::format::{read_i8, read_u8};
use crate::util::{Error, IVec2, Result};

/// Size of one encoded requirement.
pub const RECORD_SIZE: usize = 6;

/// What a requirement rectangle means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RequirementRole {
    /// Cells that must be free for the clip to play.
    #[default]
    MustBeClear = 0,
    /// Where a pawn stands when the clip starts.
    PawnStart = 1,
    /// Where a pawn stands when the clip ends.
    PawnEnd = 2,
}

impl RequirementRole {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::MustBeClear),
            1 => Some(Self::PawnStart),
            2 => Some(Self::PawnEnd),
            _ => None,
        }
    }

    /// Whether the pawn slot is meaningful for this role.
    #[inline]
    pub fn is_pawn_role(self) -> bool {
        !matches!(self, Self::MustBeClear)
    }
}

/// Integer rectangle on the ground grid: min corner plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// A single cell.
    pub const fn point(x: i32, y: i32) -> Self {
        Self::new(x, y, 1, 1)
    }

    /// Smallest corner, whatever the sign of the size.
    pub fn min(&self) -> IVec2 {
        IVec2::new(self.x.min(self.x.saturating_add(self.width)), self.y.min(self.y.saturating_add(self.height)))
    }

    /// Largest corner (exclusive), whatever the sign of the size.
    pub fn max(&self) -> IVec2 {
        IVec2::new(self.x.max(self.x.saturating_add(self.width)), self.y.max(self.y.saturating_add(self.height)))
    }

    /// Cells inside the rectangle, rows outer, columns inner, from the min corner.
    ///
    /// A negative size spans toward lower coordinates. A zero size yields nothing.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let (min, max) = (self.min(), self.max());
        (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| IVec2::new(x, y)))
    }
}

/// One grid rectangle with its role and pawn slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceRequirement {
    #[serde(rename = "type")]
    pub role: RequirementRole,
    /// Pawn slot, only meaningful for pawn roles.
    #[serde(default)]
    pub pawn: u8,
    pub area: CellRect,
}

impl SpaceRequirement {
    pub fn new(role: RequirementRole, pawn: u8, area: CellRect) -> Self {
        Self { role, pawn, area }
    }

    pub fn must_be_clear(area: CellRect) -> Self {
        Self::new(RequirementRole::MustBeClear, 0, area)
    }

    pub fn pawn_start(pawn: u8, x: i32, y: i32) -> Self {
        Self::new(RequirementRole::PawnStart, pawn, CellRect::point(x, y))
    }

    pub fn pawn_end(pawn: u8, x: i32, y: i32) -> Self {
        Self::new(RequirementRole::PawnEnd, pawn, CellRect::point(x, y))
    }

    /// Encode to the fixed 6-byte record, truncating out-of-range values.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        [
            self.role as u8,
            self.pawn,
            self.area.x as i8 as u8,
            self.area.y as i8 as u8,
            self.area.width as u8,
            self.area.height as u8,
        ]
    }

    /// Decode a 6-byte record. An unknown role byte is an error.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Result<Self> {
        Self::read_from(&mut Cursor::new(&bytes[..]))
    }

    pub fn write_to(&self, w: &mut impl Write) -> Result<()> {
        w.write_all(&self.encode())?;
        Ok(())
    }

    pub fn read_from(r: &mut impl Read) -> Result<Self> {
        let role_byte = read_u8(r, "space requirement role")?;
        let role = RequirementRole::from_u8(role_byte)
            .ok_or_else(|| Error::invalid(format!("unknown space requirement role {role_byte}")))?;
        let pawn = read_u8(r, "space requirement pawn")?;
        let x = read_i8(r, "space requirement x")?;
        let y = read_i8(r, "space requirement y")?;
        let width = read_u8(r, "space requirement width")?;
        let height = read_u8(r, "space requirement height")?;
        Ok(Self {
            role,
            pawn,
            area: CellRect::new(x.into(), y.into(), width.into(), height.into()),
        })
    }

    /// Fail if any field would be changed by [`encode`](Self::encode).
    pub fn check_range(&self) -> Result<()> {
        let signed = [("x", self.area.x), ("y", self.area.y)];
        for (field, value) in signed {
            if i8::try_from(value).is_err() {
                return Err(Error::RangeTruncation { field, value, bits: 8, kind: "signed" });
            }
        }
        let unsigned = [("width", self.area.width), ("height", self.area.height)];
        for (field, value) in unsigned {
            if u8::try_from(value).is_err() {
                return Err(Error::RangeTruncation { field, value, bits: 8, kind: "unsigned" });
            }
        }
        Ok(())
    }

    /// `|width * height|`.
    pub fn cell_count(&self) -> u64 {
        (i64::from(self.area.width) * i64::from(self.area.height)).unsigned_abs()
    }

    /// Replace the area with the single cell `(x, y)`.
    pub fn set_point(&mut self, x: i32, y: i32) {
        self.area = CellRect::point(x, y);
    }

    /// Cells of the area, each reflected through the origin on the chosen axes.
    pub fn cells(&self, mirror_x: bool, mirror_y: bool) -> impl Iterator<Item = IVec2> {
        self.area.positions().map(move |c| mirror_cell(c, mirror_x, mirror_y))
    }

    /// First cell of [`cells`](Self::cells), or the origin when the area is empty.
    pub fn first_cell(&self, mirror_x: bool, mirror_y: bool) -> IVec2 {
        self.cells(mirror_x, mirror_y).next().unwrap_or(IVec2::ZERO)
    }

    /// Whether this requirement is the given role (and pawn, for pawn roles).
    pub fn matches(&self, role: RequirementRole, pawn: u8) -> bool {
        self.role == role && (!role.is_pawn_role() || self.pawn == pawn)
    }

    /// Authoring mistakes in this entry.
    pub fn config_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.role.is_pawn_role() && self.cell_count() != 1 {
            errors.push(format!(
                "{:?} for pawn {} should cover exactly one cell, but covers {}",
                self.role,
                self.pawn,
                self.cell_count()
            ));
        }
        if !self.role.is_pawn_role() && self.cell_count() == 0 {
            errors.push("MustBeClear area is empty".to_string());
        }
        errors
    }
}

/// Reflect a cell through the origin on the chosen axes.
#[inline]
pub fn mirror_cell(cell: IVec2, mirror_x: bool, mirror_y: bool) -> IVec2 {
    IVec2::new(
        if mirror_x { -cell.x } else { cell.x },
        if mirror_y { -cell.y } else { cell.y },
    )
}

/// All must-be-clear requirements.
pub fn must_be_clear(reqs: &[SpaceRequirement]) -> impl Iterator<Item = &SpaceRequirement> + '_ {
    reqs.iter().filter(|r| r.role == RequirementRole::MustBeClear)
}

/// Start and end requirement of a pawn.
///
/// The last matching entry of each role wins. A pawn with only one of the
/// two is assumed to end where it starts, or start where it ends.
pub fn pawn_positions(
    reqs: &[SpaceRequirement],
    pawn: u8,
) -> (Option<&SpaceRequirement>, Option<&SpaceRequirement>) {
    let start = reqs.iter().rev().find(|r| r.matches(RequirementRole::PawnStart, pawn));
    let end = reqs.iter().rev().find(|r| r.matches(RequirementRole::PawnEnd, pawn));
    (start.or(end), end.or(start))
}
