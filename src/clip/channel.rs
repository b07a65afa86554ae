//! Channel addressing for part curves.
//!
//! On disk every curve is addressed by a `(group, field)` byte pair. The table
//! below is part of the file format: field numbers must never be renumbered.
//!
//! | group | field | slot |
//! |---|---|---|
//! | 1 (Transform) | 1–3 | position x, y, z |
//! | 1 | 4–6 | rotation x, y, z |
//! | 1 | 7–9 | scale x, y, z |
//! | 2 (Data) | 1–3 | free scalars a, b, c |
//! | 2 | 4–7 | colour r, g, b, a |
//! | 2 | 8–9 | flip x, flip y |
//! | 3 (GameObject) | 1 | active |

/// Channel group byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelGroup {
    Transform = 1,
    Data = 2,
    GameObject = 3,
}

impl ChannelGroup {
    /// Parse a group byte. `0` and unknown values have no group.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Transform),
            2 => Some(Self::Data),
            3 => Some(Self::GameObject),
            _ => None,
        }
    }
}

/// One of the 19 curve slots a part carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveSlot {
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ,
    ScaleX,
    ScaleY,
    ScaleZ,
    DataA,
    DataB,
    DataC,
    ColorR,
    ColorG,
    ColorB,
    ColorA,
    FlipX,
    FlipY,
    Active,
}

impl CurveSlot {
    /// Number of slots on a part.
    pub const COUNT: usize = 19;

    /// All slots in storage order.
    pub const ALL: [CurveSlot; Self::COUNT] = [
        Self::PosX,
        Self::PosY,
        Self::PosZ,
        Self::RotX,
        Self::RotY,
        Self::RotZ,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
        Self::DataA,
        Self::DataB,
        Self::DataC,
        Self::ColorR,
        Self::ColorG,
        Self::ColorB,
        Self::ColorA,
        Self::FlipX,
        Self::FlipY,
        Self::Active,
    ];

    /// Resolve an on-disk `(group, field)` address.
    ///
    /// Returns `None` for the reserved value `0` and for unknown addresses.
    pub fn from_address(group: u8, field: u8) -> Option<Self> {
        if field == 0 {
            return None;
        }
        let group = ChannelGroup::from_u8(group)?;
        let slot = match (group, field) {
            (ChannelGroup::Transform, 1..=9) => Self::ALL[(field - 1) as usize],
            (ChannelGroup::Data, 1..=9) => Self::ALL[9 + (field - 1) as usize],
            (ChannelGroup::GameObject, 1) => Self::Active,
            _ => return None,
        };
        Some(slot)
    }

    /// The on-disk `(group, field)` address of this slot.
    pub fn address(self) -> (ChannelGroup, u8) {
        let i = self.index();
        match i {
            0..=8 => (ChannelGroup::Transform, i as u8 + 1),
            9..=17 => (ChannelGroup::Data, (i - 9) as u8 + 1),
            _ => (ChannelGroup::GameObject, 1),
        }
    }

    /// Storage index in `0..COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Slots whose sampled value is read as a boolean (`>= 0.5`).
    #[inline]
    pub fn is_flag(self) -> bool {
        matches!(self, Self::FlipX | Self::FlipY | Self::Active)
    }
}
