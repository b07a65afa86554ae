//! Static description of one node in a clip's part hierarchy.

use crate::core::Curve;

use super::channel::CurveSlot;

/// One animated part of a clip.
///
/// Parts live in an arena owned by [`Clip`](super::Clip); the parent link is
/// an index into that arena, resolved once all parts have been read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartData {
    /// Hierarchical path, unique within the clip.
    pub path: String,
    /// Optional display name overriding the path.
    pub custom_name: Option<String>,
    /// Texture reference, if the part draws anything.
    pub texture_path: Option<String>,
    /// Whether the part should use a transparent material by default.
    pub transparent_by_default: bool,
    pub(crate) index: usize,
    pub(crate) parent: Option<usize>,
    curves: [Curve; CurveSlot::COUNT],
}

impl PartData {
    /// Create a root part with empty curves.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Display name: the custom name when present, else the path.
    #[inline]
    pub fn name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.path)
    }

    /// Position of this part in its clip.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the parent part, `None` for roots.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Set the parent index. Validated when the clip is built.
    pub fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }

    /// Builder form of [`PartData::set_parent`].
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    #[inline]
    pub fn curve(&self, slot: CurveSlot) -> &Curve {
        &self.curves[slot.index()]
    }

    #[inline]
    pub fn curve_mut(&mut self, slot: CurveSlot) -> &mut Curve {
        &mut self.curves[slot.index()]
    }

    /// Replace the curve in a slot.
    pub fn set_curve(&mut self, slot: CurveSlot, curve: Curve) {
        self.curves[slot.index()] = curve;
    }

    /// Builder form of [`PartData::set_curve`].
    pub fn with_curve(mut self, slot: CurveSlot, curve: Curve) -> Self {
        self.set_curve(slot, curve);
        self
    }

    /// Look up a curve by its on-disk address.
    pub fn curve_at(&self, group: u8, field: u8) -> Option<&Curve> {
        CurveSlot::from_address(group, field).map(|slot| self.curve(slot))
    }

    /// Store a curve by its on-disk address.
    ///
    /// Reserved or unknown addresses discard the curve and return `false`.
    pub fn set_curve_at(&mut self, group: u8, field: u8, curve: Curve) -> bool {
        match CurveSlot::from_address(group, field) {
            Some(slot) => {
                self.set_curve(slot, curve);
                true
            }
            None => false,
        }
    }

    /// All slots with their curves, in storage order.
    pub fn curves(&self) -> impl Iterator<Item = (CurveSlot, &Curve)> + '_ {
        CurveSlot::ALL.iter().map(move |&slot| (slot, self.curve(slot)))
    }

    /// Latest key time over all curves, `0` when nothing is animated.
    pub fn max_key_time(&self) -> f32 {
        self.curves
            .iter()
            .filter_map(Curve::time_range)
            .map(|(_, end)| end)
            .fold(0.0, f32::max)
    }
}
