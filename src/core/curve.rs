//! Keyframed scalar curves.
//!
//! A [`Curve`] is the runtime form of one animated channel: an ordered list of
//! [`Keyframe`]s plus wrap policies for times before the first and after the
//! last key. Between keys the curve is a weighted cubic Hermite segment.

use smallvec::SmallVec;

use crate::util::Seconds;

/// Tangent weight used when a key side is not explicitly weighted.
pub const DEFAULT_WEIGHT: f32 = 1.0 / 3.0;

/// Bisection steps used to invert a weighted segment's time polynomial.
const WEIGHTED_SOLVE_STEPS: usize = 24;

/// Behaviour of a curve outside its key range.
///
/// The byte values are the on-disk identifiers. Values the runtime does not
/// recognise are kept in [`WrapMode::Other`] so they re-encode unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Unset; behaves as clamp.
    #[default]
    Default,
    /// Play once then hold the end value.
    Once,
    /// Repeat the key range.
    Loop,
    /// Alternate forwards and backwards through the key range.
    PingPong,
    /// Hold the end value forever.
    ClampForever,
    /// Unrecognised byte, evaluated as clamp.
    Other(u8),
}

impl WrapMode {
    /// Parse from the on-disk byte.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Default,
            1 => Self::Once,
            2 => Self::Loop,
            4 => Self::PingPong,
            8 => Self::ClampForever,
            other => Self::Other(other),
        }
    }

    /// Convert to the on-disk byte.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Once => 1,
            Self::Loop => 2,
            Self::PingPong => 4,
            Self::ClampForever => 8,
            Self::Other(v) => v,
        }
    }

    /// Map a time outside `[start, end]` back into the range.
    fn apply(self, time: Seconds, start: Seconds, end: Seconds) -> Seconds {
        let span = end - start;
        if span <= 0.0 {
            return start;
        }
        match self {
            Self::Loop => start + (time - start).rem_euclid(span),
            Self::PingPong => start + ping_pong(time - start, span),
            _ => time.clamp(start, end),
        }
    }
}

/// Reflect `t` into `[0, span]`, bouncing at each end.
fn ping_pong(t: f32, span: f32) -> f32 {
    let m = t.rem_euclid(2.0 * span);
    if m <= span { m } else { 2.0 * span - m }
}

/// Which tangent sides of a key carry an explicit weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WeightedMode {
    #[default]
    None,
    In,
    Out,
    Both,
    /// Unrecognised byte, evaluated as `None`.
    Other(u8),
}

impl WeightedMode {
    /// Parse from the on-disk byte.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::In,
            2 => Self::Out,
            3 => Self::Both,
            other => Self::Other(other),
        }
    }

    /// Convert to the on-disk byte.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::In => 1,
            Self::Out => 2,
            Self::Both => 3,
            Self::Other(v) => v,
        }
    }

    #[inline]
    fn weights_in(self) -> bool {
        matches!(self, Self::In | Self::Both)
    }

    #[inline]
    fn weights_out(self) -> bool {
        matches!(self, Self::Out | Self::Both)
    }
}

/// A single curve key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: Seconds,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub in_weight: f32,
    pub out_weight: f32,
    pub weighted_mode: WeightedMode,
}

impl Keyframe {
    /// Key with flat tangents and default weights.
    pub fn new(time: Seconds, value: f32) -> Self {
        Self::with_tangents(time, value, 0.0, 0.0)
    }

    /// Key with explicit tangents and default weights.
    pub fn with_tangents(time: Seconds, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
            in_weight: DEFAULT_WEIGHT,
            out_weight: DEFAULT_WEIGHT,
            weighted_mode: WeightedMode::None,
        }
    }
}

/// Keyframed scalar function of time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    keys: SmallVec<[Keyframe; 4]>,
    pub pre_wrap: WrapMode,
    pub post_wrap: WrapMode,
}

impl Curve {
    /// Create a curve from keys. Keys are stably sorted by time.
    pub fn new(keys: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut keys: SmallVec<[Keyframe; 4]> = keys.into_iter().collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            keys,
            pre_wrap: WrapMode::Default,
            post_wrap: WrapMode::Default,
        }
    }

    /// Set both wrap policies.
    pub fn with_wrap(mut self, pre_wrap: WrapMode, post_wrap: WrapMode) -> Self {
        self.pre_wrap = pre_wrap;
        self.post_wrap = post_wrap;
        self
    }

    /// The single-key curve used to store a default (unanimated) value.
    pub fn constant(value: f32) -> Self {
        Self::new([Keyframe::new(0.0, value)])
            .with_wrap(WrapMode::ClampForever, WrapMode::ClampForever)
    }

    /// Whether this curve has exactly the shape produced by [`Curve::constant`].
    pub fn as_constant(&self) -> Option<f32> {
        match self.keys.as_slice() {
            [key] if *self == Self::constant(key.value) => Some(key.value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// First and last key times, if any.
    pub fn time_range(&self) -> Option<(Seconds, Seconds)> {
        Some((self.keys.first()?.time, self.keys.last()?.time))
    }

    /// Evaluate the curve at `time`. Empty curves evaluate to 0.
    pub fn evaluate(&self, time: Seconds) -> f32 {
        let keys = self.keys.as_slice();
        let (first, last) = match keys {
            [] => return 0.0,
            [only] => return only.value,
            [first, .., last] => (first, last),
        };

        let t = if time < first.time {
            self.pre_wrap.apply(time, first.time, last.time)
        } else if time > last.time {
            self.post_wrap.apply(time, first.time, last.time)
        } else {
            time
        };

        // Index of the first key strictly after t.
        let upper = keys.partition_point(|k| k.time <= t);
        if upper == 0 {
            return first.value;
        }
        if upper >= keys.len() {
            return last.value;
        }
        evaluate_segment(&keys[upper - 1], &keys[upper], t)
    }
}

fn evaluate_segment(k0: &Keyframe, k1: &Keyframe, t: Seconds) -> f32 {
    let dt = k1.time - k0.time;
    if dt <= 0.0 {
        return k1.value;
    }
    if !k0.out_tangent.is_finite() || !k1.in_tangent.is_finite() {
        return k0.value;
    }

    let w_out = if k0.weighted_mode.weights_out() { k0.out_weight } else { DEFAULT_WEIGHT };
    let w_in = if k1.weighted_mode.weights_in() { k1.in_weight } else { DEFAULT_WEIGHT };
    let u = (t - k0.time) / dt;

    if w_out == DEFAULT_WEIGHT && w_in == DEFAULT_WEIGHT {
        return hermite(k0.value, k0.out_tangent * dt, k1.value, k1.in_tangent * dt, u);
    }

    // Weighted segment as a cubic Bezier in normalized time.
    let x1 = w_out;
    let x2 = 1.0 - w_in;
    let y1 = k0.value + k0.out_tangent * w_out * dt;
    let y2 = k1.value - k1.in_tangent * w_in * dt;
    let s = solve_bezier_x(u, x1, x2);
    cubic_bezier(k0.value, y1, y2, k1.value, s)
}

#[inline]
fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Find the Bezier parameter whose x equals `x` for control xs (0, x1, x2, 1).
fn solve_bezier_x(x: f32, x1: f32, x2: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = x;
    for _ in 0..WEIGHTED_SOLVE_STEPS {
        let bx = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (bx - x).abs() < 1e-6 {
            break;
        }
        if bx < x {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    mid
}
