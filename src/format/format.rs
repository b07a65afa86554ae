//! Clip format constants.

/// Parent index written for root parts.
pub const NO_PARENT: i16 = -1;

/// Number of parts a curve record can address (its part index is one byte).
pub const MAX_PARTS: usize = u8::MAX as usize + 1;

/// Maximum number of bytes in a 7-bit encoded string length.
pub const MAX_LENGTH_PREFIX_BYTES: usize = 5;

/// Size of one keyframe record in bytes.
pub const KEYFRAME_SIZE: usize = 6 * 4 + 1;

/// Upper bound on speculative allocation from untrusted counts.
pub(crate) const PREALLOC_LIMIT: usize = 1024;
