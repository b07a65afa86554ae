//! Clip evaluation.
//!
//! [`sample_part`] turns a part's curves into a [`PartSnapshot`] at one time.
//! [`Animator`] samples a whole clip, then composes world transforms through
//! the parent chain with per-instance mirroring and [`PartOverride`]s:
//!
//! ```text
//! world = mirror * parent_chain * local * override_adjust * mirror
//! ```

mod animator;
mod overrides;
mod snapshot;

pub use animator::Animator;
pub use overrides::PartOverride;
pub use snapshot::{sample_part, PartSnapshot, FLAG_THRESHOLD};
