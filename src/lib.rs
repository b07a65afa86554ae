//! # animdata
//!
//! Runtime for part-based animation clips: a binary clip codec, weighted
//! keyframe curves, hierarchical snapshot evaluation with mirroring and
//! per-part overrides, and grid space requirements for placing clips.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math types
//! - [`core`] - Keyframe curves and the shared clip cache
//! - [`clip`] - Clips, parts, channel addressing and events
//! - [`format`] - Binary clip reader and writer
//! - [`eval`] - Per-part sampling and world composition
//! - [`space`] - Space requirement records and placement definitions
//!
//! ## Example
//!
//! ```ignore
//! use animdata::prelude::*;
//!
//! let cache = ClipCache::new();
//! let clip = cache.load("Animations/Execution/Stab.anim", LoadOptions::default())?;
//!
//! let mut animator = Animator::new(&clip);
//! animator.set_mirror(true, false);
//! animator.seek(0.5);
//! for snap in animator.frame() {
//!     println!("{} active={}", snap, snap.active);
//! }
//! ```

pub mod util;
pub mod core;
pub mod clip;
pub mod format;
pub mod eval;
pub mod space;

// Re-export commonly used types
pub use util::{Error, Result};
pub use clip::Clip;
pub use format::{decode_clip, encode_clip};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Seconds};
    pub use crate::core::{ClipCache, Curve, Keyframe, LoadOptions, WrapMode};
    pub use crate::clip::{Clip, CurveSlot, Event, EventKind, EventRegistry, PartData};
    pub use crate::format::{decode_clip, encode_clip, read_clip, write_clip};
    pub use crate::eval::{sample_part, Animator, PartOverride, PartSnapshot};
    pub use crate::space::{CellRect, PlacementDef, RequirementRole, SpaceRequirement};
}
