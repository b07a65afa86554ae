//! Core layer: keyframe curves and the shared clip cache.
//!
//! This module provides:
//! - [`Curve`] / [`Keyframe`] - Weighted Hermite curves with wrap modes
//! - [`ClipCache`] - Path-keyed cache of loaded clips

mod cache;
mod curve;

pub use cache::{load_file, ClipCache, LoadOptions};
pub use curve::{Curve, Keyframe, WeightedMode, WrapMode, DEFAULT_WEIGHT};
