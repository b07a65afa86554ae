//! Frame evaluation for one playing instance of a clip.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{trace, warn};

use super::overrides::PartOverride;
use super::snapshot::{sample_part, PartSnapshot};
use crate::clip::Clip;
use crate::util::{mirror, Mat4, Seconds, Vec3};

/// Parent-chain transform and ancestor-reduced active flag of one part.
#[derive(Clone, Copy, Debug, Default)]
struct Chain {
    matrix: Mat4,
    active: bool,
}

/// Evaluates a clip at a time for one instance.
///
/// [`seek`](Animator::seek) samples every part up front. World transforms are
/// composed lazily, parent before child, and memoised: parent chains until
/// the next seek, final snapshots until the generation changes (seek,
/// override edit or mirror change).
#[derive(Debug)]
pub struct Animator<'a> {
    clip: &'a Clip,
    time: Seconds,
    mirror_x: bool,
    mirror_y: bool,
    root: Mat4,
    overrides: HashMap<usize, PartOverride>,
    sampled: Vec<PartSnapshot>,
    chains: Vec<Option<Chain>>,
    composed: Vec<Option<(u64, PartSnapshot)>>,
    generation: u64,
    empty: PartSnapshot,
}

impl<'a> Animator<'a> {
    /// Create an animator positioned at time zero.
    pub fn new(clip: &'a Clip) -> Self {
        let mut animator = Self {
            clip,
            time: 0.0,
            mirror_x: false,
            mirror_y: false,
            root: Mat4::IDENTITY,
            overrides: HashMap::new(),
            sampled: Vec::new(),
            chains: Vec::new(),
            composed: Vec::new(),
            generation: 0,
            empty: PartSnapshot::default(),
        };
        animator.seek(0.0);
        animator
    }

    #[inline]
    pub fn clip(&self) -> &'a Clip {
        self.clip
    }

    #[inline]
    pub fn time(&self) -> Seconds {
        self.time
    }

    /// Bumped whenever composed snapshots become stale.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sample every part at `time`.
    pub fn seek(&mut self, time: Seconds) {
        self.time = time;
        self.sampled = self.clip.parts().iter().map(|p| sample_part(p, time)).collect();
        let n = self.sampled.len();
        self.chains = vec![None; n];
        self.composed = vec![None; n];
        self.generation += 1;
        trace!(clip = %self.clip.name(), time, parts = n, "seek");
    }

    #[inline]
    pub fn mirror(&self) -> (bool, bool) {
        (self.mirror_x, self.mirror_y)
    }

    pub fn set_mirror(&mut self, mirror_x: bool, mirror_y: bool) {
        if (mirror_x, mirror_y) != (self.mirror_x, self.mirror_y) {
            self.mirror_x = mirror_x;
            self.mirror_y = mirror_y;
            self.generation += 1;
        }
    }

    /// Instance transform placing the clip in the world.
    #[inline]
    pub fn root_transform(&self) -> &Mat4 {
        &self.root
    }

    pub fn set_root_transform(&mut self, root: Mat4) {
        self.root = root;
    }

    pub fn override_for(&self, part: usize) -> Option<&PartOverride> {
        self.overrides.get(&part)
    }

    /// Edit the override of a part, creating a default one if needed.
    pub fn override_mut(&mut self, part: usize) -> &mut PartOverride {
        self.generation += 1;
        self.overrides.entry(part).or_default()
    }

    pub fn remove_override(&mut self, part: usize) -> Option<PartOverride> {
        let removed = self.overrides.remove(&part);
        if removed.is_some() {
            self.generation += 1;
        }
        removed
    }

    pub fn clear_overrides(&mut self) {
        if !self.overrides.is_empty() {
            self.overrides.clear();
            self.generation += 1;
        }
    }

    /// Sampled state of a part before composition.
    pub fn sampled(&self, part: usize) -> Option<&PartSnapshot> {
        self.sampled.get(part)
    }

    /// Composed snapshot of a part. Unknown indices yield the empty snapshot.
    pub fn snapshot(&mut self, part: usize) -> &PartSnapshot {
        if part >= self.sampled.len() {
            warn!(clip = %self.clip.name(), part, "no part at index, returning empty snapshot");
            return &self.empty;
        }
        let fresh = matches!(&self.composed[part], Some((g, _)) if *g == self.generation);
        if !fresh {
            let snap = self.compose(part);
            self.composed[part] = Some((self.generation, snap));
        }
        match &self.composed[part] {
            Some((_, snap)) => snap,
            None => &self.empty,
        }
    }

    /// Composed snapshot of the part with the given display name.
    pub fn snapshot_named(&mut self, name: &str) -> &PartSnapshot {
        match self.clip.part_named(name).map(|p| p.index()) {
            Some(index) => self.snapshot(index),
            None => &self.empty,
        }
    }

    /// World matrix of a part, excluding the root transform.
    pub fn world_matrix(&mut self, part: usize) -> Mat4 {
        self.snapshot(part).world_matrix
    }

    /// World position of a part-space point, including the root transform.
    pub fn world_position(&mut self, part: usize, local: Vec3) -> Vec3 {
        let root = self.root;
        self.snapshot(part).world_position(&root, local)
    }

    /// World yaw of a part in degrees, including the root transform.
    pub fn world_rotation(&mut self, part: usize) -> f32 {
        let root = self.root;
        self.snapshot(part).world_rotation(&root)
    }

    /// Whether the part and all of its ancestors are active.
    pub fn is_active(&mut self, part: usize) -> bool {
        self.snapshot(part).active
    }

    /// All composed snapshots at the current time, in part order.
    pub fn frame(&mut self) -> Vec<PartSnapshot> {
        (0..self.sampled.len()).map(|i| self.snapshot(i).clone()).collect()
    }

    /// Indices of parts to draw, back to front by depth.
    pub fn draw_order(&mut self) -> Vec<usize> {
        let mut order: Vec<(usize, f32)> = Vec::with_capacity(self.sampled.len());
        for i in 0..self.sampled.len() {
            if self.overrides.get(&i).is_some_and(|ov| ov.prevent_draw) {
                continue;
            }
            let snap = self.snapshot(i);
            if snap.active && snap.texture_path.is_some() {
                order.push((i, snap.depth()));
            }
        }
        order.sort_by(|a, b| a.1.total_cmp(&b.1));
        order.into_iter().map(|(i, _)| i).collect()
    }

    fn compose(&mut self, part: usize) -> PartSnapshot {
        let chain = self.chain(part);
        let mut snap = self.sampled[part].clone();
        let ov = self.overrides.get(&part);

        let (flip_x, flip_y) = match ov {
            Some(ov) => snap.effective_flip(ov),
            None => (snap.flip_x, snap.flip_y),
        };
        let adjust = ov.map_or(Mat4::IDENTITY, |ov| ov.adjust_matrix(flip_x, flip_y));
        let mirror = mirror(self.mirror_x, self.mirror_y);

        snap.world_matrix = mirror * chain.matrix * adjust * mirror;
        snap.active = chain.active;
        if let Some(texture) = ov.and_then(|ov| ov.texture.as_ref()) {
            snap.texture_path = Some(texture.clone());
        }
        snap
    }

    // Walks up to the nearest cached ancestor, then fills the cache downwards.
    fn chain(&mut self, part: usize) -> Chain {
        let mut pending: SmallVec<[usize; 8]> = SmallVec::new();
        let mut base = None;
        let mut current = Some(part);
        while let Some(i) = current {
            if let Some(cached) = self.chains[i] {
                base = Some(cached);
                break;
            }
            pending.push(i);
            current = self.clip.parts()[i].parent();
        }

        let mut acc = base;
        for &i in pending.iter().rev() {
            let local = &self.sampled[i];
            let chain = match acc {
                Some(parent) => Chain {
                    matrix: parent.matrix * local.local_matrix,
                    active: parent.active && local.active,
                },
                None => Chain {
                    matrix: local.local_matrix,
                    active: local.active,
                },
            };
            self.chains[i] = Some(chain);
            acc = Some(chain);
        }
        acc.unwrap_or_default()
    }
}
