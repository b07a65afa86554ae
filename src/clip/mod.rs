//! Clip data model.
//!
//! A [`Clip`] is one loaded animation asset: a name, a duration, an arena of
//! [`PartData`] nodes linked by parent index, and a list of timed [`Event`]s.

mod channel;
mod event;
mod part;

pub use channel::{ChannelGroup, CurveSlot};
pub use event::{Event, EventDecoder, EventKind, EventRegistry, SAVE_SEPARATOR};
pub use part::PartData;

use tracing::warn;

use crate::util::{Error, Result, Seconds};

/// Time sub-range of a clip delimited by section events.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: String,
    pub start: Seconds,
    pub end: Seconds,
}

impl Section {
    /// Whether `time` lies in `[start, end)`.
    pub fn contains_time(&self, time: Seconds) -> bool {
        time >= self.start && time < self.end
    }
}

/// One loaded animation clip.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    name: String,
    duration: Seconds,
    parts: Vec<PartData>,
    events: Vec<Event>,
    sections: Vec<Section>,
}

impl Clip {
    /// Build a clip, assigning part indices and validating parent links.
    ///
    /// Parent indices outside the part list are dropped with a warning (the
    /// part becomes a root). A parent chain that loops is an error.
    pub fn new(
        name: impl Into<String>,
        duration: Seconds,
        mut parts: Vec<PartData>,
        events: Vec<Event>,
    ) -> Result<Self> {
        let count = parts.len();
        for (i, part) in parts.iter_mut().enumerate() {
            part.index = i;
            if let Some(parent) = part.parent {
                if parent >= count {
                    warn!(part = %part.path, parent, count, "parent index out of range, treating part as root");
                    part.parent = None;
                }
            }
        }
        check_acyclic(&parts)?;

        let mut clip = Self {
            name: name.into(),
            duration,
            parts,
            events,
            sections: Vec::new(),
        };
        clip.sections = clip.generate_sections();
        Ok(clip)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in seconds.
    #[inline]
    pub fn duration(&self) -> Seconds {
        self.duration
    }

    #[inline]
    pub fn parts(&self) -> &[PartData] {
        &self.parts
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[inline]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[inline]
    pub fn part(&self, index: usize) -> Option<&PartData> {
        self.parts.get(index)
    }

    /// Find a part by display name. Logs a warning when nothing matches.
    pub fn part_named(&self, name: &str) -> Option<&PartData> {
        let found = self.parts.iter().find(|p| p.name() == name);
        if found.is_none() {
            warn!(clip = %self.name, "failed to find part called '{}'", name);
        }
        found
    }

    pub fn parent_of(&self, part: &PartData) -> Option<&PartData> {
        part.parent.and_then(|i| self.parts.get(i))
    }

    /// Direct children of a part, in part order.
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &PartData> + '_ {
        self.parts.iter().filter(move |p| p.parent == Some(index))
    }

    /// Parts without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &PartData> + '_ {
        self.parts.iter().filter(|p| p.parent.is_none())
    }

    /// Events with `start <= time <= end`, in stored order.
    pub fn events_in_window(&self, start: Seconds, end: Seconds) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.is_in_time_window(start, end))
    }

    pub fn section_named(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Section containing `time`. Logs a warning when none does.
    pub fn section_at_time(&self, time: Seconds) -> Option<&Section> {
        let found = self.sections.iter().find(|s| s.contains_time(time));
        if found.is_none() {
            warn!(
                "didn't find any section for time {}, clip is {}s with {} sections",
                time,
                self.duration,
                self.sections.len()
            );
        }
        found
    }

    /// Latest key time over every part.
    pub fn max_key_time(&self) -> Seconds {
        self.parts.iter().map(PartData::max_key_time).fold(0.0, f32::max)
    }

    /// Check that the duration covers every key. Returns `false` (and warns) if not.
    pub fn validate(&self) -> bool {
        let max = self.max_key_time();
        let ok = self.duration >= 0.0 && self.duration >= max;
        if !ok {
            warn!(clip = %self.name, duration = self.duration, max_key_time = max, "clip duration does not cover its keys");
        }
        ok
    }

    // Section events are not turned into sections yet.
    fn generate_sections(&self) -> Vec<Section> {
        Vec::new()
    }
}

fn check_acyclic(parts: &[PartData]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnWalk,
        ReachesRoot,
    }

    // Each part is walked once; chains already known to end at a root stop the walk.
    let mut marks = vec![Mark::Unvisited; parts.len()];
    let mut walk = Vec::new();
    for start in 0..parts.len() {
        let mut current = Some(start);
        while let Some(i) = current {
            match marks[i] {
                Mark::ReachesRoot => break,
                Mark::OnWalk => return Err(Error::ParentCycle(start)),
                Mark::Unvisited => {}
            }
            marks[i] = Mark::OnWalk;
            walk.push(i);
            current = parts[i].parent;
        }
        for i in walk.drain(..) {
            marks[i] = Mark::ReachesRoot;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Clip {
        let parts = vec![
            PartData::new("Root"),
            PartData::new("Root/Body").with_parent(0),
            PartData::new("Root/Body/Hand").with_parent(1),
            PartData::new("Other"),
        ];
        Clip::new("tree", 2.0, parts, Vec::new()).unwrap()
    }

    #[test]
    fn test_indices_assigned() {
        let clip = tree();
        for (i, part) in clip.parts().iter().enumerate() {
            assert_eq!(part.index(), i);
        }
    }

    #[test]
    fn test_hierarchy_queries() {
        let clip = tree();
        let hand = clip.part_named("Root/Body/Hand").unwrap();
        assert_eq!(clip.parent_of(hand).map(|p| p.path.as_str()), Some("Root/Body"));
        let roots: Vec<_> = clip.roots().map(|p| p.index()).collect();
        assert_eq!(roots, vec![0, 3]);
        let children: Vec<_> = clip.children_of(0).map(|p| p.index()).collect();
        assert_eq!(children, vec![1]);
        assert!(clip.part_named("Missing").is_none());
    }

    #[test]
    fn test_deep_chain_is_acyclic() {
        let parts: Vec<PartData> = (0..20_000)
            .map(|i| {
                let part = PartData::new(format!("p{i}"));
                if i == 0 { part } else { part.with_parent(i - 1) }
            })
            .collect();
        let clip = Clip::new("deep", 1.0, parts, Vec::new()).unwrap();
        assert_eq!(clip.roots().count(), 1);
    }

    #[test]
    fn test_cycle_behind_acyclic_parts() {
        let parts = vec![
            PartData::new("a"),
            PartData::new("b").with_parent(0),
            PartData::new("c").with_parent(3),
            PartData::new("d").with_parent(2),
        ];
        let err = Clip::new("c", 1.0, parts, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ParentCycle(2)));
    }

    #[test]
    fn test_out_of_range_parent_becomes_root() {
        let parts = vec![PartData::new("a"), PartData::new("b").with_parent(7)];
        let clip = Clip::new("c", 1.0, parts, Vec::new()).unwrap();
        assert_eq!(clip.parts()[1].parent(), None);
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let parts = vec![PartData::new("a").with_parent(1), PartData::new("b").with_parent(0)];
        let err = Clip::new("c", 1.0, parts, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ParentCycle(_)));

        let parts = vec![PartData::new("self").with_parent(0)];
        assert!(Clip::new("c", 1.0, parts, Vec::new()).is_err());
    }

    #[test]
    fn test_sections_are_inert() {
        let events = vec![Event::new(0.5, EventKind::Section { name: "a".into() })];
        let clip = Clip::new("c", 1.0, Vec::new(), events).unwrap();
        assert!(clip.sections().is_empty());
        assert!(clip.section_named("a").is_none());
        assert!(clip.section_at_time(0.7).is_none());
    }

    #[test]
    fn test_validate_duration() {
        use crate::core::{Curve, Keyframe};
        let part = PartData::new("p")
            .with_curve(CurveSlot::PosX, Curve::new([Keyframe::new(0.0, 0.0), Keyframe::new(3.0, 1.0)]));
        let short = Clip::new("c", 1.0, vec![part.clone()], Vec::new()).unwrap();
        assert!(!short.validate());
        let ok = Clip::new("c", 3.0, vec![part], Vec::new()).unwrap();
        assert!(ok.validate());
    }
}
