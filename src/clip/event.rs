//! Timed clip events.
//!
//! Events are stored in the clip as an opaque save-string of the form
//! `Tag;arg1;arg2;...` plus a time. The tag selects a decoder from an
//! [`EventRegistry`]; built-in tags cover the event kinds the runtime knows,
//! hosts may register further tags that decode to [`EventKind::Custom`].

use std::collections::HashMap;
use std::fmt;

use crate::util::{Error, Result, Seconds};

/// Separator between the tag and arguments of a save-string.
pub const SAVE_SEPARATOR: char = ';';

/// Payload of an event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    /// Marks a section boundary.
    Section { name: String },
    /// Play a sound.
    Sound { sound: String, volume: f32, pitch: f32 },
    /// Damage a participating pawn.
    Damage { pawn: u8, amount: f32 },
    /// Kill a participating pawn.
    Kill { pawn: u8 },
    /// Host-registered kind; arguments are kept verbatim.
    Custom { tag: String, args: Vec<String> },
}

impl EventKind {
    /// The tag this kind is saved under.
    pub fn tag(&self) -> &str {
        match self {
            Self::Section { .. } => "Section",
            Self::Sound { .. } => "Sound",
            Self::Damage { .. } => "Damage",
            Self::Kill { .. } => "Kill",
            Self::Custom { tag, .. } => tag,
        }
    }

    /// Rebuild the save-string this kind decodes from.
    pub fn save_data(&self) -> String {
        let args: Vec<String> = match self {
            Self::Section { name } => vec![name.clone()],
            Self::Sound { sound, volume, pitch } => {
                vec![sound.clone(), volume.to_string(), pitch.to_string()]
            }
            Self::Damage { pawn, amount } => vec![pawn.to_string(), amount.to_string()],
            Self::Kill { pawn } => vec![pawn.to_string()],
            Self::Custom { args, .. } => args.clone(),
        };
        let mut out = self.tag().to_string();
        for arg in args {
            out.push(SAVE_SEPARATOR);
            out.push_str(&arg);
        }
        out
    }
}

/// A time-stamped event.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub time: Seconds,
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: Seconds, kind: EventKind) -> Self {
        Self { time, kind }
    }

    /// Save-string for this event (time is stored separately).
    pub fn save_data(&self) -> String {
        self.kind.save_data()
    }

    /// Whether the event lies in `[start, end]`, both ends inclusive.
    #[inline]
    pub fn is_in_time_window(&self, start: Seconds, end: Seconds) -> bool {
        self.time >= start && self.time <= end
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}s] {}", self.time, self.save_data())
    }
}

/// Decoder for the arguments following a tag.
pub type EventDecoder = fn(tag: &str, args: &[&str]) -> Result<EventKind>;

/// Maps save-string tags (case-insensitive) to decoders.
#[derive(Clone)]
pub struct EventRegistry {
    decoders: HashMap<String, EventDecoder>,
}

impl EventRegistry {
    /// Registry without any tags.
    pub fn empty() -> Self {
        Self { decoders: HashMap::new() }
    }

    /// Register or replace a decoder for `tag`.
    pub fn register(&mut self, tag: &str, decoder: EventDecoder) -> &mut Self {
        self.decoders.insert(tag.to_ascii_lowercase(), decoder);
        self
    }

    /// Register `tag` as a custom kind that keeps its arguments verbatim.
    pub fn register_custom(&mut self, tag: &str) -> &mut Self {
        self.register(tag, decode_custom)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(&tag.to_ascii_lowercase())
    }

    /// Rebuild an event payload from its save-string.
    pub fn decode(&self, save_data: &str) -> Result<EventKind> {
        let mut parts = save_data.split(SAVE_SEPARATOR);
        let tag = parts.next().unwrap_or_default().trim();
        let args: Vec<&str> = parts.collect();
        let decoder = self
            .decoders
            .get(&tag.to_ascii_lowercase())
            .ok_or_else(|| Error::UnknownEvent(tag.to_string()))?;
        decoder(tag, &args)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("Section", decode_section)
            .register("Sound", decode_sound)
            .register("Damage", decode_damage)
            .register("Kill", decode_kill);
        registry
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.decoders.keys().collect();
        tags.sort();
        f.debug_struct("EventRegistry").field("tags", &tags).finish()
    }
}

fn required<'a>(tag: &str, args: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| Error::invalid(format!("{tag} event is missing argument '{what}'")))
}

fn parse_arg<T: std::str::FromStr>(tag: &str, raw: &str, what: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::invalid(format!("{tag} event has invalid '{what}': {raw:?}")))
}

fn optional<T: std::str::FromStr>(tag: &str, args: &[&str], index: usize, what: &str, fallback: T) -> Result<T> {
    match args.get(index) {
        Some(raw) => parse_arg(tag, raw, what),
        None => Ok(fallback),
    }
}

fn decode_section(tag: &str, args: &[&str]) -> Result<EventKind> {
    Ok(EventKind::Section {
        name: required(tag, args, 0, "name")?.to_string(),
    })
}

fn decode_sound(tag: &str, args: &[&str]) -> Result<EventKind> {
    Ok(EventKind::Sound {
        sound: required(tag, args, 0, "sound")?.to_string(),
        volume: optional(tag, args, 1, "volume", 1.0)?,
        pitch: optional(tag, args, 2, "pitch", 1.0)?,
    })
}

fn decode_damage(tag: &str, args: &[&str]) -> Result<EventKind> {
    Ok(EventKind::Damage {
        pawn: parse_arg(tag, required(tag, args, 0, "pawn")?, "pawn")?,
        amount: optional(tag, args, 1, "amount", 0.0)?,
    })
}

fn decode_kill(tag: &str, args: &[&str]) -> Result<EventKind> {
    Ok(EventKind::Kill {
        pawn: parse_arg(tag, required(tag, args, 0, "pawn")?, "pawn")?,
    })
}

fn decode_custom(tag: &str, args: &[&str]) -> Result<EventKind> {
    Ok(EventKind::Custom {
        tag: tag.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_builtins() {
        let reg = EventRegistry::default();
        assert_eq!(
            reg.decode("Section;intro").unwrap(),
            EventKind::Section { name: "intro".into() }
        );
        assert_eq!(
            reg.decode("sound;Slash").unwrap(),
            EventKind::Sound { sound: "Slash".into(), volume: 1.0, pitch: 1.0 }
        );
        assert_eq!(
            reg.decode("Damage;1;12.5").unwrap(),
            EventKind::Damage { pawn: 1, amount: 12.5 }
        );
        assert_eq!(reg.decode("KILL;0").unwrap(), EventKind::Kill { pawn: 0 });
    }

    #[test]
    fn test_unknown_tag() {
        let reg = EventRegistry::default();
        let err = reg.decode("Explode;3").unwrap_err();
        assert!(matches!(err, Error::UnknownEvent(ref t) if t == "Explode"));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_bad_arguments() {
        let reg = EventRegistry::default();
        assert!(reg.decode("Kill").is_err());
        assert!(reg.decode("Kill;abc").is_err());
        assert!(reg.decode("Sound;Slash;loud").is_err());
    }

    #[test]
    fn test_custom_registration() {
        let mut reg = EventRegistry::default();
        reg.register_custom("CameraShake");
        let kind = reg.decode("CameraShake;0.5;strong").unwrap();
        assert_eq!(
            kind,
            EventKind::Custom { tag: "CameraShake".into(), args: vec!["0.5".into(), "strong".into()] }
        );
        assert_eq!(kind.save_data(), "CameraShake;0.5;strong");
    }

    #[test]
    fn test_save_data_inverse() {
        let reg = EventRegistry::default();
        let kinds = [
            EventKind::Section { name: "loop".into() },
            EventKind::Sound { sound: "Hit".into(), volume: 0.8, pitch: 1.25 },
            EventKind::Damage { pawn: 2, amount: 3.5 },
            EventKind::Kill { pawn: 1 },
        ];
        for kind in kinds {
            assert_eq!(reg.decode(&kind.save_data()).unwrap(), kind);
        }
    }

    #[test]
    fn test_time_window_inclusive() {
        let e = Event::new(1.5, EventKind::Kill { pawn: 0 });
        assert!(e.is_in_time_window(1.5, 2.0));
        assert!(e.is_in_time_window(1.0, 1.5));
        assert!(!e.is_in_time_window(1.6, 2.0));
    }
}
