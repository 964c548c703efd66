//! Timeline data model: actors (lanes) and the colored events drawn on them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::time::{DurationUs, TimeUs};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("default target has no activation timestamp")]
    MissingDefaultTarget,
    #[error("boot milestone `{0}` has no timestamp")]
    MissingMilestone(&'static str),
    #[error("actor `{0}` is already registered")]
    DuplicateActor(String),
    #[error("unknown actor `{0}`")]
    UnknownActor(String),
}

// ===== COLORS =====

/// Render hint for an event bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn css(self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color `{0}`, expected `#rrggbb` or `r,g,b`")]
pub struct ColorParseError(String);

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(s.to_string());
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
            };
            return Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }

        let channels = trimmed
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgb(*r, *g, *b)),
            _ => Err(invalid()),
        }
    }
}

// ===== EVENTS =====

/// Extent of an event: a known length, or running to the chart's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Span {
    Bounded(DurationUs),
    Endless,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Microseconds relative to kernel start; negative before the kernel.
    pub start: i64,
    pub span: Span,
    pub color: Rgb,
    #[serde(default)]
    pub tooltip: Option<String>,
}

impl Event {
    pub fn bounded(start: i64, duration: DurationUs, color: Rgb) -> Self {
        Self {
            start,
            span: Span::Bounded(duration),
            color,
            tooltip: None,
        }
    }

    pub fn endless(start: i64, color: Rgb) -> Self {
        Self {
            start,
            span: Span::Endless,
            color,
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// End offset for bounded events; endless events have none.
    pub fn end(&self) -> Option<i64> {
        match self.span {
            Span::Bounded(duration) => Some(self.start.saturating_add(duration.as_offset())),
            Span::Endless => None,
        }
    }
}

// ===== ACTORS =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    #[serde(default)]
    pub tooltip: Option<String>,
    pub events: Vec<Event>,
}

impl Actor {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_owned(),
            tooltip: None,
            events: Vec::new(),
        }
    }

    pub fn with_events(name: impl AsRef<str>, events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::new(name)
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

// ===== TIMELINE =====

/// Actors in discovery order, plus the default-target marker when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    actors: IndexMap<String, Actor>,
    #[serde(default)]
    horizon: Option<i64>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline whose right edge is at least the default-target activation time.
    pub fn with_horizon(default_target: TimeUs) -> Self {
        Self {
            actors: IndexMap::new(),
            horizon: Some(default_target.offset()),
        }
    }

    pub fn horizon(&self) -> Option<i64> {
        self.horizon
    }

    pub fn register_actor(&mut self, actor: Actor) -> Result<(), TimelineError> {
        if self.actors.contains_key(&actor.name) {
            return Err(TimelineError::DuplicateActor(actor.name));
        }
        self.actors.insert(actor.name.clone(), actor);
        Ok(())
    }

    pub fn add_event(&mut self, actor: &str, event: Event) -> Result<(), TimelineError> {
        let Some(entry) = self.actors.get_mut(actor) else {
            return Err(TimelineError::UnknownActor(actor.to_string()));
        };
        entry.events.push(event);
        Ok(())
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn all_events(&self) -> impl Iterator<Item = &Event> {
        self.actors.values().flat_map(|actor| actor.events.iter())
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Left edge of the chart: the earliest event start, never right of zero.
    pub fn earliest_start(&self) -> i64 {
        self.all_events().map(|e| e.start).min().unwrap_or(0).min(0)
    }

    /// Right edge of the chart, where endless events stop.
    ///
    /// The default target when known, pushed further right only by bounded
    /// events (or endless starts) that lie beyond it.
    pub fn right_edge(&self) -> i64 {
        self.all_events()
            .map(|e| e.end().unwrap_or(e.start))
            .chain(self.horizon)
            .max()
            .unwrap_or(0)
            .max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb(255, 0, 0);

    #[test]
    fn actors_keep_insertion_order() {
        let mut timeline = Timeline::new();
        for name in ["zeta.service", "alpha.service", "mid.service"] {
            timeline.register_actor(Actor::new(name)).unwrap();
        }
        let names: Vec<_> = timeline.actors().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["zeta.service", "alpha.service", "mid.service"]);
    }

    #[test]
    fn duplicate_actor_is_rejected() {
        let mut timeline = Timeline::new();
        timeline.register_actor(Actor::new("a")).unwrap();
        assert_eq!(
            timeline.register_actor(Actor::new("a")),
            Err(TimelineError::DuplicateActor("a".into()))
        );
    }

    #[test]
    fn event_for_unknown_actor_is_rejected() {
        let mut timeline = Timeline::new();
        let err = timeline
            .add_event("ghost", Event::endless(0, RED))
            .unwrap_err();
        assert_eq!(err, TimelineError::UnknownActor("ghost".into()));
    }

    #[test]
    fn edges_cover_negative_starts_and_horizon() {
        let mut timeline = Timeline::with_horizon(TimeUs(5_000));
        timeline
            .register_actor(Actor::with_events(
                "firmware",
                vec![Event::bounded(-2_000, DurationUs(1_000), RED)],
            ))
            .unwrap();
        timeline
            .register_actor(Actor::with_events(
                "late",
                vec![Event::bounded(4_000, DurationUs(3_000), RED)],
            ))
            .unwrap();
        assert_eq!(timeline.earliest_start(), -2_000);
        assert_eq!(timeline.right_edge(), 7_000);
    }

    #[test]
    fn endless_events_do_not_extend_the_right_edge() {
        let mut timeline = Timeline::with_horizon(TimeUs(5_000));
        timeline
            .register_actor(Actor::with_events("svc", vec![Event::endless(1_000, RED)]))
            .unwrap();
        assert_eq!(timeline.right_edge(), 5_000);
        assert_eq!(timeline.earliest_start(), 0);
    }

    #[test]
    fn parses_hex_and_triplet_colors() {
        assert_eq!("#ff8000".parse::<Rgb>(), Ok(Rgb(255, 128, 0)));
        assert_eq!("10, 20,30".parse::<Rgb>(), Ok(Rgb(10, 20, 30)));
        assert!("1,2".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert_eq!(Rgb(255, 128, 0).to_string(), "#ff8000");
        assert_eq!(Rgb(1, 2, 3).css(), "rgb(1,2,3)");
    }
}
