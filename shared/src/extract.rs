//! Interval extraction: raw lifecycle timestamps -> timeline events.
//!
//! Boot stages get one bar each from the manager milestones. Units are
//! admitted only if they started activating before the default target was
//! reached, and then yield an activating bar plus, if they became active,
//! an active bar that is either bounded or endless.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::time::{DurationUs, TimeUs};
use crate::timeline::{Actor, Event, Rgb, Span, Timeline, TimelineError};
use crate::timestamps::{BootMilestones, RawBootRecord, UnitTimestamps};

pub const FIRMWARE_ACTOR: &str = "firmware";
pub const LOADER_ACTOR: &str = "loader";
pub const KERNEL_ACTOR: &str = "kernel";
pub const INITRD_ACTOR: &str = "initrd";

/// Colors for each kind of bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub firmware: Rgb,
    pub loader: Rgb,
    pub kernel: Rgb,
    pub initrd: Rgb,
    pub activating: Rgb,
    pub active: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            firmware: Rgb(150, 150, 150),
            loader: Rgb(150, 150, 150),
            kernel: Rgb(204, 122, 0),
            initrd: Rgb(51, 102, 204),
            activating: Rgb(255, 0, 0),
            active: Rgb(204, 204, 204),
        }
    }
}

/// Shape of a unit's contribution to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPhases {
    /// Never activated, started after the default target, or inconsistent.
    Excluded,
    /// Activation failed, was skipped, or is still running.
    ActivatingOnly { start: TimeUs, span: Span },
    ActivatingThenBounded {
        start: TimeUs,
        activation: DurationUs,
        active: TimeUs,
        duration: DurationUs,
    },
    ActivatingThenEndless {
        start: TimeUs,
        activation: DurationUs,
        active: TimeUs,
    },
}

impl UnitPhases {
    pub fn classify(unit: &UnitTimestamps, default_target: TimeUs) -> UnitPhases {
        let Some(start) = unit.activating else {
            return UnitPhases::Excluded;
        };
        if start > default_target {
            return UnitPhases::Excluded;
        }

        // Failed or skipped units still show the attempted activation.
        let Some(activation_end) = unit.activated.or(unit.deactivated) else {
            return UnitPhases::ActivatingOnly {
                start,
                span: Span::Endless,
            };
        };
        let activation = activation_end.duration_since(start);

        let Some(active) = unit.activated else {
            return match activation {
                Some(activation) => UnitPhases::ActivatingOnly {
                    start,
                    span: Span::Bounded(activation),
                },
                None => UnitPhases::Excluded,
            };
        };

        // Activated before the recorded activating: only the activating phase
        // is void, so it shrinks to nothing where the active phase begins.
        let (start, activation) = match activation {
            Some(activation) => (start, activation),
            None => (active, DurationUs::ZERO),
        };

        match unit.deactivating {
            Some(deactivating) if active <= deactivating => {
                match deactivating.min(default_target).duration_since(active) {
                    Some(duration) => UnitPhases::ActivatingThenBounded {
                        start,
                        activation,
                        active,
                        duration,
                    },
                    // Became active only after the default target.
                    None => UnitPhases::ActivatingOnly {
                        start,
                        span: Span::Bounded(activation),
                    },
                }
            }
            // Still active, or active again after the last deactivation request.
            _ => UnitPhases::ActivatingThenEndless {
                start,
                activation,
                active,
            },
        }
    }

    pub fn into_events(self, palette: &Palette) -> Vec<Event> {
        let activating = |start: TimeUs, span: Span| {
            let event = Event {
                start: start.offset(),
                span,
                color: palette.activating,
                tooltip: None,
            };
            match span {
                Span::Bounded(duration) => event.with_tooltip(format!("activating: {duration}")),
                Span::Endless => event.with_tooltip("activating"),
            }
        };

        match self {
            UnitPhases::Excluded => Vec::new(),
            UnitPhases::ActivatingOnly { start, span } => vec![activating(start, span)],
            UnitPhases::ActivatingThenBounded {
                start,
                activation,
                active,
                duration,
            } => vec![
                activating(start, Span::Bounded(activation)),
                Event::bounded(active.offset(), duration, palette.active)
                    .with_tooltip(format!("active: {duration}")),
            ],
            UnitPhases::ActivatingThenEndless {
                start,
                activation,
                active,
            } => vec![
                activating(start, Span::Bounded(activation)),
                Event::endless(active.offset(), palette.active)
                    .with_tooltip(format!("active since {active}")),
            ],
        }
    }
}

/// One event per boot stage, in firmware, loader, kernel, initrd order.
///
/// Absent or inconsistent milestones collapse the stage to a zero-length bar
/// at the boundary where it would have been, so every stage keeps its lane.
pub fn boot_stage_events(milestones: &BootMilestones, palette: &Palette) -> [(&'static str, Event); 4] {
    let loader_start = milestones.loader.map_or(0, |loader| -loader.offset());
    let initrd_start = milestones.initrd.unwrap_or(milestones.userspace).offset();

    let firmware_time = milestones.firmware_time().unwrap_or(DurationUs::ZERO);
    let firmware_start = match milestones.firmware {
        Some(firmware) if firmware_time > DurationUs::ZERO => -firmware.offset(),
        _ => loader_start,
    };

    [
        (
            FIRMWARE_ACTOR,
            Event::bounded(firmware_start, firmware_time, palette.firmware),
        ),
        (
            LOADER_ACTOR,
            Event::bounded(
                loader_start,
                milestones.loader_time().unwrap_or(DurationUs::ZERO),
                palette.loader,
            ),
        ),
        (
            KERNEL_ACTOR,
            Event::bounded(0, milestones.kernel_time(), palette.kernel),
        ),
        (
            INITRD_ACTOR,
            Event::bounded(
                initrd_start,
                milestones.initrd_time().unwrap_or(DurationUs::ZERO),
                palette.initrd,
            ),
        ),
    ]
}

/// Build the full timeline: boot stages first, then admitted units in
/// discovery order.
pub fn build_timeline(record: &RawBootRecord, palette: &Palette) -> Result<Timeline, TimelineError> {
    let default_target =
        TimeUs::from_raw(record.default_target_reached).ok_or(TimelineError::MissingDefaultTarget)?;
    let milestones = BootMilestones::from_raw(record)?;

    let mut timeline = Timeline::with_horizon(default_target);
    for (name, event) in boot_stage_events(&milestones, palette) {
        timeline.register_actor(Actor::with_events(name, vec![event]))?;
    }

    for raw in &record.units {
        let phases = UnitPhases::classify(&UnitTimestamps::from(raw), default_target);
        if phases == UnitPhases::Excluded {
            debug!("Skipping {}: outside the boot timeline", raw.name);
            continue;
        }
        debug!("Admitting {}: {:?}", raw.name, phases);
        timeline.register_actor(Actor::with_events(&raw.name, phases.into_events(palette)))?;
    }

    Ok(timeline)
}
