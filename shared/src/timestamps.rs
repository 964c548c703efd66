//! Raw collector records and their sentinel-free counterparts.

use serde::{Deserialize, Serialize};

use crate::time::{DurationUs, TimeUs};
use crate::timeline::TimelineError;

/// Lifecycle timestamps of one unit as collected; zero means "never happened".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUnitTimestamps {
    pub name: String,
    /// inactive -> activating
    pub activating: u64,
    /// activating -> active
    pub activated: u64,
    /// active -> deactivating
    pub deactivating: u64,
    /// deactivating -> inactive
    pub deactivated: u64,
}

/// Everything collected for one boot, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBootRecord {
    /// Microseconds before kernel start at which firmware began.
    #[serde(default)]
    pub firmware: u64,
    /// Microseconds before kernel start at which the boot loader began.
    #[serde(default)]
    pub loader: u64,
    #[serde(default)]
    pub initrd: u64,
    #[serde(default)]
    pub userspace: u64,
    #[serde(default)]
    pub default_target_reached: u64,
    #[serde(default)]
    pub units: Vec<RawUnitTimestamps>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitTimestamps {
    pub activating: Option<TimeUs>,
    pub activated: Option<TimeUs>,
    pub deactivating: Option<TimeUs>,
    pub deactivated: Option<TimeUs>,
}

impl From<&RawUnitTimestamps> for UnitTimestamps {
    fn from(raw: &RawUnitTimestamps) -> Self {
        Self {
            activating: TimeUs::from_raw(raw.activating),
            activated: TimeUs::from_raw(raw.activated),
            deactivating: TimeUs::from_raw(raw.deactivating),
            deactivated: TimeUs::from_raw(raw.deactivated),
        }
    }
}

/// Manager-level timestamps bounding the firmware/loader/kernel/initrd lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootMilestones {
    pub firmware: Option<TimeUs>,
    pub loader: Option<TimeUs>,
    pub initrd: Option<TimeUs>,
    pub userspace: TimeUs,
}

impl BootMilestones {
    pub fn from_raw(raw: &RawBootRecord) -> Result<Self, TimelineError> {
        Ok(Self {
            firmware: TimeUs::from_raw(raw.firmware),
            loader: TimeUs::from_raw(raw.loader),
            initrd: TimeUs::from_raw(raw.initrd),
            userspace: TimeUs::from_raw(raw.userspace)
                .ok_or(TimelineError::MissingMilestone("userspace"))?,
        })
    }

    pub fn firmware_time(&self) -> Option<DurationUs> {
        let firmware = self.firmware?;
        firmware.duration_since(self.loader.unwrap_or(TimeUs::ZERO))
    }

    pub fn loader_time(&self) -> Option<DurationUs> {
        self.loader.map(|loader| DurationUs(loader.micros()))
    }

    /// Kernel runs until the initrd takes over, or straight to userspace.
    pub fn kernel_time(&self) -> DurationUs {
        DurationUs(self.initrd.unwrap_or(self.userspace).micros())
    }

    pub fn initrd_time(&self) -> Option<DurationUs> {
        self.userspace.duration_since(self.initrd?)
    }

    pub fn userspace_time(&self, default_target: TimeUs) -> Option<DurationUs> {
        default_target.duration_since(self.userspace)
    }

    /// One-line summary in the familiar "Startup finished in ..." form.
    pub fn summary(&self, default_target: TimeUs) -> String {
        let stages = [
            (self.firmware_time(), "firmware"),
            (self.loader_time(), "loader"),
            (Some(self.kernel_time()), "kernel"),
            (self.initrd_time(), "initrd"),
            (self.userspace_time(default_target), "userspace"),
        ];

        let mut total = DurationUs::ZERO;
        let mut parts = Vec::new();
        for (duration, stage) in stages {
            if let Some(duration) = duration.filter(|d| d.micros() > 0) {
                total = total + duration;
                parts.push(format!("{duration} ({stage})"));
            }
        }

        format!("Startup finished in {} = {}", parts.join(" + "), total)
    }
}
