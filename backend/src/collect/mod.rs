//! Sources of raw boot timestamps.

pub mod systemctl;

use anyhow::{Context, Result};
use shared::RawBootRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub use systemctl::SystemctlSource;

/// Anything that can produce one boot's raw timestamps.
pub trait TimestampSource {
    fn collect(&self) -> Result<RawBootRecord>;
}

/// A previously stored `RawBootRecord` in JSON form.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimestampSource for SnapshotSource {
    fn collect(&self) -> Result<RawBootRecord> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", self.path.display()))
    }
}

pub fn save_snapshot(path: &Path, record: &RawBootRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RawUnitTimestamps;

    #[test]
    fn snapshot_round_trips_through_a_file() {
        let record = RawBootRecord {
            firmware: 0,
            loader: 0,
            initrd: 800_000,
            userspace: 2_000_000,
            default_target_reached: 6_000_000,
            units: vec![RawUnitTimestamps {
                name: "sshd.service".into(),
                activating: 3_000_000,
                activated: 3_200_000,
                deactivating: 0,
                deactivated: 0,
            }],
        };

        let path = std::env::temp_dir().join(format!("bootline-snapshot-{}.json", std::process::id()));
        save_snapshot(&path, &record).unwrap();
        let loaded = SnapshotSource::new(&path).collect().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, record);
    }

    #[test]
    fn missing_snapshot_names_the_file() {
        let err = SnapshotSource::new("/nonexistent/bootline.json")
            .collect()
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/bootline.json"));
    }
}
