use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use shared::{CollectSection, RawBootRecord, RawUnitTimestamps};
use std::collections::HashMap;
use std::process::Command;

use super::TimestampSource;

const MANAGER_PROPERTIES: &[&str] = &[
    "FirmwareTimestampMonotonic",
    "LoaderTimestampMonotonic",
    "InitRDTimestampMonotonic",
    "UserspaceTimestampMonotonic",
];

const UNIT_PROPERTIES: &[&str] = &[
    "InactiveExitTimestampMonotonic",
    "ActiveEnterTimestampMonotonic",
    "ActiveExitTimestampMonotonic",
    "InactiveEnterTimestampMonotonic",
];

const DEFAULT_TARGET: &str = "default.target";

/// Queries the running service manager through `systemctl show`.
pub struct SystemctlSource {
    program: String,
    unit_types: Vec<String>,
}

impl SystemctlSource {
    pub fn new(config: &CollectSection) -> Self {
        Self {
            program: config.systemctl.clone(),
            unit_types: config.unit_types.clone(),
        }
    }

    fn run(&self, args: &[String]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run `{}`", self.program))?;

        if !output.status.success() {
            bail!(
                "`{} {}` failed: {}",
                self.program,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn show(&self, unit: Option<&str>, properties: &[&str]) -> Result<HashMap<String, String>> {
        let mut args = vec!["show".to_string()];
        args.extend(unit.map(str::to_string));
        args.push(format!("--property={}", properties.join(",")));
        Ok(parse_properties(&self.run(&args)?))
    }

    fn list_units(&self, unit_type: &str) -> Result<Vec<String>> {
        let args = [
            "list-units",
            "--all",
            "--plain",
            "--no-legend",
            "--no-pager",
        ]
        .into_iter()
        .map(str::to_string)
        .chain([format!("--type={unit_type}")])
        .collect::<Vec<_>>();
        Ok(parse_unit_list(&self.run(&args)?))
    }

    fn unit_timestamps(&self, name: &str) -> Result<RawUnitTimestamps> {
        let props = self.show(Some(name), UNIT_PROPERTIES)?;
        Ok(RawUnitTimestamps {
            name: name.to_string(),
            activating: timestamp(&props, "InactiveExitTimestampMonotonic"),
            activated: timestamp(&props, "ActiveEnterTimestampMonotonic"),
            deactivating: timestamp(&props, "ActiveExitTimestampMonotonic"),
            deactivated: timestamp(&props, "InactiveEnterTimestampMonotonic"),
        })
    }
}

impl TimestampSource for SystemctlSource {
    fn collect(&self) -> Result<RawBootRecord> {
        let manager = self
            .show(None, MANAGER_PROPERTIES)
            .context("Failed to query boot milestones")?;
        let target = self
            .show(Some(DEFAULT_TARGET), &["ActiveEnterTimestampMonotonic"])
            .context("Failed to query the default target")?;

        let mut units = Vec::new();
        for unit_type in &self.unit_types {
            let names = self
                .list_units(unit_type)
                .with_context(|| format!("Failed to list {unit_type} units"))?;
            debug!("Found {} {} units", names.len(), unit_type);

            for name in names {
                match self.unit_timestamps(&name) {
                    Ok(raw) => units.push(raw),
                    Err(e) => warn!("Skipping {}: {:#}", name, e),
                }
            }
        }
        info!("Collected timestamps for {} units", units.len());

        Ok(RawBootRecord {
            firmware: timestamp(&manager, "FirmwareTimestampMonotonic"),
            loader: timestamp(&manager, "LoaderTimestampMonotonic"),
            initrd: timestamp(&manager, "InitRDTimestampMonotonic"),
            userspace: timestamp(&manager, "UserspaceTimestampMonotonic"),
            default_target_reached: timestamp(&target, "ActiveEnterTimestampMonotonic"),
            units,
        })
    }
}

/// Parse `Key=Value` lines as printed by `systemctl show`.
pub fn parse_properties(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Unit names from `systemctl list-units --plain --no-legend`, in listed order.
pub fn parse_unit_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Missing, empty, or unreadable values are the "never happened" zero.
fn timestamp(props: &HashMap<String, String>, key: &str) -> u64 {
    match props.get(key).map(String::as_str) {
        None | Some("") => 0,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring unreadable {}={}", key, value);
            0
        }),
    }
}
