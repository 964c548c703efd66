//! Coordinate contract between the chart renderer and the time-axis overlay.
//!
//! The renderer stores a `ChartScale` as attributes on the root `<svg>`
//! element; the overlay reads them back at start-up.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const US_PER_PIXEL_ATTR: &str = "data-us-per-pixel";
pub const LEFT_OFFSET_ATTR: &str = "data-left-offset";
pub const HEADER_HEIGHT_ATTR: &str = "data-header-height";

/// Element ids of the overlay's indicator, updated in place.
pub const CURSOR_LINE_ID: &str = "time-cursor";
pub const CURSOR_LABEL_ID: &str = "time-label";

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("chart attribute `{0}` is missing")]
    Missing(&'static str),
    #[error("chart attribute `{name}` is not a number: {value:?}")]
    NotANumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartScale {
    /// Timeline resolution.
    pub us_per_pixel: f64,
    /// Document x-coordinate of time zero (kernel start).
    pub left_offset: f64,
    /// Document y-coordinate where the chart body and the guide start.
    pub header_height: f64,
}

impl ChartScale {
    /// Elapsed microseconds at document x-coordinate `x`.
    pub fn elapsed_at(&self, x: f64) -> f64 {
        (x - self.left_offset) * self.us_per_pixel
    }

    pub fn attributes(&self) -> [(&'static str, f64); 3] {
        [
            (US_PER_PIXEL_ATTR, self.us_per_pixel),
            (LEFT_OFFSET_ATTR, self.left_offset),
            (HEADER_HEIGHT_ATTR, self.header_height),
        ]
    }

    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScaleError> {
        let read = |name: &'static str| -> Result<f64, ScaleError> {
            let value = lookup(name).ok_or(ScaleError::Missing(name))?;
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| ScaleError::NotANumber { name, value })
        };

        Ok(Self {
            us_per_pixel: read(US_PER_PIXEL_ATTR)?,
            left_offset: read(LEFT_OFFSET_ATTR)?,
            header_height: read(HEADER_HEIGHT_ATTR)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn attributes_read_back_into_the_same_scale() {
        let scale = ChartScale {
            us_per_pixel: 10_000.0,
            left_offset: 45.5,
            header_height: 80.0,
        };
        let attrs: HashMap<_, _> = scale
            .attributes()
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        let parsed = ChartScale::from_attributes(|name| attrs.get(name).cloned()).unwrap();
        assert_eq!(parsed, scale);
    }

    #[test]
    fn missing_and_malformed_attributes() {
        assert_eq!(
            ChartScale::from_attributes(|_| None),
            Err(ScaleError::Missing(US_PER_PIXEL_ATTR))
        );
        assert_eq!(
            ChartScale::from_attributes(|_| Some("wide".into())),
            Err(ScaleError::NotANumber {
                name: US_PER_PIXEL_ATTR,
                value: "wide".into(),
            })
        );
    }

    #[test]
    fn elapsed_is_measured_from_the_left_offset() {
        let scale = ChartScale {
            us_per_pixel: 100.0,
            left_offset: 20.0,
            header_height: 0.0,
        };
        assert_eq!(scale.elapsed_at(20.0), 0.0);
        assert_eq!(scale.elapsed_at(35.0), 1_500.0);
        assert_eq!(scale.elapsed_at(10.0), -1_000.0);
    }
}
