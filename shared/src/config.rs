use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::Palette;

// ===== CONFIG TYPES =====

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported configuration version `{0}`")]
    UnsupportedVersion(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BootlineConfig {
    pub app: AppSection,
    pub render: RenderSection,
    pub colors: Palette,
    pub overlay: OverlaySection,
    pub collect: CollectSection,
}

impl BootlineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BootlineConfig = toml::from_str(content)?;
        if !config.app.is_supported_version() {
            return Err(ConfigError::UnsupportedVersion(config.app.version));
        }
        Ok(config)
    }
}

// AppSection carries the config format version so future formats can be migrated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_supported_version(&self) -> bool {
        matches!(self.version.as_str(), "1.0.0")
    }

    pub fn needs_migration(&self) -> bool {
        self.version != Self::CURRENT_VERSION
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

/// Layout of the rendered chart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderSection {
    /// Distance between labelled grid lines
    pub us_per_line: u64,
    /// Unlabelled grid lines between two labelled ones
    pub sublines: u32,
    pub us_per_pixel: u32,
    pub pixels_per_actor: f64,
    pub actor_margin: f64,
    pub actor_name_padding: f64,
    pub top_margin: f64,
    pub side_margin: f64,
    pub heading: String,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            us_per_line: 1_000_000,
            sublines: 10,
            us_per_pixel: 10_000,
            pixels_per_actor: 20.0,
            actor_margin: 0.5,
            actor_name_padding: 5.0,
            top_margin: 20.0,
            side_margin: 20.0,
            heading: String::new(),
        }
    }
}

/// Where the rendered document loads the time-axis overlay from.
///
/// Both paths are emitted verbatim; leaving either empty produces a static chart.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OverlaySection {
    /// wasm-bindgen `no-modules` JavaScript glue
    pub loader_href: Option<String>,
    pub wasm_href: Option<String>,
}

impl OverlaySection {
    pub fn hrefs(&self) -> Option<(&str, &str)> {
        match (self.loader_href.as_deref(), self.wasm_href.as_deref()) {
            (Some(loader), Some(wasm)) if !loader.is_empty() && !wasm.is_empty() => Some((loader, wasm)),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CollectSection {
    pub systemctl: String,
    /// Unit types listed as timeline actors, e.g. "service", "mount"
    pub unit_types: Vec<String>,
}

impl Default for CollectSection {
    fn default() -> Self {
        Self {
            systemctl: "systemctl".to_string(),
            unit_types: vec!["service".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Rgb;

    #[test]
    fn empty_file_gives_defaults() {
        let config = BootlineConfig::from_toml_str("").unwrap();
        assert_eq!(config, BootlineConfig::default());
        assert!(!config.app.needs_migration());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = BootlineConfig::from_toml_str(
            r#"
            [render]
            us_per_pixel = 5000
            heading = "my laptop"

            [colors]
            activating = [200, 10, 10]

            [overlay]
            loader_href = "overlay/frontend.js"
            wasm_href = "overlay/frontend_bg.wasm"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.us_per_pixel, 5_000);
        assert_eq!(config.render.heading, "my laptop");
        assert_eq!(config.render.sublines, 10);
        assert_eq!(config.colors.activating, Rgb(200, 10, 10));
        assert_eq!(config.colors.active, Palette::default().active);
        assert_eq!(
            config.overlay.hrefs(),
            Some(("overlay/frontend.js", "overlay/frontend_bg.wasm"))
        );
        assert_eq!(config.collect.unit_types, ["service"]);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let err = BootlineConfig::from_toml_str("[app]\nversion = \"9.9.9\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(v) if v == "9.9.9"));
    }

    #[test]
    fn overlay_needs_both_paths() {
        let overlay = OverlaySection {
            loader_href: Some("frontend.js".into()),
            wasm_href: None,
        };
        assert_eq!(overlay.hrefs(), None);
    }
}
