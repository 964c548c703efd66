use anyhow::{Context, Result, bail};
use log::debug;
use shared::BootlineConfig;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "bootline.toml";

/// `<config dir>/bootline/bootline.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bootline").join(CONFIG_FILE))
}

/// Load the configuration from `explicit`, or from the default location.
///
/// An explicitly named file must exist; a missing default file means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<BootlineConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file found, using defaults");
                return Ok(BootlineConfig::default());
            }
        },
    };

    read_config(&path)
}

fn read_config(path: &Path) -> Result<BootlineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = BootlineConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bootline-{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let path = temp_config(
            "explicit",
            "[render]\nus_per_pixel = 5000\n\n[collect]\nunit_types = [\"service\", \"mount\"]\n",
        );
        let config = load_config(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.render.us_per_pixel, 5000);
        assert_eq!(config.collect.unit_types, ["service", "mount"]);
        assert_eq!(config.render.sublines, 10);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/bootline.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn invalid_file_names_the_path() {
        let path = temp_config("invalid", "[app]\nversion = \"9.9.9\"\n");
        let err = load_config(Some(&path)).unwrap_err();
        fs::remove_file(&path).ok();

        let message = format!("{err:#}");
        assert!(message.contains("Failed to parse config file"));
        assert!(message.contains("9.9.9"));
    }
}
