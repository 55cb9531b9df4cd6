use serde::{Deserialize, Serialize};
use std::path::Path;

/// Display unit for dimension labels. Conversion between units is the
/// caller's business; the engine only appends the suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    Mm,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Mm => "mm",
        }
    }
}

/// Per-pass overlay configuration. Any combination of flags is legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    pub unit: Unit,
    pub lock_aspect_ratio: bool,
    pub transparent_background: bool,
    pub show_lines: bool,
    pub show_labels: bool,
    pub round_values: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            unit: Unit::Px,
            lock_aspect_ratio: false,
            transparent_background: false,
            show_lines: true,
            show_labels: true,
            round_values: false,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<OverlayConfig> {
    let Some(path) = path else {
        return Ok(OverlayConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: OverlayConfig = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_show_everything_in_pixels() {
        let config = OverlayConfig::default();
        assert_eq!(config.unit, Unit::Px);
        assert!(config.show_lines);
        assert!(config.show_labels);
        assert!(!config.round_values);
        assert!(!config.lock_aspect_ratio);
        assert!(!config.transparent_background);
    }

    #[test]
    fn deserializes_partial_camel_case() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{"unit":"mm","roundValues":true}"#).unwrap();
        assert_eq!(config.unit, Unit::Mm);
        assert!(config.round_values);
        // Untouched fields keep their defaults.
        assert!(config.show_lines);
    }

    #[test]
    fn no_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert!(!config.transparent_background);
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(Unit::Px.suffix(), "px");
        assert_eq!(Unit::Mm.suffix(), "mm");
    }
}
