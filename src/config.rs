use serde::{Deserialize, Serialize};
use std::path::Path;

/// Transcoder tunables. Loaded from an optional JSON file; every field has a
/// default matching the drawable format's conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// viewBox used when the scene root does not declare one.
    pub default_viewbox: String,
    /// Spaces per indent level in serialized XML.
    pub indent: usize,
    /// Decimal places for gradient stop offsets.
    pub offset_decimals: usize,
    /// Decimal places for trim fractions.
    pub trim_decimals: usize,
    /// Animator duration assumed when `android:duration` is absent.
    pub default_duration_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_viewbox: "0 0 16 16".to_string(),
            indent: 4,
            offset_decimals: 3,
            trim_decimals: 3,
            default_duration_ms: 300.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    default_viewbox: Option<String>,
    indent: Option<usize>,
    offset_decimals: Option<usize>,
    trim_decimals: Option<usize>,
    default_duration_ms: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(v) = parsed.default_viewbox {
        config.default_viewbox = v;
    }
    if let Some(v) = parsed.indent {
        config.indent = v;
    }
    if let Some(v) = parsed.offset_decimals {
        config.offset_decimals = v;
    }
    if let Some(v) = parsed.trim_decimals {
        config.trim_decimals = v;
    }
    if let Some(v) = parsed.default_duration_ms {
        config.default_duration_ms = v;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.default_viewbox, "0 0 16 16");
        assert_eq!(config.indent, 4);
        assert_eq!(config.default_duration_ms, 300.0);
    }
}
