//! Driver configuration.

use crate::util::logging::CONFIG;

/// Configuration for the window driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Wayland display name (e.g., "wayland-1"); `None` uses WAYLAND_DISPLAY
    pub display_name: Option<String>,
    /// DPI that corresponds to a surface scale of 1.0
    pub base_dpi: u32,
    /// Maximum number of caption characters forwarded as toplevel title
    pub max_title_len: usize,
    /// Default tracing filter for the headless binary
    pub log_filter: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            base_dpi: 96,
            max_title_len: 1023,
            log_filter: "info,waydrv=debug".to_string(),
        }
    }
}

impl DriverConfig {
    /// Build a configuration from defaults plus `WAYDRV_*` environment overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DriverConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("WAYDRV_DISPLAY").filter(|s| !s.is_empty()) {
            config.display_name = Some(name);
        }
        if let Some(value) = lookup("WAYDRV_BASE_DPI") {
            match value.parse::<u32>() {
                Ok(dpi) if dpi > 0 => config.base_dpi = dpi,
                _ => crate::wlog!(CONFIG, "Ignoring invalid WAYDRV_BASE_DPI={:?}", value),
            }
        }
        if let Some(value) = lookup("WAYDRV_MAX_TITLE_LEN") {
            match value.parse::<usize>() {
                Ok(len) => config.max_title_len = len,
                Err(_) => crate::wlog!(CONFIG, "Ignoring invalid WAYDRV_MAX_TITLE_LEN={:?}", value),
            }
        }
        if let Some(filter) = lookup("WAYDRV_LOG") {
            config.log_filter = filter;
        }

        config
    }

    /// Surface scale for a window DPI.
    pub fn scale_for_dpi(&self, dpi: u32) -> f64 {
        if dpi == 0 {
            return 1.0;
        }
        dpi as f64 / self.base_dpi as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.display_name, None);
        assert_eq!(config.base_dpi, 96);
        assert_eq!(config.max_title_len, 1023);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("WAYDRV_DISPLAY", "wayland-7"),
            ("WAYDRV_BASE_DPI", "120"),
            ("WAYDRV_MAX_TITLE_LEN", "64"),
        ]
        .into_iter()
        .collect();
        let config = DriverConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.display_name.as_deref(), Some("wayland-7"));
        assert_eq!(config.base_dpi, 120);
        assert_eq!(config.max_title_len, 64);
    }

    #[test]
    fn test_invalid_overrides_keep_defaults() {
        let config = DriverConfig::from_lookup(|k| match k {
            "WAYDRV_BASE_DPI" => Some("0".to_string()),
            "WAYDRV_MAX_TITLE_LEN" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.base_dpi, 96);
        assert_eq!(config.max_title_len, 1023);
    }

    #[test]
    fn test_scale_for_dpi() {
        let config = DriverConfig::default();
        assert_eq!(config.scale_for_dpi(96), 1.0);
        assert_eq!(config.scale_for_dpi(192), 2.0);
        assert_eq!(config.scale_for_dpi(0), 1.0);
    }
}
