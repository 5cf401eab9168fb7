//! Container settings.
//!
//! Settings are plain data with serde support, so an application can keep
//! them next to the rest of its configuration:
//!
//! ```toml
//! [container]
//! allow_override = false
//! validate_on_build = true
//! ```

use serde::Deserialize;

/// Behaviour switches applied by [`ContainerBuilder`](crate::container::ContainerBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// A later registration for the same token replaces the earlier one.
    /// When `false`, the duplicate is reported by `build()`.
    pub allow_override: bool,

    /// Check the whole dependency graph during `build()`: missing tokens,
    /// cycles and captive lifetimes. Off by default, so problems surface at
    /// resolution time.
    pub validate_on_build: bool,

    /// Upper bound on "did you mean" suggestions in `NotRegistered` errors.
    pub max_suggestions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_override: true,
            validate_on_build: false,
            max_suggestions: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.allow_override);
        assert!(!settings.validate_on_build);
        assert_eq!(settings.max_suggestions, 3);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "validate_on_build": true }"#).unwrap();
        assert!(settings.validate_on_build);
        assert!(settings.allow_override);
        assert_eq!(settings.max_suggestions, 3);
    }
}
