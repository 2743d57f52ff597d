//! Configuration file structures for alertbox.
//!
//! The configuration is read from an optional YAML file and can be overridden
//! with `ALERTBOX_` environment variables, `__` separating nested keys. Every
//! field has a default, so running without any configuration is valid.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Dialog service settings
//! dialogs:
//!   # Confirm button text when a dialog does not set one
//!   confirm_label: "OK"
//!   # Cancel button text when a dialog does not set one
//!   cancel_label: "Cancel"
//!   # Give up on confirm actions after this many seconds (unbounded if absent)
//!   confirm_timeout_secs: 30
//!
//! # Terminal front end settings
//! console:
//!   # Output format: text or json
//!   format: text
//!   # Variant of alerts that do not pass --variant
//!   default_variant: info
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export ALERTBOX_DIALOGS__CONFIRM_TIMEOUT_SECS=10
//! export ALERTBOX_CONSOLE__FORMAT=json
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::dialogs::Variant;

/// Prefix of environment variables overriding the configuration.
const ENV_PREFIX: &str = "ALERTBOX_";

/// Root configuration structure.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Dialog service configuration
    pub dialogs: Dialogs,
    /// Terminal front end configuration
    pub console: Console,
}

/// Dialog service configuration.
///
/// # YAML Section
///
/// ```yaml
/// dialogs:
///   confirm_label: "OK"
///   cancel_label: "Cancel"
///   confirm_timeout_secs: 30
/// ```
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Dialogs {
    /// Default confirm button text.
    pub confirm_label: String,

    /// Default cancel button text.
    pub cancel_label: String,

    /// Limit in seconds for confirm actions.
    ///
    /// When reached, the dialog is closed and its caller receives a timeout
    /// error. Confirm actions may run forever when unset.
    pub confirm_timeout_secs: Option<u64>,
}

impl Default for Dialogs {
    fn default() -> Self {
        Dialogs {
            confirm_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
            confirm_timeout_secs: None,
        }
    }
}

/// Output format of the terminal front end.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable boxes.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Terminal front end configuration.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Console {
    /// How dialogs and outcomes are printed.
    pub format: OutputFormat,

    /// Variant used by `alert` and `confirm` commands without `--variant`.
    pub default_variant: Variant,
}

impl Config {
    /// Loads the configuration.
    ///
    /// Reads `path` if it exists, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when the file or an override cannot be parsed into the expected
    /// structure.
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load("absent.yaml")?;

            assert_eq!(config, Config::default());
            assert_eq!(config.dialogs.confirm_label, "OK");
            assert_eq!(config.dialogs.cancel_label, "Cancel");
            assert_eq!(config.dialogs.confirm_timeout_secs, None);
            assert_eq!(config.console.format, OutputFormat::Text);
            assert_eq!(config.console.default_variant, Variant::Info);
            Ok(())
        });
    }

    #[test]
    fn test_load_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "alertbox.yaml",
                r#"
dialogs:
  confirm_label: "Got it"
  confirm_timeout_secs: 15
console:
  format: json
  default_variant: warning
"#,
            )?;

            let config = Config::load("alertbox.yaml")?;

            assert_eq!(config.dialogs.confirm_label, "Got it");
            assert_eq!(config.dialogs.cancel_label, "Cancel");
            assert_eq!(config.dialogs.confirm_timeout_secs, Some(15));
            assert_eq!(config.console.format, OutputFormat::Json);
            assert_eq!(config.console.default_variant, Variant::Warning);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "alertbox.yaml",
                r#"
dialogs:
  cancel_label: "Back"
  confirm_timeout_secs: 15
"#,
            )?;
            jail.set_env("ALERTBOX_DIALOGS__CONFIRM_TIMEOUT_SECS", "5");
            jail.set_env("ALERTBOX_CONSOLE__FORMAT", "json");

            let config = Config::load("alertbox.yaml")?;

            assert_eq!(config.dialogs.cancel_label, "Back");
            assert_eq!(config.dialogs.confirm_timeout_secs, Some(5));
            assert_eq!(config.console.format, OutputFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_variant_falls_back_to_info() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "alertbox.yaml",
                r#"
console:
  default_variant: fuchsia
"#,
            )?;

            let config = Config::load("alertbox.yaml")?;
            assert_eq!(config.console.default_variant, Variant::Info);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "alertbox.yaml",
                r#"
dialogs:
  confirm_timeout_secs: "soon"
"#,
            )?;

            assert!(Config::load("alertbox.yaml").is_err());
            Ok(())
        });
    }
}
