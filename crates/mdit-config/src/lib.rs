//! Configuration for the mdit renderer.
//!
//! Turns loosely typed input into a validated [`RenderConfig`]:
//! - [`RenderOptions`]: string keys and values, as handed over by language
//!   bindings and command-line wrappers
//! - [`ConfigFile`]: TOML text with an optional `[render]` table
//!
//! Both go through the same validation, so a value rejected in one form is
//! rejected in the other.
//!
//! ```
//! use mdit_config::ConfigFile;
//!
//! let file = ConfigFile::from_toml_str(
//!     r#"
//! [render]
//! base_url = "https://example.com"
//! heading_level_offset = 1
//! "#,
//! )
//! .unwrap();
//! assert_eq!(file.render.heading_level_offset, 1);
//! ```

mod options;

pub use mdit_renderer::RenderConfig;
pub use options::RenderOptions;
use serde::Deserialize;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An option value cannot be coerced to its expected type.
    #[error("Invalid value {value:?} for {option}: {reason}")]
    InvalidConfiguration {
        /// Canonical option name (e.g., "`heading_level_offset`").
        option: String,
        /// Value as given.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    fn invalid(option: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            option: option.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Validated `[render]` settings; defaults when the table is absent.
    pub render: RenderConfig,
}

/// Raw file layout as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFileRaw {
    render: RenderSectionRaw,
}

/// Raw `[render]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderSectionRaw {
    #[serde(alias = "internal_domain_name")]
    base_url: Option<String>,
    heading_level_offset: i32,
    #[serde(alias = "table_class_name")]
    table_class: Option<String>,
}

impl ConfigFile {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` for malformed TOML or mistyped fields and
    /// `ConfigError::InvalidConfiguration` for values that fail validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: ConfigFileRaw = toml::from_str(text)?;
        let section = raw.render;

        let render = RenderConfig {
            base_url: validate_base_url(section.base_url.as_deref().unwrap_or_default())?,
            heading_level_offset: section.heading_level_offset,
            table_class: validate_table_class(section.table_class.as_deref().unwrap_or_default())?,
        };

        tracing::debug!(?render, "Loaded render configuration");
        Ok(Self { render })
    }
}

/// Validate a base URL; blank means absent.
fn validate_base_url(value: &str) -> Result<Option<String>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::invalid(
            "base_url",
            value,
            "must not contain whitespace or control characters",
        ));
    }
    Ok(Some(trimmed.to_owned()))
}

/// Validate a heading level offset given as text.
fn validate_heading_level_offset(value: &str) -> Result<i32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| {
            ConfigError::invalid("heading_level_offset", value, e.to_string())
        })
}

/// Validate a table class; blank means absent.
fn validate_table_class(value: &str) -> Result<Option<String>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ConfigError::invalid(
            "table_class",
            value,
            "must not contain control characters",
        ));
    }
    Ok(Some(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_empty_file() {
        let file = ConfigFile::from_toml_str("").unwrap();
        assert_eq!(file.render, RenderConfig::default());
    }

    #[test]
    fn test_parse_render_section() {
        let toml = r#"
[render]
base_url = "https://example.com/"
heading_level_offset = -1
table_class = "table table-striped"
"#;
        let file = ConfigFile::from_toml_str(toml).unwrap();
        assert_eq!(
            file.render,
            RenderConfig::new()
                .with_base_url("https://example.com/")
                .with_heading_level_offset(-1)
                .with_table_class("table table-striped")
        );
    }

    #[test]
    fn test_parse_aliases() {
        let toml = r#"
[render]
internal_domain_name = "https://example.com"
table_class_name = "t"
"#;
        let file = ConfigFile::from_toml_str(toml).unwrap();
        assert_eq!(file.render.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(file.render.table_class.as_deref(), Some("t"));
    }

    #[test]
    fn test_parse_blank_values_are_absent() {
        let toml = r#"
[render]
base_url = "  "
table_class = ""
"#;
        let file = ConfigFile::from_toml_str(toml).unwrap();
        assert_eq!(file.render, RenderConfig::default());
    }

    #[test]
    fn test_parse_other_tables_ignored() {
        let toml = r#"
[server]
port = 1

[render]
heading_level_offset = 2
"#;
        let file = ConfigFile::from_toml_str(toml).unwrap();
        assert_eq!(file.render.heading_level_offset, 2);
    }

    #[test]
    fn test_parse_wrong_type_is_toml_error() {
        let toml = r#"
[render]
heading_level_offset = "two"
"#;
        let err = ConfigFile::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_parse_malformed_toml() {
        let err = ConfigFile::from_toml_str("[render").unwrap_err();
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let toml = r#"
[render]
base_url = "https://exa mple.com"
"#;
        let err = ConfigFile::from_toml_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConfiguration { ref option, .. } if option == "base_url"
        ));
    }

    #[test]
    fn test_validate_heading_level_offset() {
        assert_eq!(validate_heading_level_offset(" 2 ").unwrap(), 2);
        assert_eq!(validate_heading_level_offset("-3").unwrap(), -3);
        assert_eq!(validate_heading_level_offset("+1").unwrap(), 1);

        let err = validate_heading_level_offset("two").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value \"two\" for heading_level_offset: invalid digit found in string"
        );
    }

    #[test]
    fn test_validate_table_class() {
        assert_eq!(validate_table_class(" a b ").unwrap(), Some("a b".to_owned()));
        assert_eq!(validate_table_class("").unwrap(), None);
        assert!(validate_table_class("a\u{7}").is_err());
    }
}
