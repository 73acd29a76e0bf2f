//! String-keyed render options.

use std::collections::HashMap;

use crate::{
    ConfigError, RenderConfig, validate_base_url, validate_heading_level_offset,
    validate_table_class,
};

/// Recognized option with its accepted spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OptionKey {
    BaseUrl,
    HeadingLevelOffset,
    TableClass,
}

impl OptionKey {
    const ALL: [Self; 3] = [Self::BaseUrl, Self::HeadingLevelOffset, Self::TableClass];

    /// Canonical key.
    fn name(self) -> &'static str {
        match self {
            Self::BaseUrl => "base_url",
            Self::HeadingLevelOffset => "heading_level_offset",
            Self::TableClass => "table_class",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::BaseUrl => &["internal_domain_name"],
            Self::HeadingLevelOffset => &[],
            Self::TableClass => &["table_class_name"],
        }
    }

    fn matches(self, key: &str) -> bool {
        key == self.name() || self.aliases().contains(&key)
    }
}

/// Canonical identifier form of an option key.
///
/// Trims, drops one leading `:`, lowercases ASCII and maps `-` and spaces
/// to `_`, so `:Heading-Level-Offset` and `heading_level_offset` agree.
fn canonical_key(key: &str) -> String {
    let key = key.trim();
    let key = key.strip_prefix(':').unwrap_or(key);
    key.chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Render options as string keys and values.
///
/// Keys are canonicalized on insertion; a later value for the same key
/// replaces an earlier one. Validation happens in [`parse`](Self::parse).
///
/// # Example
///
/// ```
/// use mdit_config::RenderOptions;
///
/// let config = RenderOptions::from_pairs([
///     ("internal_domain_name", "https://example.com"),
///     ("heading-level-offset", "2"),
/// ])
/// .parse()
/// .unwrap();
/// assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
/// assert_eq!(config.heading_level_offset, 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    entries: HashMap<String, String>,
}

impl RenderOptions {
    /// Empty options; parses to the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect options from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::new();
        for (key, value) in pairs {
            options.insert(key.as_ref(), value);
        }
        options
    }

    /// Set an option.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(canonical_key(key), value.into());
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no option was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value for an option, preferring the canonical key over aliases.
    fn lookup(&self, option: OptionKey) -> Option<&str> {
        std::iter::once(option.name())
            .chain(option.aliases().iter().copied())
            .find_map(|key| self.entries.get(key))
            .map(String::as_str)
    }

    /// Validate and coerce into a [`RenderConfig`].
    ///
    /// Unknown keys are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfiguration` for the first value that
    /// cannot be coerced.
    pub fn parse(&self) -> Result<RenderConfig, ConfigError> {
        for key in self.entries.keys() {
            if !OptionKey::ALL.iter().any(|option| option.matches(key)) {
                tracing::warn!(key = %key, "Ignoring unknown render option");
            }
        }

        let mut config = RenderConfig::default();
        if let Some(value) = self.lookup(OptionKey::BaseUrl) {
            config.base_url = validate_base_url(value)?;
        }
        if let Some(value) = self.lookup(OptionKey::HeadingLevelOffset) {
            config.heading_level_offset = validate_heading_level_offset(value)?;
        }
        if let Some(value) = self.lookup(OptionKey::TableClass) {
            config.table_class = validate_table_class(value)?;
        }
        Ok(config)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RenderOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("base_url"), "base_url");
        assert_eq!(canonical_key(" :Heading-Level-Offset "), "heading_level_offset");
        assert_eq!(canonical_key("table class"), "table_class");
    }

    #[test]
    fn test_empty_options_default() {
        assert_eq!(RenderOptions::new().parse().unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_all_options() {
        let config = RenderOptions::from_pairs([
            ("base_url", "https://example.com"),
            ("heading_level_offset", "2"),
            ("table_class", "table-class"),
        ])
        .parse()
        .unwrap();
        assert_eq!(
            config,
            RenderConfig::new()
                .with_base_url("https://example.com")
                .with_heading_level_offset(2)
                .with_table_class("table-class")
        );
    }

    #[test]
    fn test_aliases() {
        let config = RenderOptions::from_pairs([
            ("internal_domain_name", "https://example.com"),
            ("table_class_name", "t"),
        ])
        .parse()
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.table_class.as_deref(), Some("t"));
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let config = RenderOptions::from_pairs([
            ("table_class_name", "alias"),
            ("table_class", "canonical"),
        ])
        .parse()
        .unwrap();
        assert_eq!(config.table_class.as_deref(), Some("canonical"));
    }

    #[test]
    fn test_later_value_replaces_earlier() {
        let options: RenderOptions = [("heading_level_offset", "1"), ("Heading-Level-Offset", "3")]
            .into_iter()
            .collect();
        assert_eq!(options.len(), 1);
        assert_eq!(options.parse().unwrap().heading_level_offset, 3);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = RenderOptions::from_pairs([("linkify", "true")]).parse().unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_blank_values_absent() {
        let config = RenderOptions::from_pairs([("base_url", " "), ("table_class", "")])
            .parse()
            .unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_invalid_offset() {
        let err = RenderOptions::from_pairs([("heading_level_offset", "two")])
            .parse()
            .unwrap_err();
        match err {
            ConfigError::InvalidConfiguration { option, value, .. } => {
                assert_eq!(option, "heading_level_offset");
                assert_eq!(value, "two");
            }
            ConfigError::Toml(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_offset_out_of_range() {
        let err = RenderOptions::from_pairs([("heading_level_offset", "99999999999")])
            .parse()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
    }
}
