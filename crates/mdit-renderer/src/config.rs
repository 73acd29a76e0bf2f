//! Render configuration.

/// Options applied while rendering.
///
/// Parsing is configuration-independent; only the renderer reads this.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Prefix for internal link and image destinations.
    pub base_url: Option<String>,
    /// Added to every heading level before clamping to `1..=6`.
    pub heading_level_offset: i32,
    /// `class` attribute for `<table>` tags.
    pub table_class: Option<String>,
}

impl RenderConfig {
    /// Configuration with no rewriting, no offset and no table class.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for internal destinations.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the heading level offset.
    #[must_use]
    pub fn with_heading_level_offset(mut self, offset: i32) -> Self {
        self.heading_level_offset = offset;
        self
    }

    /// Set the table class.
    #[must_use]
    pub fn with_table_class(mut self, class: impl Into<String>) -> Self {
        self.table_class = Some(class.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_passthrough() {
        let config = RenderConfig::default();
        assert_eq!(config.base_url, None);
        assert_eq!(config.heading_level_offset, 0);
        assert_eq!(config.table_class, None);
    }

    #[test]
    fn test_builders() {
        let config = RenderConfig::new()
            .with_base_url("https://example.com")
            .with_heading_level_offset(-1)
            .with_table_class("table-class");
        assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.heading_level_offset, -1);
        assert_eq!(config.table_class.as_deref(), Some("table-class"));
    }
}
