//! Shared utility functions for markdown rendering.

/// Emitted heading level for a source level and a configured offset.
///
/// The result is clamped to `1..=6`; the offset may be negative.
///
/// # Examples
///
/// ```
/// use mdit_renderer::offset_heading_level;
///
/// assert_eq!(offset_heading_level(1, 2), 3);
/// assert_eq!(offset_heading_level(3, 5), 6);
/// assert_eq!(offset_heading_level(3, -5), 1);
/// ```
#[must_use]
pub fn offset_heading_level(level: u8, offset: i32) -> u8 {
    let shifted = i64::from(level) + i64::from(offset);
    u8::try_from(shifted.clamp(1, 6)).unwrap_or(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_heading_level_zero() {
        for level in 1..=6 {
            assert_eq!(offset_heading_level(level, 0), level);
        }
    }

    #[test]
    fn test_offset_heading_level_clamps_high() {
        assert_eq!(offset_heading_level(6, 1), 6);
        assert_eq!(offset_heading_level(1, i32::MAX), 6);
    }

    #[test]
    fn test_offset_heading_level_clamps_low() {
        assert_eq!(offset_heading_level(2, -1), 1);
        assert_eq!(offset_heading_level(6, i32::MIN), 1);
    }
}
