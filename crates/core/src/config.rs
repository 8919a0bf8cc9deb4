//! Tunable thresholds for heading classification and title selection.
//!
//! Every field has a default, so a TOML file only needs the keys it wants to
//! override:
//!
//! ```toml
//! max_heading_words = 12
//! min_heading_score = 4
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Typical body-text font size; `rel_size` is measured against it.
    pub body_font_size: f32,
    /// Maximum distance between line and page midpoints for `is_centered`.
    pub center_tolerance: f32,
    /// Lines with more words than this are never headings.
    pub max_heading_words: usize,
    /// Lines wider than this fraction of the page are never headings.
    pub max_line_ratio: f32,
    /// Bold lines below this relative size are inline emphasis.
    pub bold_min_rel_size: f32,
    /// Relative size above which a line earns the large-font bonus.
    pub large_rel_size: f32,
    /// Score contribution of the large-font signal.
    pub large_size_weight: u8,
    /// `space_above` beyond this earns one point.
    pub space_above_threshold: f32,
    /// Minimum total score for a heading.
    pub min_heading_score: u8,
    /// Inclusive word-count bounds for fallback title candidates.
    pub fallback_min_words: usize,
    pub fallback_max_words: usize,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            body_font_size: 12.0,
            center_tolerance: 5.0,
            max_heading_words: 15,
            max_line_ratio: 0.85,
            bold_min_rel_size: 1.15,
            large_rel_size: 1.3,
            large_size_weight: 2,
            space_above_threshold: 0.5,
            min_heading_score: 3,
            fallback_min_words: 2,
            fallback_max_words: 20,
        }
    }
}

impl OutlineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: OutlineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.body_font_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "body_font_size must be positive, got {}",
                self.body_font_size
            )));
        }
        if self.fallback_min_words > self.fallback_max_words {
            return Err(ConfigError::Invalid(format!(
                "fallback_min_words ({}) exceeds fallback_max_words ({})",
                self.fallback_min_words, self.fallback_max_words
            )));
        }
        Ok(())
    }
}
