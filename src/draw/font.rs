//! Font descriptor and best-effort glyph metric lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Font configuration captured with each text draw call.
///
/// Describes which font the text was recorded with, so the page can be
/// re-rendered with consistent typography later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family name (e.g., "sans-serif", "Monospace", "JetBrains Mono")
    pub family: String,
    /// Whether the face is bold
    pub bold: bool,
    /// Whether the face is italic
    pub italic: bool,
}

impl FontDescriptor {
    /// Creates a new font descriptor.
    pub fn new(family: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            family: family.into(),
            bold,
            italic,
        }
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            bold: false,
            italic: false,
        }
    }
}

/// Vertical and horizontal extents of a single glyph, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub width: f64,
}

impl FontMetrics {
    /// All-zero metrics, the degraded result when lookup fails.
    pub const ZERO: FontMetrics = FontMetrics {
        ascent: 0.0,
        descent: 0.0,
        width: 0.0,
    };
}

/// Failure modes of a metric lookup.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("font family '{0}' is not available")]
    UnknownFamily(String),
    #[error("no metrics for character {0:?}")]
    UnknownGlyph(char),
}

/// Source of glyph metrics for layout queries coming from the engine.
///
/// Implementations are best-effort: callers degrade any error to zeroed
/// metrics rather than failing the draw operation.
pub trait MetricSource {
    /// Looks up ascent/descent/width for one character at the given size.
    fn char_metrics(
        &self,
        ch: char,
        font: &FontDescriptor,
        size: f64,
    ) -> Result<FontMetrics, MetricError>;

    /// Measures the advance width of a whole string at the given size.
    fn str_width(&self, text: &str, font: &FontDescriptor, size: f64) -> Result<f64, MetricError> {
        let mut width = 0.0;
        for ch in text.chars() {
            width += self.char_metrics(ch, font, size)?.width;
        }
        Ok(width)
    }
}

/// Crude proportional metrics used when no real font backend is wired in.
///
/// Ratios approximate a common sans-serif face; exact glyph measurement is
/// the job of the embedding engine, not this crate.
#[derive(Debug, Default)]
pub struct ApproxMetrics;

impl MetricSource for ApproxMetrics {
    fn char_metrics(
        &self,
        ch: char,
        font: &FontDescriptor,
        size: f64,
    ) -> Result<FontMetrics, MetricError> {
        if ch.is_control() {
            return Err(MetricError::UnknownGlyph(ch));
        }
        let base = if font.bold { 0.56 } else { 0.52 };
        let width = match ch {
            'i' | 'j' | 'l' | '.' | ',' | '\'' | '|' => base * 0.45,
            'm' | 'w' | 'M' | 'W' => base * 1.5,
            ' ' => base * 0.55,
            _ => base,
        };
        Ok(FontMetrics {
            ascent: size * 0.74,
            descent: size * 0.26,
            width: width * size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_metrics_scale_with_size() {
        let font = FontDescriptor::default();
        let small = ApproxMetrics.char_metrics('a', &font, 10.0).unwrap();
        let large = ApproxMetrics.char_metrics('a', &font, 20.0).unwrap();
        assert!((large.width - 2.0 * small.width).abs() < 1e-9);
        assert!((large.ascent - 2.0 * small.ascent).abs() < 1e-9);
    }

    #[test]
    fn control_characters_have_no_metrics() {
        let font = FontDescriptor::default();
        assert!(ApproxMetrics.char_metrics('\u{7}', &font, 12.0).is_err());
    }

    #[test]
    fn str_width_sums_char_advances() {
        let font = FontDescriptor::default();
        let a = ApproxMetrics.char_metrics('a', &font, 12.0).unwrap().width;
        let b = ApproxMetrics.char_metrics('b', &font, 12.0).unwrap().width;
        let total = ApproxMetrics.str_width("ab", &font, 12.0).unwrap();
        assert!((total - (a + b)).abs() < 1e-9);
    }
}
