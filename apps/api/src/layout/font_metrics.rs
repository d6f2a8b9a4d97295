//! Static font-metric tables backing the text-metrics measurer.
//!
//! Character widths are in em units (relative to font size). This is an
//! approximation of real glyph advance widths: good enough to decide how many
//! lines a paragraph wraps to at the A4 text width, which is all pagination needs.
//! The base table covers ASCII 0x20..=0x7E; other families are a uniform scale of it.

use serde::{Deserialize, Serialize};

/// Font families the preview can be measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Humanist sans-serif; the browser preview's default stack.
    #[default]
    Inter,
    /// Old-style serif, roughly 85% of Inter's advance widths.
    EbGaramond,
    /// Traditional TeX serif, roughly 90% of Inter.
    ComputerModern,
    /// Monospace, used for code blocks.
    Mono,
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "inter" => Ok(FontFamily::Inter),
            "eb_garamond" | "garamond" => Ok(FontFamily::EbGaramond),
            "computer_modern" => Ok(FontFamily::ComputerModern),
            "mono" => Ok(FontFamily::Mono),
            other => Err(format!("unknown font family {other:?}")),
        }
    }
}

/// Character-width table for a font family, in em.
pub struct FontMetricTable {
    pub font: FontFamily,
    /// Uniform factor applied to the base table.
    scale: f32,
    pub space_width: f32,
    /// Fallback width for non-ASCII characters.
    pub average_char_width: f32,
}

#[rustfmt::skip]
static BASE_WIDTHS: [f32; 95] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
    0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
    // 0-9
    0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
    // :     ;     <     =     >     ?     @
    0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
    // A-M
    0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
    // N-Z
    0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
    // [     \     ]     ^     _     `
    0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
    // a-m
    0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
    // n-z
    0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
    // {     |     }     ~
    0.33, 0.26, 0.33, 0.59,
];

static INTER: FontMetricTable = FontMetricTable {
    font: FontFamily::Inter,
    scale: 1.0,
    space_width: 0.25,
    average_char_width: 0.52,
};

static EB_GARAMOND: FontMetricTable = FontMetricTable {
    font: FontFamily::EbGaramond,
    scale: 0.85,
    space_width: 0.21,
    average_char_width: 0.44,
};

static COMPUTER_MODERN: FontMetricTable = FontMetricTable {
    font: FontFamily::ComputerModern,
    scale: 0.90,
    space_width: 0.23,
    average_char_width: 0.47,
};

static MONO: FontMetricTable = FontMetricTable {
    font: FontFamily::Mono,
    scale: 1.0,
    space_width: 0.60,
    average_char_width: 0.60,
};

impl FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        if self.font == FontFamily::Mono {
            return self.average_char_width;
        }
        let code = c as usize;
        if (32..=126).contains(&code) {
            BASE_WIDTHS[code - 32] * self.scale
        } else {
            self.average_char_width
        }
    }

    /// Rendered width of a string in em.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Number of lines `text` occupies when greedily word-wrapped at `max_width_em`.
    ///
    /// A word wider than the line is placed on its own line rather than broken.
    /// Empty or whitespace-only text occupies zero lines.
    pub fn wrapped_lines(&self, text: &str, max_width_em: f32) -> usize {
        let mut lines = 0usize;
        let mut current = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);
            if lines == 0 {
                lines = 1;
                current = word_w;
            } else if current + self.space_width + word_w > max_width_em {
                lines += 1;
                current = word_w;
            } else {
                current += self.space_width + word_w;
            }
        }
        lines
    }
}

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Inter => &INTER,
        FontFamily::EbGaramond => &EB_GARAMOND,
        FontFamily::ComputerModern => &COMPUTER_MODERN,
        FontFamily::Mono => &MONO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontFamily::Inter).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00
        let width = get_metrics(FontFamily::Inter).measure_str("Rust");
        assert!((width - 2.00).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = get_metrics(FontFamily::Inter);
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_serif_is_narrower_than_sans() {
        let text = "Architected distributed caching layer";
        assert!(
            get_metrics(FontFamily::EbGaramond).measure_str(text)
                < get_metrics(FontFamily::Inter).measure_str(text)
        );
    }

    #[test]
    fn test_wrapped_lines_empty_is_zero() {
        assert_eq!(get_metrics(FontFamily::Inter).wrapped_lines("   ", 40.0), 0);
    }

    #[test]
    fn test_wrapped_lines_long_text_wraps() {
        let metrics = get_metrics(FontFamily::Inter);
        assert_eq!(metrics.wrapped_lines("Rust", 40.0), 1);
        let long = "word ".repeat(60);
        assert!(metrics.wrapped_lines(&long, 40.0) >= 4);
    }

    #[test]
    fn test_wrapped_lines_oversized_word_gets_own_line() {
        let metrics = get_metrics(FontFamily::Inter);
        let giant = "x".repeat(200);
        assert_eq!(metrics.wrapped_lines(&giant, 10.0), 1);
        assert_eq!(metrics.wrapped_lines(&format!("a {giant} b"), 10.0), 3);
    }

    #[test]
    fn test_font_family_from_str() {
        assert_eq!("EB Garamond".parse::<FontFamily>().unwrap(), FontFamily::EbGaramond);
        assert_eq!("computer-modern".parse::<FontFamily>().unwrap(), FontFamily::ComputerModern);
        assert!("comic_sans".parse::<FontFamily>().is_err());
    }

    #[test]
    fn test_mono_is_fixed_width() {
        let mono = get_metrics(FontFamily::Mono);
        assert!((mono.measure_str("iiii") - mono.measure_str("WWWW")).abs() < 1e-6);
    }
}
