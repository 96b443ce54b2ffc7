//! Label width measurement.
//!
//! Widths come from the first system font matching the theme's family list.
//! When no font is available (headless CI, WASM) a per-character estimate is
//! used instead so layouts stay deterministic.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Average advance of a proportional sans-serif glyph, in ems.
const ESTIMATED_ADVANCE_EM: f32 = 0.56;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Measures `text` with the first installed font of `font_family`.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().filter(|ch| *ch != '\n').count() as f32 * font_size * ESTIMATED_ADVANCE_EM
}

/// Font-backed width when available, estimate otherwise.
pub fn text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| estimate_text_width(text, font_size))
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontMetrics>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let metrics = self.load(font_family);
            if metrics.is_none() {
                tracing::debug!(family = font_family, "no font found, estimating text widths");
            }
            self.faces.insert(key.clone(), metrics);
        }
        let metrics = self.faces.get(&key)?.as_ref()?;
        Some(metrics.width(text, font_size))
    }

    fn load(&mut self, font_family: &str) -> Option<FontMetrics> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "blinkmacsystemfont" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        families.push(Family::SansSerif);

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let id = self.db.query(&Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;
        self.db
            .with_face_data(id, |data, index| FontMetrics::from_face_data(data, index))
            .flatten()
    }
}

/// Horizontal advances extracted from a font face.
struct FontMetrics {
    units_per_em: f32,
    ascii: [u16; 128],
    other: HashMap<char, u16>,
}

impl FontMetrics {
    fn from_face_data(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let mut ascii = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        // Latin-1 supplement and general punctuation cover most labels.
        let mut other = HashMap::new();
        for ch in ('\u{a0}'..='\u{17f}').chain('\u{2010}'..='\u{206f}') {
            if let Some(advance) = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
            {
                other.insert(ch, advance);
            }
        }
        Some(Self {
            units_per_em: face.units_per_em().max(1) as f32,
            ascii,
            other,
        })
    }

    fn width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * ESTIMATED_ADVANCE_EM;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                self.ascii[ch as usize]
            } else {
                self.other.get(&ch).copied().unwrap_or(0)
            };
            if advance == 0 {
                width += fallback;
            } else {
                width += advance as f32 * scale;
            }
        }
        width.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 12.0, "sans-serif"), Some(0.0));
        assert_eq!(text_width("", 12.0, "sans-serif"), 0.0);
    }

    #[test]
    fn estimate_scales_with_length_and_size() {
        let short = estimate_text_width("Ja", 12.0);
        let long = estimate_text_width("Geen idee", 12.0);
        assert!(long > short);
        assert!((estimate_text_width("ab", 24.0) - 2.0 * short).abs() < 1e-4);
    }

    #[test]
    fn measured_width_is_positive() {
        let width = text_width("Node 1", 12.0, "Inter, sans-serif");
        assert!(width > 0.0);
        assert!(width.is_finite());
    }
}
