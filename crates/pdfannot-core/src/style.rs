//! Text style helpers for default appearance strings
//!
//! Free-text annotations name their font in `/DA`. Viewers only ship the
//! standard 14 fonts, so every family is mapped onto one of those.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    /// Hex colour, `#RRGGBB` or `RRGGBB`.
    pub color: String,
    /// Font family or PostScript name. Mapped to a standard font.
    #[serde(default)]
    pub font_name: Option<String>,
    #[serde(default)]
    pub is_italic: bool,
    #[serde(default)]
    pub is_bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            color: "#000000".to_string(),
            font_name: None,
            is_italic: false,
            is_bold: false,
        }
    }
}

impl TextStyle {
    /// Standard 14 font for this style, honouring the bold and italic flags.
    pub fn pdf_font_name(&self) -> &'static str {
        let family = match &self.font_name {
            Some(name) => {
                let lower = name.to_lowercase();
                if lower.contains("italic") || lower.contains("bold") || lower.contains("oblique") {
                    return standard_font_name(name);
                }
                font_family(&lower)
            }
            None => FontFamily::Helvetica,
        };
        family.variant(self.is_bold, self.is_italic)
    }

    /// `/DA` string, e.g. `/Helvetica 12 Tf 1 0 0 rg`.
    pub fn default_appearance(&self) -> String {
        let (r, g, b) = parse_hex_color(&self.color);
        format!(
            "/{} {} Tf {} {} {} rg",
            self.pdf_font_name(),
            self.font_size,
            r,
            g,
            b
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFamily {
    Helvetica,
    Times,
    Courier,
    Symbol,
    ZapfDingbats,
}

impl FontFamily {
    fn variant(self, bold: bool, italic: bool) -> &'static str {
        match (self, bold, italic) {
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Symbol, _, _) => "Symbol",
            (FontFamily::ZapfDingbats, _, _) => "ZapfDingbats",
        }
    }
}

fn font_family(lower: &str) -> FontFamily {
    // CSS generic families and the AcroForm resource abbreviations
    match lower {
        "serif" | "tiro" => return FontFamily::Times,
        "sans-serif" | "cursive" | "fantasy" | "helv" => return FontFamily::Helvetica,
        "monospace" | "cour" => return FontFamily::Courier,
        "symb" => return FontFamily::Symbol,
        "zadb" => return FontFamily::ZapfDingbats,
        _ => {}
    }

    if lower.contains("times") || lower.contains("georgia") || lower.contains("garamond") {
        FontFamily::Times
    } else if lower.contains("courier")
        || lower.contains("mono")
        || lower.contains("consolas")
        || lower.contains("monaco")
    {
        FontFamily::Courier
    } else if lower.contains("symbol") {
        FontFamily::Symbol
    } else if lower.contains("zapf") || lower.contains("dingbat") {
        FontFamily::ZapfDingbats
    } else {
        FontFamily::Helvetica
    }
}

/// Map any font name, including style suffixes like `Arial-BoldMT`, to a standard 14 font.
pub fn standard_font_name(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let bold = lower.contains("bold");
    let italic = lower.contains("italic") || lower.contains("oblique");
    font_family(&lower).variant(bold, italic)
}

/// Parse `#RRGGBB` into 0..1 components. Anything shorter is black.
pub fn parse_hex_color(color: &str) -> (f32, f32, f32) {
    let hex = color.trim_start_matches('#');
    if hex.len() < 6 || !hex.is_ascii() {
        return (0.0, 0.0, 0.0);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).unwrap_or(0) as f32 / 255.0
    };
    (channel(0..2), channel(2..4), channel(4..6))
}
