//! Built-in appearance for free-text annotations
//!
//! Produces a Form XObject the size of `/Rect` holding:
//! 1. an optional background fill in `/C`
//! 2. a border stroked in the text colour
//! 3. the `/Contents` text, one line per newline, aligned by `/Q`
//!
//! Glyph metrics are not available here, so line widths are estimated from
//! an average glyph width. Good enough for left alignment, approximate for
//! centred and right-aligned text.

use super::{AppearanceConfig, AppearanceHandler, DefaultAppearance};
use crate::error::{AnnotationError, Result};
use crate::free_text::{FreeTextAnnotation, Quadding};
use crate::style::standard_font_name;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream, StringFormat};

/// Average advance width of a standard font glyph, in text space units per point.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct FreeTextAppearanceHandler {
    config: AppearanceConfig,
}

impl FreeTextAppearanceHandler {
    pub fn new(config: AppearanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppearanceConfig {
        &self.config
    }

    fn border_width(&self, annotation: &FreeTextAnnotation) -> f32 {
        annotation
            .cos_object()
            .get_dictionary("BS")
            .and_then(|bs| bs.get(b"W").ok().and_then(crate::cos::number_value))
            .unwrap_or(self.config.border_width)
            .max(0.0)
    }

    fn content_operations(
        &self,
        annotation: &FreeTextAnnotation,
        width: f32,
        height: f32,
    ) -> (Vec<Operation>, String) {
        let da = annotation
            .default_appearance()
            .map(|s| DefaultAppearance::parse(&s))
            .unwrap_or_default();
        if annotation.default_appearance().is_some() && da.font_name.is_none() {
            tracing::warn!("Unusable /DA font selection, falling back to configured font");
        }
        let font_name = da.font_name.unwrap_or_else(|| self.config.font_name.clone());
        let font_size = da
            .font_size
            .filter(|size| *size > 0.0)
            .unwrap_or(self.config.font_size);
        let text_color = da.color.unwrap_or_else(|| vec![0.0]);
        let border_width = self.border_width(annotation);

        let mut ops = vec![Operation::new("q", vec![])];

        if let Some(fill) = annotation
            .annotation()
            .color()
            .and_then(|c| color_operation(&c, false))
        {
            ops.push(fill);
            ops.push(Operation::new(
                "re",
                vec![0.into(), 0.into(), width.into(), height.into()],
            ));
            ops.push(Operation::new("f", vec![]));
        }

        if border_width > 0.0 {
            if let Some(stroke) = color_operation(&text_color, true) {
                ops.push(stroke);
            }
            let inset = border_width / 2.0;
            ops.push(Operation::new("w", vec![border_width.into()]));
            ops.push(Operation::new(
                "re",
                vec![
                    inset.into(),
                    inset.into(),
                    (width - border_width).max(0.0).into(),
                    (height - border_width).max(0.0).into(),
                ],
            ));
            ops.push(Operation::new("S", vec![]));
        }

        let [rd_left, rd_top, rd_right, _rd_bottom] = annotation.rect_differences();
        let left = rd_left + border_width + self.config.padding;
        let right = width - rd_right - border_width - self.config.padding;
        let top = height - rd_top - border_width - self.config.padding;
        let quadding = annotation.quadding().unwrap_or(Quadding::Left);
        let contents = annotation.annotation().contents().unwrap_or_default();

        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font_name.as_bytes().to_vec()), font_size.into()],
        ));
        if let Some(fill) = color_operation(&text_color, false) {
            ops.push(fill);
        }
        let mut baseline = top - font_size;
        for line in text_lines(&contents) {
            let line_width = line.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
            let x = match quadding {
                Quadding::Left => left,
                Quadding::Centered => left + (right - left - line_width) / 2.0,
                Quadding::Right => right - line_width,
            };
            ops.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    x.max(left).into(),
                    baseline.into(),
                ],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ));
            baseline -= font_size * self.config.line_height;
        }
        ops.push(Operation::new("ET", vec![]));
        ops.push(Operation::new("Q", vec![]));

        (ops, font_name)
    }
}

impl AppearanceHandler for FreeTextAppearanceHandler {
    fn generate_appearance_streams(&self, annotation: &FreeTextAnnotation) -> Result<()> {
        let Some(rect) = annotation.annotation().rect() else {
            tracing::warn!("Free-text annotation has no usable /Rect, skipping appearance");
            return Ok(());
        };
        if rect.is_empty() {
            tracing::debug!("Free-text annotation has an empty /Rect, skipping appearance");
            return Ok(());
        }

        let width = rect.width as f32;
        let height = rect.height as f32;
        let (operations, font_name) = self.content_operations(annotation, width, height);
        let content = Content { operations }
            .encode()
            .map_err(|e| AnnotationError::EncodeError(e.to_string()))?;

        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => standard_font_name(&font_name),
            "Encoding" => "WinAnsiEncoding",
        };
        let mut fonts = lopdf::Dictionary::new();
        fonts.set(font_name.as_bytes().to_vec(), Object::Dictionary(font));

        let form = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! { "Font" => fonts },
        };

        tracing::debug!(
            width,
            height,
            bytes = content.len(),
            "Generated free-text normal appearance"
        );
        annotation
            .annotation()
            .set_normal_appearance(Stream::new(form, content));
        Ok(())
    }
}

/// Fill (`g`/`rg`/`k`) or stroke (`G`/`RG`/`K`) colour for 1, 3 or 4 components.
fn color_operation(components: &[f32], stroking: bool) -> Option<Operation> {
    let operator = match (components.len(), stroking) {
        (1, false) => "g",
        (3, false) => "rg",
        (4, false) => "k",
        (1, true) => "G",
        (3, true) => "RG",
        (4, true) => "K",
        _ => return None,
    };
    Some(Operation::new(
        operator,
        components.iter().map(|c| Object::Real(*c)).collect(),
    ))
}

/// `Contents` line breaks: `\r\n`, `\n` or a lone `\r`.
fn text_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

/// Standard fonts use WinAnsiEncoding; characters it cannot represent become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x09 => b' ',
            _ => win_ansi_high_byte(c).unwrap_or(b'?'),
        })
        .collect()
}

/// Characters placed in WinAnsiEncoding's `0x80..=0x9F` range.
fn win_ansi_high_byte(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::PdfRect;

    fn annotation(contents: &str) -> FreeTextAnnotation {
        let annot = FreeTextAnnotation::new();
        annot.annotation().set_rect(&PdfRect {
            x: 100.0,
            y: 700.0,
            width: 200.0,
            height: 40.0,
        });
        annot.annotation().set_contents(Some(contents));
        annot
    }

    fn operations(annot: &FreeTextAnnotation) -> Vec<Operation> {
        let stream = annot.annotation().normal_appearance().unwrap();
        Content::decode(&stream.content).unwrap().operations
    }

    fn text_x_positions(ops: &[Operation]) -> Vec<f32> {
        ops.iter()
            .filter(|op| op.operator == "Tm")
            .map(|op| crate::cos::number_value(&op.operands[4]).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_form_xobject_sized_to_rect() {
        let annot = annotation("Hello");
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();

        let stream = annot.annotation().normal_appearance().unwrap();
        assert!(matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Form"));
        let bbox: Vec<f32> = stream
            .dict
            .get(b"BBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .filter_map(crate::cos::number_value)
            .collect();
        assert_eq!(bbox, vec![0.0, 0.0, 200.0, 40.0]);
    }

    #[test]
    fn test_uses_da_font_resource() {
        let annot = annotation("Hello");
        annot.set_default_appearance(Some("/TiRo 10 Tf 1 0 0 rg"));
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();

        let stream = annot.annotation().normal_appearance().unwrap();
        let resources = stream.dict.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font = fonts.get(b"TiRo").unwrap().as_dict().unwrap();
        assert!(matches!(font.get(b"BaseFont"), Ok(Object::Name(n)) if n == b"Times-Roman"));

        let ops = operations(&annot);
        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        assert!(matches!(&tf.operands[0], Object::Name(n) if n == b"TiRo"));
        assert!(ops.iter().any(|op| op.operator == "rg"));
    }

    #[test]
    fn test_one_text_line_per_newline() {
        let annot = annotation("first\nsecond\nthird");
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();
        let ops = operations(&annot);
        assert_eq!(ops.iter().filter(|op| op.operator == "Tj").count(), 3);
    }

    #[test]
    fn test_quadding_moves_text_right() {
        let left = annotation("abc");
        let centered = annotation("abc");
        centered.set_quadding(Quadding::Centered);
        let right = annotation("abc");
        right.set_quadding(Quadding::Right);

        let handler = FreeTextAppearanceHandler::default();
        for annot in [&left, &centered, &right] {
            handler.generate_appearance_streams(annot).unwrap();
        }

        let x_left = text_x_positions(&operations(&left))[0];
        let x_center = text_x_positions(&operations(&centered))[0];
        let x_right = text_x_positions(&operations(&right))[0];
        assert!(x_left < x_center);
        assert!(x_center < x_right);
    }

    #[test]
    fn test_unknown_quadding_renders_left() {
        let left = annotation("abc");
        let unknown = annotation("abc");
        unknown.set_q(9);

        let handler = FreeTextAppearanceHandler::default();
        handler.generate_appearance_streams(&left).unwrap();
        handler.generate_appearance_streams(&unknown).unwrap();

        assert_eq!(
            text_x_positions(&operations(&left)),
            text_x_positions(&operations(&unknown))
        );
        assert_eq!(unknown.q(), 9);
    }

    #[test]
    fn test_background_fill_from_color() {
        let annot = annotation("Hello");
        annot.annotation().set_color(Some(&[1.0, 1.0, 0.0][..]));
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();
        let ops = operations(&annot);
        assert!(ops.iter().any(|op| op.operator == "f"));
    }

    #[test]
    fn test_zero_border_width_skips_stroke() {
        let annot = annotation("Hello");
        annot
            .cos_object()
            .set_dictionary("BS", dictionary! { "W" => 0 });
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();
        let ops = operations(&annot);
        assert!(!ops.iter().any(|op| op.operator == "S"));
    }

    #[test]
    fn test_missing_rect_writes_nothing() {
        let annot = FreeTextAnnotation::new();
        annot.annotation().set_contents(Some("Hello"));
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();
        assert!(annot.annotation().appearance_dictionary().is_none());
    }

    #[test]
    fn test_configured_font_used_without_da() {
        let annot = annotation("Hello");
        let handler = FreeTextAppearanceHandler::new(AppearanceConfig {
            font_name: "Cour".to_string(),
            font_size: 8.0,
            ..AppearanceConfig::default()
        });
        handler.generate_appearance_streams(&annot).unwrap();

        let ops = operations(&annot);
        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        assert!(matches!(&tf.operands[0], Object::Name(n) if n == b"Cour"));
        assert_eq!(crate::cos::number_value(&tf.operands[1]), Some(8.0));
    }

    #[test]
    fn test_encode_win_ansi_replaces_wide_chars() {
        assert_eq!(encode_win_ansi("a→b"), b"a?b".to_vec());
        assert_eq!(encode_win_ansi("é"), vec![0xE9]);
    }

    #[test]
    fn test_encode_win_ansi_maps_punctuation() {
        assert_eq!(
            encode_win_ansi("€ \u{2018}x\u{2019} •"),
            vec![0x80, b' ', 0x91, b'x', 0x92, b' ', 0x95]
        );
        assert_eq!(encode_win_ansi("\u{80}\u{9F}"), b"??".to_vec());
    }

    #[test]
    fn test_carriage_returns_break_lines() {
        assert_eq!(
            text_lines("one\rtwo\r\nthree\nfour").collect::<Vec<_>>(),
            vec!["one", "two", "three", "four"]
        );

        let annot = annotation("one\rtwo");
        FreeTextAppearanceHandler::default()
            .generate_appearance_streams(&annot)
            .unwrap();
        let ops = operations(&annot);
        assert_eq!(ops.iter().filter(|op| op.operator == "Tj").count(), 2);
    }
}
