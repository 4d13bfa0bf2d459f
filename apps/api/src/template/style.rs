//! Interpretation of free-text style rules: colors, line spacing, alignment.

use std::borrow::Cow;

use crate::rules::Measure;

const BLACK: &str = "000000";
const WHITE: &str = "FFFFFF";
const DEFAULT_LINE_MULTIPLE: f64 = 1.5;

/// Parses `#RRGGBB`, `RRGGBB` or `#RGB`.
pub fn parse_hex_color(text: &str) -> Option<(u8, u8, u8)> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

fn is_light((r, g, b): (u8, u8, u8)) -> bool {
    let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
    luminance > 0.5
}

/// Run color as `RRGGBB`.
///
/// An explicit valid `font.color` wins. Otherwise black on light or unknown
/// backgrounds, white on dark ones.
pub fn font_color(explicit: Option<&str>, background: Option<&str>) -> String {
    if let Some((r, g, b)) = explicit.and_then(parse_hex_color) {
        return format!("{r:02X}{g:02X}{b:02X}");
    }

    let background = background.map(str::trim).unwrap_or_default();
    if background.is_empty() || background.eq_ignore_ascii_case("white") {
        return BLACK.to_string();
    }

    match parse_hex_color(background) {
        Some(rgb) if !is_light(rgb) => WHITE.to_string(),
        _ => BLACK.to_string(),
    }
}

/// Line spacing as a multiple of single spacing.
pub fn line_multiple(spacing: &Measure) -> f64 {
    let text = match spacing {
        Measure::Number(n) => return *n,
        Measure::Text(text) => text.to_lowercase(),
    };

    const ONE_AND_HALF: &[&str] = &["setengah", "one and a half", "one-and-a-half", "1.5", "1,5"];
    const DOUBLE: &[&str] = &["double", "ganda"];
    const SINGLE: &[&str] = &["single", "tunggal"];

    if ONE_AND_HALF.iter().any(|k| text.contains(k)) {
        1.5
    } else if DOUBLE.iter().any(|k| text.contains(k)) {
        2.0
    } else if SINGLE.iter().any(|k| text.contains(k)) {
        1.0
    } else {
        spacing.magnitude().unwrap_or(DEFAULT_LINE_MULTIPLE)
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drops characters XML 1.0 forbids (C0 controls, U+FFFE, U+FFFF).
/// docx-rs escapes markup but writes these through, and Word rejects the part.
pub fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Justify,
}

/// Body alignment from `special_formatting.alignment`; left when unknown.
pub fn body_alignment(alignment: Option<&str>) -> Align {
    let Some(text) = alignment.map(str::to_lowercase) else {
        return Align::Left;
    };
    if text.contains("justif") || text.contains("kiri kanan") || text.contains("kanan kiri") {
        Align::Justify
    } else if text.contains("center") || text.contains("centre") || text.contains("tengah") {
        Align::Center
    } else {
        Align::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1F3864"), Some((0x1F, 0x38, 0x64)));
        assert_eq!(parse_hex_color("ffffff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("navy"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_explicit_font_color_wins() {
        assert_eq!(font_color(Some("#1f3864"), Some("#000000")), "1F3864");
    }

    #[test]
    fn test_contrast_with_background() {
        assert_eq!(font_color(None, None), "000000");
        assert_eq!(font_color(None, Some("white")), "000000");
        assert_eq!(font_color(None, Some("#F5F5DC")), "000000");
        assert_eq!(font_color(None, Some("#1A1A2E")), "FFFFFF");
        assert_eq!(font_color(Some("not a color"), Some("#000")), "FFFFFF");
    }

    #[test]
    fn test_unknown_background_defaults_to_black() {
        assert_eq!(font_color(None, Some("light blue")), "000000");
    }

    #[test]
    fn test_line_multiple_words_and_numbers() {
        assert_eq!(line_multiple(&Measure::Number(2.0)), 2.0);
        assert_eq!(line_multiple(&Measure::from("1,5 spasi")), 1.5);
        assert_eq!(line_multiple(&Measure::from("satu setengah spasi")), 1.5);
        assert_eq!(line_multiple(&Measure::from("Double")), 2.0);
        assert_eq!(line_multiple(&Measure::from("spasi tunggal")), 1.0);
        assert_eq!(line_multiple(&Measure::from("1.15 lines")), 1.15);
        assert_eq!(line_multiple(&Measure::from("3 lines")), 3.0);
        assert_eq!(line_multiple(&Measure::from("normal")), 1.5);
    }

    #[test]
    fn test_xml_text_drops_forbidden_characters() {
        assert!(matches!(xml_text("BAB I\tPENDAHULUAN"), Cow::Borrowed(_)));
        assert_eq!(xml_text("Sub\u{1}ctrl\u{B}\u{1F}"), "Subctrl");
        assert_eq!(xml_text("Tinjauan\u{FFFE} Pustaka\u{FFFF}"), "Tinjauan Pustaka");
        assert_eq!(xml_text("Ringkasan 📄"), "Ringkasan 📄");
    }

    #[test]
    fn test_body_alignment() {
        assert_eq!(body_alignment(Some("Justified")), Align::Justify);
        assert_eq!(body_alignment(Some("rata kiri kanan")), Align::Justify);
        assert_eq!(body_alignment(Some("center")), Align::Center);
        assert_eq!(body_alignment(Some("left")), Align::Left);
        assert_eq!(body_alignment(None), Align::Left);
    }
}
