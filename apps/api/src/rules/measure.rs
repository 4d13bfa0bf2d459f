//! Lengths and sizes as the model reports them.
//!
//! A value is either a bare JSON number or free text with an embedded number
//! (`"4 cm"`, `"2,5cm"`, `"1 inch"`, `"12pt"`). Values are stored exactly as
//! received; conversion happens when the generator needs a concrete unit.
//!
//! Conversion policy: a bare number is read in the caller's default unit
//! (centimeters for page geometry, points for type and spacing). Text may name
//! its unit explicitly, in which case it is converted. Comma is accepted as a
//! decimal separator.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Twentieths of a point per centimeter (1 in = 2.54 cm = 1440 twips).
pub const TWIPS_PER_CM: f64 = 1440.0 / 2.54;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Centimeter,
    Millimeter,
    Inch,
    Point,
}

impl Unit {
    fn in_cm(self) -> f64 {
        match self {
            Unit::Centimeter => 1.0,
            Unit::Millimeter => 0.1,
            Unit::Inch => 2.54,
            Unit::Point => 2.54 / 72.0,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "cm" => Some(Unit::Centimeter),
            "mm" => Some(Unit::Millimeter),
            "in" | "inch" | "inches" | "inci" | "\"" => Some(Unit::Inch),
            "pt" => Some(Unit::Point),
            _ => None,
        }
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(\d+(?:[.,]\d+)?)\s*(cm|mm|inches|inch|inci|in\b|"|pt)?"#)
            .expect("number pattern is a valid regex")
    })
}

impl Measure {
    /// The number carried by this value, ignoring any unit.
    /// For text this is the first numeric substring.
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Measure::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Measure::Text(text) => parse_text(text).map(|(n, _)| n),
        }
    }

    /// The unit written next to the first number, if any.
    pub fn unit(&self) -> Option<Unit> {
        match self {
            Measure::Number(_) => None,
            Measure::Text(text) => parse_text(text).and_then(|(_, unit)| unit),
        }
    }

    /// Converts to `target`, reading unit-less values as `default`.
    pub fn convert(&self, default: Unit, target: Unit) -> Option<f64> {
        let magnitude = self.magnitude()?;
        let unit = self.unit().unwrap_or(default);
        Some(magnitude * unit.in_cm() / target.in_cm())
    }

    pub fn to_cm(&self) -> Option<f64> {
        self.convert(Unit::Centimeter, Unit::Centimeter)
    }

    pub fn to_points(&self) -> Option<f64> {
        self.convert(Unit::Point, Unit::Point)
    }
}

fn parse_text(text: &str) -> Option<(f64, Option<Unit>)> {
    let captures = number_pattern().captures(text)?;
    let magnitude = captures
        .get(1)?
        .as_str()
        .replace(',', ".")
        .parse::<f64>()
        .ok()?;
    let unit = captures
        .get(2)
        .and_then(|m| Unit::from_suffix(m.as_str()));
    Some((magnitude, unit))
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::Number(value)
    }
}

impl From<&str> for Measure {
    fn from(value: &str) -> Self {
        Measure::Text(value.to_string())
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Number(n) => f.write_str(&format_number(*n)),
            Measure::Text(text) => f.write_str(text),
        }
    }
}

/// Formats a number without trailing zeros: `3.0` → `3`, `2.50` → `2.5`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn cm_to_twips(cm: f64) -> i32 {
    (cm * TWIPS_PER_CM).round() as i32
}

pub fn pt_to_twips(pt: f64) -> i32 {
    (pt * 20.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_is_read_in_default_unit() {
        let m = Measure::Number(3.0);
        assert_eq!(m.to_cm(), Some(3.0));
        assert_eq!(m.to_points(), Some(3.0));
    }

    #[test]
    fn test_text_extracts_first_number() {
        assert_eq!(Measure::from("4 cm").to_cm(), Some(4.0));
        assert_eq!(Measure::from("atas 4 cm, bawah 3 cm").to_cm(), Some(4.0));
        assert_eq!(Measure::from("12pt").to_points(), Some(12.0));
    }

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(Measure::from("2,5 cm").to_cm(), Some(2.5));
    }

    #[test]
    fn test_explicit_units_are_converted() {
        let inch = Measure::from("1 inch").to_cm().unwrap();
        assert!((inch - 2.54).abs() < 1e-9);

        let mm = Measure::from("25 mm").to_cm().unwrap();
        assert!((mm - 2.5).abs() < 1e-9);

        let pt = Measure::from("1 cm").to_points().unwrap();
        assert!((pt - 72.0 / 2.54).abs() < 1e-9);
    }

    #[test]
    fn test_text_without_number() {
        let m = Measure::from("standard");
        assert_eq!(m.magnitude(), None);
        assert_eq!(m.to_cm(), None);
    }

    #[test]
    fn test_untagged_serde_keeps_shape() {
        let number: Measure = serde_json::from_str("3").unwrap();
        assert_eq!(number, Measure::Number(3.0));

        let text: Measure = serde_json::from_str("\"4 cm\"").unwrap();
        assert_eq!(text, Measure::Text("4 cm".to_string()));
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"4 cm\"");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.25), "1.25");
    }

    #[test]
    fn test_twip_conversions() {
        assert_eq!(cm_to_twips(2.54), 1440);
        assert_eq!(pt_to_twips(6.0), 120);
    }
}
