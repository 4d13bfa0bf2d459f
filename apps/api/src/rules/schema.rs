//! The canonical rule set schema and its fallback values.
//!
//! Every section keeps the sub-keys the model returned beyond the known ones
//! in `extra`, so the side-channel JSON mirrors the model's output while the
//! generator only reads the typed fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::measure::Measure;

/// Top-level keys every normalized rule set serializes.
#[cfg(test)]
pub const TOP_LEVEL_KEYS: &[&str] = &[
    "margin",
    "font",
    "spacing",
    "paper",
    "headers_footers",
    "numbering",
    "document_structure",
    "special_formatting",
];

pub type Extra = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginRules {
    pub top: Measure,
    pub bottom: Measure,
    pub left: Measure,
    pub right: Measure,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for MarginRules {
    fn default() -> Self {
        Self {
            top: Measure::Number(3.0),
            bottom: Measure::Number(3.0),
            left: Measure::Number(3.0),
            right: Measure::Number(3.0),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRules {
    pub family: String,
    pub body_size: Measure,
    pub heading_size: Measure,
    pub subheading_size: Measure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_size: Option<Measure>,
    /// Hex color such as `#1F3864`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for FontRules {
    fn default() -> Self {
        Self {
            family: "Times New Roman".to_string(),
            body_size: Measure::Number(12.0),
            heading_size: Measure::Number(14.0),
            subheading_size: Measure::Number(12.0),
            title_size: None,
            color: None,
            bold: None,
            italic: None,
            underline: None,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingRules {
    /// Multiple of single spacing; text such as "double" or "1,5 spasi" is allowed.
    pub line_spacing: Measure,
    /// Space after paragraphs in points.
    pub paragraph_spacing: Measure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_paragraph: Option<Measure>,
    /// Overrides `paragraph_spacing` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_paragraph: Option<Measure>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for SpacingRules {
    fn default() -> Self {
        Self {
            line_spacing: Measure::Number(1.5),
            paragraph_spacing: Measure::Number(6.0),
            before_paragraph: None,
            after_paragraph: None,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRules {
    pub size: String,
    pub orientation: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for PaperRules {
    fn default() -> Self {
        Self {
            size: "A4".to_string(),
            orientation: "portrait".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooterRules {
    pub enabled: bool,
    pub page_numbers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for HeaderFooterRules {
    fn default() -> Self {
        Self {
            enabled: true,
            page_numbers: true,
            position: None,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingRules {
    pub page_numbering: String,
    pub chapter_numbering: String,
    pub section_numbering: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for NumberingRules {
    fn default() -> Self {
        Self {
            page_numbering: "arabic".to_string(),
            chapter_numbering: "roman_upper".to_string(),
            section_numbering: "decimal".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialFormatting {
    /// First-line indent of body paragraphs (cm unless stated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<Measure>,
    /// Body text alignment, e.g. "justify" or "rata kiri kanan".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A complete set of formatting rules. `RuleSet::default()` is the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub margin: MarginRules,
    pub font: FontRules,
    pub spacing: SpacingRules,
    pub paper: PaperRules,
    pub headers_footers: HeaderFooterRules,
    pub numbering: NumberingRules,
    pub document_structure: Vec<String>,
    #[serde(default)]
    pub special_formatting: SpecialFormatting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl RuleSet {
    /// Hardcoded rules used whenever extraction fails.
    pub fn fallback() -> Self {
        Self::default()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            margin: MarginRules::default(),
            font: FontRules::default(),
            spacing: SpacingRules::default(),
            paper: PaperRules::default(),
            headers_footers: HeaderFooterRules::default(),
            numbering: NumberingRules::default(),
            document_structure: [
                "Halaman Judul",
                "Daftar Isi",
                "BAB I PENDAHULUAN",
                "BAB II TINJAUAN PUSTAKA",
                "BAB III METODOLOGI",
                "BAB IV HASIL DAN PEMBAHASAN",
                "BAB V KESIMPULAN",
                "Daftar Pustaka",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            special_formatting: SpecialFormatting::default(),
            title: None,
            background_color: None,
        }
    }
}
