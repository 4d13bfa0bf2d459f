//! Rule normalization: folds arbitrary model output into a complete `RuleSet`.
//!
//! The model's JSON is read into patch types whose fields are all optional and
//! individually lenient: a field of the wrong shape is dropped instead of
//! failing the whole section. Patches are then applied over the fallback.
//!
//! Merge rules:
//! - object sections merge key-by-key into the default section (shallow)
//! - `document_structure` replaces the default list, even when empty
//! - sections that are not objects, and keys outside the schema, are ignored

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::rules::measure::Measure;
use crate::rules::schema::{
    Extra, FontRules, HeaderFooterRules, MarginRules, NumberingRules, PaperRules, RuleSet,
    SpacingRules, SpecialFormatting,
};

/// Keys tried, in order, when a structure entry is an object instead of a string.
const STRUCTURE_TITLE_KEYS: &[&str] = &["title", "name", "section", "heading"];

/// Normalizes any JSON value into a complete rule set.
pub fn normalize(raw: &Value) -> RuleSet {
    let mut rules = RuleSet::fallback();
    let Some(object) = raw.as_object() else {
        return rules;
    };

    let patch: RulePatch =
        serde_json::from_value(Value::Object(canonical_keys(object))).unwrap_or_default();
    patch.apply_to(&mut rules);
    rules
}

/// Lowercases top-level keys and folds spaces/dashes into underscores so
/// `"HEADERS FOOTERS"` and `"Headers-Footers"` land on `headers_footers`.
fn canonical_keys(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .map(|(key, value)| {
            let key = key.trim().to_lowercase().replace([' ', '-'], "_");
            (key, value.clone())
        })
        .collect()
}

/// Deserializes a field, discarding it when its shape does not fit.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn structure<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(items.iter().filter_map(structure_title).collect()),
        _ => None,
    })
}

fn structure_title(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(s) => s.as_str(),
        Value::Object(map) => STRUCTURE_TITLE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RulePatch {
    #[serde(deserialize_with = "lenient")]
    margin: Option<MarginPatch>,
    #[serde(deserialize_with = "lenient")]
    font: Option<FontPatch>,
    #[serde(deserialize_with = "lenient")]
    spacing: Option<SpacingPatch>,
    #[serde(deserialize_with = "lenient")]
    paper: Option<PaperPatch>,
    #[serde(deserialize_with = "lenient")]
    headers_footers: Option<HeaderFooterPatch>,
    #[serde(deserialize_with = "lenient")]
    numbering: Option<NumberingPatch>,
    #[serde(deserialize_with = "structure")]
    document_structure: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    special_formatting: Option<SpecialFormattingPatch>,
    #[serde(deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    background_color: Option<String>,
}

impl RulePatch {
    fn apply_to(self, rules: &mut RuleSet) {
        if let Some(p) = self.margin {
            p.apply_to(&mut rules.margin);
        }
        if let Some(p) = self.font {
            p.apply_to(&mut rules.font);
        }
        if let Some(p) = self.spacing {
            p.apply_to(&mut rules.spacing);
        }
        if let Some(p) = self.paper {
            p.apply_to(&mut rules.paper);
        }
        if let Some(p) = self.headers_footers {
            p.apply_to(&mut rules.headers_footers);
        }
        if let Some(p) = self.numbering {
            p.apply_to(&mut rules.numbering);
        }
        if let Some(structure) = self.document_structure {
            rules.document_structure = structure;
        }
        if let Some(p) = self.special_formatting {
            p.apply_to(&mut rules.special_formatting);
        }
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            rules.title = Some(title);
        }
        if let Some(color) = self.background_color {
            rules.background_color = Some(color);
        }
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn replace_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[derive(Debug, Default, Deserialize)]
struct MarginPatch {
    #[serde(default, deserialize_with = "lenient")]
    top: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    bottom: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    left: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    right: Option<Measure>,
    #[serde(flatten)]
    extra: Extra,
}

impl MarginPatch {
    fn apply_to(self, margin: &mut MarginRules) {
        replace(&mut margin.top, self.top);
        replace(&mut margin.bottom, self.bottom);
        replace(&mut margin.left, self.left);
        replace(&mut margin.right, self.right);
        margin.extra.extend(self.extra);
    }
}

#[derive(Debug, Default, Deserialize)]
struct FontPatch {
    #[serde(default, deserialize_with = "lenient")]
    family: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    body_size: Option<Measure>,
    /// Models often answer with a plain `size`; it stands in for `body_size`.
    #[serde(default, deserialize_with = "lenient")]
    size: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    heading_size: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    subheading_size: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    title_size: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    bold: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    italic: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    underline: Option<bool>,
    #[serde(flatten)]
    extra: Extra,
}

impl FontPatch {
    fn apply_to(self, font: &mut FontRules) {
        replace(&mut font.family, self.family.filter(|f| !f.trim().is_empty()));
        replace(&mut font.body_size, self.body_size.or(self.size));
        replace(&mut font.heading_size, self.heading_size);
        replace(&mut font.subheading_size, self.subheading_size);
        replace_opt(&mut font.title_size, self.title_size);
        replace_opt(&mut font.color, self.color);
        replace_opt(&mut font.bold, self.bold);
        replace_opt(&mut font.italic, self.italic);
        replace_opt(&mut font.underline, self.underline);
        font.extra.extend(self.extra);
    }
}

#[derive(Debug, Default, Deserialize)]
struct SpacingPatch {
    #[serde(default, deserialize_with = "lenient")]
    line_spacing: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    paragraph_spacing: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    before_paragraph: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    after_paragraph: Option<Measure>,
    #[serde(flatten)]
    extra: Extra,
}

impl SpacingPatch {
    fn apply_to(self, spacing: &mut SpacingRules) {
        replace(&mut spacing.line_spacing, self.line_spacing);
        replace(&mut spacing.paragraph_spacing, self.paragraph_spacing);
        replace_opt(&mut spacing.before_paragraph, self.before_paragraph);
        replace_opt(&mut spacing.after_paragraph, self.after_paragraph);
        spacing.extra.extend(self.extra);
    }
}

#[derive(Debug, Default, Deserialize)]
struct PaperPatch {
    #[serde(default, deserialize_with = "lenient")]
    size: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    orientation: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl PaperPatch {
    fn apply_to(self, paper: &mut PaperRules) {
        replace(&mut paper.size, self.size);
        replace(&mut paper.orientation, self.orientation);
        paper.extra.extend(self.extra);
    }
}

#[derive(Debug, Default, Deserialize)]
struct HeaderFooterPatch {
    #[serde(default, deserialize_with = "lenient")]
    enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    page_numbers: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    position: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl HeaderFooterPatch {
    fn apply_to(self, headers_footers: &mut HeaderFooterRules) {
        replace(&mut headers_footers.enabled, self.enabled);
        replace(&mut headers_footers.page_numbers, self.page_numbers);
        replace_opt(&mut headers_footers.position, self.position);
        headers_footers.extra.extend(self.extra);
    }
}

#[derive(Debug, Default, Deserialize)]
struct NumberingPatch {
    #[serde(default, deserialize_with = "lenient")]
    page_numbering: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    chapter_numbering: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    section_numbering: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl NumberingPatch {
    fn apply_to(self, numbering: &mut NumberingRules) {
        replace(&mut numbering.page_numbering, self.page_numbering);
        replace(&mut numbering.chapter_numbering, self.chapter_numbering);
        replace(&mut numbering.section_numbering, self.section_numbering);
        numbering.extra.extend(self.extra);
    }
}

#[derive(Debug, Default, Deserialize)]
struct SpecialFormattingPatch {
    #[serde(default, deserialize_with = "lenient")]
    indent: Option<Measure>,
    #[serde(default, deserialize_with = "lenient")]
    alignment: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl SpecialFormattingPatch {
    fn apply_to(self, special: &mut SpecialFormatting) {
        replace_opt(&mut special.indent, self.indent);
        replace_opt(&mut special.alignment, self.alignment);
        special.extra.extend(self.extra);
    }
}
