// All LLM prompt constants for rule extraction.

use std::borrow::Cow;

/// Character budget for guideline text sent to the model.
pub const MAX_GUIDELINE_CHARS: usize = 12_000;

/// Role description for the extraction system instruction.
const EXTRACTION_ROLE: &str = "You are a meticulous document-formatting analyst. \
    You read thesis, report and manuscript guidelines (often written in Indonesian) \
    and extract every formatting rule they state.";

/// Keeps the model from wrapping the object in prose or fences.
const JSON_ONLY_SYSTEM: &str = "Respond with a single JSON object and nothing else: \
    no markdown code fences, no commentary before or after it.";

/// Extraction prompt template. Replace `{guideline_text}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Analyze the guideline document below and extract ALL formatting rules needed to build a complete document template.

GUIDELINE DOCUMENT:
{guideline_text}

Return a JSON object with these keys:
{
  "margin": {"top": 4, "bottom": 3, "left": 4, "right": 3},
  "font": {
    "family": "Times New Roman",
    "body_size": 12,
    "heading_size": 14,
    "subheading_size": 12,
    "title_size": 14,
    "bold": false
  },
  "spacing": {
    "line_spacing": 1.5,
    "paragraph_spacing": 6,
    "before_paragraph": 0,
    "after_paragraph": 6
  },
  "paper": {"size": "A4", "orientation": "portrait"},
  "headers_footers": {"enabled": true, "page_numbers": true, "position": "bottom center"},
  "numbering": {
    "page_numbering": "arabic",
    "chapter_numbering": "roman_upper",
    "section_numbering": "decimal"
  },
  "document_structure": ["Halaman Judul", "Daftar Isi", "BAB I PENDAHULUAN", "Daftar Pustaka"],
  "special_formatting": {"indent": 1.25, "alignment": "justify"},
  "title": "PROPOSAL PENELITIAN"
}

Rules:
1. Margins and indents are in centimeters. If the guideline uses another unit, write it as text, e.g. "1 inch".
2. Font sizes and paragraph spacing are in points.
3. line_spacing is a multiple of single spacing (1, 1.5, 2).
4. document_structure lists the sections in order, using the guideline's own headings.
5. When a rule is not stated, use these defaults:
   - margin: top=3, bottom=3, left=3, right=3
   - font: family="Times New Roman", body_size=12
   - spacing: line_spacing=1.5, paragraph_spacing=6
   - paper: size="A4", orientation="portrait""#;

/// Builds the system instruction for the extraction call.
pub fn extraction_system() -> String {
    format!("{EXTRACTION_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Builds the user prompt, truncating the guideline text to the budget.
pub fn build_extraction_prompt(guideline_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace(
        "{guideline_text}",
        &truncate_chars(guideline_text, MAX_GUIDELINE_CHARS),
    )
}

/// Keeps the first `max_chars` characters, appending `...` when text was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => Cow::Owned(format!("{}...", &text[..byte_index])),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_chars("margin 4 cm", 100), "margin 4 cm");
    }

    #[test]
    fn test_long_text_is_cut_with_ellipsis() {
        let text = "a".repeat(MAX_GUIDELINE_CHARS + 50);
        let cut = truncate_chars(&text, MAX_GUIDELINE_CHARS);
        assert_eq!(cut.chars().count(), MAX_GUIDELINE_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé...");
    }

    #[test]
    fn test_text_of_exact_budget_is_kept() {
        let text = "b".repeat(5);
        assert_eq!(truncate_chars(&text, 5), text);
    }

    #[test]
    fn test_prompt_embeds_guideline() {
        let prompt = build_extraction_prompt("Margin kiri 4 cm");
        assert!(prompt.contains("GUIDELINE DOCUMENT:\nMargin kiri 4 cm"));
        assert!(!prompt.contains("{guideline_text}"));
    }

    #[test]
    fn test_system_instruction_demands_json() {
        let system = extraction_system();
        assert!(system.contains("single JSON object"));
        assert!(system.contains("no markdown code fences"));
    }
}
