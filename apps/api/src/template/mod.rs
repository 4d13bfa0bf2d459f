// Template Generation: rule set → page plan → .docx bytes.
// Generation never fails outward; unusable rules produce the minimal document.

pub mod handlers;
pub mod plan;
pub mod render;
pub mod style;

use thiserror::Error;
use tracing::{debug, error};

use crate::rules::RuleSet;

use plan::plan_template;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid {side} margin: {cm} cm")]
    InvalidMargin { side: &'static str, cm: f64 },

    #[error("margins ({horizontal_cm} cm × {vertical_cm} cm) do not fit on {paper}")]
    MarginsExceedPage {
        paper: &'static str,
        horizontal_cm: f64,
        vertical_cm: f64,
    },

    #[error("invalid {element} font size: {pt} pt")]
    InvalidFontSize { element: &'static str, pt: f64 },

    #[error("invalid spacing: {0}")]
    InvalidSpacing(String),

    #[error("failed to write .docx package: {0}")]
    Pack(String),
}

/// Plans and renders the template, surfacing the first problem.
pub fn try_generate(rules: &RuleSet) -> Result<Vec<u8>, GenerateError> {
    let plan = plan_template(rules)?;
    debug!(
        "Rendering template: {} blocks on {} ({})",
        plan.blocks.len(),
        plan.page.paper.name,
        if plan.page.landscape { "landscape" } else { "portrait" }
    );
    render::render(&plan)
}

/// Always returns a `.docx`. Falls back to the minimal document on error.
pub fn generate_template(rules: &RuleSet) -> Vec<u8> {
    match try_generate(rules) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Template generation failed, emitting minimal document: {e}");
            render::minimal_document()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::normalize;
    use serde_json::json;
    use std::io::{Cursor, Read, Write};

    fn read_back(bytes: &[u8]) -> String {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        docx_lite::extract_text(file.path()).unwrap()
    }

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_generates_zip_package() {
        let bytes = generate_template(&RuleSet::fallback());
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_generated_document_contains_structure_and_summary() {
        let rules = normalize(&json!({
            "document_structure": ["BAB I PENDAHULUAN", "Latar Belakang"],
            "font": {"family": "Arial"}
        }));
        let text = read_back(&try_generate(&rules).unwrap());

        assert!(text.contains(plan::DEFAULT_TITLE));
        assert!(text.contains("BAB I PENDAHULUAN"));
        assert!(text.contains("Latar Belakang"));
        assert!(text.contains(plan::SUMMARY_HEADING));
        assert!(text.contains("Font: Arial"));
    }

    #[test]
    fn test_empty_structure_uses_default_chapters() {
        let rules = normalize(&json!({"document_structure": []}));
        let text = read_back(&generate_template(&rules));
        for section in plan::DEFAULT_SECTIONS {
            assert!(text.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_impossible_margins_produce_minimal_document() {
        let rules = normalize(&json!({"margin": {"left": "50 cm"}}));
        assert!(matches!(
            try_generate(&rules),
            Err(GenerateError::MarginsExceedPage { .. })
        ));

        let bytes = generate_template(&rules);
        assert!(bytes.starts_with(b"PK"));
        let text = read_back(&bytes);
        assert!(text.contains("Template Dokumen"));
        assert!(text.contains("Template minimal - error dalam generating."));
    }

    #[test]
    fn test_control_characters_in_rules_keep_document_well_formed() {
        let rules = normalize(&json!({
            "title": "PROPOSAL\u{2} SKRIPSI",
            "font": {"family": "Times\u{1} New Roman"},
            "document_structure": ["Sub\u{1}ctrl", "BAB I\u{B} PENDAHULUAN"]
        }));
        let xml = document_xml(&generate_template(&rules));

        let document = roxmltree::Document::parse(&xml).unwrap();
        let texts: Vec<&str> = document
            .descendants()
            .filter(|n| n.tag_name().name() == "t")
            .filter_map(|n| n.text())
            .collect();
        assert!(texts.contains(&"PROPOSAL SKRIPSI"));
        assert!(texts.contains(&"Subctrl"));
        assert!(texts.contains(&"BAB I PENDAHULUAN"));
        assert!(texts.contains(&"Font: Times New Roman"));

        let fonts: Vec<&str> = document
            .descendants()
            .filter(|n| n.tag_name().name() == "rFonts")
            .filter_map(|n| n.attributes().find(|a| a.name() == "ascii").map(|a| a.value()))
            .collect();
        assert!(!fonts.is_empty());
        assert!(fonts.iter().all(|f| *f == "Times New Roman"));
    }

    #[test]
    fn test_prebuilt_minimal_document_is_readable() {
        assert!(render::MINIMAL_DOCX.starts_with(b"PK"));
        roxmltree::Document::parse(&document_xml(render::MINIMAL_DOCX)).unwrap();

        let text = read_back(render::MINIMAL_DOCX);
        assert!(text.contains("Template Dokumen"));
        assert!(text.contains("Template minimal - error dalam generating."));
    }

    #[test]
    fn test_landscape_template_renders() {
        let rules = normalize(&json!({
            "paper": {"size": "A5", "orientation": "landscape"},
            "margin": {"top": 2, "bottom": 2, "left": 2.5, "right": 2},
            "headers_footers": {"enabled": true, "page_numbers": true}
        }));
        let bytes = try_generate(&rules).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
