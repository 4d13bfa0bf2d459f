//! Template Planning: turns a normalized rule set into a concrete page setup
//! and an ordered list of styled paragraphs.
//!
//! The plan is plain data in document units (twips, half-points) so the
//! geometry can be checked without opening the rendered `.docx`. Rendering
//! the plan is `render.rs`'s job.

use serde::Serialize;

use crate::rules::measure::{cm_to_twips, format_number, pt_to_twips};
use crate::rules::{Measure, RuleSet};
use crate::template::style::{body_alignment, font_color, line_multiple, xml_text, Align};
use crate::template::GenerateError;

pub const DEFAULT_TITLE: &str = "TEMPLATE DOKUMEN";

/// Chapters emitted when the rule set has no structure at all.
pub const DEFAULT_SECTIONS: [&str; 5] = [
    "PENDAHULUAN",
    "TINJAUAN PUSTAKA",
    "METODOLOGI",
    "HASIL DAN PEMBAHASAN",
    "KESIMPULAN",
];

/// Structure entries containing one of these are chapter-level headings.
const CHAPTER_KEYWORDS: &[&str] = &["BAB", "CHAPTER"];

const CHAPTER_PLACEHOLDER: &str =
    "[Konten untuk bagian ini akan diisi sesuai dengan panduan format yang telah diekstrak]";
const SECTION_PLACEHOLDER: &str = "[Konten akan diisi di sini sesuai format yang diekstrak]";
const DEFAULT_SECTION_PLACEHOLDER: &str = "[Isi konten sesuai dengan aturan format yang diekstrak]";
pub const SUMMARY_HEADING: &str = "RINGKASAN FORMAT YANG DITERAPKAN";

const DEFAULT_MARGIN_CM: f64 = 3.0;
const DEFAULT_BODY_PT: f64 = 12.0;
const DEFAULT_PARAGRAPH_SPACING_PT: f64 = 6.0;
/// Word stores run sizes in half-points up to 1638.
const MAX_FONT_PT: f64 = 819.0;
/// Word rejects paragraph spacing above 1584 pt.
const MAX_PARAGRAPH_SPACING_PT: f64 = 1584.0;
/// `w:line` value for single spacing with the `auto` rule.
const SINGLE_LINE: f64 = 240.0;

// ────────────────────────────────────────────────────────────────────────────
// Plan types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaperSize {
    pub name: &'static str,
    pub width_cm: f64,
    pub height_cm: f64,
}

const A4: PaperSize = PaperSize {
    name: "A4",
    width_cm: 21.0,
    height_cm: 29.7,
};

/// Known paper sizes, matched by substring of the upper-cased rule value.
const PAPER_SIZES: &[(&[&str], PaperSize)] = &[
    (
        &["A5"],
        PaperSize {
            name: "A5",
            width_cm: 14.8,
            height_cm: 21.0,
        },
    ),
    (
        &["LETTER", "KUARTO", "QUARTO"],
        PaperSize {
            name: "Letter",
            width_cm: 21.59,
            height_cm: 27.94,
        },
    ),
    (
        &["LEGAL"],
        PaperSize {
            name: "Legal",
            width_cm: 21.59,
            height_cm: 35.56,
        },
    ),
    (
        &["F4", "FOLIO"],
        PaperSize {
            name: "F4",
            width_cm: 21.5,
            height_cm: 33.0,
        },
    ),
];

/// Paper size for a rule value; anything unrecognised is A4.
pub fn paper_size(name: &str) -> PaperSize {
    let upper = name.to_uppercase();
    PAPER_SIZES
        .iter()
        .find(|(aliases, _)| aliases.iter().any(|a| upper.contains(a)))
        .map(|(_, size)| *size)
        .unwrap_or(A4)
}

/// Page margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMargins {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSetup {
    pub paper: PaperSize,
    pub landscape: bool,
    /// Page width in twips, after orientation is applied.
    pub width: i32,
    pub height: i32,
    pub margins: PageMargins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Title,
    ChapterHeading,
    SectionHeading,
    Body,
    PageBreak,
}

impl BlockKind {
    /// Paragraph style id, matching Word's built-in heading styles.
    pub fn style_id(self) -> Option<&'static str> {
        match self {
            BlockKind::Title => Some("Title"),
            BlockKind::ChapterHeading => Some("Heading1"),
            BlockKind::SectionHeading => Some("Heading2"),
            BlockKind::Body | BlockKind::PageBreak => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStyle {
    pub family: String,
    pub half_points: usize,
    /// `RRGGBB`
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Line spacing in 240ths of a line; before/after in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParagraphSpacing {
    pub line: i32,
    pub before: i32,
    pub after: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    pub run: RunStyle,
    #[serde(skip)]
    pub align: Align,
    pub spacing: ParagraphSpacing,
    /// First-line indent in twips.
    pub first_line_indent: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePlan {
    pub page: PageSetup,
    pub page_number_footer: bool,
    pub blocks: Vec<Block>,
}

#[cfg(test)]
impl TemplatePlan {
    pub fn headings(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| {
            matches!(
                b.kind,
                BlockKind::ChapterHeading | BlockKind::SectionHeading
            )
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution of rule values
// ────────────────────────────────────────────────────────────────────────────

/// Rule values reduced to numbers in their canonical units.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    paper: PaperSize,
    landscape: bool,
    margin_cm: [f64; 4],
    body_pt: f64,
    heading_pt: f64,
    subheading_pt: f64,
    title_pt: f64,
    line_multiple: f64,
    before_pt: f64,
    after_pt: f64,
    indent_cm: Option<f64>,
    align: Align,
    color: String,
}

const MARGIN_SIDES: [&str; 4] = ["top", "bottom", "left", "right"];

fn resolve(rules: &RuleSet) -> Result<Resolved, GenerateError> {
    let paper = paper_size(&rules.paper.size);
    let landscape = rules.paper.orientation.to_lowercase().contains("landscape");

    let margins = [
        &rules.margin.top,
        &rules.margin.bottom,
        &rules.margin.left,
        &rules.margin.right,
    ];
    let mut margin_cm = [DEFAULT_MARGIN_CM; 4];
    for (slot, (side, value)) in margin_cm.iter_mut().zip(MARGIN_SIDES.into_iter().zip(margins)) {
        let cm = value.to_cm().unwrap_or(DEFAULT_MARGIN_CM);
        if !cm.is_finite() || cm < 0.0 {
            return Err(GenerateError::InvalidMargin { side, cm });
        }
        *slot = cm;
    }

    let font = &rules.font;
    let body_pt = font.body_size.to_points().unwrap_or(DEFAULT_BODY_PT);
    let heading_pt = font.heading_size.to_points().unwrap_or(body_pt + 1.0);
    let subheading_pt = font.subheading_size.to_points().unwrap_or(body_pt);
    let title_pt = font
        .title_size
        .as_ref()
        .and_then(Measure::to_points)
        .unwrap_or(body_pt + 2.0);
    for (element, pt) in [
        ("body", body_pt),
        ("heading", heading_pt),
        ("subheading", subheading_pt),
        ("title", title_pt),
    ] {
        if !pt.is_finite() || pt <= 0.0 || pt > MAX_FONT_PT {
            return Err(GenerateError::InvalidFontSize { element, pt });
        }
    }

    let spacing = &rules.spacing;
    let line_multiple = line_multiple(&spacing.line_spacing);
    if !line_multiple.is_finite() || line_multiple <= 0.0 {
        return Err(GenerateError::InvalidSpacing(format!(
            "line spacing {line_multiple}"
        )));
    }
    let after_pt = spacing
        .after_paragraph
        .as_ref()
        .unwrap_or(&spacing.paragraph_spacing)
        .to_points()
        .unwrap_or(DEFAULT_PARAGRAPH_SPACING_PT);
    let before_pt = spacing
        .before_paragraph
        .as_ref()
        .and_then(Measure::to_points)
        .unwrap_or(0.0);
    for (which, pt) in [("before", before_pt), ("after", after_pt)] {
        if !pt.is_finite() || !(0.0..=MAX_PARAGRAPH_SPACING_PT).contains(&pt) {
            return Err(GenerateError::InvalidSpacing(format!(
                "space {which} paragraph {pt} pt"
            )));
        }
    }

    let indent_cm = rules
        .special_formatting
        .indent
        .as_ref()
        .and_then(Measure::to_cm)
        .filter(|cm| cm.is_finite() && *cm > 0.0);

    Ok(Resolved {
        paper,
        landscape,
        margin_cm,
        body_pt,
        heading_pt,
        subheading_pt,
        title_pt,
        line_multiple,
        before_pt,
        after_pt,
        indent_cm,
        align: body_alignment(rules.special_formatting.alignment.as_deref()),
        color: font_color(font.color.as_deref(), rules.background_color.as_deref()),
    })
}

fn page_setup(resolved: &Resolved) -> Result<PageSetup, GenerateError> {
    let (width_cm, height_cm) = if resolved.landscape {
        (resolved.paper.height_cm, resolved.paper.width_cm)
    } else {
        (resolved.paper.width_cm, resolved.paper.height_cm)
    };
    let [top, bottom, left, right] = resolved.margin_cm;

    if left + right >= width_cm || top + bottom >= height_cm {
        return Err(GenerateError::MarginsExceedPage {
            paper: resolved.paper.name,
            horizontal_cm: left + right,
            vertical_cm: top + bottom,
        });
    }

    Ok(PageSetup {
        paper: resolved.paper,
        landscape: resolved.landscape,
        width: cm_to_twips(width_cm),
        height: cm_to_twips(height_cm),
        margins: PageMargins {
            top: cm_to_twips(top),
            bottom: cm_to_twips(bottom),
            left: cm_to_twips(left),
            right: cm_to_twips(right),
        },
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Block construction
// ────────────────────────────────────────────────────────────────────────────

fn is_chapter(entry: &str) -> bool {
    let upper = entry.to_uppercase();
    CHAPTER_KEYWORDS.iter().any(|k| upper.contains(k))
}

struct BlockBuilder<'a> {
    rules: &'a RuleSet,
    resolved: &'a Resolved,
    blocks: Vec<Block>,
}

impl<'a> BlockBuilder<'a> {
    fn run(&self, pt: f64, bold: bool) -> RunStyle {
        let font = &self.rules.font;
        RunStyle {
            family: xml_text(&font.family).into_owned(),
            half_points: (pt * 2.0).round() as usize,
            color: self.resolved.color.clone(),
            bold: bold || font.bold.unwrap_or(false),
            italic: font.italic.unwrap_or(false),
            underline: font.underline.unwrap_or(false),
        }
    }

    fn spacing(&self) -> ParagraphSpacing {
        ParagraphSpacing {
            line: (self.resolved.line_multiple * SINGLE_LINE).round() as i32,
            before: pt_to_twips(self.resolved.before_pt),
            after: pt_to_twips(self.resolved.after_pt),
        }
    }

    fn push(&mut self, kind: BlockKind, text: &str, run: RunStyle, align: Align) {
        let first_line_indent = match kind {
            BlockKind::Body => self.resolved.indent_cm.map(cm_to_twips),
            _ => None,
        };
        self.blocks.push(Block {
            kind,
            text: xml_text(text).into_owned(),
            run,
            align,
            spacing: self.spacing(),
            first_line_indent,
        });
    }

    fn title(&mut self, text: &str) {
        let run = self.run(self.resolved.title_pt, true);
        self.push(BlockKind::Title, text, run, Align::Center);
    }

    fn chapter(&mut self, text: &str) {
        let run = self.run(self.resolved.heading_pt, true);
        self.push(BlockKind::ChapterHeading, text, run, Align::Center);
    }

    fn section(&mut self, text: &str) {
        let run = self.run(self.resolved.subheading_pt, true);
        self.push(BlockKind::SectionHeading, text, run, Align::Left);
    }

    fn body(&mut self, text: &str) {
        let run = self.run(self.resolved.body_pt, false);
        self.push(BlockKind::Body, text, run, self.resolved.align);
    }

    fn page_break(&mut self) {
        let run = self.run(self.resolved.body_pt, false);
        self.push(BlockKind::PageBreak, "", run, Align::Left);
    }
}

/// Human-readable lines describing the applied formatting.
fn summary_lines(rules: &RuleSet, resolved: &Resolved) -> Vec<String> {
    let [top, bottom, left, right] = resolved.margin_cm.map(format_number);
    vec![
        format!("Font: {}", rules.font.family),
        format!("Ukuran Font: {} pt", format_number(resolved.body_pt)),
        format!("Margin - Atas: {top} cm, Bawah: {bottom} cm"),
        format!("Margin - Kiri: {left} cm, Kanan: {right} cm"),
        format!(
            "Spasi Antar Baris: {}",
            format_number(resolved.line_multiple)
        ),
        format!(
            "Spasi Setelah Paragraf: {} pt",
            format_number(resolved.after_pt)
        ),
        format!(
            "Kertas: {} ({})",
            resolved.paper.name,
            if resolved.landscape {
                "landscape"
            } else {
                "portrait"
            }
        ),
        format!(
            "Penomoran Halaman: {}",
            rules.numbering.page_numbering
        ),
    ]
}

/// Builds the full template plan, or explains why the rules cannot be laid out.
pub fn plan_template(rules: &RuleSet) -> Result<TemplatePlan, GenerateError> {
    let resolved = resolve(rules)?;
    let page = page_setup(&resolved)?;

    let mut builder = BlockBuilder {
        rules,
        resolved: &resolved,
        blocks: Vec::new(),
    };

    let title = rules
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    builder.title(title);

    if rules.document_structure.is_empty() {
        for section in DEFAULT_SECTIONS {
            builder.chapter(section);
            builder.body(DEFAULT_SECTION_PLACEHOLDER);
        }
    } else {
        for entry in &rules.document_structure {
            if is_chapter(entry) {
                builder.chapter(entry);
                builder.body(CHAPTER_PLACEHOLDER);
            } else {
                builder.section(entry);
                builder.body(SECTION_PLACEHOLDER);
            }
        }
    }

    builder.page_break();
    builder.chapter(SUMMARY_HEADING);
    for line in summary_lines(rules, &resolved) {
        builder.body(&line);
    }

    let blocks = builder.blocks;
    Ok(TemplatePlan {
        page,
        page_number_footer: rules.headers_footers.enabled && rules.headers_footers.page_numbers,
        blocks,
    })
}
