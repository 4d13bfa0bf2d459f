//! Writes a [`TemplatePlan`] out as a `.docx` package.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, Footer, LineSpacing, LineSpacingType, PageMargin, PageNum,
    PageOrientationType, Paragraph, Run, RunFonts, SpecialIndentType, Style, StyleType,
};
use tracing::error;

use crate::template::plan::{Block, BlockKind, PageSetup, TemplatePlan};
use crate::template::style::Align;
use crate::template::GenerateError;

const MINIMAL_HEADING: &str = "Template Dokumen";
const MINIMAL_BODY: &str = "Template minimal - error dalam generating.";

/// Prebuilt copy of the minimal document, used if docx-rs cannot pack even that.
pub const MINIMAL_DOCX: &[u8] = include_bytes!("../../assets/minimal.docx");

fn alignment(align: Align) -> AlignmentType {
    match align {
        Align::Left => AlignmentType::Left,
        Align::Center => AlignmentType::Center,
        Align::Justify => AlignmentType::Both,
    }
}

fn heading_styles() -> [Style; 3] {
    [
        Style::new("Title", StyleType::Paragraph).name("Title").bold(),
        Style::new("Heading1", StyleType::Paragraph)
            .name("Heading 1")
            .bold(),
        Style::new("Heading2", StyleType::Paragraph)
            .name("Heading 2")
            .bold(),
    ]
}

fn page(docx: Docx, page: &PageSetup) -> Docx {
    let margins = PageMargin::new()
        .top(page.margins.top)
        .bottom(page.margins.bottom)
        .left(page.margins.left)
        .right(page.margins.right);

    let docx = docx
        .page_size(page.width as u32, page.height as u32)
        .page_margin(margins);

    if page.landscape {
        docx.page_orient(PageOrientationType::Landscape)
    } else {
        docx
    }
}

fn run(block: &Block) -> Run {
    let style = &block.run;
    let mut run = Run::new()
        .add_text(&block.text)
        .size(style.half_points)
        .color(&style.color)
        .fonts(
            RunFonts::new()
                .ascii(&style.family)
                .hi_ansi(&style.family)
                .cs(&style.family),
        );
    if style.bold {
        run = run.bold();
    }
    if style.italic {
        run = run.italic();
    }
    if style.underline {
        run = run.underline("single");
    }
    run
}

fn paragraph(block: &Block) -> Paragraph {
    if block.kind == BlockKind::PageBreak {
        return Paragraph::new().add_run(Run::new().add_break(BreakType::Page));
    }

    let spacing = LineSpacing::new()
        .line_rule(LineSpacingType::Auto)
        .line(block.spacing.line as _)
        .before(block.spacing.before as _)
        .after(block.spacing.after as _);

    let mut paragraph = Paragraph::new()
        .add_run(run(block))
        .align(alignment(block.align))
        .line_spacing(spacing);

    if let Some(style_id) = block.kind.style_id() {
        paragraph = paragraph.style(style_id);
    }
    if let Some(indent) = block.first_line_indent {
        paragraph = paragraph.indent(None, Some(SpecialIndentType::FirstLine(indent)), None, None);
    }
    paragraph
}

fn pack(docx: Docx) -> Result<Vec<u8>, GenerateError> {
    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| GenerateError::Pack(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Renders the plan into `.docx` bytes.
pub fn render(plan: &TemplatePlan) -> Result<Vec<u8>, GenerateError> {
    let mut docx = heading_styles()
        .into_iter()
        .fold(Docx::new(), |docx, style| docx.add_style(style));
    docx = page(docx, &plan.page);

    if plan.page_number_footer {
        let footer = Footer::new().add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_page_num(PageNum::new()),
        );
        docx = docx.footer(footer);
    }

    let docx = plan
        .blocks
        .iter()
        .fold(docx, |docx, block| docx.add_paragraph(paragraph(block)));

    pack(docx)
}

/// One heading and one sentence, returned when the rules cannot be rendered.
pub fn minimal_document() -> Vec<u8> {
    try_minimal_document().unwrap_or_else(|e| {
        error!("Minimal document could not be packed, using the prebuilt copy: {e}");
        MINIMAL_DOCX.to_vec()
    })
}

fn try_minimal_document() -> Result<Vec<u8>, GenerateError> {
    let docx = heading_styles()
        .into_iter()
        .fold(Docx::new(), |docx, style| docx.add_style(style))
        .add_paragraph(
            Paragraph::new()
                .style("Heading1")
                .add_run(Run::new().add_text(MINIMAL_HEADING).bold()),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(MINIMAL_BODY)));
    pack(docx)
}
