//! Document assembly: building the page list from workflow state, the JSON
//! export format, and turning a page list into draw calls and PDF bytes.

use crate::error::{Result, WizardError};
use crate::formats::{Document, HydratedSection, Outline, Page, TeaserOption};
use crate::layout::{DrawOp, PageGeometry, PdfLayout};
use crate::render;

pub const PDF_FILE_NAME: &str = "generated_pdf.pdf";
const PDF_TITLE: &str = "generated_pdf";

/// Cover, overview, table of contents, then one section page per hydrated
/// section in the order given.
pub fn assemble(
    cover: &TeaserOption,
    outline: &Outline,
    sections: Vec<HydratedSection>,
    created_at: i64,
) -> Document {
    let mut pages = Vec::with_capacity(3 + sections.len());
    pages.push(Page::CoverPage {
        title: cover.title.clone(),
        author: Some(cover.author.clone()),
        subtext: Some(cover.subtext.clone()),
    });
    pages.push(Page::Overview {
        text: outline.overview.clone(),
    });
    pages.push(Page::TableOfContents {
        sections: outline.table_of_contents.clone(),
    });
    pages.extend(
        sections
            .into_iter()
            .map(|section| Page::Section { section }),
    );

    Document { created_at, pages }
}

pub fn parse_export(json: &str) -> Result<Document> {
    serde_json::from_str(json).map_err(WizardError::MalformedDocument)
}

pub fn to_export_json(document: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

/// The ordered draw calls for the whole document: a new page per record,
/// followed by that record's content.
pub fn instructions(document: &Document, geometry: &PageGeometry) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    for page in &document.pages {
        ops.push(DrawOp::AddPage);
        render::render_page(page, geometry, &mut ops);
    }
    ops
}

pub fn render_pdf(document: &Document) -> Result<Vec<u8>> {
    let geometry = PageGeometry::A4;
    let mut layout = PdfLayout::new(geometry, PDF_TITLE);
    for op in instructions(document, &geometry) {
        layout.apply(&op);
    }
    tracing::debug!(
        records = document.pages.len(),
        pages = layout.pages().len(),
        "laid out document"
    );
    layout.finish()
}

/// Parses an export and renders it. Nothing is rendered if parsing fails.
pub fn pdf_from_json(json: &str) -> Result<Vec<u8>> {
    let document = parse_export(json)?;
    render_pdf(&document)
}
