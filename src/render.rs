use crate::formats::Page;
use crate::layout::metrics;
use crate::layout::{Align, DrawOp, FontStyle, PageGeometry};

const LINE: f32 = 10.0;
/// Extra width given to the cover title cell around the measured text.
const TITLE_PADDING: f32 = 6.0;
const TITLE_SIZE: f32 = 18.0;

/// Emits the draw calls for one page. The caller has already started a new
/// output page.
pub fn render_page(page: &Page, geometry: &PageGeometry, ops: &mut Vec<DrawOp>) {
    match page {
        Page::CoverPage {
            title,
            author,
            subtext,
        } => {
            ops.push(font(FontStyle::Bold, TITLE_SIZE));
            let title_width = cover_title_width(title);
            ops.push(DrawOp::SetXY {
                x: cover_title_x(title, geometry),
                y: geometry.height / 2.0 - 10.0,
            });
            ops.push(cell(title_width, title, Align::Center));

            if let Some(subtext) = subtext {
                ops.push(font(FontStyle::Italic, 14.0));
                ops.push(cell(0.0, subtext, Align::Center));
            }
            if let Some(author) = author {
                ops.push(font(FontStyle::Italic, 12.0));
                ops.push(cell(0.0, &format!("Author: {author}"), Align::Center));
            }
        }
        Page::Introduction { title, text } => {
            heading(ops, title.as_deref().unwrap_or("Introduction"));
            ops.push(font(FontStyle::Regular, 12.0));
            ops.push(multi_cell(text));
        }
        Page::Overview { text } => {
            heading(ops, "Overview");
            ops.push(font(FontStyle::Regular, 12.0));
            ops.push(multi_cell(text));
        }
        Page::TableOfContents { sections } => {
            heading(ops, "Table of Contents");
            for section in sections {
                ops.push(font(FontStyle::Bold, 12.0));
                ops.push(cell(0.0, &section.title, Align::Left));
                for point in &section.points {
                    ops.push(font(FontStyle::Regular, 10.0));
                    ops.push(multi_cell(&point.text));
                }
            }
        }
        Page::Section { section } => {
            heading(ops, &section.title);
            for point in &section.points {
                ops.push(font(FontStyle::Bold, 12.0));
                ops.push(cell(0.0, &point.text, Align::Left));
                for paragraph in &point.paragraphs {
                    ops.push(font(FontStyle::Regular, 10.0));
                    ops.push(multi_cell(&paragraph.content));
                }
            }
        }
    }
}

/// Measured title width plus cell padding.
pub fn cover_title_width(title: &str) -> f32 {
    metrics::string_width(&metrics::to_latin1(title), FontStyle::Bold, TITLE_SIZE) + TITLE_PADDING
}

/// Left edge of the cover title cell: the cell is centred within the width
/// between the margins.
pub fn cover_title_x(title: &str, geometry: &PageGeometry) -> f32 {
    let document_width = geometry.width - 2.0 * geometry.left_margin;
    (document_width - cover_title_width(title)) / 2.0
}

fn heading(ops: &mut Vec<DrawOp>, text: &str) {
    ops.push(font(FontStyle::Bold, 16.0));
    ops.push(cell(0.0, text, Align::Left));
}

fn font(style: FontStyle, size: f32) -> DrawOp {
    DrawOp::SetFont { style, size }
}

fn cell(width: f32, text: &str, align: Align) -> DrawOp {
    DrawOp::Cell {
        width,
        height: LINE,
        text: text.to_owned(),
        align,
        line_break: true,
    }
}

fn multi_cell(text: &str) -> DrawOp {
    DrawOp::MultiCell {
        width: 0.0,
        height: LINE,
        text: text.to_owned(),
    }
}
