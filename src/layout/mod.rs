//! A small flowing-text page layout engine on top of `printpdf`.
//!
//! Coordinates are millimetres from the top-left corner of the page. The
//! engine keeps a cursor, breaks lines inside `MultiCell`, and starts a new
//! page whenever the next line would cross the bottom margin.

pub mod metrics;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::error::{Result, WizardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
            Self::Italic => BuiltinFont::HelveticaOblique,
            Self::BoldItalic => BuiltinFont::HelveticaBoldOblique,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One layout primitive. A width of `0.0` means "up to the right margin".
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    AddPage,
    SetFont {
        style: FontStyle,
        size: f32,
    },
    SetXY {
        x: f32,
        y: f32,
    },
    /// A single line box. With `line_break` the cursor moves to the start of
    /// the next line, otherwise to the right of the box.
    Cell {
        width: f32,
        height: f32,
        text: String,
        align: Align,
        line_break: bool,
    },
    /// Word-wrapped text, one `height` tall line per wrapped line.
    MultiCell {
        width: f32,
        height: f32,
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub left_margin: f32,
    pub top_margin: f32,
    pub right_margin: f32,
    pub bottom_margin: f32,
    /// Horizontal padding inside a cell.
    pub cell_margin: f32,
}

impl PageGeometry {
    pub const A4: Self = Self {
        width: 210.0,
        height: 297.0,
        left_margin: 10.0,
        top_margin: 10.0,
        right_margin: 10.0,
        bottom_margin: 15.0,
        cell_margin: 1.0,
    };

    pub fn page_break_trigger(&self) -> f32 {
        self.height - self.bottom_margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Text placed on a page. `baseline` is measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub style: FontStyle,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub runs: Vec<TextRun>,
}

pub const FOOTER_OFFSET: f32 = 15.0;
const LINE_HEIGHT: f32 = 10.0;

pub struct PdfLayout {
    geometry: PageGeometry,
    title: String,
    style: FontStyle,
    size: f32,
    x: f32,
    y: f32,
    pages: Vec<LaidOutPage>,
}

impl PdfLayout {
    pub fn new(geometry: PageGeometry, title: impl Into<String>) -> Self {
        Self {
            geometry,
            title: title.into(),
            style: FontStyle::Regular,
            size: 12.0,
            x: geometry.left_margin,
            y: geometry.top_margin,
            pages: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn pages(&self) -> &[LaidOutPage] {
        &self.pages
    }

    pub fn apply(&mut self, op: &DrawOp) {
        match op {
            DrawOp::AddPage => self.add_page(),
            DrawOp::SetFont { style, size } => {
                self.style = *style;
                self.size = *size;
            }
            DrawOp::SetXY { x, y } => {
                self.x = *x;
                self.y = *y;
            }
            DrawOp::Cell {
                width,
                height,
                text,
                align,
                line_break,
            } => self.cell(*width, *height, text, *align, *line_break),
            DrawOp::MultiCell {
                width,
                height,
                text,
            } => self.multi_cell(*width, *height, text),
        }
    }

    fn add_page(&mut self) {
        self.pages.push(LaidOutPage::default());
        self.x = self.geometry.left_margin;
        self.y = self.geometry.top_margin;
    }

    fn cell(&mut self, width: f32, height: f32, text: &str, align: Align, line_break: bool) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if self.y + height > self.geometry.page_break_trigger() {
            let x = self.x;
            self.add_page();
            self.x = x;
        }

        let width = if width <= 0.0 {
            self.geometry.width - self.geometry.right_margin - self.x
        } else {
            width
        };

        let text = metrics::to_latin1(text);
        if !text.is_empty() {
            let text_x = match align {
                Align::Left => self.x + self.geometry.cell_margin,
                Align::Center => {
                    self.x + (width - metrics::string_width(&text, self.style, self.size)) / 2.0
                }
            };
            let baseline = self.y + 0.5 * height + 0.3 * metrics::pt_to_mm(self.size);
            if let Some(page) = self.pages.last_mut() {
                page.runs.push(TextRun {
                    x: text_x,
                    baseline,
                    style: self.style,
                    size: self.size,
                    text,
                });
            }
        }

        if line_break {
            self.x = self.geometry.left_margin;
            self.y += height;
        } else {
            self.x += width;
        }
    }

    fn multi_cell(&mut self, width: f32, height: f32, text: &str) {
        let width = if width <= 0.0 {
            self.geometry.width - self.geometry.right_margin - self.x
        } else {
            width
        };
        let max_line = width - 2.0 * self.geometry.cell_margin;
        let text = metrics::to_latin1(text);

        for line in wrap_text(&text, max_line, self.style, self.size) {
            self.cell(width, height, &line, Align::Left, true);
        }
    }

    /// Serializes the laid-out pages, adding a "Page n" footer to each.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            self.pages.push(LaidOutPage::default());
        }

        let geometry = self.geometry;
        let (doc, first_page, first_layer) = PdfDocument::new(
            self.title.as_str(),
            Mm(geometry.width),
            Mm(geometry.height),
            "Layer 1",
        );
        let fonts = FontSet::load(&doc)?;
        let mut first = Some((first_page, first_layer));

        for (index, page) in self.pages.iter().enumerate() {
            let (page_index, layer_index) = match first.take() {
                Some(first) => first,
                None => doc.add_page(Mm(geometry.width), Mm(geometry.height), "Layer 1"),
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            let footer = footer(&geometry, index + 1);
            for run in page.runs.iter().chain(std::iter::once(&footer)) {
                layer.use_text(
                    run.text.clone(),
                    run.size,
                    Mm(run.x),
                    Mm(geometry.height - run.baseline),
                    fonts.get(run.style),
                );
            }
        }

        doc.save_to_bytes()
            .map_err(|err| WizardError::Render(err.to_string()))
    }
}

fn footer(geometry: &PageGeometry, page_number: usize) -> TextRun {
    let size = 8.0;
    let style = FontStyle::Italic;
    let text = format!("Page {page_number}");
    let usable = geometry.width - geometry.left_margin - geometry.right_margin;
    let y = geometry.height - FOOTER_OFFSET;
    TextRun {
        x: geometry.left_margin + (usable - metrics::string_width(&text, style, size)) / 2.0,
        baseline: y + 0.5 * LINE_HEIGHT + 0.3 * metrics::pt_to_mm(size),
        style,
        size,
        text,
    }
}

struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
}

impl FontSet {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let load = |style: FontStyle| {
            doc.add_builtin_font(style.builtin())
                .map_err(|err| WizardError::Render(format!("load font {style:?}: {err}")))
        };
        Ok(Self {
            regular: load(FontStyle::Regular)?,
            bold: load(FontStyle::Bold)?,
            italic: load(FontStyle::Italic)?,
            bold_italic: load(FontStyle::BoldItalic)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
            FontStyle::BoldItalic => &self.bold_italic,
        }
    }
}

/// Greedy word wrap. Explicit newlines are kept; a word wider than the line
/// is split between characters. Always yields at least one line.
pub fn wrap_text(text: &str, max_width: f32, style: FontStyle, size: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if metrics::string_width(&candidate, style, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if metrics::string_width(word, style, size) <= max_width {
                current = word.to_owned();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if metrics::string_width(&current, style, size) > max_width && current.len() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }
        lines.push(current);
    }

    lines
}
