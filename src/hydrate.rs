use crate::formats::{HydratedPoint, HydratedSection, Outline};
use crate::generator::TextGenerator;
use crate::prompts;

/// Progress after one hydration call.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationEvent {
    pub completed: usize,
    pub total: usize,
    pub section_index: usize,
    pub section_title: String,
    pub point_text: String,
    /// Set when the call failed; the point keeps empty paragraphs.
    pub error: Option<String>,
}

impl HydrationEvent {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

/// Walks every point of every section in outline order, one blocking call per
/// point, yielding an event after each call.
///
/// The outline is only read. Hydrated points are fresh copies.
pub struct Hydration<'a> {
    generator: &'a dyn TextGenerator,
    outline: &'a Outline,
    table_of_contents_json: String,
    total: usize,
    completed: usize,
    section: usize,
    point: usize,
    sections: Vec<HydratedSection>,
}

impl<'a> Hydration<'a> {
    pub fn new(generator: &'a dyn TextGenerator, outline: &'a Outline) -> Self {
        Self {
            generator,
            outline,
            table_of_contents_json: prompts::table_of_contents_json(&outline.table_of_contents),
            total: outline.point_count(),
            completed: 0,
            section: 0,
            point: 0,
            sections: Vec::with_capacity(outline.table_of_contents.len()),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Runs any remaining calls and returns one hydrated section per outline
    /// section, in order.
    pub fn finish(mut self) -> Vec<HydratedSection> {
        for _ in self.by_ref() {}
        self.sections
    }
}

impl Iterator for Hydration<'_> {
    type Item = HydrationEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let outline = self.outline;
        loop {
            let section = outline.table_of_contents.get(self.section)?;
            if self.sections.len() == self.section {
                self.sections.push(HydratedSection {
                    title: section.title.clone(),
                    points: Vec::with_capacity(section.points.len()),
                });
            }

            let Some(point) = section.points.get(self.point) else {
                self.section += 1;
                self.point = 0;
                continue;
            };
            self.point += 1;

            let (paragraphs, error) = match prompts::request_paragraphs(
                self.generator,
                &self.table_of_contents_json,
                &outline.overview,
                &section.title,
                &point.text,
            ) {
                Ok(paragraphs) => (paragraphs, None),
                Err(err) => {
                    tracing::warn!(
                        section = %section.title,
                        point = %point.text,
                        error = %err,
                        "hydration failed; continuing with empty paragraphs"
                    );
                    (Vec::new(), Some(err.to_string()))
                }
            };

            self.sections[self.section].points.push(HydratedPoint {
                text: point.text.clone(),
                paragraphs,
            });
            self.completed += 1;

            return Some(HydrationEvent {
                completed: self.completed,
                total: self.total,
                section_index: self.section,
                section_title: section.title.clone(),
                point_text: point.text.clone(),
                error,
            });
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.completed;
        (remaining, Some(remaining))
    }
}
