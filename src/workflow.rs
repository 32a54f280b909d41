//! Wizard state: five forward stages, each entered by one user action.
//!
//! Every action has a row in the transition table naming the stage it needs,
//! the stage it moves to and the downstream artifacts it discards. Re-running
//! an earlier action therefore resets everything that depended on it.

use std::fmt;

use crate::document;
use crate::error::{Result, WizardError};
use crate::formats::{Document, Outline, TeaserOption};
use crate::generator::TextGenerator;
use crate::hydrate::{Hydration, HydrationEvent};
use crate::prompts;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    #[default]
    Idle,
    TeasersReady,
    TeaserSelected,
    OutlineReady,
    ContentReady,
    PdfReady,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TeasersReady => "teasers ready",
            Self::TeaserSelected => "teaser selected",
            Self::OutlineReady => "outline ready",
            Self::ContentReady => "content ready",
            Self::PdfReady => "pdf ready",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RequestTeasers,
    SelectTeaser,
    RequestOutline,
    GenerateContent,
    BuildPdf,
    Download,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RequestTeasers => "request teasers",
            Self::SelectTeaser => "select a teaser",
            Self::RequestOutline => "request an outline",
            Self::GenerateContent => "generate content",
            Self::BuildPdf => "build the pdf",
            Self::Download => "download",
        })
    }
}

/// Downstream state an action can discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Selection,
    Outline,
    Document,
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Lowest stage the action is allowed from.
    pub requires: Stage,
    pub target: Stage,
    pub clears: &'static [Artifact],
}

impl Action {
    pub const fn transition(self) -> Transition {
        match self {
            Self::RequestTeasers => Transition {
                requires: Stage::Idle,
                target: Stage::TeasersReady,
                clears: &[
                    Artifact::Selection,
                    Artifact::Outline,
                    Artifact::Document,
                    Artifact::Pdf,
                ],
            },
            Self::SelectTeaser => Transition {
                requires: Stage::TeasersReady,
                target: Stage::TeaserSelected,
                clears: &[Artifact::Outline, Artifact::Document, Artifact::Pdf],
            },
            Self::RequestOutline => Transition {
                requires: Stage::TeaserSelected,
                target: Stage::OutlineReady,
                clears: &[Artifact::Document, Artifact::Pdf],
            },
            Self::GenerateContent => Transition {
                requires: Stage::OutlineReady,
                target: Stage::ContentReady,
                clears: &[Artifact::Pdf],
            },
            Self::BuildPdf => Transition {
                requires: Stage::ContentReady,
                target: Stage::PdfReady,
                clears: &[],
            },
            Self::Download => Transition {
                requires: Stage::PdfReady,
                target: Stage::PdfReady,
                clears: &[],
            },
        }
    }
}

/// What the user typed into the topic form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInputs {
    pub author: String,
    pub content_type: String,
    pub topic: String,
}

impl TopicInputs {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("author", &self.author),
            ("content type", &self.content_type),
            ("topic", &self.topic),
        ] {
            if value.trim().is_empty() {
                return Err(WizardError::MissingInput { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workflow {
    stage: Stage,
    inputs: Option<TopicInputs>,
    teasers: Vec<TeaserOption>,
    selected: Option<usize>,
    outline: Option<Outline>,
    document: Option<Document>,
    pdf: Option<Vec<u8>>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn inputs(&self) -> Option<&TopicInputs> {
        self.inputs.as_ref()
    }

    pub fn teasers(&self) -> &[TeaserOption] {
        &self.teasers
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_teaser(&self) -> Option<&TeaserOption> {
        self.selected.and_then(|index| self.teasers.get(index))
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn pdf(&self) -> Option<&[u8]> {
        self.pdf.as_deref()
    }

    /// Replaces the teasers. On failure nothing changes.
    pub fn request_teasers(
        &mut self,
        generator: &dyn TextGenerator,
        inputs: TopicInputs,
    ) -> Result<&[TeaserOption]> {
        let transition = self.check(Action::RequestTeasers)?;
        inputs.validate()?;

        let teasers = prompts::request_teasers(
            generator,
            &inputs.author,
            &inputs.content_type,
            &inputs.topic,
        )?;
        tracing::info!(count = teasers.len(), topic = %inputs.topic, "teasers ready");

        self.apply(transition);
        self.inputs = Some(inputs);
        self.teasers = teasers;
        Ok(self.teasers.as_slice())
    }

    pub fn select_teaser(&mut self, index: usize) -> Result<&TeaserOption> {
        let transition = self.check(Action::SelectTeaser)?;
        let Some(teaser) = self.teasers.get(index) else {
            return Err(WizardError::TeaserIndexOutOfRange {
                index,
                len: self.teasers.len(),
            });
        };
        tracing::info!(index, title = %teaser.title, "teaser selected");

        self.apply(transition);
        self.selected = Some(index);
        Ok(&self.teasers[index])
    }

    /// Requests the outline for the selected teaser's title and subtext.
    pub fn request_outline(&mut self, generator: &dyn TextGenerator) -> Result<&Outline> {
        let transition = self.check(Action::RequestOutline)?;
        let teaser = self
            .selected_teaser()
            .ok_or(WizardError::InvalidStage {
                action: Action::RequestOutline,
                stage: self.stage(),
            })?;

        let outline = prompts::request_outline(generator, teaser)?;
        tracing::info!(
            sections = outline.table_of_contents.len(),
            points = outline.point_count(),
            "outline ready"
        );

        self.apply(transition);
        Ok(&*self.outline.insert(outline))
    }

    /// Hydrates every outline point, in order, reporting progress after each
    /// call. A failed point keeps empty paragraphs and the walk continues.
    pub fn generate_content(
        &mut self,
        generator: &dyn TextGenerator,
        mut on_progress: impl FnMut(&HydrationEvent),
    ) -> Result<&Document> {
        let transition = self.check(Action::GenerateContent)?;
        let (Some(teaser), Some(outline)) = (self.selected_teaser(), self.outline.as_ref()) else {
            return Err(WizardError::InvalidStage {
                action: Action::GenerateContent,
                stage: self.stage(),
            });
        };

        let mut hydration = Hydration::new(generator, outline);
        let total = hydration.total();
        let mut failed = 0;
        for event in hydration.by_ref() {
            if event.error.is_some() {
                failed += 1;
            }
            tracing::info!(
                completed = event.completed,
                total = event.total,
                section = %event.section_title,
                "hydrated point"
            );
            on_progress(&event);
        }
        let sections = hydration.finish();
        if failed > 0 {
            tracing::warn!(failed, total, "some points have no content");
        }

        let created_at = chrono::Utc::now().timestamp();
        let document = document::assemble(teaser, outline, sections, created_at);

        self.apply(transition);
        Ok(&*self.document.insert(document))
    }

    pub fn build_pdf(&mut self) -> Result<&[u8]> {
        let transition = self.check(Action::BuildPdf)?;
        let Some(document) = self.document.as_ref() else {
            return Err(WizardError::InvalidStage {
                action: Action::BuildPdf,
                stage: self.stage(),
            });
        };

        let bytes = document::render_pdf(document)?;
        tracing::info!(bytes = bytes.len(), pages = document.pages.len(), "pdf ready");

        self.apply(transition);
        Ok(self.pdf.insert(bytes).as_slice())
    }

    pub fn download(&self) -> Result<&[u8]> {
        self.check(Action::Download)?;
        self.pdf.as_deref().ok_or(WizardError::InvalidStage {
            action: Action::Download,
            stage: self.stage(),
        })
    }

    fn check(&self, action: Action) -> Result<Transition> {
        let transition = action.transition();
        let stage = self.stage();
        if stage < transition.requires {
            return Err(WizardError::InvalidStage { action, stage });
        }
        Ok(transition)
    }

    fn apply(&mut self, transition: Transition) {
        for artifact in transition.clears {
            match artifact {
                Artifact::Selection => self.selected = None,
                Artifact::Outline => self.outline = None,
                Artifact::Document => self.document = None,
                Artifact::Pdf => self.pdf = None,
            }
        }
        self.stage = transition.target;
    }
}
