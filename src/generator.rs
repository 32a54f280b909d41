use std::fmt;

use anyhow::Context as _;

use crate::cli::LlmEngine;
use crate::config::OpenAiConfig;
use crate::openai::OpenAiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    Teasers,
    Outline,
    Hydration,
}

impl GenerationStep {
    pub fn name(self) -> &'static str {
        match self {
            Self::Teasers => "teasers",
            Self::Outline => "outline",
            Self::Hydration => "hydration",
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully built request for one generation step.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub step: GenerationStep,
    /// Short human label of what is being generated (topic, title or point).
    pub subject: String,
    pub system: &'static str,
    pub user: String,
}

/// Boundary to the completion API: one blocking request, one JSON object back.
///
/// Implementations return the raw response text. Callers own parsing.
pub trait TextGenerator: Send + Sync {
    fn complete_json(&self, prompt: &Prompt) -> anyhow::Result<String>;
}

pub fn from_engine(engine: LlmEngine) -> anyhow::Result<Box<dyn TextGenerator>> {
    match engine {
        LlmEngine::Noop => Ok(Box::new(NoopGenerator)),
        LlmEngine::Openai => {
            let config = OpenAiConfig::from_env().context("load openai config")?;
            tracing::info!(model = %config.model, base_url = %config.base_url, "using openai engine");
            Ok(Box::new(OpenAiClient::new(config)))
        }
    }
}

/// Canned, deterministic responses shaped like the real API's.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGenerator;

const NOOP_SECTION_COUNT: usize = 7;
const NOOP_POINTS_PER_SECTION: usize = 2;

impl TextGenerator for NoopGenerator {
    fn complete_json(&self, prompt: &Prompt) -> anyhow::Result<String> {
        let subject = prompt.subject.as_str();
        let timestamp = chrono::Utc::now().timestamp();
        let value = match prompt.step {
            GenerationStep::Teasers => {
                let covers = (1..=3)
                    .map(|n| {
                        serde_json::json!({
                            "title": format!("{subject}, Volume {n}"),
                            "subtext": format!("Everything you need to know about {subject}, take {n}."),
                            "author": "",
                            "photo": "",
                        })
                    })
                    .collect::<Vec<_>>();
                serde_json::json!({ "covers": covers, "timestamp": timestamp })
            }
            GenerationStep::Outline => {
                let sections = (1..=NOOP_SECTION_COUNT)
                    .map(|s| {
                        let points = (1..=NOOP_POINTS_PER_SECTION)
                            .map(|p| serde_json::json!({ "text": format!("Point {s}.{p}") }))
                            .collect::<Vec<_>>();
                        serde_json::json!({ "title": format!("Chapter {s}"), "points": points })
                    })
                    .collect::<Vec<_>>();
                serde_json::json!({
                    "outline": {
                        "overview": format!(
                            "This document explores {subject}. It is organised in {NOOP_SECTION_COUNT} chapters. \
Each chapter builds on the previous one. Read it front to back."
                        ),
                        "tableOfContents": sections,
                    },
                    "timestamp": timestamp,
                })
            }
            GenerationStep::Hydration => serde_json::json!({
                "paragraphs": [
                    { "content": format!("{subject} matters because it shapes everything that follows.") },
                    { "content": format!("Put {subject} into practice one small step at a time.") },
                ],
                "timestamp": timestamp,
            }),
        };
        Ok(value.to_string())
    }
}
