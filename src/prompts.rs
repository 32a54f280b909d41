//! The three fixed generation templates and the parsing of their responses.
//!
//! Caller strings are embedded verbatim. Responses only have to be JSON; a
//! parseable response of the wrong shape degrades to empty content.

use serde::de::DeserializeOwned;

use crate::error::{Result, WizardError};
use crate::formats::{
    BodyResult, CoversResult, Outline, OutlineSection, OutlineResult, Paragraph, TeaserOption,
};
use crate::generator::{GenerationStep, Prompt, TextGenerator};

pub const TEASER_COUNT: usize = 3;

const TEASERS_SYSTEM: &str =
    "You are an API that generates an array of 3 covers of digital content.";
const OUTLINE_SYSTEM: &str =
    "You are an API that generates overviews and outlines for digital content.";
const HYDRATION_SYSTEM: &str = "You are an API that generates paragraphs for a specific point \
of a digital document, using the overview and outline as a guide to infer what was already \
written. You adhere strictly to the Schema when responding.";

const TEASERS_SCHEMA: &str = "\
interface Cover {
  title: string;
  subtext: string;
  author: string;
  photo: string; // placeholder image url
}

interface CoversResult {
  covers: Cover[]; // exactly 3
  timestamp: number;
}";

const OUTLINE_SCHEMA: &str = "\
interface Point {
  text: string;
}

interface Contents {
  title: string;
  points: Point[];
}

interface Outline {
  overview: string; // a paragraph of at least 4 sentences
  tableOfContents: Contents[]; // at least 7 entries
}

interface OutlineResult {
  outline: Outline;
  timestamp: number;
}";

const HYDRATION_SCHEMA: &str = "\
interface ParagraphContent {
  content: string;
}

interface BodyResult {
  paragraphs: ParagraphContent[];
  timestamp: number;
}";

pub fn teasers_prompt(content_type: &str, topic: &str) -> Prompt {
    Prompt {
        step: GenerationStep::Teasers,
        subject: topic.to_owned(),
        system: TEASERS_SYSTEM,
        user: format!(
            "Given the following TypeScript interfaces:\n\
\n\
{TEASERS_SCHEMA}\n\
\n\
Give me 3 example covers for digital content of type {content_type} about {topic} \
returned as a json representation of a CoversResult.\n"
        ),
    }
}

pub fn outline_prompt(title: &str, subtext: &str) -> Prompt {
    Prompt {
        step: GenerationStep::Outline,
        subject: title.to_owned(),
        system: OUTLINE_SYSTEM,
        user: format!(
            "Given the following TypeScript interfaces:\n\
\n\
{OUTLINE_SCHEMA}\n\
\n\
Give me a full outline for a piece of digital content with a title of {title} and a subtext \
of {subtext} returned as a json representation of an OutlineResult.\n"
        ),
    }
}

pub fn hydration_prompt(
    table_of_contents_json: &str,
    overview: &str,
    section_title: &str,
    point: &str,
) -> Prompt {
    Prompt {
        step: GenerationStep::Hydration,
        subject: point.to_owned(),
        system: HYDRATION_SYSTEM,
        user: format!(
            "Given the following TypeScript interfaces:\n\
\n\
{HYDRATION_SCHEMA}\n\
\n\
Overview:\n\
{overview}\n\
\n\
Table of contents:\n\
{table_of_contents_json}\n\
\n\
Write the required content for the point in the table of contents called {point} with \
{section_title} section returned as a json representation of a BodyResult.\n"
        ),
    }
}

/// The returned teasers carry `author` instead of whatever the API
/// put there.
pub fn request_teasers(
    generator: &dyn TextGenerator,
    author: &str,
    content_type: &str,
    topic: &str,
) -> Result<Vec<TeaserOption>> {
    let prompt = teasers_prompt(content_type, topic);
    let result: CoversResult = generate(generator, &prompt)?;

    let mut covers = result.covers;
    if covers.len() != TEASER_COUNT {
        tracing::warn!(
            received = covers.len(),
            expected = TEASER_COUNT,
            "unexpected number of teasers"
        );
    }
    covers.truncate(TEASER_COUNT);
    for cover in &mut covers {
        cover.author = author.to_owned();
    }
    Ok(covers)
}

/// The outline is tagged with the teaser's title and subtext.
pub fn request_outline(generator: &dyn TextGenerator, teaser: &TeaserOption) -> Result<Outline> {
    let prompt = outline_prompt(&teaser.title, &teaser.subtext);
    let result: OutlineResult = generate(generator, &prompt)?;

    let mut outline = result.outline.unwrap_or_else(|| {
        tracing::warn!("outline response has no `outline`; using an empty outline");
        Outline::default()
    });
    outline.title = teaser.title.clone();
    outline.subtext = teaser.subtext.clone();
    Ok(outline)
}

/// Paragraphs for a single outline point.
pub fn request_paragraphs(
    generator: &dyn TextGenerator,
    table_of_contents_json: &str,
    overview: &str,
    section_title: &str,
    point: &str,
) -> Result<Vec<Paragraph>> {
    let prompt = hydration_prompt(table_of_contents_json, overview, section_title, point);
    let result: BodyResult = generate(generator, &prompt)?;
    Ok(result.paragraphs)
}

pub fn table_of_contents_json(sections: &[OutlineSection]) -> String {
    serde_json::to_string(sections).unwrap_or_else(|_| "[]".to_owned())
}

fn generate<T: DeserializeOwned + Default>(
    generator: &dyn TextGenerator,
    prompt: &Prompt,
) -> Result<T> {
    let step = prompt.step.name();
    tracing::debug!(step, subject = %prompt.subject, "generate");

    let raw = generator
        .complete_json(prompt)
        .map_err(|err| WizardError::Upstream {
            step,
            message: format!("{err:#}"),
        })?;

    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|source| WizardError::MalformedResponse { step, source })?;

    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            tracing::warn!(step, error = %err, "response does not match the schema; using empty content");
            Ok(T::default())
        }
    }
}
