use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request teaser options and print them as JSON.
    Teasers(TeasersArgs),
    /// Run the whole wizard non-interactively and write the PDF.
    Build(BuildArgs),
    /// Render a PDF from a document export JSON file.
    Render(RenderArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmEngine {
    /// Deterministic offline content, no network access.
    Noop,
    /// OpenAI chat completions (requires `OPENAI_API_KEY`).
    Openai,
}

#[derive(Debug, Clone, Args)]
pub struct TopicArgs {
    /// Author name printed on the cover.
    #[arg(long, default_value = "John Doe")]
    pub author: String,

    /// Kind of content, e.g. "Comprehensive Guide" or "How-to".
    #[arg(long, default_value = "Comprehensive Guide")]
    pub content_type: String,

    /// What the document is about.
    #[arg(long, default_value = "Personal Branding")]
    pub topic: String,
}

#[derive(Debug, Args)]
pub struct TeasersArgs {
    #[command(flatten)]
    pub topic: TopicArgs,

    #[arg(long, value_enum, default_value_t = LlmEngine::Openai)]
    pub engine: LlmEngine,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub topic: TopicArgs,

    /// Which of the generated teasers to use (0-based).
    #[arg(long, default_value_t = 0)]
    pub teaser: usize,

    /// Output path for the PDF.
    #[arg(long, default_value = "generated_pdf.pdf")]
    pub out: String,

    /// Also write the document export JSON here.
    #[arg(long)]
    pub json_out: Option<String>,

    /// Overwrite existing outputs.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    #[arg(long, value_enum, default_value_t = LlmEngine::Openai)]
    pub engine: LlmEngine,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Input path to the document export JSON.
    #[arg(long)]
    pub input: String,

    /// Output path for the PDF.
    #[arg(long)]
    pub out: String,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
