use crate::workflow::{Action, Stage};

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{field} is required")]
    MissingInput { field: &'static str },

    #[error("cannot {action} while the wizard is at stage {stage}")]
    InvalidStage { action: Action, stage: Stage },

    #[error("teaser index {index} is out of range ({len} teasers available)")]
    TeaserIndexOutOfRange { index: usize, len: usize },

    #[error("{step} generation failed: {message}")]
    Upstream { step: &'static str, message: String },

    #[error("{step} response is not a JSON object: {source}")]
    MalformedResponse {
        step: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid document JSON: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    #[error("render pdf: {0}")]
    Render(String),
}

pub type Result<T, E = WizardError> = std::result::Result<T, E>;
