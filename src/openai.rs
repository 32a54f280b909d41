use anyhow::Context as _;

use crate::config::OpenAiConfig;
use crate::generator::{Prompt, TextGenerator};

/// Chat-completions client forced into JSON-object mode.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let endpoint = config.chat_completions_endpoint();
        Self { config, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for OpenAiClient {
    fn complete_json(&self, prompt: &Prompt) -> anyhow::Result<String> {
        chat_json(
            &self.endpoint,
            &self.config.api_key,
            &self.config.model,
            prompt.system,
            &prompt.user,
        )
    }
}

pub fn chat_json(
    endpoint: &str,
    api_key: &str,
    model: &str,
    system: &str,
    user: &str,
) -> anyhow::Result<String> {
    let body = serde_json::json!({
        "model": model,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
    });

    // Built per call: a blocking client must not be created or dropped on an
    // async worker thread.
    let client = reqwest::blocking::Client::builder()
        .build()
        .context("build http client")?;

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .with_context(|| format!("POST {endpoint}"))?;

    let status = response.status();
    let raw = response.text().context("read OpenAI response body")?;
    if !status.is_success() {
        let message = parse_error_message(&raw).unwrap_or_else(|| raw.clone());
        anyhow::bail!("OpenAI API error ({status}): {message}");
    }

    let value: serde_json::Value = serde_json::from_str(&raw).context("parse OpenAI response")?;
    extract_message_content(&value).context("extract message content")
}

fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?.to_owned();
    Some(message)
}

fn extract_message_content(value: &serde_json::Value) -> anyhow::Result<String> {
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("missing `choices[0].message.content` in response"))?;

    if content.trim().is_empty() {
        anyhow::bail!("OpenAI message content is empty");
    }
    Ok(content.to_owned())
}
