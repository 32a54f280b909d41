use anyhow::Context as _;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-1106";

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        let api_key = api_key.trim().to_owned();
        if api_key.is_empty() {
            anyhow::bail!("OPENAI_API_KEY is empty");
        }

        let base_url = env_or_default("PDFWIZARD_OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        let base_url = parse_base_url(&base_url).with_context(|| {
            format!("invalid PDFWIZARD_OPENAI_BASE_URL={base_url:?}")
        })?;
        let model = env_or_default("PDFWIZARD_OPENAI_MODEL", DEFAULT_OPENAI_MODEL);

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }

    pub fn chat_completions_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

pub fn parse_base_url(raw: &str) -> anyhow::Result<String> {
    let url = url::Url::parse(raw.trim()).context("parse url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("base url must be http/https");
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

/// Settings for the web wizard.
#[derive(Clone)]
pub struct AppConfig {
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let password = std::env::var("PDFWIZARD_PASSWORD")
            .context("PDFWIZARD_PASSWORD is required to serve the wizard")?;
        if password.is_empty() {
            anyhow::bail!("PDFWIZARD_PASSWORD is empty");
        }
        Ok(Self { password })
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
