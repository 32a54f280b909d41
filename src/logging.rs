use anyhow::Context as _;

/// HTTP client internals stay quiet unless asked for through `RUST_LOG`.
const DEFAULT_DIRECTIVES: &str = "info,hyper_util=warn,reqwest=warn";

/// Installs the stderr subscriber for both binaries.
pub fn init() -> anyhow::Result<()> {
    let filter = match std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            tracing_subscriber::EnvFilter::try_new(&directives)
                .with_context(|| format!("parse RUST_LOG={directives:?}"))?
        }
        _ => tracing_subscriber::EnvFilter::try_new(DEFAULT_DIRECTIVES)
            .context("build default log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
