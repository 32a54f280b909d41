use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    pdfwizard::logging::init().context("init logging")?;

    let cli = pdfwizard::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        pdfwizard::cli::Command::Teasers(args) => {
            pdfwizard::build::teasers(args).context("teasers")?;
        }
        pdfwizard::cli::Command::Build(args) => {
            pdfwizard::build::run(args).context("build")?;
        }
        pdfwizard::cli::Command::Render(args) => {
            pdfwizard::export::run(args).context("render")?;
        }
    }

    Ok(())
}
