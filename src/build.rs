use std::io::Write as _;

use anyhow::Context as _;

use crate::cli::{BuildArgs, TeasersArgs, TopicArgs};
use crate::document;
use crate::export;
use crate::generator;
use crate::workflow::{TopicInputs, Workflow};

pub fn teasers(args: TeasersArgs) -> anyhow::Result<()> {
    let generator = generator::from_engine(args.engine)?;
    let mut workflow = Workflow::new();
    let teasers = workflow
        .request_teasers(generator.as_ref(), topic_inputs(args.topic))
        .context("request teasers")?;

    let json = serde_json::to_string_pretty(teasers).context("serialize teasers")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("write stdout")?;
    Ok(())
}

/// Drives every wizard stage in order without interaction and writes the PDF.
pub fn run(args: BuildArgs) -> anyhow::Result<()> {
    export::ensure_writable(&args.out, args.force)?;
    if let Some(json_out) = &args.json_out {
        export::ensure_writable(json_out, args.force)?;
    }

    let generator = generator::from_engine(args.engine)?;
    let generator = generator.as_ref();
    let mut workflow = Workflow::new();

    tracing::info!(topic = %args.topic.topic, "build: teasers");
    workflow
        .request_teasers(generator, topic_inputs(args.topic))
        .context("request teasers")?;

    tracing::info!(index = args.teaser, "build: select teaser");
    let teaser = workflow.select_teaser(args.teaser).context("select teaser")?;
    tracing::info!(title = %teaser.title, "build: outline");
    workflow.request_outline(generator).context("request outline")?;

    tracing::info!("build: content");
    let mut failed = 0usize;
    workflow
        .generate_content(generator, |event| {
            if event.error.is_some() {
                failed += 1;
            }
            tracing::info!(
                percent = event.percent(),
                point = %event.point_text,
                "build: hydrated {}/{}",
                event.completed,
                event.total
            );
        })
        .context("generate content")?;
    if failed > 0 {
        tracing::warn!(failed, "build: some points were left empty");
    }

    if let (Some(json_out), Some(doc)) = (&args.json_out, workflow.document()) {
        let json = document::to_export_json(doc).context("serialize document")?;
        export::write_output(json_out, json.as_bytes(), args.force)?;
        tracing::info!(out = %json_out, "build: wrote document json");
    }

    tracing::info!("build: pdf");
    let bytes = workflow.build_pdf().context("build pdf")?;
    export::write_output(&args.out, bytes, args.force)?;
    tracing::info!(out = %args.out, bytes = bytes.len(), "build: done");
    Ok(())
}

fn topic_inputs(args: TopicArgs) -> TopicInputs {
    TopicInputs {
        author: args.author,
        content_type: args.content_type,
        topic: args.topic,
    }
}
