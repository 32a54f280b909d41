use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::cli::RenderArgs;
use crate::document;

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    ensure_writable(&args.out, args.force)?;

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read input: {}", args.input))?;
    let bytes = document::pdf_from_json(&json)
        .with_context(|| format!("render pdf from: {}", args.input))?;

    write_output(&args.out, &bytes, args.force)?;
    tracing::info!(input = %args.input, out = %args.out, bytes = bytes.len(), "rendered pdf");
    Ok(())
}

/// Fails early when `out` exists and `force` is off, and creates its parent
/// directory.
pub fn ensure_writable(out: &str, force: bool) -> anyhow::Result<()> {
    if Path::new(out).exists() && !force {
        anyhow::bail!("output already exists: {out}");
    }
    if let Some(parent) = Path::new(out).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_output(out: &str, contents: &[u8], force: bool) -> anyhow::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options
        .open(out)
        .with_context(|| format!("open output: {out}"))?;
    file.write_all(contents)
        .with_context(|| format!("write output: {out}"))?;
    file.flush()
        .with_context(|| format!("flush output: {out}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_output_refuses_to_clobber_without_force() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("out.pdf");
        let out = out.to_string_lossy().to_string();

        write_output(&out, b"first", false)?;
        assert!(write_output(&out, b"second", false).is_err());
        assert_eq!(std::fs::read(&out)?, b"first");

        write_output(&out, b"third", true)?;
        assert_eq!(std::fs::read(&out)?, b"third");
        Ok(())
    }

    #[test]
    fn ensure_writable_creates_parent_dirs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("nested/deeper/out.pdf");
        ensure_writable(&out.to_string_lossy(), false)?;
        assert!(dir.path().join("nested/deeper").is_dir());
        Ok(())
    }
}
