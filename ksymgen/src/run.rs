//! Drives the `ksym-core` pipeline end to end and writes the result.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use ksym_core::backend::{Backend, CBackend, GasBackend};
use ksym_core::emit::Emitter;
use ksym_core::{parse, pipeline, Mode};

use crate::listing;

pub fn run(out_file: &Path, binary: Option<&Path>, linux_mode: bool) -> Result<()> {
    let mode = if linux_mode { Mode::Linux } else { Mode::Default };

    // No `--binary` means a two-pass build's first pass: there is no listing
    // to parse or filter, so skip straight to an empty symbol set rather
    // than running an empty listing through `filter_and_bind`, which would
    // never observe `.text` sentinels and fail with `MissingSection`.
    let (symbols, section) = match binary {
        Some(binary) => {
            let text = listing::read(binary)?;
            let raw = parse::parse_listing(&text)?;
            parse::filter_and_bind(raw, mode)?
        }
        None => {
            tracing::debug!("no --binary given, emitting empty tables");
            (Vec::new(), ksym_core::Section::default())
        }
    };

    tracing::info!(count = symbols.len(), "kept symbols after filtering");

    let output = match mode.backend() {
        Backend::C => {
            let mut backend = CBackend::new();
            generate(symbols, mode, section, &mut backend)?;
            backend.finish()
        }
        Backend::Gas => {
            let mut backend = GasBackend::new();
            generate(symbols, mode, section, &mut backend)?;
            backend.finish()
        }
    };

    let file = File::create(out_file)
        .with_context(|| format!("failed to create {}", out_file.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(output.as_bytes())
        .with_context(|| format!("failed to write {}", out_file.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", out_file.display()))?;

    Ok(())
}

fn generate(
    symbols: Vec<ksym_core::Symbol>,
    mode: Mode,
    section: ksym_core::Section,
    backend: &mut dyn Emitter,
) -> Result<()> {
    pipeline::generate(symbols, mode, section, backend)
        .context("failed to generate symbol tables")
}
