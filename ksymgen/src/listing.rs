//! Invokes `nm -n <binary>` and captures its output as the symbol listing.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Returns the `nm -n` listing for `binary`.
pub fn read(binary: &Path) -> Result<String> {
    tracing::info!(binary = %binary.display(), "running nm");

    let output = Command::new("nm")
        .arg("-n")
        .arg(binary)
        .output()
        .with_context(|| format!("failed to spawn nm on {}", binary.display()))?;

    if !output.status.success() {
        bail!(
            "nm exited with {} while reading {}",
            output.status,
            binary.display()
        );
    }

    String::from_utf8(output.stdout)
        .with_context(|| format!("nm output for {} was not valid UTF-8", binary.display()))
}
