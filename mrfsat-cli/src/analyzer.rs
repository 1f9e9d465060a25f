//! Running the external structural analyzer

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

/// Run `analyzer <instance>` and return its stdout
pub(crate) fn run_analyzer(analyzer: &Path, instance: &Path) -> Result<String> {
    let output = Command::new(analyzer)
        .arg(instance)
        .output()
        .with_context(|| format!("failed to execute analyzer '{}'", analyzer.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.lines().last().unwrap_or("").trim();
        match output.status.code() {
            Some(code) => bail!("analyzer exited with code {code}: {detail}"),
            None => bail!("analyzer terminated by signal: {detail}"),
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    tracing::trace!(instance = %instance.display(), bytes = stdout.len(), "analyzer finished");
    Ok(stdout)
}
