//! Instance processing for `mrfsat predict`
//!
//! Collects instance files, runs the analyzer on each and classifies its
//! output. A failing instance is reported as skipped; only model and
//! configuration errors stop the batch.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use mrfsat_core::{DegenerateClusterPolicy, FeatureSchema};
use mrfsat_ml::{InstanceOutcome, PredictionConfig, PredictionService, SkipReason};

use crate::analyzer::run_analyzer;
use crate::format::{BatchSummary, print_outcome, print_summary, println_colored};
use crate::{Args, DEFAULT_ANALYZER, PredictArgs, SchemaVersion, Verbosity};

/// Build the service configuration from flags already merged with the config file
fn prediction_config(predict: &PredictArgs) -> Result<PredictionConfig> {
    let model = predict
        .model
        .clone()
        .context("no model given; pass --model or set `model` in the config file")?;
    let schema = predict.schema.unwrap_or(SchemaVersion::Canonical);

    let feature_schema = if !predict.features.is_empty() {
        FeatureSchema::new(predict.features.iter().cloned())
    } else if schema == SchemaVersion::Legacy {
        FeatureSchema::legacy()
    } else {
        FeatureSchema::canonical()
    };

    let mut config = PredictionConfig::new(model);
    config.record_schema = schema.as_str().to_string();
    config.feature_schema = feature_schema;
    if predict.zero_fill {
        config.degenerate_policy = DegenerateClusterPolicy::ZeroFill;
    }
    Ok(config)
}

/// Classify every requested instance
pub(crate) fn run_predict(args: &Args, predict: &PredictArgs, verbosity: Verbosity) -> Result<()> {
    let config = prediction_config(predict)?;
    let service = PredictionService::load(&config).context("failed to load model")?;
    let analyzer = predict
        .analyzer
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ANALYZER));

    let files = collect_files(&predict.file, predict.dir.as_deref(), predict.recursive)?;
    if files.is_empty() {
        bail!("no instance files found");
    }

    if verbosity >= Verbosity::Verbose {
        println_colored(
            args,
            &format!("Processing {} file(s)...", files.len()),
            Some(owo_colors::AnsiColors::Cyan),
        );
    }

    let mut summary = BatchSummary::default();
    for file in &files {
        let outcome = classify_file(&service, &analyzer, file)?;
        summary.record(&outcome);
        if verbosity > Verbosity::Quiet || !outcome.is_skipped() {
            print_outcome(args, predict.format, file, &outcome);
        }
    }

    if verbosity >= Verbosity::Verbose {
        print_summary(args, &summary);
    }
    Ok(())
}

/// Run the analyzer on one instance and classify its output
fn classify_file(service: &PredictionService, analyzer: &Path, file: &Path) -> Result<InstanceOutcome> {
    let stdout = match run_analyzer(analyzer, file) {
        Ok(stdout) => stdout,
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "analyzer failed");
            return Ok(InstanceOutcome::Skipped {
                reason: SkipReason::Analyzer(format!("{:#}", e)),
            });
        }
    };

    let outcome = service
        .classify_output(&stdout)
        .with_context(|| format!("cannot classify '{}'", file.display()))?;
    if let InstanceOutcome::Skipped { ref reason } = outcome {
        tracing::info!(file = %file.display(), %reason, "instance skipped");
    }
    Ok(outcome)
}

/// Explicit files in the given order, then regular files under `dir` sorted by path
fn collect_files(files: &[PathBuf], dir: Option<&Path>, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut collected = files.to_vec();

    if let Some(dir) = dir {
        if !dir.is_dir() {
            bail!("'{}' is not a directory", dir.display());
        }
        let walker = if recursive {
            WalkDir::new(dir)
        } else {
            WalkDir::new(dir).max_depth(1)
        };

        let mut found = Vec::new();
        for entry in walker {
            let entry = entry.with_context(|| format!("cannot read '{}'", dir.display()))?;
            if entry.file_type().is_file() {
                found.push(entry.into_path());
            }
        }
        found.sort();
        collected.extend(found);
    }

    Ok(collected)
}
