//! `mrfsat prepare`: build a training dataset from analyzer exports

use anyhow::{Context, Result};
use owo_colors::AnsiColors;

use mrfsat_dataset::{
    PipelineConfig, PreparationPipeline, ReferenceTables, load_feature_export, load_mrfsat_export,
};

use crate::format::println_colored;
use crate::{Args, PrepareArgs, Verbosity};

pub(crate) fn run_prepare(args: &Args, prepare: &PrepareArgs, verbosity: Verbosity) -> Result<()> {
    let mut config = match prepare.config {
        Some(ref path) => PipelineConfig::load(path)
            .with_context(|| format!("cannot read pipeline config '{}'", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = prepare.seed {
        config = config.with_seed(seed);
    }

    let tables = ReferenceTables::load(&prepare.baseline, &prepare.dec_opt, &prepare.family)
        .context("cannot load reference tables")?;
    let export = load_mrfsat_export(&prepare.export)
        .with_context(|| format!("cannot load export '{}'", prepare.export.display()))?;
    let pipeline = PreparationPipeline::new(config, tables);

    let (dataset, balance) = match prepare.secondary {
        Some(ref secondary) => {
            let features = load_feature_export(secondary)
                .with_context(|| format!("cannot load feature export '{}'", secondary.display()))?;
            let aligned = pipeline.prepare_aligned(export, features)?;
            if let Some(ref out) = prepare.secondary_output {
                aligned
                    .secondary
                    .write_csv(out)
                    .with_context(|| format!("cannot write '{}'", out.display()))?;
            }
            (aligned.primary, aligned.balance)
        }
        None => {
            let prepared = pipeline.run(export)?;
            (prepared.dataset, prepared.balance)
        }
    };

    dataset
        .write_csv(&prepare.output)
        .with_context(|| format!("cannot write '{}'", prepare.output.display()))?;

    if verbosity >= Verbosity::Normal {
        println_colored(
            args,
            &format!(
                "Wrote {} row(s) to {}",
                dataset.len(),
                prepare.output.display()
            ),
            Some(AnsiColors::Green),
        );
        if let Some(summary) = balance
            && verbosity >= Verbosity::Verbose
        {
            println!(
                "  strata: {}, kept: {}, dropped: {}, unstratified: {}",
                summary.strata, summary.kept, summary.dropped, summary.unstratified
            );
        }
    }
    Ok(())
}
