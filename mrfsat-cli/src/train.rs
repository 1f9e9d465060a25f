//! `mrfsat train`: fit a random forest on a prepared dataset

use anyhow::{Context, Result, bail};
use owo_colors::AnsiColors;
use std::fs;

use mrfsat_dataset::{TRAINING_FEATURES, load_prepared_dataset};
use mrfsat_ml::training::sanitize_matrix;
use mrfsat_ml::{Classifier, ForestConfig, RandomForest, TreeConfig, evaluate, holdout_split};

use crate::format::{print_evaluation, println_colored};
use crate::{Args, TrainArgs, Verbosity};

pub(crate) fn run_train(args: &Args, train: &TrainArgs, verbosity: Verbosity) -> Result<()> {
    let dataset = load_prepared_dataset(&train.dataset)
        .with_context(|| format!("cannot load dataset '{}'", train.dataset.display()))?;

    let features: Vec<String> = if train.features.is_empty() {
        TRAINING_FEATURES.iter().map(|f| f.to_string()).collect()
    } else {
        train.features.clone()
    };
    let mut matrix = dataset.to_matrix(&features)?;
    if matrix.x.is_empty() {
        bail!("no usable rows in '{}'", train.dataset.display());
    }
    sanitize_matrix(&mut matrix.x);

    let split = holdout_split(&matrix.x, &matrix.y, train.test_fraction, train.seed)?;
    let config = ForestConfig {
        n_trees: train.trees,
        tree: TreeConfig {
            max_depth: train.max_depth,
            ..TreeConfig::default()
        },
        standardize: train.standardize,
        seed: train.seed,
        ..ForestConfig::default()
    };

    let mut forest = RandomForest::new(features.len(), config);
    forest.fit(&split.train_x, &split.train_y)?;

    if verbosity >= Verbosity::Normal {
        println_colored(
            args,
            &format!(
                "Trained {} tree(s) on {} row(s) ({} skipped) with features: {}",
                forest.num_trees(),
                split.train_x.len(),
                matrix.skipped,
                features.join(",")
            ),
            Some(AnsiColors::Green),
        );
        if !split.test_x.is_empty() {
            let eval = evaluate(&forest, &split.test_x, &split.test_y);
            print_evaluation(args, &eval);
        }
    }

    fs::write(&train.output, forest.save()?)
        .with_context(|| format!("cannot write model '{}'", train.output.display()))?;
    Ok(())
}
