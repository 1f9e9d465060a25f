//! Output formatting and display utilities for MRFSAT CLI

use mrfsat_core::Label;
use mrfsat_ml::{Evaluation, InstanceOutcome};
use owo_colors::{AnsiColors, OwoColorize, Stream};
use serde::Serialize;
use std::path::Path;

use crate::{Args, OutputFormat};

/// One instance's result as printed in JSON mode
#[derive(Debug, Serialize)]
struct PredictionReport<'a> {
    file: String,
    #[serde(flatten)]
    outcome: &'a InstanceOutcome,
}

/// Tally of a prediction batch
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BatchSummary {
    pub(crate) sat: usize,
    pub(crate) unsat: usize,
    pub(crate) skipped: usize,
}

impl BatchSummary {
    pub(crate) fn record(&mut self, outcome: &InstanceOutcome) {
        match outcome.label() {
            Some(Label::Sat) => self.sat += 1,
            Some(Label::Unsat) => self.unsat += 1,
            None => self.skipped += 1,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.sat + self.unsat + self.skipped
    }
}

/// Print one instance's outcome
pub(crate) fn print_outcome(args: &Args, format: OutputFormat, file: &Path, outcome: &InstanceOutcome) {
    match format {
        OutputFormat::Json => {
            let report = PredictionReport {
                file: file.display().to_string(),
                outcome,
            };
            match serde_json::to_string(&report) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln_colored(args, &format!("Failed to encode result: {}", e)),
            }
        }
        OutputFormat::Text => match outcome {
            InstanceOutcome::Predicted { label } => {
                let color = match label {
                    Label::Sat => AnsiColors::Green,
                    Label::Unsat => AnsiColors::Red,
                };
                println_colored(
                    args,
                    &format!("Prediction on {}: {}", file.display(), label.as_str()),
                    Some(color),
                );
            }
            InstanceOutcome::Skipped { reason } => {
                println_colored(
                    args,
                    &format!("Skipped {}: {}", file.display(), reason),
                    Some(AnsiColors::Yellow),
                );
            }
        },
    }
}

/// Print the batch tally
pub(crate) fn print_summary(args: &Args, summary: &BatchSummary) {
    println_colored(
        args,
        &format!(
            "Processed {} instance(s): {} SAT, {} UNSAT, {} skipped",
            summary.total(),
            summary.sat,
            summary.unsat,
            summary.skipped
        ),
        Some(AnsiColors::Cyan),
    );
}

/// Print holdout metrics
pub(crate) fn print_evaluation(args: &Args, eval: &Evaluation) {
    println_colored(args, "Holdout evaluation:", Some(AnsiColors::Yellow));
    println!("  rows:      {}", eval.total());
    println!("  accuracy:  {:.4}", eval.accuracy());
    println!("  SAT   -> SAT: {:>6}   SAT   -> UNSAT: {:>6}", eval.true_sat, eval.false_unsat);
    println!("  UNSAT -> SAT: {:>6}   UNSAT -> UNSAT: {:>6}", eval.false_sat, eval.true_unsat);
}

/// Print colored text to stdout
pub(crate) fn println_colored(args: &Args, text: &str, color: Option<AnsiColors>) {
    if args.no_color {
        println!("{}", text);
    } else if let Some(c) = color {
        println!("{}", text.if_supports_color(Stream::Stdout, |t| t.color(c)));
    } else {
        println!("{}", text);
    }
}

/// Print colored error message to stderr
pub(crate) fn eprintln_colored(args: &Args, text: &str) {
    if args.no_color {
        eprintln!("{}", text);
    } else {
        eprintln!("{}", text.if_supports_color(Stream::Stderr, |t| t.red()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrfsat_ml::SkipReason;

    #[test]
    fn test_batch_summary() {
        let mut summary = BatchSummary::default();
        summary.record(&InstanceOutcome::Predicted { label: Label::Sat });
        summary.record(&InstanceOutcome::Predicted { label: Label::Unsat });
        summary.record(&InstanceOutcome::Skipped {
            reason: SkipReason::Analyzer("exit 1".to_string()),
        });
        assert_eq!(summary.total(), 3);
        assert_eq!((summary.sat, summary.unsat, summary.skipped), (1, 1, 1));
    }

    #[test]
    fn test_json_report_shape() {
        let outcome = InstanceOutcome::Skipped {
            reason: SkipReason::Malformed("bad".to_string()),
        };
        let report = PredictionReport {
            file: "a.opb".to_string(),
            outcome: &outcome,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"file":"a.opb","status":"skipped","reason":{"kind":"malformed","detail":"bad"}}"#
        );
    }
}
