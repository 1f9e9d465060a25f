//! Integration tests for mrfsat CLI

use mrfsat_core::Label;
use mrfsat_ml::{Classifier, ForestConfig, RandomForest};
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the mrfsat binary
fn mrfsat_bin() -> PathBuf {
    let mut path = env::current_exe().expect("Failed to get current executable path");
    path.pop(); // Remove test executable name
    if path.ends_with("deps") {
        path.pop(); // Remove deps directory
    }
    path.push("mrfsat");
    path
}

/// Run mrfsat with an isolated home so no user config is picked up
fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(mrfsat_bin())
        .args(args)
        .arg("--no-color")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .output()
        .expect("Failed to execute mrfsat")
}

/// Forest over (average_freedom, std_dev_freedom, ratio): SAT iff ratio > 0.5
fn write_legacy_model(dir: &Path) -> PathBuf {
    let x: Vec<Vec<f64>> = (1..50)
        .map(|i| vec![0.5, 0.1, f64::from(i) / 50.0])
        .collect();
    let y: Vec<Label> = x.iter().map(|r| Label::from(r[2] > 0.5)).collect();
    let mut forest = RandomForest::new(3, ForestConfig::default().with_trees(15).with_seed(1));
    forest.fit(&x, &y).unwrap();

    let path = dir.join("model.json");
    fs::write(&path, forest.save().unwrap()).unwrap();
    path
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mrfsat"));
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("predict"));
    assert!(stdout.contains("prepare"));
    assert!(stdout.contains("train"));
}

#[test]
fn test_predict_requires_input() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["predict", "--model", "m.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_predict_without_model_fails() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["predict", "-f", "x.opb"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no model given"));
}

#[test]
fn test_predict_with_missing_model_file_fails() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("absent.json");
    let output = run(
        home.path(),
        &["predict", "-f", "x.opb", "--model", missing.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load model"));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Analyzer stub: echoes the instance file, fails on files containing "fail"
    fn write_analyzer(dir: &Path) -> PathBuf {
        let path = dir.join("analyzer.sh");
        fs::write(
            &path,
            "#!/bin/sh\nif grep -q fail \"$1\"; then echo boom >&2; exit 3; fi\ncat \"$1\"\n",
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn instance_dir(root: &Path) -> PathBuf {
        let dir = root.join("instances");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a_sat.opb"), "a_sat.opb,9,10,40,20,0.5,0.1,\n").unwrap();
        fs::write(dir.join("b_unsat.opb"), "b_unsat.opb,1,10,40,20,0.5,0.1,\n").unwrap();
        fs::write(dir.join("c_degenerate.opb"), "c.opb,0,0,40,20,0.5,0.1,\n").unwrap();
        fs::write(dir.join("d_fail.opb"), "fail\n").unwrap();
        dir
    }

    #[test]
    fn test_predict_directory_batch() {
        let home = TempDir::new().unwrap();
        let model = write_legacy_model(home.path());
        let analyzer = write_analyzer(home.path());
        let dir = instance_dir(home.path());

        let output = run(
            home.path(),
            &[
                "predict",
                "-d",
                dir.to_str().unwrap(),
                "--model",
                model.to_str().unwrap(),
                "--analyzer",
                analyzer.to_str().unwrap(),
                "--schema",
                "legacy",
            ],
        );
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Prediction on") && lines[0].ends_with(": SAT"));
        assert!(lines[1].contains("Prediction on") && lines[1].ends_with(": UNSAT"));
        assert!(lines[2].starts_with("Skipped") && lines[2].contains("degenerate"));
        assert!(lines[3].starts_with("Skipped") && lines[3].contains("analyzer failed"));
    }

    #[test]
    fn test_predict_json_and_zero_fill() {
        let home = TempDir::new().unwrap();
        let model = write_legacy_model(home.path());
        let analyzer = write_analyzer(home.path());
        let dir = instance_dir(home.path());
        let degenerate = dir.join("c_degenerate.opb");

        let output = run(
            home.path(),
            &[
                "predict",
                "-f",
                degenerate.to_str().unwrap(),
                "--model",
                model.to_str().unwrap(),
                "--analyzer",
                analyzer.to_str().unwrap(),
                "--schema",
                "legacy",
                "--zero-fill",
                "--format",
                "json",
            ],
        );
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
        assert_eq!(value["status"], "predicted");
        assert_eq!(value["label"], "Unsat");
    }

    #[test]
    fn test_config_file_supplies_defaults() {
        let home = TempDir::new().unwrap();
        let model = write_legacy_model(home.path());
        let analyzer = write_analyzer(home.path());
        let dir = instance_dir(home.path());
        fs::write(
            home.path().join(".mrfsatrc"),
            format!(
                "model: {}\nanalyzer: {}\nschema: legacy\n",
                model.display(),
                analyzer.display()
            ),
        )
        .unwrap();

        let instance = dir.join("a_sat.opb");
        let output = run(home.path(), &["predict", "-f", instance.to_str().unwrap()]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert!(String::from_utf8_lossy(&output.stdout).trim_end().ends_with(": SAT"));
    }
}

fn write_training_inputs(dir: &Path) -> [PathBuf; 5] {
    let mut export = String::new();
    let mut baseline = String::from("name,is_sat\n");
    let mut dec_opt = String::from("name,dec_opt\n");
    let mut family = String::from("name,family\n");
    for i in 0..40 {
        let sat = i % 2 == 0;
        let clusters = if sat { 8 } else { 2 };
        writeln!(export, "inst{i}.opb,{clusters},10,{},{},0.{},0.1,", 100 + i, 30 + i, i % 9).unwrap();
        writeln!(baseline, "inst{i}.opb,{}", i32::from(sat)).unwrap();
        writeln!(dec_opt, "inst{i}.opb,DEC").unwrap();
        writeln!(family, "inst{i}.opb,fam").unwrap();
    }

    let write = |name: &str, contents: &str| {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    };
    [
        write("export.csv", &export),
        write("baseline.csv", &baseline),
        write("dec_opt.csv", &dec_opt),
        write("family.csv", &family),
        write("pipeline.yaml", "balance: null\n"),
    ]
}

#[test]
fn test_prepare_then_train() {
    let home = TempDir::new().unwrap();
    let [export, baseline, dec_opt, family, config] = write_training_inputs(home.path());
    let prepared = home.path().join("prepared.csv");
    let model = home.path().join("model.json");

    let output = run(
        home.path(),
        &[
            "prepare",
            "--export",
            export.to_str().unwrap(),
            "--baseline",
            baseline.to_str().unwrap(),
            "--dec-opt",
            dec_opt.to_str().unwrap(),
            "--family",
            family.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--output",
            prepared.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Wrote 40 row(s)"));

    let output = run(
        home.path(),
        &[
            "train",
            "--dataset",
            prepared.to_str().unwrap(),
            "--output",
            model.to_str().unwrap(),
            "--trees",
            "10",
            "--seed",
            "4",
            "--test-fraction",
            "0.25",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Trained 10 tree(s) on 30 row(s)"));
    assert!(stdout.contains("accuracy"));

    let forest = RandomForest::from_bytes(&fs::read(&model).unwrap()).unwrap();
    assert_eq!(forest.input_dim(), 4);
}
