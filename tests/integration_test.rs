//! Integration tests for the complete analysis pipeline.

use std::fs;
use std::path::PathBuf;

use det_analysis::config::{EvalConfig, RunOptions};
use det_analysis::matching::{ClassTally, MatchOrder};
use det_analysis::run::run;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("det_analysis_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn fixture_options(out_dir: &PathBuf) -> RunOptions {
    let mut options = RunOptions::new(fixtures_dir().join("gt.json"), fixtures_dir().join("dets"));
    options.output = out_dir.join("report.txt");
    options
}

#[test]
fn test_fixture_run_counts() {
    let out_dir = scratch_dir("counts");
    let (report, stats) = run(&fixture_options(&out_dir)).unwrap();

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.row(1).unwrap().tally(), ClassTally::new(1, 1, 1));
    assert_eq!(report.row(2).unwrap().tally(), ClassTally::new(2, 1, 0));
    assert_eq!(report.row(3).unwrap().tally(), ClassTally::new(0, 0, 1));

    let car = report.row(2).unwrap();
    assert!((car.precision - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(car.recall, 1.0);

    assert_eq!(stats.images_processed, 3);
    assert_eq!(stats.missing_detection_files, 1);
    assert_eq!(stats.detections_loaded, 6);
    assert_eq!(stats.below_score_threshold, 1);

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn test_fixture_report_file() {
    let out_dir = scratch_dir("report_file");
    let mut options = fixture_options(&out_dir);
    options.json_output = Some(out_dir.join("report.json"));

    run(&options).unwrap();

    let text = fs::read_to_string(out_dir.join("report.txt")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Detection Analysis Report (IoU Thr: 0.5, Score Thr: 0.3)");
    assert!(lines[4].starts_with("person          | 1     | 1     | 1     | 0.5000"));
    assert!(lines[5].starts_with("car             | 2     | 1     | 0     | 0.6667"));
    assert!(lines[6].starts_with("dog             | 0     | 0     | 1     | 0.0000"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(json["rows"][1]["name"], "car");
    assert_eq!(json["rows"][1]["true_positives"], 2);

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn test_lower_score_threshold_admits_more_detections() {
    let out_dir = scratch_dir("low_score");
    let mut options = fixture_options(&out_dir);
    options.eval = EvalConfig::new().with_score_threshold(0.05);

    let (report, stats) = run(&options).unwrap();

    // The 0.1-score person now matches the second person box.
    assert_eq!(report.row(1).unwrap().tally(), ClassTally::new(2, 1, 0));
    assert_eq!(stats.below_score_threshold, 0);

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn test_strict_iou_threshold() {
    let out_dir = scratch_dir("strict_iou");
    let mut options = fixture_options(&out_dir);
    options.eval = EvalConfig::new()
        .with_iou_threshold(0.95)
        .with_match_order(MatchOrder::ScoreDescending);

    let (report, _) = run(&options).unwrap();

    // The car in a.jpg overlaps with IoU ~0.93 and no longer counts.
    assert_eq!(report.row(2).unwrap().tally(), ClassTally::new(1, 2, 1));

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn test_visualization_without_source_images() {
    let out_dir = scratch_dir("vis_missing");
    let mut options = fixture_options(&out_dir);
    options.image_dir = Some(out_dir.join("no_images_here"));
    options.vis_dir = Some(out_dir.join("vis"));

    let (_, stats) = run(&options).unwrap();
    assert_eq!(stats.visualizations_saved, 0);
    assert_eq!(stats.visualizations_failed, 0);

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn test_visualization_writes_images() {
    let out_dir = scratch_dir("vis_written");
    let img_dir = out_dir.join("images");
    fs::create_dir_all(&img_dir).unwrap();
    image::RgbImage::new(400, 400).save(img_dir.join("a.jpg")).unwrap();

    let mut options = fixture_options(&out_dir);
    options.image_dir = Some(img_dir);
    options.vis_dir = Some(out_dir.join("vis"));

    let (_, stats) = run(&options).unwrap();
    assert_eq!(stats.visualizations_saved, 1);
    assert!(out_dir.join("vis").join("a_vis.jpg").exists());

    let _ = fs::remove_dir_all(&out_dir);
}

#[test]
fn test_invalid_config_fails_before_loading() {
    let mut options = RunOptions::new("/path/that/does/not/exist.json", "/nowhere");
    options.eval = EvalConfig::new().with_iou_threshold(1.5);

    let err = run(&options).unwrap_err();
    assert!(err.to_string().contains("Invalid threshold"));
}

#[test]
fn test_cli_reports_failure_once() {
    let out_dir = scratch_dir("cli_failure");
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_det-analyze"))
        .arg("--gt")
        .arg(out_dir.join("missing_gt.json"))
        .arg("--det-dir")
        .arg(fixtures_dir().join("dets"))
        .arg("--output")
        .arg(out_dir.join("report.txt"))
        .env("RUST_LOG", "error")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("IO error").count(), 1, "stderr: {stderr}");
    // No second copy from returning the error out of main.
    assert!(!stderr.contains("Error: "), "stderr: {stderr}");
    assert!(!out_dir.join("report.txt").exists());
}
