use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const CATALOG: &str = r#"{
  "a": [
    {"index": 0, "cost": 10, "item": "silver ewer"},
    {"index": 1, "cost": "25 gp", "item": "jade figurine"},
    {"index": 2, "cost": 50, "item": "gold circlet"}
  ],
  "c": [
    {"cost": 30, "item": "potion of cure light wounds"},
    {"cost": 300, "item": "wand of magic missile"}
  ]
}"#;

fn hoard() -> Command {
    let mut cmd = Command::cargo_bin("hoard").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn catalog_in(dir: &Path) -> PathBuf {
    let p = dir.join("catalog.json");
    fs::write(&p, CATALOG).unwrap();
    p
}

fn read_json(p: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(p).unwrap()).unwrap()
}

#[test]
fn list_presets_prints_codes() {
    hoard()
        .arg("--list-presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("dragon").and(predicate::str::contains("abchi")));
}

#[test]
fn explicit_run_writes_artifacts_and_prints_picks() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    let out = dir.path().join("out");

    hoard()
        .args(["--catalog", catalog.to_str().unwrap(), "--budget", "200 gp", "--types", "ac", "--seed", "7"])
        .args(["--out", out.to_str().unwrap(), "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  1. [").and(predicate::str::contains("spent ")));

    let result = read_json(&out.join("result.json"));
    assert!(result["id"].as_str().unwrap().starts_with("RES:"));
    let picks = result["picks"].as_array().unwrap();
    assert!(!picks.is_empty());

    let record = read_json(&out.join("run_record.json"));
    assert_eq!(record["rng"]["seed"], 7);
    assert_eq!(record["outputs"]["result_id"], result["id"]);
    assert_eq!(record["inputs"]["selection"], "ac");

    let request = read_json(&out.join("generate_request.json"));
    assert_eq!(request["mode"], "hoard_generate");
    let requested: u64 = ["a", "c"]
        .iter()
        .filter_map(|k| request[*k].as_array())
        .flatten()
        .map(|e| e["count"].as_u64().unwrap())
        .sum();
    assert_eq!(requested, picks.len() as u64);
}

#[test]
fn same_seed_same_result() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    let run = |out: &Path| {
        hoard()
            .args(["--catalog", catalog.to_str().unwrap(), "--budget", "500", "--preset", "dragon"])
            .args(["--seed", "0x2a", "--weighting", "fibonacci", "--quiet", "--out", out.to_str().unwrap()])
            .assert()
            .success();
        fs::read_to_string(out.join("result.json")).unwrap()
    };
    assert_eq!(run(&dir.path().join("one")), run(&dir.path().join("two")));
}

#[test]
fn empty_selection_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    hoard()
        .args(["--catalog", catalog.to_str().unwrap(), "--budget", "100", "--types", ""])
        .args(["--out", dir.path().to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no treasure category selected"));
}

#[test]
fn nothing_affordable_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    hoard()
        .args(["--catalog", catalog.to_str().unwrap(), "--budget", "5 gp", "--types", "a"])
        .args(["--out", dir.path().to_str().unwrap()])
        .assert()
        .code(3);
    assert!(!dir.path().join("result.json").exists());
}

#[test]
fn missing_catalog_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    hoard()
        .args(["--catalog", dir.path().join("nope.json").to_str().unwrap(), "--budget", "5", "--types", "a"])
        .assert()
        .code(4);
}

#[test]
fn usage_errors_exit_2() {
    hoard().args(["--catalog", "c.json", "--types", "a"]).assert().code(2);
    hoard().args(["--catalog", "c.json", "--budget", "5", "--npc-level", "3", "--types", "a"]).assert().code(2);
    hoard().args(["--manifest", "http://example.org/run.json"]).assert().code(2);
    hoard().args(["--seed", "0xZZ"]).assert().code(2);
    hoard().args(["--catalog", "c.json", "--budget", "5", "--types", "a", "--heroic"]).assert().code(2);
    hoard().args(["--catalog", "c.json", "--budget", "5", "--types", "a", "--rate", "fast"]).assert().code(2);
}

#[test]
fn out_of_table_level_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    hoard()
        .args(["--catalog", catalog.to_str().unwrap(), "--encounter-apl", "21", "--types", "a"])
        .assert()
        .code(2);
}

#[test]
fn validate_only_checks_params_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    let base = ["--catalog", catalog.to_str().unwrap(), "--budget", "100", "--types", "a", "--validate-only"];

    hoard().args(base).args(["--out", dir.path().to_str().unwrap()]).assert().success();
    assert!(!dir.path().join("result.json").exists());

    hoard()
        .args(base)
        .args(["--max-attempts", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("params.domain"));
}

#[test]
fn manifest_mode_with_digest_mismatch_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    catalog_in(dir.path());
    let manifest = dir.path().join("run.json");
    fs::write(
        &manifest,
        format!(
            r#"{{"catalog_path":"catalog.json","budget":"100 gp","preset":"fey","catalog_sha256":"{}"}}"#,
            "0".repeat(64)
        ),
    )
    .unwrap();
    hoard()
        .args(["--manifest", manifest.to_str().unwrap(), "--out", dir.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sha256 mismatch"));
}

#[test]
fn manifest_mode_runs_and_seed_flag_wins() {
    let dir = tempfile::tempdir().unwrap();
    catalog_in(dir.path());
    let manifest = dir.path().join("run.json");
    fs::write(
        &manifest,
        r#"{"catalog_path":"catalog.json","budget":"100 gp","types":"a","params":{"seed":1,"weighting":"cost"}}"#,
    )
    .unwrap();
    let out = dir.path().join("out");
    hoard()
        .args(["--manifest", manifest.to_str().unwrap(), "--seed", "99", "--out", out.to_str().unwrap()])
        .assert()
        .success();
    let record = read_json(&out.join("run_record.json"));
    assert_eq!(record["params"]["seed"], 99);
    assert_eq!(record["params"]["weighting"], "cost");
}

#[test]
fn unknown_weighting_falls_back_to_cost() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog_in(dir.path());
    hoard()
        .args(["--catalog", catalog.to_str().unwrap(), "--budget", "100", "--types", "a", "--seed", "1"])
        .args(["--weighting", "lucky", "--out", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("lucky"));
    let record = read_json(&dir.path().join("run_record.json"));
    assert_eq!(record["params"]["weighting"], "cost");
}
