//! Shared test utilities for litrank-cli integration tests.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

/// A `litrank` command isolated to `dir`.
///
/// Data goes to `dir/data` and the config file is `dir/config.yaml`, so the
/// user's `~/.litrank` is never read. Colors are off.
#[allow(deprecated)]
pub fn litrank_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("litrank").expect("litrank binary should exist");
    cmd.env("LITRANK_DATA_DIR", dir.join("data"))
        .env("LITRANK_CONFIG", dir.join("config.yaml"))
        .env("NO_COLOR", "1")
        .env_remove("LITRANK_VERBOSE")
        .env_remove("LITRANK_COLOR");
    cmd
}

/// Run `litrank` with `args` and assert success.
pub fn run_ok(dir: &Path, args: &[&str]) {
    litrank_cmd(dir).args(args).assert().success();
}

/// Run `litrank` with `args` and parse stdout as JSON.
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = litrank_cmd(dir)
        .args(args)
        .output()
        .expect("run litrank");
    assert!(
        output.status.success(),
        "litrank {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Seed three retrieval methods, one benchmark and scores on it.
pub fn seed_retrieval(dir: &Path) {
    run_ok(
        dir,
        &["entity", "add", "colbert", "ColBERT", "-f", "year=2020", "-f", "task=RAG retrieval"],
    );
    run_ok(
        dir,
        &["entity", "add", "splade", "SPLADE", "-f", "task=RAG retrieval"],
    );
    run_ok(dir, &["entity", "add", "bm25", "BM25", "-f", "task=sparse"]);
    run_ok(dir, &["entity", "add", "beir", "BEIR", "--type", "benchmark"]);
    run_ok(dir, &["score", "colbert", "beir", "ndcg", "0.85"]);
    run_ok(dir, &["score", "splade", "beir", "ndcg", "0.9"]);
    run_ok(dir, &["score", "bm25", "beir", "ndcg", "0.4"]);
}
