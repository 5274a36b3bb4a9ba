// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Fixed queue key so runs inside one test share the queue.
pub const TEST_KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

const TEST_CONFIG: &str = r#"
[api]
base_url = "http://127.0.0.1:9"

[[routes]]
method = "POST"
path = "/api/v1/orders"

[[routes]]
method = "DELETE"
path = "/api/v1/orders/{id}"
"#;

/// Isolated config and state for one test.
pub struct Env {
    pub temp: TempDir,
}

impl Env {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), TEST_CONFIG).unwrap();
        Env { temp }
    }

    pub fn config(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    pub fn state(&self) -> PathBuf {
        self.temp.path().join("state")
    }

    pub fn queue_file(&self) -> PathBuf {
        self.state().join("offline_queue.json")
    }

    /// `outbox` pinned offline against this env.
    pub fn outbox(&self) -> Command {
        self.outbox_with_config(&self.config())
    }

    pub fn outbox_with_config(&self, config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("outbox");
        cmd.env("OUTBOX_STATE_DIR", self.state())
            .env("OUTBOX_QUEUE_KEY", TEST_KEY)
            .env_remove("OUTBOX_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--offline")
            .arg("--config")
            .arg(config);
        cmd
    }

    /// Queues a POST to `url` and asserts it was accepted.
    pub fn queue_post(&self, url: &str, body: &str) {
        self.outbox()
            .args(["send", "POST", url, "--body", body])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("queued POST"));
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
