#![allow(dead_code)]

//! Common test utilities for CLI integration tests.
//!
//! HTTP fragments are served by a wiremock `MockServer`; local pages are
//! written into a temporary directory.

pub mod fixtures;

use std::path::PathBuf;

use quizdeck_cli::config::Config;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve `body` at `route`, only for requests that bypass caches.
pub async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("cache-control", "no-store"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Answer `route` with a bare status code.
pub async fn fail(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Directory of local quiz files.
pub struct Site {
    dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Write `contents` to `name` inside the site and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create site dir");
        }
        std::fs::write(&path, contents).expect("Failed to write site file");
        path
    }
}

/// Configuration with defaults and nothing read from the environment.
pub fn config() -> Config {
    Config::default()
}
