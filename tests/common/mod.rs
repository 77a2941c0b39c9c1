//! Shared test harness for integration tests.
//!
//! Provides [`TestServices`], a mock render and suggestion backend on a random
//! port with a [`ServicesConfig`] pointing at it, plus a scratch directory for
//! source files.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use trimline::config::ServicesConfig;
use wiremock::MockServer;

pub const RENDER_PATH: &str = "/export/from-file";
pub const SUGGEST_PATH: &str = "/ai/suggest-cuts-from-sprites";

/// Mock services plus a scratch directory.
pub struct TestServices {
    pub server: MockServer,
    pub config: ServicesConfig,
    pub dir: TempDir,
}

impl TestServices {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = ServicesConfig {
            render_url: format!("{}{}", server.uri(), RENDER_PATH),
            suggest_url: format!("{}{}", server.uri(), SUGGEST_PATH),
            timeout_secs: 5,
        };
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        Self {
            server,
            config,
            dir,
        }
    }

    /// Write a small fake source file and return its path.
    pub fn source_file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"\x00\x00\x00\x18ftypmp42fake-media").expect("failed to write source");
        path
    }
}

/// Services config whose endpoints refuse connections.
pub fn unreachable_services() -> ServicesConfig {
    ServicesConfig {
        render_url: "http://127.0.0.1:9/export/from-file".to_string(),
        suggest_url: "http://127.0.0.1:9/ai/suggest-cuts-from-sprites".to_string(),
        timeout_secs: 2,
    }
}
