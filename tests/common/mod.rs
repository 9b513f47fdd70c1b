#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use ap_core::Config;
use ap_engine::Transcoder;
use ap_server::context::AppContext;
use ap_server::router::build_router;

/// Engine script that prints its arguments, one per line, to stdout.
pub const ECHO_ARGS: &str = r#"printf '%s\n' "$@""#;

/// Engine script that emits a fixed payload on stdout.
pub const EMIT_PAYLOAD: &str = "printf 'transcoded-bytes'";

/// Engine script that fails with a diagnostic on stderr.
pub const FAIL: &str = "echo 'demuxer choked' >&2; exit 1";

/// A running server instance backed by a fake engine script.
pub struct TestHarness {
    pub addr: SocketAddr,
    marker: PathBuf,
    _dir: TempDir,
}

impl TestHarness {
    pub async fn start(script: &str) -> Self {
        Self::start_with_config(script, Config::default()).await
    }

    pub async fn start_with_config(script: &str, config: Config) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let marker = dir.path().join("engine-ran");
        let engine = dir.path().join("engine");

        let body = format!("#!/bin/sh\ntouch {}\n{script}\n", marker.display());
        std::fs::write(&engine, body).expect("write fake engine");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755))
                .expect("mark engine executable");
        }

        let transcoder = Transcoder::new(&engine).verbose(config.verbose);
        let ctx = AppContext {
            config: Arc::new(config),
            transcoder: Arc::new(transcoder),
        };
        let app = build_router(ctx);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            addr,
            marker,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Whether the fake engine was ever invoked.
    pub fn engine_ran(&self) -> bool {
        self.marker.exists()
    }
}
