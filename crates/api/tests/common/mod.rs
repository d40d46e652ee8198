#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use phantom_agent::sampler::SamplerConfig;
use phantom_api::config::ServerConfig;
use phantom_api::router::build_app_router;
use phantom_api::state::AppState;

/// Catalog images created for every test studio.
pub const CATALOG_IMAGES: &[&str] = &["ref14.png", "ref15.png", "ref16.png", "ref20.png"];

/// A self-contained studio rooted in a temporary directory.
pub struct TestStudio {
    pub dir: TempDir,
    pub config: ServerConfig,
    pub state: AppState,
}

impl TestStudio {
    /// Studio whose launcher is the real default; fine for tests that never
    /// reach a successful launch.
    pub fn new() -> Self {
        Self::with_launcher(None)
    }

    /// Studio whose launcher is a shell script with the given body.
    ///
    /// The script runs in the work directory and receives the generator
    /// arguments as `$@`.
    pub fn with_launcher_script(body: &str) -> Self {
        Self::with_launcher(Some(body))
    }

    fn with_launcher(script: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path();

        let catalog_dir = root.join("catalog");
        std::fs::create_dir_all(&catalog_dir).expect("catalog dir");
        for name in CATALOG_IMAGES {
            std::fs::write(catalog_dir.join(name), b"png").expect("catalog image");
        }

        let work_dir = root.join("work");
        std::fs::create_dir_all(&work_dir).expect("work dir");

        let launcher = match script {
            Some(body) => write_script(root, "fake-launcher", body)
                .to_string_lossy()
                .into_owned(),
            None => "torchrun".to_string(),
        };

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 5,
            work_dir,
            generation_log: root.join("generation_log.txt"),
            catalog_dir,
            preselected: vec![
                "ref14.png".to_string(),
                "ref15.png".to_string(),
                "ref16.png".to_string(),
            ],
            upload_dir: root.join("uploads"),
            launcher,
            generate_script: "generate.py".to_string(),
            task: "s2v-14B".to_string(),
            telemetry: SamplerConfig {
                log_path: root.join("rocm_smi.txt"),
                ..SamplerConfig::default()
            },
        };

        let state = AppState::new(config.clone());
        Self { dir, config, state }
    }

    /// Edit the configuration and rebuild the session from it.
    pub fn reconfigure(mut self, edit: impl FnOnce(&mut ServerConfig)) -> Self {
        edit(&mut self.config);
        self.state = AppState::new(self.config.clone());
        self
    }

    pub fn app(&self) -> Router {
        build_app_router(self.state.clone(), &self.config)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn catalog_ref(&self, name: &str) -> String {
        self.config
            .catalog_dir
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

/// Write an executable shell script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

/// `path` expressed relative to the current directory.
pub fn relative_to_cwd(path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().expect("cwd");
    let mut relative = PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.push(path.strip_prefix("/").expect("absolute path"));
    relative
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Selected references from a `{ data: { selected } }` body.
pub fn selected(json: &serde_json::Value) -> Vec<String> {
    json["data"]["selected"]
        .as_array()
        .expect("selected array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect()
}
