use std::path::PathBuf;

use phantom_agent::sampler::SamplerConfig;
use phantom_core::catalog::DEFAULT_PRESELECTED;
use phantom_core::generation::command::{DEFAULT_GENERATE_SCRIPT, DEFAULT_LAUNCHER, DEFAULT_TASK};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults matching a single-node studio launched from
/// the generator's checkout directory.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `7860`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Not applied to job launches.
    pub request_timeout_secs: u64,
    /// Bound on background task shutdown in seconds (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// Working directory of generation jobs and root of artifact search.
    pub work_dir: PathBuf,
    /// Append-only generation log, cleared at startup.
    pub generation_log: PathBuf,
    /// Directory scanned for catalog images.
    pub catalog_dir: PathBuf,
    /// File names (relative to `catalog_dir`) selected when a session starts.
    pub preselected: Vec<String>,
    /// Directory receiving uploaded reference images.
    pub upload_dir: PathBuf,
    /// Distributed launcher executable.
    pub launcher: String,
    /// Generator entry script passed to the launcher.
    pub generate_script: String,
    /// Generator task identifier.
    pub task: String,
    /// GPU telemetry sampler settings.
    pub telemetry: SamplerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                         |
    /// |-------------------------|---------------------------------|
    /// | `HOST`                  | `0.0.0.0`                       |
    /// | `PORT`                  | `7860`                          |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                            |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                            |
    /// | `WORK_DIR`              | `.`                             |
    /// | `GENERATION_LOG`        | `generation_log.txt`            |
    /// | `CATALOG_DIR`           | `examples`                      |
    /// | `PRESELECTED_IMAGES`    | `ref14.png,ref15.png,ref16.png` |
    /// | `UPLOAD_DIR`            | `uploads`                       |
    /// | `LAUNCHER`              | `torchrun`                      |
    /// | `GENERATE_SCRIPT`       | `generate.py`                   |
    /// | `GENERATION_TASK`       | `s2v-14B`                       |
    ///
    /// Telemetry settings are read by [`SamplerConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "7860".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let preselected = std::env::var("PRESELECTED_IMAGES")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| DEFAULT_PRESELECTED.iter().map(|s| s.to_string()).collect());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            work_dir: env_path("WORK_DIR", "."),
            generation_log: env_path("GENERATION_LOG", "generation_log.txt"),
            catalog_dir: env_path("CATALOG_DIR", "examples"),
            preselected,
            upload_dir: env_path("UPLOAD_DIR", "uploads"),
            launcher: std::env::var("LAUNCHER").unwrap_or_else(|_| DEFAULT_LAUNCHER.into()),
            generate_script: std::env::var("GENERATE_SCRIPT")
                .unwrap_or_else(|_| DEFAULT_GENERATE_SCRIPT.into()),
            task: std::env::var("GENERATION_TASK").unwrap_or_else(|_| DEFAULT_TASK.into()),
            telemetry: SamplerConfig::from_env(),
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
