use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use phantom_core::artifact::RecentVideoResolver;
use phantom_core::catalog::Catalog;
use phantom_core::generation::{CommandBuilder, JobResult, JobRunner, JobSlot};
use phantom_core::selection::SelectionStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The operator session: selection, job guard and last outcome.
    pub session: Arc<Session>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let session = Session::from_config(&config);
        Self {
            config: Arc::new(config),
            session: Arc::new(session),
        }
    }
}

/// Per-process studio session.
///
/// Owns everything the operator interacts with between requests. One
/// session exists per server process.
pub struct Session {
    /// Images discovered at startup.
    pub catalog: Catalog,
    /// Current reference selection.
    pub selection: Mutex<SelectionStore>,
    /// Admits one generation job at a time.
    pub slot: JobSlot,
    pub runner: Arc<JobRunner>,
    pub builder: CommandBuilder,
    /// Outcome of the most recent finished job.
    pub last_result: Mutex<Option<JobResult>>,
    /// Where uploaded reference images are stored.
    pub upload_dir: PathBuf,
    /// Telemetry log written by the background sampler.
    pub telemetry_log: PathBuf,
}

impl Session {
    /// Scan the catalog and seed the selection with the configured
    /// pre-selected images.
    pub fn from_config(config: &ServerConfig) -> Self {
        let catalog = Catalog::scan(&config.catalog_dir);
        let defaults = catalog.preselection(&config.preselected[..]);
        let selection = SelectionStore::with_defaults(defaults);
        let resolver = Arc::new(RecentVideoResolver::new(&config.work_dir));
        let runner = JobRunner::new(&config.work_dir, &config.generation_log, resolver);
        // Uploaded references are handed to a child running in the work dir.
        let upload_dir = std::path::absolute(&config.upload_dir)
            .unwrap_or_else(|_| config.upload_dir.clone());

        Self {
            catalog,
            selection: Mutex::new(selection),
            slot: JobSlot::new(),
            runner: Arc::new(runner),
            builder: CommandBuilder::new(
                &config.launcher,
                &config.generate_script,
                &config.task,
            ),
            last_result: Mutex::new(None),
            upload_dir,
            telemetry_log: config.telemetry.log_path.clone(),
        }
    }
}
