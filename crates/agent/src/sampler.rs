//! Background telemetry sampling loop.
//!
//! [`TelemetrySampler::run`] polls a [`StatusProbe`] until cancelled and
//! keeps the telemetry log current for live display:
//!
//! - a successful query **overwrites** the log with a timestamp header and
//!   the captured output;
//! - a timed-out query **appends** a notice and sampling continues;
//! - any other fault appends an error notice and stops sampling for good.
//!
//! Sampling is best-effort and fully independent of generation jobs: the
//! loop never touches job state and its failure is only logged.

use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use phantom_core::logs;

use crate::probe::{
    CommandProbe, ProbeError, ProbeOutput, StatusProbe, DEFAULT_PROBE_TIMEOUT, DEFAULT_STATUS_TOOL,
};

/// Default telemetry log file.
pub const DEFAULT_TELEMETRY_LOG: &str = "rocm_smi.txt";

/// Default pause between the end of one cycle and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Timestamp format used in log headers and notices.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sampler settings, loaded from the environment.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Status tool executable (default: `rocm-smi`).
    pub tool: String,
    /// Telemetry log path (default: `rocm_smi.txt`).
    pub log_path: PathBuf,
    /// Pause between cycles (default: 1s).
    pub interval: Duration,
    /// Bound on one status query (default: 10s).
    pub probe_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_STATUS_TOOL.to_string(),
            log_path: PathBuf::from(DEFAULT_TELEMETRY_LOG),
            interval: DEFAULT_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl SamplerConfig {
    /// Load settings from environment variables with defaults.
    ///
    /// | Env Var                  | Default        |
    /// |--------------------------|----------------|
    /// | `TELEMETRY_TOOL`         | `rocm-smi`     |
    /// | `TELEMETRY_LOG`          | `rocm_smi.txt` |
    /// | `TELEMETRY_INTERVAL_MS`  | `1000`         |
    /// | `TELEMETRY_TIMEOUT_SECS` | `10`           |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let tool = std::env::var("TELEMETRY_TOOL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.tool);

        let log_path = std::env::var("TELEMETRY_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.log_path);

        let interval = std::env::var("TELEMETRY_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);

        let probe_timeout = std::env::var("TELEMETRY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.probe_timeout);

        Self {
            tool,
            log_path,
            interval,
            probe_timeout,
        }
    }
}

/// Why the sampling loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerExit {
    /// The cancellation token fired.
    Cancelled,
    /// An unexpected fault stopped sampling permanently.
    Faulted(String),
}

/// Periodic status sampler writing to a single log file.
pub struct TelemetrySampler<P> {
    probe: P,
    log_path: PathBuf,
    interval: Duration,
}

impl<P: StatusProbe> TelemetrySampler<P> {
    pub fn new(probe: P, log_path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            probe,
            log_path: log_path.into(),
            interval,
        }
    }

    /// Run the sampling loop until `cancel` fires or a fault occurs.
    ///
    /// The log is truncated once on entry. A query in flight when `cancel`
    /// fires is dropped.
    pub async fn run(self, cancel: CancellationToken) -> SamplerExit {
        tracing::info!(
            tool = self.probe.name(),
            log = %self.log_path.display(),
            interval_ms = self.interval.as_millis() as u64,
            "Telemetry sampler started",
        );

        if let Err(e) = logs::truncate(&self.log_path).await {
            return self.fault(&e.to_string()).await;
        }

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(),
                result = self.probe.probe() => result,
            };

            match result {
                Ok(output) => {
                    if let Err(e) = self.write_snapshot(&output).await {
                        return self.fault(&e.to_string()).await;
                    }
                }
                Err(ProbeError::Timeout(bound)) => {
                    tracing::warn!(
                        tool = self.probe.name(),
                        timeout_secs = bound.as_secs(),
                        "Status query timed out",
                    );
                    let notice = format!(
                        "{} command timed out at {}\n",
                        self.probe.name(),
                        now_stamp()
                    );
                    if let Err(e) = logs::append(&self.log_path, &notice).await {
                        return self.fault(&e.to_string()).await;
                    }
                }
                Err(ProbeError::Failed(msg)) => return self.fault(&msg).await,
            }

            tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Replace the log with a fresh snapshot.
    async fn write_snapshot(&self, output: &ProbeOutput) -> std::io::Result<()> {
        tokio::fs::write(&self.log_path, render_snapshot(&now_stamp(), output)).await
    }

    fn cancelled(&self) -> SamplerExit {
        tracing::info!(tool = self.probe.name(), "Telemetry sampler stopping");
        SamplerExit::Cancelled
    }

    /// Record an unrecoverable fault in the log and stop.
    async fn fault(&self, description: &str) -> SamplerExit {
        tracing::error!(
            tool = self.probe.name(),
            error = %description,
            "Telemetry sampler stopped after fault",
        );
        let notice = format!(
            "Error running {} monitoring: {description}\n",
            self.probe.name()
        );
        if let Err(e) = logs::append(&self.log_path, &notice).await {
            tracing::warn!(error = %e, "Failed to record sampler fault in telemetry log");
        }
        SamplerExit::Faulted(description.to_string())
    }
}

/// Spawn a sampler that runs the configured status tool.
///
/// The returned handle resolves once the loop exits; it is not required to
/// be awaited.
pub fn spawn(config: &SamplerConfig, cancel: CancellationToken) -> JoinHandle<SamplerExit> {
    let probe = CommandProbe::new(config.tool.clone(), config.probe_timeout);
    let sampler = TelemetrySampler::new(probe, config.log_path.clone(), config.interval);
    tokio::spawn(sampler.run(cancel))
}

fn now_stamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Log content for one successful query.
fn render_snapshot(stamp: &str, output: &ProbeOutput) -> String {
    let mut text = format!("--- {stamp} ---\n{}", output.stdout);
    if !output.stderr.is_empty() {
        text.push_str("STDERR: ");
        text.push_str(&output.stderr);
    }
    text.push('\n');
    text
}
