//! GPU telemetry sampling for the studio session.
//!
//! Runs the agent's sampling loop in-process so the telemetry log stays
//! current while the server is up. Sampler faults are logged and end the
//! task; they never affect generation jobs or the HTTP surface.

use tokio_util::sync::CancellationToken;

use phantom_agent::sampler::{self, SamplerConfig, SamplerExit};

/// Run the telemetry sampler until `cancel` fires or it faults.
pub async fn run(config: SamplerConfig, cancel: CancellationToken) {
    match sampler::spawn(&config, cancel).await {
        Ok(SamplerExit::Cancelled) => tracing::info!("Telemetry job stopped"),
        Ok(SamplerExit::Faulted(reason)) => {
            tracing::warn!(%reason, "Telemetry job ended; GPU status will not refresh")
        }
        Err(e) => tracing::error!(error = %e, "Telemetry job panicked"),
    }
}
