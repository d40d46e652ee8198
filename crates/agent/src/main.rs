//! `phantom-agent` -- standalone GPU telemetry sampler.
//!
//! Runs the same sampling loop the studio host starts at boot, without
//! the HTTP surface. Useful for watching a GPU node on its own.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default        | Description                    |
//! |--------------------------|----------|----------------|--------------------------------|
//! | `TELEMETRY_TOOL`         | no       | `rocm-smi`     | Status tool executable         |
//! | `TELEMETRY_LOG`          | no       | `rocm_smi.txt` | Log rewritten every cycle      |
//! | `TELEMETRY_INTERVAL_MS`  | no       | `1000`         | Pause between cycles           |
//! | `TELEMETRY_TIMEOUT_SECS` | no       | `10`           | Bound on a single status query |

use phantom_agent::sampler::{self, SamplerConfig, SamplerExit};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phantom_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SamplerConfig::from_env();
    tracing::info!(
        tool = %config.tool,
        log = %config.log_path.display(),
        interval_ms = config.interval.as_millis() as u64,
        "Starting phantom-agent",
    );

    let cancel = CancellationToken::new();
    let mut handle = sampler::spawn(&config, cancel.clone());

    let exit = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT (Ctrl-C), stopping sampler");
            cancel.cancel();
            handle.await
        }
    };

    match exit {
        Ok(SamplerExit::Cancelled) => tracing::info!("Sampler stopped"),
        Ok(SamplerExit::Faulted(reason)) => {
            tracing::error!(%reason, "Sampler stopped after fault");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Sampler task panicked");
            std::process::exit(1);
        }
    }
}
