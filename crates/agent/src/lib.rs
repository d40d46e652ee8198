//! `phantom-agent` library crate.
//!
//! GPU telemetry sampling: a [`probe::StatusProbe`] queried by a
//! cancellable [`sampler::TelemetrySampler`] loop. The session host
//! spawns it at startup; the `phantom-agent` binary runs it standalone.

pub mod probe;
pub mod sampler;
