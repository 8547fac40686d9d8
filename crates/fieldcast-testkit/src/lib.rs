//! Test utilities shared by the fieldcast crates.
//!
//! Dev-dependency only. Provides proptest strategies for core types and a
//! one-line tracing setup for tests that want engine output.

#![forbid(unsafe_code)]

/// Proptest strategies for fields and device ids
pub mod strategies;

pub use proptest;

/// Install a compact tracing subscriber for the current test binary.
///
/// Honors `RUST_LOG`; safe to call from every test, only the first call
/// installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
