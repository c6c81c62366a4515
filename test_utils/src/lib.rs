//! Shared helpers for rule tests: a fixture parser for the restricted Go
//! subset the testdata is written in, a harness that compares diagnostics
//! against `// want` annotations, and random input generators for
//! property-based tests.

pub mod fixture;
pub mod generator;
pub mod harness;

use tracing_subscriber::EnvFilter;

/// Initializes tracing for a test binary from `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
