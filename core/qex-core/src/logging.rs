//! Tracing setup for the executor
//!
//! Events are emitted under two kinds of targets: `sort` for run generation
//! and merge passes, and the `qex_core::*` module paths for page files,
//! group-by materialization and result dumps. Nothing is printed until a
//! subscriber is installed, either here (feature `logging`) or by the host.

use crate::error::QexResult;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "qex_core=info,sort=info";

/// Filter installed by [`init_test`]: merge passes and page I/O.
pub const TEST_FILTER: &str = "qex_core=debug,sort=debug";

/// Install a fmt subscriber filtered by `RUST_LOG`, or [`DEFAULT_FILTER`].
///
/// # Example
/// ```rust
/// qex_core::logging::init().unwrap();
/// ```
pub fn init() -> QexResult<()> {
    match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.is_empty() => init_with_filter(&filter),
        _ => init_with_filter(DEFAULT_FILTER),
    }
}

/// Install a fmt subscriber with an explicit filter directive.
///
/// Fails with `Config` for an unparsable directive or when a global
/// subscriber is already installed.
#[cfg(feature = "logging")]
pub fn init_with_filter(filter: &str) -> QexResult<()> {
    use crate::error::QexError;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_new(filter)
        .map_err(|e| QexError::Config(format!("invalid log filter '{}': {}", filter, e)))?;
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| QexError::Config(format!("tracing subscriber not installed: {}", e)))
}

#[cfg(not(feature = "logging"))]
pub fn init_with_filter(_filter: &str) -> QexResult<()> {
    Ok(())
}

/// Route executor events into the test harness output at debug level.
///
/// Safe to call from every test; only the first call installs anything.
#[cfg(feature = "logging")]
pub fn init_test() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::new(TEST_FILTER))
        .with_test_writer()
        .try_init();
}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
