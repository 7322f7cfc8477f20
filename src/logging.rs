//! Logging initialization shared by the demo binaries.
//!
//! The library itself never initializes a logger — only emits through the
//! `log` facade — so embedding it in another process never double-installs
//! a logger.

/// Installs `env_logger` with a default filter of `info`, honoring
/// `RUST_LOG` if set. Safe to call more than once; subsequent calls are
/// no-ops.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
