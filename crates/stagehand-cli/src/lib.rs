//! stagehand CLI library - expose modules for testing
#![forbid(unsafe_code)]

pub mod commands;
pub mod common;
pub mod errors;
pub mod sink;

pub use common::GlobalOpts;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the `tracing` subscriber for bridge and runtime diagnostics.
///
/// `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    let fallback = format!(
        "stagehand_bridge={level},stagehand_runtime={level},stagehand_cli={level}"
    );
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
