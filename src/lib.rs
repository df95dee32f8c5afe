pub mod chart;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod series;
pub mod signals;
pub mod watch;

pub use error::{Error, Result};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Filter comes from `RUST_LOG` and defaults to `warn`. Output goes to stderr.
/// This function can only be called once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
