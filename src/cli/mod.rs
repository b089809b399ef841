pub mod backend;
pub mod init;
pub mod run;
pub mod send;

use crate::config::LogLevel;

/// Install the stderr log subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
