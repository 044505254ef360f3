//! Tracing subscriber setup for the binaries

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber; `RUST_LOG` takes precedence over `level`
pub fn init(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);

    if json {
        builder.json().init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}
