//! Structured logging init (spec §4.10): `RUST_LOG` if set, else a default
//! level, rendered through `tracing_subscriber::fmt`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

pub fn shutdown_tracing() {}
