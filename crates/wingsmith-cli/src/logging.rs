use std::io;

use tracing_subscriber::EnvFilter;

/// Filter used when `-v` is given; it overrides `RUST_LOG`.
pub(crate) fn verbosity_filter(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Installs the stderr subscriber. Defaults to `warn` when neither `-v` nor
/// `RUST_LOG` says otherwise.
pub(crate) fn init_logging(verbosity: u8, ansi: bool) {
    let env_filter = match verbosity_filter(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
}
