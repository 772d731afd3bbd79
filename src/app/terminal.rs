//! Logging setup for the CLI.

/// Picks the default log level from CLI flags.
///
/// Priority: `RUST_LOG` (applied in [`init_tracing`]) > quiet flag > verbose count > `info`.
pub(crate) fn default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color_env_requested())
        .with_env_filter(filter)
        .try_init();
}
