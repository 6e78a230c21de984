use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subsystem on stderr.
///
/// `RUST_LOG` wins unless `--verbose` was given.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("buildstamp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("buildstamp=warn"))
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
