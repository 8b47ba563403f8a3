//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or everything
/// from this crate down to `debug` when `verbose` is on.
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "warn,dirsort=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("dirsort logging initialized");
    }
}
