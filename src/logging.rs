//! Structured logging setup, shared by the CLI binary and anything else
//! that embeds the crate as a library.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Error;

/// Initialize a `tracing` subscriber writing to stderr, filtered by
/// `level` (an `EnvFilter` directive, e.g. `"info"` or `"multisect=debug"`).
/// Safe to call at most once per process; a second call returns
/// `Error::Usage` rather than panicking.
pub fn init_logging(level: &str) -> Result<(), Error> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| Error::Usage(format!("invalid log level '{level}': {e}")))?,
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| Error::Usage("logging already initialized".into()))
}
