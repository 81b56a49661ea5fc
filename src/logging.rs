use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};


pub const LOG_ENV: &str = "BIBLE_COMPRESSION_LOG";

static INIT: Once = Once::new();


/// Installs the stderr logger. Filter comes from `BIBLE_COMPRESSION_LOG`
/// (e.g. `bible_compression=debug`), falling back to `bible_compression=info`.
/// Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("bible_compression=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(filter)
            .init();
    });
}
