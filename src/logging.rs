//! Log output for the demo binary
//!
//! Everything goes to a daily file under `.logs/`; stdout is reserved for
//! the end-of-run summary.

use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "scrollfeed";
/// Used when `RUST_LOG` is unset or unparsable
const DEFAULT_FILTER: &str = "scrollfeed=debug,warn";

/// Installs the global subscriber writing `.logs/scrollfeed.YYYY-MM-DD`.
///
/// Fails if the directory cannot be created or a subscriber is already set.
pub fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all(LOG_DIR)?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(LOG_DIR, LOG_FILE_PREFIX));
    // dropping the guard would stop the writer thread
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry().with(filter).with(file_layer).try_init()?;

    tracing::info!(dir = LOG_DIR, filter = DEFAULT_FILTER, "Feed logging ready");
    Ok(())
}
