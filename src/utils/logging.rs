use std::path::Path;
#[cfg(test)]
use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

pub const LOG_PREFIX: &str = "focuslog";

/// Installs the global subscriber for a focuslog run. Tracking, relay and plotting events land in
/// `focuslog.*` files under `application_data_path/logs`, next to `time_logs.csv`. Console output
/// is opt-in (`--log`) because the shell prompt and the `Tracked:` lines share stdout.
///
/// Returns an error if a subscriber is already installed.
pub fn enable_logging(
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_PREFIX)
        .build(application_data_path.join("logs"))?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);

    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()));

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .try_init()
        .map_err(|e| anyhow!("Logging is already set up: {e}"))?;
    Ok(())
}

#[cfg(test)]
pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;
    use tracing::level_filters::LevelFilter;

    use super::{enable_logging, TEST_LOGGING};

    #[test]
    fn test_second_subscriber_is_rejected() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;

        assert!(enable_logging(dir.path(), Some(LevelFilter::INFO), false).is_err());
        assert!(dir.path().join("logs").is_dir());
        Ok(())
    }
}
