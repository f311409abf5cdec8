use std::error::Error;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "eyelab.log";

/// Route tracing output to `<dir>/eyelab.log`. The terminal belongs to the
/// TUI, so nothing is written to stdout/stderr.
///
/// Keep the returned guard alive for the whole run; dropping it flushes.
pub fn init_file_logging(
    dir: &Path,
    level: &str,
) -> Result<WorkerGuard, Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_new(level)?;
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_level() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_file_logging(dir.path(), "eyelab=loudest").is_err());
    }
}
