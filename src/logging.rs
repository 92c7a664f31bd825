use std::path::Path;

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};

use crate::config::LoggingConfig;
use crate::error::DataTableError;

const LOG_BASENAME: &str = "datatable";
const LOG_ROTATE_BYTES: u64 = 10 * 1024 * 1024;
const LOG_KEEP_FILES: usize = 5;

/// Starts the file logger under `log_dir`. Warnings and errors are echoed to stderr.
///
/// The returned handle must be kept alive for the lifetime of the process; dropping it
/// flushes and shuts down the logger.
pub fn setup_logging(
    logging: &LoggingConfig,
    log_dir: &Path,
) -> Result<LoggerHandle, DataTableError> {
    let handle = Logger::try_with_str(logging.log_spec())?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(LOG_ROTATE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_KEEP_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    Ok(handle)
}
