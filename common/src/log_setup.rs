use std::path::Path;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

/// Starts a rotating file logger in `directory`, echoing everything to stdout
/// and warnings to stderr. Keep the returned handle alive for the program's
/// lifetime.
pub fn setup_logging(base_level: &str, directory: &Path) -> anyhow::Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(base_level)?
        .log_to_file(
            FileSpec::default()
                .directory(directory)
                .basename("backdrop"),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            Criterion::Size(1024 * 1024), //1MB
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_writes_to_directory() {
        let directory = std::env::temp_dir().join("backdrop_log_setup_test");
        let handle = setup_logging("info", &directory).unwrap();
        log::info!("logger started");
        handle.flush();

        assert!(directory.is_dir());
        handle.shutdown();
    }
}
