//! Logger setup.
//!
//! Records go to stdout and, when a local data directory exists, to
//! `eon-native/latest.log` inside it. The level comes from `RUST_LOG`
//! (a single level such as `debug`), defaulting to `info`.

use std::path::PathBuf;

use log::LevelFilter;

use crate::error::Result;

pub const LOG_DIR_NAME: &str = "eon-native";
pub const LOG_FILE_NAME: &str = "latest.log";

/// Where the log file is written, if the platform has a local data directory.
pub fn log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(LOG_DIR_NAME).join(LOG_FILE_NAME))
}

fn level_from_env(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Installs the global logger. Fails if a logger is already installed.
pub fn init_logging() -> Result<()> {
    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    let mut file_error = None;
    if let Some(path) = log_file_path() {
        let opened = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| fern::log_file(&path));
        match opened {
            Ok(file) => dispatch = dispatch.chain(file),
            Err(e) => file_error = Some((path, e)),
        }
    }

    dispatch.apply()?;

    if let Some((path, e)) = file_error {
        log::warn!("not writing log file {}: {e}", path.display());
    }
    log::debug!("logging initialized at level {level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_level_from_env() {
        assert_eq!(level_from_env(None), LevelFilter::Info);
        assert_eq!(level_from_env(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from_env(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(level_from_env(Some("eon_native=trace")), LevelFilter::Info);
    }

    #[test]
    fn test_second_install_is_an_error() {
        // The first install may already have happened in another test.
        let _ = init_logging();
        assert!(matches!(init_logging(), Err(Error::Logger(_))));
    }

    #[test]
    fn test_log_file_name() {
        if let Some(path) = log_file_path() {
            assert!(path.ends_with("eon-native/latest.log"));
        }
    }
}
