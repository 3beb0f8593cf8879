use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    registry::LookupSpan,
};

/// Maps the `-v` count and `-q` flag to a level. Warnings are shown by default.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Plain-text file layer with thread ids and targets.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            subscriber.with(file_layer(file)).init();
        }
        None => subscriber.init(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::{error, info, warn};

    /// Runs `emit` under a file-only subscriber at the level chosen by the flags and returns
    /// what reached the file.
    fn capture(verbosity: u8, quiet: bool, emit: impl FnOnce()) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codonopt.log");
        let subscriber = tracing_subscriber::registry()
            .with(level_filter(verbosity, quiet))
            .with(file_layer(File::create(&path).unwrap()));
        tracing::subscriber::with_default(subscriber, emit);
        std::fs::read_to_string(path).unwrap()
    }

    fn emit_design_events() {
        info!(profile = "bacterial", seed = 0, "Design configuration resolved.");
        warn!(id = "bad", error = "no solution", "Design failed.");
        error!("Command failed: 1 of 2 designs failed");
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(9, false), LevelFilter::TRACE);
        assert_eq!(level_filter(3, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn default_level_keeps_failed_designs_but_hides_progress() {
        let content = capture(0, false, emit_design_events);
        assert!(!content.contains("Design configuration resolved."));
        assert!(content.contains("Design failed."));
        assert!(content.contains("id=\"bad\""));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn verbose_level_includes_resolved_configuration() {
        let content = capture(1, false, emit_design_events);
        assert!(content.contains("Design configuration resolved."));
        assert!(content.contains("profile=\"bacterial\""));
    }

    #[test]
    #[serial]
    fn quiet_level_keeps_only_errors() {
        let content = capture(0, true, emit_design_events);
        assert!(!content.contains("Design failed."));
        assert!(content.contains("1 of 2 designs failed"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = Path::new("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
