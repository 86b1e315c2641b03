//! Subscriber setup for the binary

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Filter used when RUST_LOG is unset: 0 = info, 1+ = debug
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "modcache=info",
        _ => "modcache=debug",
    }
}

fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)))
}

/// Install the global subscriber
///
/// Logs go to stderr and, when `log_file` is given, to that file as JSON
/// lines. Keep the returned guard alive until exit so buffered lines are
/// flushed. Fails if a global subscriber is already installed.
pub fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>, TryInitError> {
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = match log_file.and_then(|path| Some((path.parent()?, path.file_name()?))) {
        Some((dir, name)) if std::fs::create_dir_all(dir).is_ok() => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "modcache=info")]
    #[case(1, "modcache=debug")]
    #[case(3, "modcache=debug")]
    fn default_filter_follows_verbosity(#[case] verbose: u8, #[case] expected: &str) {
        assert_eq!(default_filter(verbose), expected);
    }

    #[test]
    fn second_installation_is_reported() {
        let _ = init_logging(0, None);

        assert!(init_logging(0, None).is_err());
    }
}
