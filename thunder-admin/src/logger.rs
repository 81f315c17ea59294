//! Logging Infrastructure
//!
//! Logs go to stderr (stdout carries command output) or to a daily
//! rolling file.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger.
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logger(log_level: &str, json: bool, log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, "thunder-admin");
                if json {
                    builder.json().with_writer(file_appender).init();
                } else {
                    builder.with_ansi(false).with_writer(file_appender).init();
                }
                return;
            }
            Err(e) => eprintln!("Cannot create log directory {}: {e}", dir.display()),
        }
    }

    if json {
        builder.json().with_writer(std::io::stderr).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}
