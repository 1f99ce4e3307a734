/*
================================================================================
                            bboxviz Logging
================================================================================

Console logging through the `log` facade (debug!, info!, etc.) backed by
env_logger, plus a panic hook that reports panics with a backtrace.

**Log Levels**:
- RUST_LOG set: used as-is
- Otherwise: INFO for bboxviz (DEBUG with --verbose), other crates off

**Format**: `<utc timestamp> <LEVEL> <module:line> <message>`, level colored.

The final `max w: .., h: ..` diagnostic is printed to stdout, not logged, so
scripts can read it regardless of the log level.

================================================================================
*/

use std::io::Write;
use std::panic;

use chrono::Utc;
use env_logger::fmt::{Color, Formatter};
use log::{debug, error, Level, LevelFilter, Record};

const LOG_TARGET: &str = "bboxviz";

pub fn setup_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();

    // First check if RUST_LOG is set - if so, use that configuration
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        // Filter out all other crates' logs
        builder.filter(None, LevelFilter::Off);
        let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
        builder.filter(Some(LOG_TARGET), level);
    }

    builder.format(|buf: &mut Formatter, record: &Record| {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

        // Create the module:line part
        let module_info = match (record.module_path(), record.line()) {
            (Some(module), Some(line)) => format!("{module}:{line}"),
            (Some(module), None) => module.to_string(),
            (None, Some(line)) => format!("line:{line}"),
            (None, None) => "unknown".to_string(),
        };

        let mut level_style = buf.style();
        let mut meta_style = buf.style();

        match record.level() {
            Level::Error => level_style.set_color(Color::Red).set_bold(true),
            Level::Warn => level_style.set_color(Color::Yellow).set_bold(true),
            Level::Info => level_style.set_color(Color::Green).set_bold(true),
            Level::Debug => level_style.set_color(Color::Blue).set_bold(true),
            Level::Trace => level_style.set_color(Color::White),
        };

        #[cfg(target_os = "macos")]
        {
            // Color::Rgb does not work on macOS, so we use Color::Blue as a workaround
            meta_style.set_color(Color::Blue);
        }

        #[cfg(not(target_os = "macos"))]
        {
            meta_style.set_color(Color::Rgb(120, 120, 120));
        }

        writeln!(
            buf,
            "{} {} {} {}",
            meta_style.value(timestamp),
            level_style.value(record.level()),
            meta_style.value(module_info),
            record.args()
        )
    });

    // Ignore the error if a logger is already installed (tests)
    let _ = builder.try_init();
}

/// Logs panics with their location and a backtrace, then defers to the default hook.
pub fn setup_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let backtrace = backtrace::Backtrace::new();

        let location = if let Some(location) = info.location() {
            format!("{}:{}", location.file(), location.line())
        } else {
            "unknown location".to_string()
        };

        error!("[PANIC] at {location} - {info}");
        for line in format!("{backtrace:?}").lines() {
            debug!("[BACKTRACE] {}", line.trim());
        }

        default_hook(info);
    }));
}
