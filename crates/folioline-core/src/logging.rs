//! Logging through `log` + `env_logger`, bridged to indicatif on a TTY

use indicatif::MultiProgress;
use log::{Level, Log, Metadata, Record};

const RESET: &str = "\x1b[0m";

/// Fixed-width label so messages line up
fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn ansi(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

/// `[LEVEL] message`, with the label colored when `color` is set
fn render(level: Level, message: &std::fmt::Arguments<'_>, color: bool) -> String {
    if color {
        format!("[{}{}{RESET}] {message}", ansi(level), label(level))
    } else {
        format!("[{}] {message}", label(level))
    }
}

/// Logger that prints above the job spinners.
///
/// Filtering is delegated to the wrapped `env_logger` so `RUST_LOG`
/// module directives behave the same with and without a TTY.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }

    fn accepts(&self, record: &Record) -> bool {
        self.inner.matches(record)
    }
}

impl Log for IndicatifLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.accepts(record) {
            return;
        }
        let line = render(record.level(), record.args(), true);
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Default filter: `debug` wins over `quiet`; `RUST_LOG` overrides both.
fn default_level(quiet: bool, debug: bool) -> &'static str {
    match (debug, quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    }
}

/// Initialize logging. With `multi`, log lines go through indicatif.
///
/// A second call is a no-op.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level(quiet, debug)),
    );

    match multi {
        Some(multi) => {
            let logger = builder.build();
            let max_level = logger.filter();
            let bridge = IndicatifLogger::new(logger, multi.clone());
            if log::set_boxed_logger(Box::new(bridge)).is_ok() {
                log::set_max_level(max_level);
            }
        }
        None => {
            let _ = builder
                .format(|buf, record| {
                    writeln!(buf, "{}", render(record.level(), record.args(), false))
                })
                .try_init();
        }
    }
}
