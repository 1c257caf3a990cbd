// Logging setup for taskpool.
//
// Built on the `tracing` ecosystem. The pool emits structured events
// (worker lifecycle at DEBUG, pool construction/shutdown at INFO,
// contained panics at ERROR); this module only wires up a subscriber for
// binaries and tests that want to see them. Library users with their own
// subscriber can ignore it entirely.

use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the taskpool logging setup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display.
    pub level: Level,
    /// Whether to use JSON format for logs.
    pub json_format: bool,
    /// Whether to include file and line information.
    pub show_file_line: bool,
    /// Whether to include thread name/id. Worker threads are named
    /// `taskpool-worker-{id}`, which makes this worth keeping on.
    pub show_thread_info: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: false,
            show_thread_info: true,
        }
    }
}

// Initialization guard to ensure we only initialize once.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber with the given configuration.
/// Safe to call multiple times; only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        let fmt_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let registry = tracing_subscriber::registry().with(env_filter);

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else {
            Box::new(registry.with(fmt_layer))
        };

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Error setting global tracing subscriber: {err}");
        }
    });
}

/// Initializes logging with defaults (INFO level, console output).
pub fn init_default() {
    init(LogConfig::default());
}

/// Initializes logging for tests: warnings and errors only, with file and
/// line information, no thread noise.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
    });
}
