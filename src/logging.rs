//! Kernel logging facility
//!
//! Routes the `log` crate's macros to the uart as `[LEVEL] message` lines.

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

pub static LOGGER: Logger = Logger::new();

pub struct Logger {
    // keeps a record's line from interleaving with another record
    inner: Mutex<()>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub const fn new() -> Logger {
        Logger {
            inner: Mutex::new(()),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _guard = self.inner.lock();
            crate::println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs [`LOGGER`]. Debug builds log at `Debug`, release builds at
/// `Info`. A second call is a no-op.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(
            #[cfg(debug_assertions)]
            LevelFilter::Debug,
            #[cfg(not(debug_assertions))]
            LevelFilter::Info,
        );
    }
}
