//! `log` sink that forwards records to a C callback.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::ffi::{c_char, CString};
use std::sync::{Mutex, Once, PoisonError};

/// Receives one NUL-terminated line per log record. The pointer is only
/// valid for the duration of the call.
pub type LogCallback = extern "C" fn(message: *const c_char);

static CALLBACK: Mutex<Option<LogCallback>> = Mutex::new(None);
static LOGGER: CallbackLogger = CallbackLogger;
static INSTALL: Once = Once::new();

struct CallbackLogger;

fn current() -> Option<LogCallback> {
    *CALLBACK.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Log for CallbackLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Copied out so the callback may replace itself.
        let Some(callback) = current() else {
            return;
        };
        let line = record.args().to_string().replace('\0', " ");
        if let Ok(line) = CString::new(line) {
            callback(line.as_ptr());
        }
    }

    fn flush(&self) {}
}

/// Route `info!` and above to `callback`, or stop forwarding with `None`.
///
/// Installs the process-wide logger on first use. If another logger is
/// already installed the callback is stored but never called.
pub fn set_callback(callback: Option<LogCallback>) {
    *CALLBACK.lock().unwrap_or_else(PoisonError::into_inner) = callback;
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Info);
        }
    });
}
