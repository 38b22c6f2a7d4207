//! Kernel logger fanning out to the console and serial sinks.
//!
//! Every record is written synchronously to both attached sinks. A missing
//! sink simply receives nothing, so driver code behaves identically with
//! zero, one or two sinks attached.
//!
//! # Usage
//!
//! ```ignore
//! use lib_kernel::{log_info, log_warn};
//!
//! log_info!("Detected {} IDE device(s)", count);
//! log_warn!("LSI Logic controller not supported");
//! ```
//!
//! Console lines look like `[INFO  ] message`; serial lines additionally
//! carry the source location: `[INFO  ] [drivers/ide/src/lib.rs:42] message`.

use core::fmt::Write;

use spin::{Mutex, MutexGuard};

use crate::console::TextSink;
use crate::writer::LineWriter;

/// Log levels for kernel logging, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Very detailed tracing information (most verbose)
    TRACE = 0,
    /// General debugging information
    DEBUG = 1,
    /// Informational messages about normal operation
    INFO = 2,
    /// Potentially problematic situations
    WARN = 3,
    /// Failures that don't halt the system
    ERROR = 4,
    /// Errors that may lead to a halt
    CRITICAL = 5,
}

impl LogLevel {
    /// 6-character padded tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::TRACE => "TRACE ",
            LogLevel::DEBUG => "DEBUG ",
            LogLevel::INFO => "INFO  ",
            LogLevel::WARN => "WARN  ",
            LogLevel::ERROR => "ERROR ",
            LogLevel::CRITICAL => "CRIT  ",
        }
    }

    /// Parses a lowercase level name as used on the kernel command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "trace" => Some(LogLevel::TRACE),
            "debug" => Some(LogLevel::DEBUG),
            "info" => Some(LogLevel::INFO),
            "warn" => Some(LogLevel::WARN),
            "error" => Some(LogLevel::ERROR),
            "critical" => Some(LogLevel::CRITICAL),
            _ => None,
        }
    }
}

type SinkRef = &'static mut dyn TextSink;

/// Logger state: the two sinks, a level filter and counters.
pub struct KernelLogger {
    console: Option<SinkRef>,
    serial: Option<SinkRef>,
    min_level: LogLevel,
    total_logs: usize,
    dropped_logs: usize,
}

impl KernelLogger {
    pub const fn new() -> Self {
        Self {
            console: None,
            serial: None,
            min_level: LogLevel::INFO,
            total_logs: 0,
            dropped_logs: 0,
        }
    }

    /// Attaches the row/column console, replacing any previous one.
    pub fn attach_console(&mut self, sink: SinkRef) {
        self.console = Some(sink);
    }

    /// Attaches the line-oriented serial log, replacing any previous one.
    pub fn attach_serial(&mut self, sink: SinkRef) {
        self.serial = Some(sink);
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Writes one record to both sinks.
    pub fn log(&mut self, level: LogLevel, file: &'static str, line: u32, message: &str) {
        if level < self.min_level {
            self.dropped_logs += 1;
            return;
        }
        self.total_logs += 1;

        if let Some(console) = self.console.as_deref_mut() {
            console.write_str("[");
            console.write_str(level.as_str());
            console.write_str("] ");
            console.write_line(message);
        }

        if let Some(serial) = self.serial.as_deref_mut() {
            let mut location = LineWriter::new();
            let _ = write!(location, "[{}] [{}:{}] ", level.as_str(), file, line);
            serial.write_str(location.as_str());
            serial.write_line(message);
        }
    }

    /// Writes unadorned text to both sinks.
    pub fn print(&mut self, text: &str) {
        if let Some(console) = self.console.as_deref_mut() {
            console.write_str(text);
        }
        if let Some(serial) = self.serial.as_deref_mut() {
            serial.write_str(text);
        }
    }

    /// `(total_logs, dropped_logs)`
    pub fn stats(&self) -> (usize, usize) {
        (self.total_logs, self.dropped_logs)
    }
}

impl Default for KernelLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Global logger instance; usable before any sink is attached.
pub static GLOBAL_LOGGER: Mutex<KernelLogger> = Mutex::new(KernelLogger::new());

pub fn get_logger() -> MutexGuard<'static, KernelLogger> {
    GLOBAL_LOGGER.lock()
}

// ============================================================================
// LOGGING MACROS
// ============================================================================

/// Internal macro for logging (captures file and line information).
///
/// Use the level-specific macros like `log_info!` instead.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {{
        let mut writer = $crate::writer::LineWriter::new();
        use ::core::fmt::Write;
        let _ = ::core::write!(&mut writer, $($arg)*);
        $crate::logger::get_logger().log($level, file!(), line!(), writer.as_str());
    }};
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logger::LogLevel::TRACE, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logger::LogLevel::DEBUG, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logger::LogLevel::INFO, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logger::LogLevel::WARN, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logger::LogLevel::ERROR, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logger::LogLevel::CRITICAL, $($arg)*)
    };
}

/// Print with newline to both sinks, without a level tag.
#[macro_export]
macro_rules! kprintln {
    () => {
        $crate::logger::get_logger().print("\n")
    };
    ($($arg:tt)*) => {{
        let mut writer = $crate::writer::LineWriter::new();
        use ::core::fmt::Write;
        let _ = ::core::writeln!(&mut writer, $($arg)*);
        $crate::logger::get_logger().print(writer.as_str());
    }};
}

/// Print without newline to both sinks.
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {{
        let mut writer = $crate::writer::LineWriter::new();
        use ::core::fmt::Write;
        let _ = ::core::write!(&mut writer, $($arg)*);
        $crate::logger::get_logger().print(writer.as_str());
    }};
}
