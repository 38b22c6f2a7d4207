//! Kernel command-line options that shape the boot sequence.

use lib_kernel::log_warn;
use lib_kernel::logger::LogLevel;

/// Options parsed from the bootloader command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootOptions {
    /// Print the detailed CPU and PCI report after detection.
    pub verbose: bool,
    /// Minimum logger level; `None` keeps the logger's default.
    pub log_level: Option<LogLevel>,
}

impl BootOptions {
    /// Parses whitespace-separated words: `verbose` and `loglevel=<name>`.
    /// Anything else is ignored; an unknown level name keeps the default.
    pub fn from_cmdline(cmdline: &str) -> Self {
        let mut options = BootOptions::default();
        for word in cmdline.split_whitespace() {
            if word == "verbose" {
                options.verbose = true;
            } else if let Some(name) = word.strip_prefix("loglevel=") {
                match LogLevel::from_name(name) {
                    Some(level) => options.log_level = Some(level),
                    None => log_warn!("Ignoring unknown log level '{}'", name),
                }
            }
        }
        options
    }
}
