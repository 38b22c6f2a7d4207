//! Text sinks the boot-time hardware layer narrates to.
//!
//! The platform supplies two independent sinks: a row/column console (VGA or
//! framebuffer text) and a line-oriented log (serial). Both are seen only
//! through [`TextSink`]; either may be a [`NullSink`].

#[cfg(target_arch = "x86_64")]
use lazy_static::lazy_static;
#[cfg(target_arch = "x86_64")]
use spin::Mutex;
#[cfg(target_arch = "x86_64")]
use uart_16550::SerialPort;

/// COM1 base port.
pub const COM1: u16 = 0x3F8;

/// A destination for boot-time text.
pub trait TextSink: Send {
    fn write_str(&mut self, s: &str);

    fn write_line(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\n");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TextSink for NullSink {
    fn write_str(&mut self, _s: &str) {}
}

#[cfg(target_arch = "x86_64")]
lazy_static! {
    pub static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(COM1) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

/// The line-oriented log on COM1.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialSink;

#[cfg(target_arch = "x86_64")]
impl TextSink for SerialSink {
    fn write_str(&mut self, s: &str) {
        use core::fmt::Write;
        let _ = SERIAL1.lock().write_str(s);
    }
}
