//! # Port I/O capability
//!
//! Every driver in the hardware layer talks to the machine through the
//! [`PortIo`] trait instead of issuing `in`/`out` instructions directly. On
//! real hardware this is [`X86PortIo`]; on the host the drivers run against
//! `sim::SimulatedPorts`.
//!
//! ## Architecture-Specific Notes
//!
//! - [`X86PortIo`] is only implemented on x86_64, using the port wrappers
//!   from the `x86_64` crate.
//! - Port accesses can have arbitrary side effects on hardware. Obtaining an
//!   [`X86PortIo`] is therefore `unsafe`; using one is not.

#[cfg(target_arch = "x86_64")]
use x86_64::instructions::port::Port;

/// Minimal 8/16/32-bit port-I/O capability consumed by the drivers.
pub trait PortIo {
    /// Reads an 8-bit value from `port`.
    fn inb(&mut self, port: u16) -> u8;
    /// Writes an 8-bit value to `port`.
    fn outb(&mut self, port: u16, value: u8);
    /// Reads a 16-bit value from `port`.
    fn inw(&mut self, port: u16) -> u16;
    /// Writes a 16-bit value to `port`.
    fn outw(&mut self, port: u16, value: u16);
    /// Reads a 32-bit value from `port`.
    fn inl(&mut self, port: u16) -> u32;
    /// Writes a 32-bit value to `port`.
    fn outl(&mut self, port: u16, value: u32);

    /// Reads `buffer.len()` consecutive 16-bit values from the same port.
    fn insw(&mut self, port: u16, buffer: &mut [u16]) {
        for word in buffer.iter_mut() {
            *word = self.inw(port);
        }
    }

    /// Writes every 16-bit value in `buffer` to the same port.
    fn outsw(&mut self, port: u16, buffer: &[u16]) {
        for &word in buffer {
            self.outw(port, word);
        }
    }
}

impl<P: PortIo + ?Sized> PortIo for &mut P {
    fn inb(&mut self, port: u16) -> u8 {
        (**self).inb(port)
    }

    fn outb(&mut self, port: u16, value: u8) {
        (**self).outb(port, value)
    }

    fn inw(&mut self, port: u16) -> u16 {
        (**self).inw(port)
    }

    fn outw(&mut self, port: u16, value: u16) {
        (**self).outw(port, value)
    }

    fn inl(&mut self, port: u16) -> u32 {
        (**self).inl(port)
    }

    fn outl(&mut self, port: u16, value: u32) {
        (**self).outl(port, value)
    }
}

/// Direct x86 port access through the `in`/`out` instructions.
#[derive(Debug)]
pub struct X86PortIo {
    _private: (),
}

impl X86PortIo {
    /// Creates the hardware port-I/O capability.
    ///
    /// # Safety
    /// The caller must be running with I/O privilege (ring 0 or a suitable
    /// IOPL/IO bitmap) and must be the only code driving the ports the
    /// drivers touch.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "x86_64")]
impl PortIo for X86PortIo {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        let mut port = Port::<u8>::new(port);
        unsafe { port.read() }
    }

    #[inline]
    fn outb(&mut self, port: u16, value: u8) {
        let mut port = Port::<u8>::new(port);
        unsafe { port.write(value) }
    }

    #[inline]
    fn inw(&mut self, port: u16) -> u16 {
        let mut port = Port::<u16>::new(port);
        unsafe { port.read() }
    }

    #[inline]
    fn outw(&mut self, port: u16, value: u16) {
        let mut port = Port::<u16>::new(port);
        unsafe { port.write(value) }
    }

    #[inline]
    fn inl(&mut self, port: u16) -> u32 {
        let mut port = Port::<u32>::new(port);
        unsafe { port.read() }
    }

    #[inline]
    fn outl(&mut self, port: u16, value: u32) {
        let mut port = Port::<u32>::new(port);
        unsafe { port.write(value) }
    }
}

/// Busy-waits for `iterations` spin-loop hints. Not a timer.
#[inline]
pub fn spin_delay(iterations: u32) {
    for _ in 0..iterations {
        core::hint::spin_loop();
    }
}
