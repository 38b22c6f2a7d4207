//! Low-level building blocks shared by the HueOS hardware-discovery layer.
//!
//! - [`port`]: the port-I/O capability every driver is written against
//! - [`cpu`]: CPUID-based processor identification
//! - [`console`] and [`logger`]: the two boot-time text sinks and the
//!   logging/print macros that fan out to both of them
//! - [`sim`] (feature `sim`): a software register file and scripted CPUID so
//!   the drivers can be exercised on the host

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod console;
pub mod cpu;
pub mod logger;
pub mod port;
pub mod writer;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use port::PortIo;
