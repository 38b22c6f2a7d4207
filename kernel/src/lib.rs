//! HueOS boot-time hardware discovery.
//!
//! [`init::init_hardware`] runs CPU identification, IDE and SCSI bring-up
//! and, when booted with `verbose`, a PCI listing. The result is a
//! [`HardwareInventory`] that [`report::print_report`] can show.

#![cfg_attr(not(test), no_std)]

pub mod boot;
pub mod init;
pub mod inventory;
pub mod report;

pub use boot::BootOptions;
pub use init::{init_hardware, init_hardware_with, HardwareConfig};
pub use inventory::HardwareInventory;
