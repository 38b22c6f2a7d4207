//! PCI configuration-space enumeration.
//!
//! Configuration space is reached through the legacy mechanism #1 port pair
//! (`0xCF8` address, `0xCFC` data). On top of the raw accessors in
//! [`config`] sits one parameterized enumerator ([`scan::enumerate`]) that is
//! driven by a [`ScanPlan`]. Two plans exist and are intentionally different:
//!
//! - [`HARDWARE_INVENTORY_SCAN`]: buses 0-7, every slot and function,
//!   used to build the [`PciInventory`] shown in the verbose boot report.
//! - [`STORAGE_CONTROLLER_SCAN`]: every bus, function 0 only, abandoning
//!   the walk after bus 3 when nothing has been claimed. Used by the SCSI
//!   controller discovery.
#![cfg_attr(not(test), no_std)]

pub mod class;
pub mod config;
pub mod scan;

pub use class::PciClass;
pub use config::{config_address, read_config_byte, read_config_dword, read_config_word};
pub use scan::{
    enumerate, PciFunction, PciInventory, ScanPlan, ScanSummary, HARDWARE_INVENTORY_SCAN,
    STORAGE_CONTROLLER_SCAN,
};
