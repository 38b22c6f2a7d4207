//! SCSI support: controller discovery over PCI, BusLogic bring-up, and
//! target probing through a pluggable [`CommandExecutor`].
//!
//! Discovery walks [`pci::STORAGE_CONTROLLER_SCAN`] looking for class 0x01
//! subclass 0x00 functions. BusLogic adapters are reset and registered; LSI
//! Logic adapters are recognised and reported but never registered.
//!
//! The sector and block entry points validate the device id and report
//! success without moving data.
#![cfg_attr(not(test), no_std)]

pub mod buslogic;
pub mod cdb;
pub mod consts;
pub mod error;
pub mod executor;
pub mod types;

use lib_kernel::logger::LogLevel;
use lib_kernel::{klog, log_debug, log_info, log_warn, PortIo};
use pci::class::{CLASS_MASS_STORAGE, SUBCLASS_SCSI};
use pci::config::{read_config_byte, read_config_dword, REG_BAR0, REG_INTERRUPT_LINE};
use pci::{PciFunction, STORAGE_CONTROLLER_SCAN};

pub use buslogic::{BusLogic, BusLogicConfig};
pub use cdb::{swap16, swap32, InquiryData, ReadCapacityData};
pub use error::{ScsiError, ScsiResult};
pub use executor::{CommandExecutor, CommandTarget, SyntheticExecutor};
pub use types::{ControllerKind, ScsiController, ScsiDevice, ScsiRegistry};

use consts::*;

/* ============================================================================
 * CONTROLLER DISCOVERY
 * ============================================================================ */

fn is_scsi_controller(function: &PciFunction) -> bool {
    function.class_code == CLASS_MASS_STORAGE && function.subclass == SUBCLASS_SCSI
}

/// Recognises a SCSI adapter by PCI id.
pub fn controller_kind(vendor_id: u16, device_id: u16) -> Option<ControllerKind> {
    match (vendor_id, device_id) {
        (BUSLOGIC_VENDOR_ID, BUSLOGIC_DEVICE_ID) => Some(ControllerKind::BusLogic),
        (LSI_VENDOR_ID, LSI_53C895A_DEVICE_ID | LSI_53C1030_DEVICE_ID) => Some(ControllerKind::LsiLogic),
        _ => None,
    }
}

/// Handles one SCSI-class function. Returns `true` if a controller was
/// registered.
fn claim_controller<P: PortIo + ?Sized>(
    io: &mut P,
    function: &PciFunction,
    registry: &mut ScsiRegistry,
    config: &BusLogicConfig,
) -> bool {
    log_info!(
        "Found SCSI controller: Vendor={:#06x} Device={:#06x}",
        function.vendor_id,
        function.device_id
    );

    let bar0 = read_config_dword(io, function.bus, function.slot, function.func, REG_BAR0);
    let io_base = (bar0 & !PCI_BAR_FLAGS_MASK) as u16;
    if io_base == 0 {
        log_warn!("  Invalid I/O base address");
        return false;
    }

    match controller_kind(function.vendor_id, function.device_id) {
        Some(ControllerKind::BusLogic) => {
            log_info!("  Type: {}", ControllerKind::BusLogic);
            if BusLogic::new(io_base, *config).init(io).is_err() {
                return false;
            }

            let irq = read_config_byte(io, function.bus, function.slot, function.func, REG_INTERRUPT_LINE);
            let controller = ScsiController {
                kind: ControllerKind::BusLogic,
                io_base,
                mmio_base: 0,
                irq,
                device_count: 0,
            };
            match registry.register_controller(controller) {
                Ok(_) => true,
                Err(err) => {
                    log_warn!("  BusLogic controller at {:#06x} dropped: {}", io_base, err);
                    false
                }
            }
        }
        Some(ControllerKind::LsiLogic) => {
            log_info!("  Type: {}", ControllerKind::LsiLogic);
            log_warn!("  Note: LSI Logic not yet fully supported");
            false
        }
        None => false,
    }
}

/// Scans PCI for SCSI host adapters and registers those that come up.
/// Returns the number of registered controllers.
pub fn discover_controllers<P: PortIo + ?Sized>(
    io: &mut P,
    registry: &mut ScsiRegistry,
    config: &BusLogicConfig,
) -> usize {
    log_info!("Scanning for SCSI controllers...");

    enumerate_controllers(io, registry, config);

    let count = registry.controller_count();
    if count == 0 {
        log_info!("No SCSI controllers detected");
    } else {
        log_info!("Detected {} SCSI controller(s)", count);
    }
    count
}

fn enumerate_controllers<P: PortIo + ?Sized>(io: &mut P, registry: &mut ScsiRegistry, config: &BusLogicConfig) {
    pci::enumerate(io, &STORAGE_CONTROLLER_SCAN, is_scsi_controller, |io, function| {
        claim_controller(io, function, registry, config)
    });
}

/* ============================================================================
 * DEVICE PROBING
 * ============================================================================ */

fn probe_target<E: CommandExecutor + ?Sized>(
    executor: &mut E,
    target: CommandTarget<'_>,
) -> ScsiResult<Option<ScsiDevice>> {
    let mut response = [0u8; INQUIRY_DATA_LEN];
    let len = executor.execute(target, &cdb::inquiry_cdb(target.lun), &mut response)?;
    let inquiry = InquiryData::parse(&response[..len])?;
    if !inquiry.is_present() {
        return Ok(None);
    }

    let capacity = if inquiry.peripheral_type == SCSI_TYPE_DISK {
        let mut response = [0u8; READ_CAPACITY_DATA_LEN];
        match executor
            .execute(target, &cdb::read_capacity_cdb(target.lun), &mut response)
            .and_then(|len| ReadCapacityData::parse(&response[..len]))
        {
            Ok(capacity) => Some(capacity),
            Err(err) => {
                log_warn!("  READ CAPACITY failed on target {}: {}", target.target, err);
                None
            }
        }
    } else {
        None
    };

    Ok(Some(ScsiDevice::new(
        target.controller_id,
        target.target,
        target.lun,
        &inquiry,
        capacity.as_ref(),
    )))
}

/// Probes targets 0-7, LUN 0, on every registered controller. Returns the
/// number of devices registered by this pass.
pub fn scan_devices<E: CommandExecutor + ?Sized>(registry: &mut ScsiRegistry, executor: &mut E) -> usize {
    log_info!("Scanning for SCSI devices...");
    let before = registry.device_count();

    for index in 0..registry.controller_count() {
        let Some(&controller) = registry.controller(index) else {
            continue;
        };
        let controller_id = index as u8;
        log_info!("Scanning controller {}", controller_id);

        for target in 0..SCSI_MAX_TARGETS {
            for lun in 0..SCSI_MAX_LUNS {
                let address = CommandTarget {
                    controller_id,
                    controller: &controller,
                    target,
                    lun,
                };
                let device = match probe_target(executor, address) {
                    Ok(Some(device)) => device,
                    Ok(None) => continue,
                    Err(err) => {
                        log_debug!("  Target {}: {}", target, err);
                        continue;
                    }
                };

                log_info!("  Found device at target {}: {} {}", target, device.vendor, device.product);
                if let Err(err) = registry.register_device(device) {
                    log_warn!("  Device at target {} not registered: {}", target, err);
                }
            }
        }
    }

    let found = registry.device_count() - before;
    log_info!("SCSI device scan complete. Found {} device(s)", registry.device_count());
    found
}

/* ============================================================================
 * I/O ENTRY POINTS
 * ============================================================================ */

fn check_device(registry: &ScsiRegistry, device_id: u8) -> ScsiResult<&ScsiDevice> {
    registry
        .device(usize::from(device_id))
        .ok_or(ScsiError::InvalidDevice(device_id))
}

/// Level of the notice printed by the data-transfer entry points, which do
/// not move any data yet.
pub const IO_NOTICE_LEVEL: LogLevel = LogLevel::INFO;

impl ScsiRegistry {
    /// Reads one sector. No data is transferred yet.
    pub fn read_sector(&self, device_id: u8, lba: u32, _buffer: &mut [u8; SCSI_SECTOR_SIZE]) -> ScsiResult<()> {
        check_device(self, device_id)?;
        klog!(IO_NOTICE_LEVEL, "SCSI read sector {} on device {}: not yet fully implemented", lba, device_id);
        Ok(())
    }

    /// Writes one sector. No data is transferred yet.
    pub fn write_sector(&self, device_id: u8, lba: u32, _buffer: &[u8; SCSI_SECTOR_SIZE]) -> ScsiResult<()> {
        check_device(self, device_id)?;
        klog!(IO_NOTICE_LEVEL, "SCSI write sector {} on device {}: not yet fully implemented", lba, device_id);
        Ok(())
    }

    /// Reads `count` blocks starting at `lba`. No data is transferred yet.
    pub fn read_blocks(&self, device_id: u8, lba: u32, count: u16, _buffer: &mut [u8]) -> ScsiResult<()> {
        check_device(self, device_id)?;
        klog!(IO_NOTICE_LEVEL, "SCSI read {} block(s) at {} on device {}: not yet fully implemented", count, lba, device_id);
        Ok(())
    }

    /// Writes `count` blocks starting at `lba`. No data is transferred yet.
    pub fn write_blocks(&self, device_id: u8, lba: u32, count: u16, _buffer: &[u8]) -> ScsiResult<()> {
        check_device(self, device_id)?;
        klog!(IO_NOTICE_LEVEL, "SCSI write {} block(s) at {} on device {}: not yet fully implemented", count, lba, device_id);
        Ok(())
    }
}
