//! IDE and SCSI bring-up.

use ide::{IdeBus, IdeRegistry};
use lib_kernel::{log_info, PortIo};
use scsi::{BusLogicConfig, CommandExecutor, ScsiRegistry};

/// Masks channel interrupts, then probes all four drive positions.
pub fn init_ide<P: PortIo + ?Sized>(io: &mut P, bus: &IdeBus) -> IdeRegistry {
    log_info!("Initializing IDE controller...");
    bus.init(io);
    bus.detect_devices(io)
}

/// Brings up every SCSI host adapter on PCI, then probes their targets.
pub fn init_scsi<P, E>(io: &mut P, executor: &mut E, config: &BusLogicConfig) -> ScsiRegistry
where
    P: PortIo + ?Sized,
    E: CommandExecutor + ?Sized,
{
    log_info!("Initializing SCSI subsystem...");
    let mut registry = ScsiRegistry::new();
    if scsi::discover_controllers(io, &mut registry, config) > 0 {
        scsi::scan_devices(&mut registry, executor);
    }
    registry
}
