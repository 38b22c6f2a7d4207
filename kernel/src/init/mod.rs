//! Boot-time hardware detection.
//!
//! The sequence runs once, in a fixed order: CPU, IDE, SCSI, and in verbose
//! mode a full PCI listing. Each step fills its own part of the
//! [`HardwareInventory`]; nothing here fails, absent hardware just leaves
//! the corresponding registry empty.

pub mod cpu;
pub mod storage;

pub use cpu::detect_cpu;
pub use storage::{init_ide, init_scsi};

use ide::IdeBus;
use lib_kernel::cpu::CpuidSource;
use lib_kernel::logger::{get_logger, KernelLogger};
use lib_kernel::{log_info, PortIo};
use pci::PciInventory;
use scsi::{BusLogicConfig, SyntheticExecutor};

use crate::boot::BootOptions;
use crate::inventory::HardwareInventory;

/// Tunables for the detection sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardwareConfig {
    pub ide_bus: IdeBus,
    pub buslogic: BusLogicConfig,
}

/// Runs the detection sequence with the stock configuration.
pub fn init_hardware<P, C>(io: &mut P, cpuid: &mut C, options: BootOptions) -> HardwareInventory
where
    P: PortIo + ?Sized,
    C: CpuidSource + ?Sized,
{
    init_hardware_with(io, cpuid, options, &HardwareConfig::default())
}

pub fn init_hardware_with<P, C>(
    io: &mut P,
    cpuid: &mut C,
    options: BootOptions,
    config: &HardwareConfig,
) -> HardwareInventory
where
    P: PortIo + ?Sized,
    C: CpuidSource + ?Sized,
{
    apply_log_level(&mut get_logger(), &options);

    let (cpu, hypervisor) = detect_cpu(cpuid);
    let ide = init_ide(io, &config.ide_bus);
    let scsi = init_scsi(io, &mut SyntheticExecutor::new(), &config.buslogic);

    let pci = if options.verbose {
        log_info!("Collecting PCI inventory...");
        Some(PciInventory::scan(io))
    } else {
        None
    };

    log_info!("Hardware detection complete");

    HardwareInventory {
        options,
        cpu,
        hypervisor,
        ide_bus: config.ide_bus,
        ide,
        scsi,
        pci,
    }
}

/// Sets the logger's minimum level when the command line asked for one.
pub fn apply_log_level(logger: &mut KernelLogger, options: &BootOptions) {
    if let Some(level) = options.log_level {
        logger.set_min_level(level);
    }
}

#[cfg(target_arch = "x86_64")]
static mut SERIAL_SINK: lib_kernel::console::SerialSink = lib_kernel::console::SerialSink;

/// Attaches COM1 to the logger and runs the detection sequence against the
/// real ports and the executing processor.
///
/// # Safety
/// Must be called once, in ring 0, before anything else drives the legacy
/// IDE ports, the PCI configuration ports or COM1.
#[cfg(target_arch = "x86_64")]
pub unsafe fn init_platform_hardware(cmdline: &str) -> HardwareInventory {
    use lib_kernel::cpu::NativeCpuid;
    use lib_kernel::port::X86PortIo;

    get_logger().attach_serial(&mut *core::ptr::addr_of_mut!(SERIAL_SINK));

    let options = BootOptions::from_cmdline(cmdline);
    let mut io = X86PortIo::new();
    init_hardware(&mut io, &mut NativeCpuid, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_kernel::cpu::CpuidRegs;
    use lib_kernel::logger::LogLevel;
    use lib_kernel::sim::{ScriptedCpuid, SimulatedPorts};

    fn fast_config() -> HardwareConfig {
        HardwareConfig {
            buslogic: BusLogicConfig {
                ready_retries: 4,
                reset_delay: 0,
                poll_delay: 0,
            },
            ..HardwareConfig::default()
        }
    }

    fn intel_cpuid() -> ScriptedCpuid {
        // "GenuineIntel", family 6 model 10 stepping 9, FPU|TSC|SSE2
        ScriptedCpuid::new()
            .leaf(0, CpuidRegs { eax: 1, ebx: 0x756E_6547, ecx: 0x6C65_746E, edx: 0x4965_6E69 })
            .leaf(1, CpuidRegs { eax: 0x0000_06A9, ebx: 0, ecx: 0, edx: (1 << 0) | (1 << 4) | (1 << 26) })
    }

    #[test]
    fn test_empty_machine() {
        let mut io = SimulatedPorts::new();
        let mut cpuid = intel_cpuid();
        let inventory = init_hardware_with(&mut io, &mut cpuid, BootOptions::default(), &fast_config());

        assert_eq!(inventory.cpu().vendor_str(), "GenuineIntel");
        assert_eq!(inventory.cpu().family, 6);
        assert!(inventory.hypervisor().is_none());
        assert_eq!(inventory.ide_device_count(), 0);
        assert_eq!(inventory.scsi_controller_count(), 0);
        assert_eq!(inventory.scsi_device_count(), 0);
        assert!(inventory.pci().is_none());
    }

    #[test]
    fn test_ide_channels_are_masked() {
        let mut io = SimulatedPorts::new();
        let mut cpuid = intel_cpuid();
        init_hardware_with(&mut io, &mut cpuid, BootOptions::default(), &fast_config());

        assert_eq!(io.writes_to(0x3F8).first(), Some(&2));
        assert_eq!(io.writes_to(0x378).first(), Some(&2));
    }

    #[test]
    fn test_verbose_collects_pci() {
        let mut io = SimulatedPorts::new();
        // Host bridge at 00:00.0 and a network card at 00:03.0
        io.set_config_dword(0, 0, 0, 0x00, 0x1237_8086)
            .set_config_dword(0, 0, 0, 0x08, 0x0600_0002)
            .set_config_dword(0, 3, 0, 0x00, 0x100E_8086)
            .set_config_dword(0, 3, 0, 0x08, 0x0200_0003);
        let mut cpuid = intel_cpuid();
        let options = BootOptions { verbose: true, log_level: None };
        let inventory = init_hardware_with(&mut io, &mut cpuid, options, &fast_config());

        let pci = inventory.pci().expect("verbose boot lists PCI");
        assert_eq!(pci.total_found(), 2);
        assert_eq!(pci.functions()[1].slot, 3);
    }

    #[test]
    fn test_buslogic_and_synthetic_disks() {
        let mut io = SimulatedPorts::new();
        // BusLogic MultiMaster at 00:04.0, I/O BAR 0xC001, IRQ 11
        io.set_config_dword(0, 4, 0, 0x00, 0x1040_104B)
            .set_config_dword(0, 4, 0, 0x08, 0x0100_0001)
            .set_config_dword(0, 4, 0, 0x10, 0x0000_C001)
            .set_config_dword(0, 4, 0, 0x3C, 0x0000_010B)
            .set(0xC000, 0x08);
        let mut cpuid = intel_cpuid();
        let inventory = init_hardware_with(&mut io, &mut cpuid, BootOptions::default(), &fast_config());

        assert_eq!(inventory.scsi_controller_count(), 1);
        let controller = inventory.scsi_controller(0).expect("controller registered");
        assert_eq!(controller.io_base, 0xC000);
        assert_eq!(controller.irq, 11);
        assert_eq!(inventory.scsi_device_count(), 8);

        let disk = inventory.scsi_device(0).expect("target 0");
        assert_eq!(disk.vendor.as_str(), "QEMU");
        assert_eq!(disk.size_mb(), 100);

        let mut sector = [0u8; 512];
        assert_eq!(inventory.scsi_read_sector(7, 0, &mut sector), Ok(()));
        assert!(inventory.scsi_read_sector(8, 0, &mut sector).is_err());
    }

    #[test]
    fn test_log_level_applied() {
        let mut logger = KernelLogger::new();
        apply_log_level(&mut logger, &BootOptions::from_cmdline("loglevel=warn"));
        assert_eq!(logger.min_level(), LogLevel::WARN);

        apply_log_level(&mut logger, &BootOptions::from_cmdline("verbose"));
        assert_eq!(logger.min_level(), LogLevel::WARN);
    }
}
