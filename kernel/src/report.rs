//! Human-readable hardware inventory report.
//!
//! The report is rendered into any [`fmt::Write`]; [`print_report`] sends it
//! to the kernel logger's sinks without a level tag.

use core::fmt::{self, Write};

use ide::{DeviceKind, IdeRegistry};
use lib_kernel::logger::get_logger;
use pci::PciInventory;
use scsi::ScsiRegistry;

use crate::inventory::HardwareInventory;

const RULE: &str = "========================================";

/// Forwards formatted text to both logger sinks.
pub struct LoggerWriter;

impl Write for LoggerWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        get_logger().print(s);
        Ok(())
    }
}

/// Prints the full report on the console and serial log.
pub fn print_report(inventory: &HardwareInventory) {
    let _ = render(inventory, &mut LoggerWriter);
}

/// Renders the IDE list, the SCSI list when it is non-empty and, in verbose
/// mode, the CPU information and the PCI listing.
pub fn render<W: Write>(inventory: &HardwareInventory, out: &mut W) -> fmt::Result {
    render_ide(inventory.ide_devices(), out)?;
    render_scsi(inventory.scsi(), out)?;
    if inventory.options().verbose {
        render_detailed(inventory, out)?;
    }
    Ok(())
}

pub fn render_ide<W: Write>(devices: &IdeRegistry, out: &mut W) -> fmt::Result {
    out.write_str("\nIDE Devices:\n============\n")?;
    if devices.is_empty() {
        return out.write_str("No IDE devices detected\n");
    }

    for (index, device) in devices.iter().enumerate() {
        let kind = match device.kind {
            DeviceKind::Ata => "ATA HDD",
            DeviceKind::Atapi => "ATAPI CD/DVD",
        };
        writeln!(
            out,
            "Device {}: {} {} - {}",
            index,
            device.channel_name(),
            device.drive_name(),
            kind
        )?;
        writeln!(out, "  Model: {}", device.model())?;
        if device.kind == DeviceKind::Ata && device.size > 0 {
            writeln!(out, "  Size: {} MB", device.size_mb())?;
        }
    }
    Ok(())
}

/// Nothing is written when no SCSI device was found.
pub fn render_scsi<W: Write>(registry: &ScsiRegistry, out: &mut W) -> fmt::Result {
    if registry.device_count() == 0 {
        return Ok(());
    }

    out.write_str("\nSCSI Devices:\n=============\n")?;
    for (index, device) in registry.devices().iter().enumerate() {
        writeln!(out, "Device {}: Target {} - {}", index, device.target, device.type_label())?;
        writeln!(out, "  Vendor: {}", device.vendor)?;
        writeln!(out, "  Product: {}", device.product)?;
        writeln!(out, "  Revision: {}", device.revision)?;
        if device.is_disk() && device.block_count > 0 {
            writeln!(out, "  Size: {} MB ({} blocks)", device.size_mb(), device.block_count)?;
        }
    }
    Ok(())
}

fn render_detailed<W: Write>(inventory: &HardwareInventory, out: &mut W) -> fmt::Result {
    write!(out, "\n{}\n  DETAILED HARDWARE INFORMATION\n{}\n", RULE, RULE)?;

    let cpu = inventory.cpu();
    out.write_str("\nCPU Information:\n================\n")?;
    writeln!(out, "Vendor: {}", cpu.vendor_str())?;
    writeln!(
        out,
        "Family: {:02} Model: {:02} Stepping: {}",
        cpu.family, cpu.model, cpu.stepping
    )?;
    out.write_str("Features: ")?;
    for feature in cpu.features() {
        write!(out, "{} ", feature)?;
    }
    out.write_str("\n")?;

    if let Some(hypervisor) = inventory.hypervisor() {
        writeln!(out, "Hypervisor: {}", hypervisor.vendor_str())?;
        if let Some(features) = hypervisor.hyperv_features {
            writeln!(out, "Hyper-V features: {:#010x}", features)?;
        }
    }

    match inventory.pci() {
        Some(pci) => render_pci(pci, out),
        None => Ok(()),
    }
}

pub fn render_pci<W: Write>(pci: &PciInventory, out: &mut W) -> fmt::Result {
    out.write_str("\nPCI Devices:\n============\n")?;
    if pci.is_empty() {
        return out.write_str("No PCI devices found\n");
    }
    for function in pci.functions() {
        writeln!(out, "  {}", function)?;
    }
    if pci.total_found() > pci.functions().len() {
        writeln!(out, "  ... {} more not listed", pci.total_found() - pci.functions().len())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot::BootOptions;
    use ide::{IdeBus, IdeDevice};
    use lib_kernel::cpu::{CpuInfo, CpuidRegs};
    use lib_kernel::sim::{ScriptedCpuid, SimulatedPorts};
    use scsi::{InquiryData, ReadCapacityData, ScsiDevice};

    fn cpu() -> CpuInfo {
        let mut cpuid = ScriptedCpuid::new()
            .leaf(0, CpuidRegs { eax: 1, ebx: 0x6874_7541, ecx: 0x444D_4163, edx: 0x6974_6E65 })
            .leaf(1, CpuidRegs { eax: 0x0000_0F12, ebx: 0, ecx: 1, edx: 1 | (1 << 23) });
        CpuInfo::detect(&mut cpuid)
    }

    fn inventory(verbose: bool) -> HardwareInventory {
        HardwareInventory {
            options: BootOptions { verbose, log_level: None },
            cpu: cpu(),
            hypervisor: None,
            ide_bus: IdeBus::LEGACY,
            ide: IdeRegistry::new(),
            scsi: ScsiRegistry::new(),
            pci: None,
        }
    }

    fn ide_device(channel: u8, drive: u8, kind: DeviceKind, model: &str, size: u32) -> IdeDevice {
        IdeDevice {
            channel,
            drive,
            kind,
            signature: 0,
            capabilities: 0x0200,
            command_sets: 1 << 26,
            size,
            model: model.try_into().expect("model fits"),
        }
    }

    fn rendered(inventory: &HardwareInventory) -> String {
        let mut out = String::new();
        render(inventory, &mut out).expect("rendering into a String cannot fail");
        out
    }

    #[test]
    fn test_empty_report() {
        let out = rendered(&inventory(false));
        assert_eq!(out, "\nIDE Devices:\n============\nNo IDE devices detected\n");
    }

    #[test]
    fn test_ide_listing() {
        let mut inv = inventory(false);
        inv.ide
            .register(ide_device(0, 0, DeviceKind::Ata, "HueOSDisk", 204_800))
            .expect("free slot");
        inv.ide
            .register(ide_device(1, 0, DeviceKind::Atapi, "QEMU DVD-ROM", 0))
            .expect("free slot");

        let out = rendered(&inv);
        assert!(out.contains("Device 0: Primary Master - ATA HDD\n  Model: HueOSDisk\n  Size: 100 MB\n"));
        assert!(out.contains("Device 1: Secondary Master - ATAPI CD/DVD\n  Model: QEMU DVD-ROM\n"));
        assert!(!out.contains("SCSI"));
    }

    #[test]
    fn test_scsi_listing() {
        let mut inv = inventory(false);
        inv.scsi
            .register_controller(scsi::ScsiController {
                kind: scsi::ControllerKind::BusLogic,
                io_base: 0xC000,
                mmio_base: 0,
                irq: 11,
                device_count: 0,
            })
            .expect("free slot");

        let mut wire = [0u8; 36];
        wire[8..16].copy_from_slice(b"QEMU    ");
        wire[16..32].copy_from_slice(b"QEMU HARDDISK   ");
        wire[32..36].copy_from_slice(b"2.5+");
        let inquiry = InquiryData::parse(&wire).expect("full inquiry");
        let capacity = ReadCapacityData::parse(&[0x00, 0x03, 0x1F, 0xFF, 0x00, 0x00, 0x02, 0x00])
            .expect("full capacity");
        inv.scsi
            .register_device(ScsiDevice::new(0, 2, 0, &inquiry, Some(&capacity)))
            .expect("free slot");

        let out = rendered(&inv);
        assert!(out.contains("\nSCSI Devices:\n=============\n"));
        assert!(out.contains("Device 0: Target 2 - SCSI HDD\n"));
        assert!(out.contains("  Vendor: QEMU\n  Product: QEMU HARDDISK\n  Revision: 2.5+\n"));
        assert!(out.contains("  Size: 100 MB (204800 blocks)\n"));
    }

    #[test]
    fn test_verbose_cpu_section() {
        let mut inv = inventory(true);
        inv.pci = Some(PciInventory::scan(&mut SimulatedPorts::new()));

        let out = rendered(&inv);
        assert!(out.contains("  DETAILED HARDWARE INFORMATION\n"));
        assert!(out.contains("Vendor: AuthenticAMD\n"));
        assert!(out.contains("Family: 15 Model: 01 Stepping: 2\n"));
        assert!(out.contains("Features: FPU MMX SSE3 \n"));
        assert!(out.contains("No PCI devices found\n"));
    }

    #[test]
    fn test_verbose_pci_listing() {
        let mut io = SimulatedPorts::new();
        io.set_config_dword(0, 1, 1, 0x00, 0x7010_8086)
            .set_config_dword(0, 1, 1, 0x08, 0x0101_8000);
        let mut inv = inventory(true);
        inv.pci = Some(PciInventory::scan(&mut io));

        let out = rendered(&inv);
        assert!(out.contains("  00:01.1 - Mass Storage (IDE)\n"));
    }
}
