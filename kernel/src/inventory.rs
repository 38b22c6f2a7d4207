//! The hardware inventory built once at boot.

use ide::{IdeBus, IdeDevice, IdeRegistry, IdeResult};
use lib_kernel::cpu::{CpuInfo, HypervisorInfo};
use lib_kernel::PortIo;
use pci::PciInventory;
use scsi::{ScsiController, ScsiDevice, ScsiRegistry, ScsiResult};

use crate::boot::BootOptions;

/// Everything the boot-time detection pass found.
///
/// Built by [`crate::init::init_hardware`] and handed by reference to
/// whatever consumes it. Nothing in it changes after construction.
#[derive(Debug, Clone)]
pub struct HardwareInventory {
    pub(crate) options: BootOptions,
    pub(crate) cpu: CpuInfo,
    pub(crate) hypervisor: Option<HypervisorInfo>,
    pub(crate) ide_bus: IdeBus,
    pub(crate) ide: IdeRegistry,
    pub(crate) scsi: ScsiRegistry,
    pub(crate) pci: Option<PciInventory>,
}

impl HardwareInventory {
    pub fn options(&self) -> &BootOptions {
        &self.options
    }

    pub fn cpu(&self) -> &CpuInfo {
        &self.cpu
    }

    pub fn hypervisor(&self) -> Option<&HypervisorInfo> {
        self.hypervisor.as_ref()
    }

    /// PCI listing; only collected in verbose mode.
    pub fn pci(&self) -> Option<&PciInventory> {
        self.pci.as_ref()
    }

    pub fn ide_devices(&self) -> &IdeRegistry {
        &self.ide
    }

    pub fn ide_device_count(&self) -> usize {
        self.ide.count()
    }

    pub fn ide_device(&self, index: usize) -> Option<&IdeDevice> {
        self.ide.get(index)
    }

    pub fn scsi(&self) -> &ScsiRegistry {
        &self.scsi
    }

    pub fn scsi_controller_count(&self) -> usize {
        self.scsi.controller_count()
    }

    pub fn scsi_controller(&self, index: usize) -> Option<&ScsiController> {
        self.scsi.controller(index)
    }

    pub fn scsi_device_count(&self) -> usize {
        self.scsi.device_count()
    }

    pub fn scsi_device(&self, index: usize) -> Option<&ScsiDevice> {
        self.scsi.device(index)
    }

    pub fn ide_read_sector<P: PortIo + ?Sized>(
        &self,
        io: &mut P,
        channel: u8,
        drive: u8,
        lba: u32,
        buffer: &mut [u8; ide::consts::SECTOR_SIZE],
    ) -> IdeResult<()> {
        self.ide_bus.read_sector(io, channel, drive, lba, buffer)
    }

    pub fn ide_write_sector<P: PortIo + ?Sized>(
        &self,
        io: &mut P,
        channel: u8,
        drive: u8,
        lba: u32,
        buffer: &[u8; ide::consts::SECTOR_SIZE],
    ) -> IdeResult<()> {
        self.ide_bus.write_sector(io, channel, drive, lba, buffer)
    }

    pub fn scsi_read_sector(&self, device_id: u8, lba: u32, buffer: &mut [u8; scsi::consts::SCSI_SECTOR_SIZE]) -> ScsiResult<()> {
        self.scsi.read_sector(device_id, lba, buffer)
    }

    pub fn scsi_write_sector(&self, device_id: u8, lba: u32, buffer: &[u8; scsi::consts::SCSI_SECTOR_SIZE]) -> ScsiResult<()> {
        self.scsi.write_sector(device_id, lba, buffer)
    }

    pub fn scsi_read_blocks(&self, device_id: u8, lba: u32, count: u16, buffer: &mut [u8]) -> ScsiResult<()> {
        self.scsi.read_blocks(device_id, lba, count, buffer)
    }

    pub fn scsi_write_blocks(&self, device_id: u8, lba: u32, count: u16, buffer: &[u8]) -> ScsiResult<()> {
        self.scsi.write_blocks(device_id, lba, count, buffer)
    }
}
