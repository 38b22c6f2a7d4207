use core::fmt;

use heapless::{String, Vec};

use crate::cdb::{InquiryData, ReadCapacityData};
use crate::consts::*;
use crate::error::{ScsiError, ScsiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    BusLogic,
    LsiLogic,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerKind::BusLogic => write!(f, "BusLogic BT-958"),
            ControllerKind::LsiLogic => write!(f, "LSI Logic"),
        }
    }
}

/// A host adapter that came up and was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScsiController {
    pub kind: ControllerKind,
    pub io_base: u16,
    pub mmio_base: u32,
    pub irq: u8,
    /// Devices registered behind this controller.
    pub device_count: u8,
}

/// A target that answered INQUIRY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScsiDevice {
    pub controller_id: u8,
    pub target: u8,
    pub lun: u8,
    pub peripheral_type: u8,
    pub block_count: u32,
    pub block_size: u32,
    pub vendor: String<SCSI_VENDOR_LEN>,
    pub product: String<SCSI_PRODUCT_LEN>,
    pub revision: String<SCSI_REVISION_LEN>,
}

impl ScsiDevice {
    pub fn new(controller_id: u8, target: u8, lun: u8, inquiry: &InquiryData, capacity: Option<&ReadCapacityData>) -> Self {
        let (block_count, block_size) = match capacity {
            Some(capacity) => (capacity.block_count(), capacity.block_size()),
            None => (0, 0),
        };
        ScsiDevice {
            controller_id,
            target,
            lun,
            peripheral_type: inquiry.peripheral_type,
            block_count,
            block_size,
            vendor: inquiry.vendor.clone(),
            product: inquiry.product.clone(),
            revision: inquiry.revision.clone(),
        }
    }

    pub fn is_disk(&self) -> bool {
        self.peripheral_type == SCSI_TYPE_DISK
    }

    /// Whole megabytes, computed in 32 bits as the boot report shows them.
    pub fn size_mb(&self) -> u32 {
        self.block_count.wrapping_mul(self.block_size) / (1024 * 1024)
    }

    /// Short label for the console listing.
    pub fn type_label(&self) -> &'static str {
        match self.peripheral_type {
            SCSI_TYPE_DISK => "SCSI HDD",
            SCSI_TYPE_CDROM => "SCSI CD/DVD",
            SCSI_TYPE_TAPE => "SCSI Tape",
            _ => "SCSI Device",
        }
    }

    /// Long label for the serial log.
    pub fn type_description(&self) -> &'static str {
        match self.peripheral_type {
            SCSI_TYPE_DISK => "SCSI Hard Disk",
            SCSI_TYPE_CDROM => "SCSI Optical Drive",
            SCSI_TYPE_TAPE => "SCSI Tape Drive",
            _ => "SCSI Device",
        }
    }
}

/// Controllers and devices, each capped at a fixed capacity.
#[derive(Debug, Clone, Default)]
pub struct ScsiRegistry {
    controllers: Vec<ScsiController, SCSI_MAX_CONTROLLERS>,
    devices: Vec<ScsiDevice, SCSI_MAX_DEVICES>,
}

impl ScsiRegistry {
    pub const fn new() -> Self {
        Self {
            controllers: Vec::new(),
            devices: Vec::new(),
        }
    }

    pub fn register_controller(&mut self, controller: ScsiController) -> ScsiResult<u8> {
        let id = self.controllers.len() as u8;
        self.controllers
            .push(controller)
            .map_err(|_| ScsiError::RegistryFull)?;
        Ok(id)
    }

    /// Registers a device behind an already registered controller and bumps
    /// that controller's device count.
    pub fn register_device(&mut self, device: ScsiDevice) -> ScsiResult<u8> {
        let controller_id = device.controller_id;
        if usize::from(controller_id) >= self.controllers.len() {
            return Err(ScsiError::InvalidController(controller_id));
        }
        if self.devices.iter().any(|d| {
            d.controller_id == device.controller_id && d.target == device.target && d.lun == device.lun
        }) {
            return Err(ScsiError::DuplicateTarget);
        }

        let id = self.devices.len() as u8;
        self.devices.push(device).map_err(|_| ScsiError::RegistryFull)?;
        if let Some(controller) = self.controllers.get_mut(usize::from(controller_id)) {
            controller.device_count = controller.device_count.saturating_add(1);
        }
        Ok(id)
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// `None` for any index outside `0..controller_count()`.
    pub fn controller(&self, index: usize) -> Option<&ScsiController> {
        self.controllers.get(index)
    }

    /// `None` for any index outside `0..device_count()`.
    pub fn device(&self, index: usize) -> Option<&ScsiDevice> {
        self.devices.get(index)
    }

    pub fn controllers(&self) -> &[ScsiController] {
        &self.controllers
    }

    pub fn devices(&self) -> &[ScsiDevice] {
        &self.devices
    }
}
