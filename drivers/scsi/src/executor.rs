//! Command execution seam.
//!
//! The probe code builds real CDBs and decodes real wire-format responses;
//! what sits in between is a [`CommandExecutor`]. The only executor today is
//! [`SyntheticExecutor`], which answers INQUIRY and READ CAPACITY with a
//! fixed QEMU-style 100 MB disk on every target. A mailbox/CCB executor for
//! the BusLogic adapter would slot in behind the same trait.

use crate::cdb::swap32;
use crate::consts::*;
use crate::error::{ScsiError, ScsiResult};
use crate::types::ScsiController;

/// Addressing of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTarget<'a> {
    pub controller_id: u8,
    pub controller: &'a ScsiController,
    pub target: u8,
    pub lun: u8,
}

pub trait CommandExecutor {
    /// Runs `cdb` against `target`, filling `response` with the raw wire
    /// bytes. Returns the number of bytes written.
    fn execute(&mut self, target: CommandTarget<'_>, cdb: &[u8], response: &mut [u8]) -> ScsiResult<usize>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &mut E {
    fn execute(&mut self, target: CommandTarget<'_>, cdb: &[u8], response: &mut [u8]) -> ScsiResult<usize> {
        (**self).execute(target, cdb, response)
    }
}

/// Fixed identity returned for every probed target.
const SYNTHETIC_VENDOR: &[u8; 8] = b"QEMU    ";
const SYNTHETIC_PRODUCT: &[u8; 16] = b"HARDDISK        ";
const SYNTHETIC_REVISION: &[u8; 4] = b"2.5+";
/// 100 MB: 204800 blocks of 512 bytes.
const SYNTHETIC_LAST_LBA: u32 = 204_799;
const SYNTHETIC_BLOCK_SIZE: u32 = 512;

/// Stand-in executor that never touches the bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticExecutor;

impl SyntheticExecutor {
    pub const fn new() -> Self {
        SyntheticExecutor
    }

    fn inquiry(response: &mut [u8]) -> usize {
        let mut data = [0u8; INQUIRY_DATA_LEN];
        data[0] = SCSI_TYPE_DISK;
        data[1] = 0; // not removable
        data[2] = 2; // SCSI-2
        data[3] = 2; // response data format
        data[4] = 31; // additional length
        data[8..16].copy_from_slice(SYNTHETIC_VENDOR);
        data[16..32].copy_from_slice(SYNTHETIC_PRODUCT);
        data[32..36].copy_from_slice(SYNTHETIC_REVISION);

        copy_response(&data, response)
    }

    fn read_capacity(response: &mut [u8]) -> usize {
        // Stored the way a host overlay of the big-endian wire data reads it.
        let mut data = [0u8; READ_CAPACITY_DATA_LEN];
        data[..4].copy_from_slice(&swap32(SYNTHETIC_LAST_LBA).to_le_bytes());
        data[4..].copy_from_slice(&swap32(SYNTHETIC_BLOCK_SIZE).to_le_bytes());

        copy_response(&data, response)
    }
}

fn copy_response(data: &[u8], response: &mut [u8]) -> usize {
    let len = data.len().min(response.len());
    response[..len].copy_from_slice(&data[..len]);
    len
}

impl CommandExecutor for SyntheticExecutor {
    fn execute(&mut self, _target: CommandTarget<'_>, cdb: &[u8], response: &mut [u8]) -> ScsiResult<usize> {
        match cdb.first().copied() {
            Some(SCSI_CMD_INQUIRY) => {
                let allocation = cdb.get(4).copied().map_or(response.len(), usize::from);
                let len = allocation.min(response.len());
                Ok(Self::inquiry(&mut response[..len]))
            }
            Some(SCSI_CMD_READ_CAPACITY_10) => Ok(Self::read_capacity(response)),
            Some(op) => Err(ScsiError::UnsupportedCommand(op)),
            None => Err(ScsiError::UnsupportedCommand(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::{inquiry_cdb, read_capacity_cdb, InquiryData, ReadCapacityData};
    use crate::types::ControllerKind;

    const CONTROLLER: ScsiController = ScsiController {
        kind: ControllerKind::BusLogic,
        io_base: 0xE000,
        mmio_base: 0,
        irq: 11,
        device_count: 0,
    };

    fn target(target: u8) -> CommandTarget<'static> {
        CommandTarget {
            controller_id: 0,
            controller: &CONTROLLER,
            target,
            lun: 0,
        }
    }

    #[test]
    fn test_synthetic_inquiry() {
        let mut response = [0u8; INQUIRY_DATA_LEN];
        let len = SyntheticExecutor
            .execute(target(5), &inquiry_cdb(0), &mut response)
            .unwrap();
        assert_eq!(len, 36);

        let inquiry = InquiryData::parse(&response).unwrap();
        assert_eq!(inquiry.peripheral_type, SCSI_TYPE_DISK);
        assert_eq!((inquiry.version, inquiry.response_format), (2, 2));
        assert_eq!(inquiry.additional_length, 31);
        assert_eq!(inquiry.vendor.as_str(), "QEMU");
        assert_eq!(inquiry.product.as_str(), "HARDDISK");
        assert_eq!(inquiry.revision.as_str(), "2.5+");
        assert!(!inquiry.removable);
    }

    #[test]
    fn test_synthetic_inquiry_honours_allocation_length() {
        let mut cdb = inquiry_cdb(0);
        cdb[4] = 8;
        let mut response = [0xAAu8; INQUIRY_DATA_LEN];
        let len = SyntheticExecutor.execute(target(0), &cdb, &mut response).unwrap();

        assert_eq!(len, 8);
        assert_eq!(response[8], 0xAA);
    }

    #[test]
    fn test_synthetic_capacity_is_big_endian_on_the_wire() {
        let mut response = [0u8; READ_CAPACITY_DATA_LEN];
        SyntheticExecutor
            .execute(target(0), &read_capacity_cdb(0), &mut response)
            .unwrap();

        assert_eq!(response, [0x00, 0x03, 0x1F, 0xFF, 0x00, 0x00, 0x02, 0x00]);
        let capacity = ReadCapacityData::parse(&response).unwrap();
        assert_eq!(capacity.block_count(), 204_800);
        assert_eq!(capacity.block_size(), 512);
    }

    #[test]
    fn test_other_commands_are_unsupported() {
        let mut response = [0u8; 8];
        assert_eq!(
            SyntheticExecutor.execute(target(0), &[0x28; 10], &mut response),
            Err(ScsiError::UnsupportedCommand(0x28))
        );
        assert!(SyntheticExecutor.execute(target(0), &[], &mut response).is_err());
    }
}
