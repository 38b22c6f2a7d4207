//! Command descriptor blocks and response decoding.
//!
//! Multi-byte fields in SCSI responses are big-endian. Responses are first
//! loaded the way the host would overlay them (little-endian words), then
//! swapped into host order with [`swap32`].

use heapless::String;

use crate::consts::*;
use crate::error::{ScsiError, ScsiResult};

pub const fn swap32(val: u32) -> u32 {
    ((val >> 24) & 0xFF) | ((val >> 8) & 0xFF00) | ((val << 8) & 0xFF_0000) | ((val << 24) & 0xFF00_0000)
}

pub const fn swap16(val: u16) -> u16 {
    ((val >> 8) & 0xFF) | ((val << 8) & 0xFF00)
}

/// INQUIRY (6-byte CDB), LUN in bits 7:5 of byte 1.
pub const fn inquiry_cdb(lun: u8) -> [u8; 6] {
    [SCSI_CMD_INQUIRY, lun << 5, 0, 0, INQUIRY_DATA_LEN as u8, 0]
}

/// READ CAPACITY(10).
pub const fn read_capacity_cdb(lun: u8) -> [u8; 10] {
    [SCSI_CMD_READ_CAPACITY_10, lun << 5, 0, 0, 0, 0, 0, 0, 0, 0]
}

/// Copies an INQUIRY string field up to the first NUL and trims trailing
/// spaces.
pub fn scsi_string<const N: usize>(field: &[u8]) -> String<N> {
    let mut out = String::new();
    for &byte in field.iter().take(N) {
        if byte == 0 {
            break;
        }
        let ch = if byte.is_ascii() { byte as char } else { '?' };
        if out.push(ch).is_err() {
            break;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

fn check_len(data: &[u8], expected: usize) -> ScsiResult<()> {
    if data.len() < expected {
        return Err(ScsiError::ShortResponse {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Standard INQUIRY data, first 36 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryData {
    pub peripheral_type: u8,
    pub removable: bool,
    pub version: u8,
    pub response_format: u8,
    pub additional_length: u8,
    pub vendor: String<SCSI_VENDOR_LEN>,
    pub product: String<SCSI_PRODUCT_LEN>,
    pub revision: String<SCSI_REVISION_LEN>,
}

impl InquiryData {
    pub fn parse(data: &[u8]) -> ScsiResult<Self> {
        check_len(data, INQUIRY_DATA_LEN)?;
        Ok(InquiryData {
            peripheral_type: data[0],
            removable: data[1] & 0x80 != 0,
            version: data[2],
            response_format: data[3] & 0x0F,
            additional_length: data[4],
            vendor: scsi_string(&data[8..16]),
            product: scsi_string(&data[16..32]),
            revision: scsi_string(&data[32..36]),
        })
    }

    /// False for the "no device at this LUN" peripheral byte.
    pub fn is_present(&self) -> bool {
        self.peripheral_type != SCSI_TYPE_NO_DEVICE
    }
}

/// READ CAPACITY(10) response as loaded from the wire, still big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCapacityData {
    pub last_lba: u32,
    pub block_size: u32,
}

impl ReadCapacityData {
    pub fn parse(data: &[u8]) -> ScsiResult<Self> {
        check_len(data, READ_CAPACITY_DATA_LEN)?;
        Ok(ReadCapacityData {
            last_lba: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            block_size: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        })
    }

    /// `last_lba + 1` in host order.
    pub const fn block_count(&self) -> u32 {
        swap32(self.last_lba).wrapping_add(1)
    }

    pub const fn block_size(&self) -> u32 {
        swap32(self.block_size)
    }
}
