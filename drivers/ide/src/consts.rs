#![allow(unused)]

// Legacy channel ports
pub const ATA_PRIMARY_IO: u16 = 0x1F0;
pub const ATA_PRIMARY_CTRL: u16 = 0x3F6;
pub const ATA_SECONDARY_IO: u16 = 0x170;
pub const ATA_SECONDARY_CTRL: u16 = 0x376;

// ATA Status Register bits
pub const ATA_SR_BSY: u8 = 0x80;    // Busy
pub const ATA_SR_DRDY: u8 = 0x40;   // Drive ready
pub const ATA_SR_DF: u8 = 0x20;     // Drive write fault
pub const ATA_SR_DSC: u8 = 0x10;    // Drive seek complete
pub const ATA_SR_DRQ: u8 = 0x08;    // Data request ready
pub const ATA_SR_CORR: u8 = 0x04;   // Corrected data
pub const ATA_SR_IDX: u8 = 0x02;    // Index
pub const ATA_SR_ERR: u8 = 0x01;    // Error

// ATA Commands
pub const ATA_CMD_READ_PIO: u8 = 0x20;
pub const ATA_CMD_WRITE_PIO: u8 = 0x30;
pub const ATA_CMD_CACHE_FLUSH: u8 = 0xE7;
pub const ATA_CMD_IDENTIFY_PACKET: u8 = 0xA1;
pub const ATA_CMD_IDENTIFY: u8 = 0xEC;

// Logical register numbers. 0x00-0x07 are the task file, 0x08-0x0B the
// LBA48 high-order shadows, 0x0C-0x0D the control block.
pub const ATA_REG_DATA: u8 = 0x00;
pub const ATA_REG_ERROR: u8 = 0x01;
pub const ATA_REG_FEATURES: u8 = 0x01;
pub const ATA_REG_SECCOUNT0: u8 = 0x02;
pub const ATA_REG_LBA0: u8 = 0x03;
pub const ATA_REG_LBA1: u8 = 0x04;
pub const ATA_REG_LBA2: u8 = 0x05;
pub const ATA_REG_HDDEVSEL: u8 = 0x06;
pub const ATA_REG_COMMAND: u8 = 0x07;
pub const ATA_REG_STATUS: u8 = 0x07;
pub const ATA_REG_SECCOUNT1: u8 = 0x08;
pub const ATA_REG_LBA3: u8 = 0x09;
pub const ATA_REG_LBA4: u8 = 0x0A;
pub const ATA_REG_LBA5: u8 = 0x0B;
pub const ATA_REG_CONTROL: u8 = 0x0C;
pub const ATA_REG_ALTSTATUS: u8 = 0x0C;
pub const ATA_REG_DEVADDRESS: u8 = 0x0D;
/// One past the highest mapped logical register.
pub const ATA_REG_LIMIT: u8 = 0x16;

// Device control values
pub const ATA_CTRL_NIEN: u8 = 0x02;
pub const ATA_CTRL_HOB: u8 = 0x80;

// Drive select bases
pub const ATA_SELECT_IDENTIFY: u8 = 0xA0;
pub const ATA_SELECT_LBA: u8 = 0xE0;

// IDENTIFY data word offsets
pub const ATA_IDENT_SIGNATURE: usize = 0;
pub const ATA_IDENT_MODEL: usize = 27;
pub const ATA_IDENT_MODEL_WORDS: usize = 20;
pub const ATA_IDENT_CAPABILITIES: usize = 49;
pub const ATA_IDENT_MAX_LBA: usize = 60;
pub const ATA_IDENT_COMMANDSETS: usize = 82;

/// Command-set bit that gates the size field (LBA48 supported).
pub const ATA_COMMANDSET_LBA48: u32 = 1 << 26;

// LBA1/LBA2 signatures that mark a packet device
pub const ATAPI_SIGNATURE_PATA: (u8, u8) = (0x14, 0xEB);
pub const ATAPI_SIGNATURE_SATA: (u8, u8) = (0x69, 0x96);

pub const SECTOR_SIZE: usize = 512;
pub const SECTOR_WORDS: usize = SECTOR_SIZE / 2;
pub const IDENTIFY_WORDS: usize = 256;

/// Control-port reads making up the ~1 ms settle delay.
pub const IDE_SETTLE_READS: u32 = 1000;
/// Alternate-status reads making up the 400 ns delay before polling.
pub const IDE_ALTSTATUS_READS: u32 = 4;

pub const IDE_CHANNELS: u8 = 2;
pub const IDE_DRIVES_PER_CHANNEL: u8 = 2;
pub const IDE_MAX_DEVICES: usize = 4;
pub const IDE_MODEL_LEN: usize = 40;
