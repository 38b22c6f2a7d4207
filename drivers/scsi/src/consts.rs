// Peripheral device types (INQUIRY byte 0)
pub const SCSI_TYPE_DISK: u8 = 0x00;
pub const SCSI_TYPE_TAPE: u8 = 0x01;
pub const SCSI_TYPE_CDROM: u8 = 0x05;
pub const SCSI_TYPE_NO_DEVICE: u8 = 0x7F;

// SCSI Commands
pub const SCSI_CMD_INQUIRY: u8 = 0x12;
pub const SCSI_CMD_READ_CAPACITY_10: u8 = 0x25;

// PCI identification
pub const BUSLOGIC_VENDOR_ID: u16 = 0x104B;
pub const BUSLOGIC_DEVICE_ID: u16 = 0x1040;
pub const LSI_VENDOR_ID: u16 = 0x1000;
pub const LSI_53C895A_DEVICE_ID: u16 = 0x0012;
pub const LSI_53C1030_DEVICE_ID: u16 = 0x0030;

// BusLogic registers (offsets from the I/O base)
pub const BUSLOGIC_REG_CONTROL: u16 = 0x00;
pub const BUSLOGIC_REG_STATUS: u16 = 0x00;

// BusLogic status and control bits
pub const BUSLOGIC_STATUS_HOST_READY: u8 = 0x08;
pub const BUSLOGIC_CTRL_SOFT_RESET: u8 = 0x80;

// Bring-up timing, in spin iterations / status reads
pub const BUSLOGIC_READY_RETRIES: u32 = 10_000;
pub const BUSLOGIC_RESET_DELAY: u32 = 10_000;
pub const BUSLOGIC_POLL_DELAY: u32 = 100;

// BAR0 flag bits cleared to obtain the I/O base
pub const PCI_BAR_FLAGS_MASK: u32 = 0x0000_000F;

// Response sizes
pub const INQUIRY_DATA_LEN: usize = 36;
pub const READ_CAPACITY_DATA_LEN: usize = 8;
pub const SCSI_SECTOR_SIZE: usize = 512;

// Probe range
pub const SCSI_MAX_TARGETS: u8 = 8;
pub const SCSI_MAX_LUNS: u8 = 1;

// Registry capacities
pub const SCSI_MAX_DEVICES: usize = 16;
pub const SCSI_MAX_CONTROLLERS: usize = 4;

// String field widths
pub const SCSI_VENDOR_LEN: usize = 8;
pub const SCSI_PRODUCT_LEN: usize = 16;
pub const SCSI_REVISION_LEN: usize = 4;
