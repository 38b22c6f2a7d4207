use core::fmt;

use heapless::{String, Vec};

use crate::consts::*;

/// I/O and control port bases of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeChannel {
    pub base: u16,
    pub ctrl: u16,
}

impl IdeChannel {
    pub const PRIMARY: IdeChannel = IdeChannel {
        base: ATA_PRIMARY_IO,
        ctrl: ATA_PRIMARY_CTRL,
    };
    pub const SECONDARY: IdeChannel = IdeChannel {
        base: ATA_SECONDARY_IO,
        ctrl: ATA_SECONDARY_CTRL,
    };

    /// Physical port behind a logical register number.
    ///
    /// | logical       | physical           |
    /// |---------------|--------------------|
    /// | `0x00..0x08`  | `base + reg`       |
    /// | `0x08..0x0C`  | `base + reg - 6`   |
    /// | `0x0C..0x0E`  | `ctrl + reg - 0x0A`|
    /// | `0x0E..0x16`  | `base + reg - 0x0E`|
    pub const fn register_port(&self, reg: u8) -> Option<u16> {
        let reg = reg as u16;
        if reg < 0x08 {
            Some(self.base + reg)
        } else if reg < 0x0C {
            Some(self.base + reg - 0x06)
        } else if reg < 0x0E {
            Some(self.ctrl + reg - 0x0A)
        } else if reg < ATA_REG_LIMIT as u16 {
            Some(self.base + reg - 0x0E)
        } else {
            None
        }
    }

    /// Registers whose access goes through the CONTROL latch first.
    pub const fn is_latched(reg: u8) -> bool {
        reg > 0x07 && reg < 0x0C
    }
}

/// The channel table. Channel 0 is primary, channel 1 secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeBus {
    pub channels: [IdeChannel; IDE_CHANNELS as usize],
}

impl IdeBus {
    pub const LEGACY: IdeBus = IdeBus {
        channels: [IdeChannel::PRIMARY, IdeChannel::SECONDARY],
    };
}

impl Default for IdeBus {
    fn default() -> Self {
        Self::LEGACY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Ata,
    Atapi,
}

impl DeviceKind {
    /// Classifies the LBA1/LBA2 signature left behind by IDENTIFY.
    ///
    /// `(0, 0)` is a plain ATA disk; the two packet signatures are ATAPI;
    /// anything else is unknown.
    pub const fn from_signature(lba1: u8, lba2: u8) -> Option<DeviceKind> {
        match (lba1, lba2) {
            ATAPI_SIGNATURE_PATA | ATAPI_SIGNATURE_SATA => Some(DeviceKind::Atapi),
            (0, 0) => Some(DeviceKind::Ata),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Ata => write!(f, "ATA"),
            DeviceKind::Atapi => write!(f, "ATAPI"),
        }
    }
}

/// The 256-word IDENTIFY (PACKET) DEVICE response.
#[derive(Clone)]
pub struct IdentifyData {
    pub words: [u16; IDENTIFY_WORDS],
}

impl IdentifyData {
    pub const fn new() -> Self {
        Self {
            words: [0; IDENTIFY_WORDS],
        }
    }

    pub fn signature(&self) -> u16 {
        self.words[ATA_IDENT_SIGNATURE]
    }

    pub fn capabilities(&self) -> u16 {
        self.words[ATA_IDENT_CAPABILITIES]
    }

    /// Words 82 (low) and 83 (high).
    pub fn command_sets(&self) -> u32 {
        self.dword(ATA_IDENT_COMMANDSETS)
    }

    /// Words 60 (low) and 61 (high): addressable sectors in LBA28 mode.
    pub fn max_lba(&self) -> u32 {
        self.dword(ATA_IDENT_MAX_LBA)
    }

    /// Sector count as recorded in the registry: the LBA28 count, but only
    /// when the LBA48 command-set bit is set.
    pub fn size(&self) -> u32 {
        if self.command_sets() & ATA_COMMANDSET_LBA48 != 0 {
            self.max_lba()
        } else {
            0
        }
    }

    pub fn model(&self) -> String<IDE_MODEL_LEN> {
        decode_model(&self.words[ATA_IDENT_MODEL..ATA_IDENT_MODEL + ATA_IDENT_MODEL_WORDS])
    }

    fn dword(&self, word: usize) -> u32 {
        u32::from(self.words[word]) | (u32::from(self.words[word + 1]) << 16)
    }
}

impl Default for IdentifyData {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes an ATA string: each word holds two characters, high byte first.
///
/// Decoding stops at a NUL, trailing spaces are trimmed and non-ASCII bytes
/// become `?`.
pub fn decode_model(words: &[u16]) -> String<IDE_MODEL_LEN> {
    let mut model = String::new();
    'words: for &word in words {
        for byte in word.to_be_bytes() {
            if byte == 0 {
                break 'words;
            }
            let ch = if byte.is_ascii() { byte as char } else { '?' };
            if model.push(ch).is_err() {
                break 'words;
            }
        }
    }

    while model.ends_with(' ') {
        model.pop();
    }
    model
}

/// One detected drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeDevice {
    /// Primary (0) or Secondary (1) channel
    pub channel: u8,
    /// Master (0) or Slave (1) drive
    pub drive: u8,
    pub kind: DeviceKind,
    pub signature: u16,
    pub capabilities: u16,
    pub command_sets: u32,
    /// Size in 512-byte sectors, see [`IdentifyData::size`].
    pub size: u32,
    pub model: String<IDE_MODEL_LEN>,
}

impl IdeDevice {
    pub fn from_identify(channel: u8, drive: u8, kind: DeviceKind, data: &IdentifyData) -> Self {
        IdeDevice {
            channel,
            drive,
            kind,
            signature: data.signature(),
            capabilities: data.capabilities(),
            command_sets: data.command_sets(),
            size: data.size(),
            model: data.model(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Capacity in bytes; packet devices report 0.
    pub fn size_bytes(&self) -> u64 {
        match self.kind {
            DeviceKind::Ata => u64::from(self.size) * SECTOR_SIZE as u64,
            DeviceKind::Atapi => 0,
        }
    }

    /// Whole megabytes, as shown in the boot report.
    pub fn size_mb(&self) -> u32 {
        self.size / 2048
    }

    pub fn channel_name(&self) -> &'static str {
        if self.channel == 0 {
            "Primary"
        } else {
            "Secondary"
        }
    }

    pub fn drive_name(&self) -> &'static str {
        if self.drive == 0 {
            "Master"
        } else {
            "Slave"
        }
    }
}

/// Detected drives in detection order, at most one per (channel, drive).
#[derive(Debug, Clone, Default)]
pub struct IdeRegistry {
    devices: Vec<IdeDevice, IDE_MAX_DEVICES>,
}

impl IdeRegistry {
    pub const fn new() -> Self {
        Self { devices: Vec::new() }
    }

    /// Appends a device. Returns it back when the registry is full or the
    /// (channel, drive) pair is already present.
    pub fn register(&mut self, device: IdeDevice) -> Result<usize, IdeDevice> {
        if self
            .devices
            .iter()
            .any(|d| d.channel == device.channel && d.drive == device.drive)
        {
            return Err(device);
        }
        let index = self.devices.len();
        self.devices.push(device)?;
        Ok(index)
    }

    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// `None` for any index outside `0..count()`.
    pub fn get(&self, index: usize) -> Option<&IdeDevice> {
        self.devices.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, IdeDevice> {
        self.devices.iter()
    }
}
