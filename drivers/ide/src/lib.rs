//! Legacy IDE/ATA driver: two fixed channels, IDENTIFY-based detection and
//! single-sector LBA28 PIO transfers.
//!
//! All BSY waits in this driver are unbounded. A drive that never drops BSY
//! hangs the caller; there is no timeout and no way to tell "still busy"
//! from "wedged".
#![cfg_attr(not(test), no_std)]

pub mod consts;
pub mod error;
pub mod types;

use lib_kernel::{log_debug, log_info, log_warn, PortIo};

use consts::*;
pub use error::{IdeError, IdeResult, PollError};
pub use types::{decode_model, DeviceKind, IdeBus, IdeChannel, IdeDevice, IdeRegistry, IdentifyData};

/* ============================================================================
 * LOW-LEVEL REGISTER ACCESS
 * ============================================================================ */

/// Reads a logical register. Registers 0x08-0x0B read CONTROL first.
pub fn ide_read<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel, reg: u8) -> u8 {
    if IdeChannel::is_latched(reg) {
        ide_read(io, channel, ATA_REG_CONTROL);
    }

    match channel.register_port(reg) {
        Some(port) => io.inb(port),
        None => 0,
    }
}

/// Writes a logical register. Registers 0x08-0x0B first latch
/// `0x80 | ctrl` into CONTROL.
pub fn ide_write<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel, reg: u8, data: u8) {
    if IdeChannel::is_latched(reg) {
        ide_write(io, channel, ATA_REG_CONTROL, (u16::from(ATA_CTRL_HOB) | channel.ctrl) as u8);
    }

    if let Some(port) = channel.register_port(reg) {
        io.outb(port, data);
    }
}

/// Reads `buffer.len()` words from a task-file register.
pub fn ide_read_buffer<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel, reg: u8, buffer: &mut [u16]) {
    if IdeChannel::is_latched(reg) {
        ide_read(io, channel, ATA_REG_CONTROL);
    }

    if reg < 0x08 {
        io.insw(channel.base + u16::from(reg), buffer);
    }
}

/// ~1 ms settle delay: a fixed number of reads from the control port.
fn settle<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel) {
    for _ in 0..IDE_SETTLE_READS {
        io.inb(channel.ctrl);
    }
}

fn wait_not_busy<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel) {
    // No timeout: see the crate docs.
    while ide_read(io, channel, ATA_REG_STATUS) & ATA_SR_BSY != 0 {
        core::hint::spin_loop();
    }
}

/// Waits 400 ns, then for BSY to clear. With `advanced_check` the final
/// status is classified: ERR, then DF, then missing DRQ.
pub fn ide_polling<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel, advanced_check: bool) -> Result<(), PollError> {
    for _ in 0..IDE_ALTSTATUS_READS {
        ide_read(io, channel, ATA_REG_ALTSTATUS);
    }

    wait_not_busy(io, channel);

    if advanced_check {
        let state = ide_read(io, channel, ATA_REG_STATUS);

        if state & ATA_SR_ERR != 0 {
            return Err(PollError::CommandError);
        }
        if state & ATA_SR_DF != 0 {
            return Err(PollError::DeviceFault);
        }
        if state & ATA_SR_DRQ == 0 {
            return Err(PollError::DataNotReady);
        }
    }

    Ok(())
}

/* ============================================================================
 * INITIALIZATION AND DETECTION
 * ============================================================================ */

impl IdeBus {
    fn channel(&self, index: u8) -> IdeResult<&IdeChannel> {
        self.channels
            .get(usize::from(index))
            .ok_or(IdeError::InvalidChannel(index))
    }

    /// Disables interrupts (nIEN) on both channels.
    pub fn init<P: PortIo + ?Sized>(&self, io: &mut P) {
        log_info!("Initializing IDE controllers...");
        for channel in &self.channels {
            ide_write(io, channel, ATA_REG_CONTROL, ATA_CTRL_NIEN);
        }
        log_info!("IDE controllers initialized");
    }

    /// Runs IDENTIFY on all four (channel, drive) positions.
    ///
    /// Absent, unknown or erroring positions are skipped; a failure at one
    /// position never stops the others from being probed.
    pub fn detect_devices<P: PortIo + ?Sized>(&self, io: &mut P) -> IdeRegistry {
        log_info!("Detecting IDE devices...");
        let mut registry = IdeRegistry::new();
        let mut data = IdentifyData::new();

        for (index, channel) in self.channels.iter().enumerate() {
            let channel_index = index as u8;
            for drive in 0..IDE_DRIVES_PER_CHANNEL {
                let Some(kind) = identify(io, channel, drive, &mut data) else {
                    continue;
                };

                let device = IdeDevice::from_identify(channel_index, drive, kind, &data);
                log_info!(
                    "IDE {}/{}: {} '{}', {} sectors",
                    device.channel_name(),
                    device.drive_name(),
                    device.kind,
                    device.model(),
                    device.size
                );
                if let Err(device) = registry.register(device) {
                    log_warn!(
                        "IDE registry refused channel {} drive {}",
                        device.channel,
                        device.drive
                    );
                }
            }
        }

        log_info!("IDE device detection complete: {} device(s)", registry.count());
        registry
    }

    /* ========================================================================
     * SECTOR I/O
     * ======================================================================== */

    /// Reads one 512-byte sector (LBA28).
    pub fn read_sector<P: PortIo + ?Sized>(
        &self,
        io: &mut P,
        channel: u8,
        drive: u8,
        lba: u32,
        buffer: &mut [u8; SECTOR_SIZE],
    ) -> IdeResult<()> {
        let ch = self.channel(channel)?;
        start_transfer(io, ch, drive, lba, ATA_CMD_READ_PIO)?;

        let mut words = [0u16; SECTOR_WORDS];
        io.insw(ch.base + u16::from(ATA_REG_DATA), &mut words);
        for (bytes, word) in buffer.chunks_exact_mut(2).zip(words) {
            bytes.copy_from_slice(&word.to_le_bytes());
        }

        Ok(())
    }

    /// Writes one 512-byte sector (LBA28), then flushes the drive cache.
    pub fn write_sector<P: PortIo + ?Sized>(
        &self,
        io: &mut P,
        channel: u8,
        drive: u8,
        lba: u32,
        buffer: &[u8; SECTOR_SIZE],
    ) -> IdeResult<()> {
        let ch = self.channel(channel)?;
        start_transfer(io, ch, drive, lba, ATA_CMD_WRITE_PIO)?;

        let mut words = [0u16; SECTOR_WORDS];
        for (word, bytes) in words.iter_mut().zip(buffer.chunks_exact(2)) {
            *word = u16::from_le_bytes([bytes[0], bytes[1]]);
        }
        io.outsw(ch.base + u16::from(ATA_REG_DATA), &words);

        ide_write(io, ch, ATA_REG_COMMAND, ATA_CMD_CACHE_FLUSH);
        // Flush completion is not checked.
        let _ = ide_polling(io, ch, false);

        Ok(())
    }
}

/// Selects `drive`, issues IDENTIFY and reads the response into `data`.
fn identify<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel, drive: u8, data: &mut IdentifyData) -> Option<DeviceKind> {
    ide_write(io, channel, ATA_REG_HDDEVSEL, ATA_SELECT_IDENTIFY | (drive << 4));
    settle(io, channel);

    ide_write(io, channel, ATA_REG_COMMAND, ATA_CMD_IDENTIFY);
    settle(io, channel);

    if ide_read(io, channel, ATA_REG_STATUS) == 0 {
        log_debug!("IDE {:#x} drive {}: no device", channel.base, drive);
        return None;
    }

    let polled = ide_polling(io, channel, false);

    let lba1 = ide_read(io, channel, ATA_REG_LBA1);
    let lba2 = ide_read(io, channel, ATA_REG_LBA2);
    let kind = match DeviceKind::from_signature(lba1, lba2) {
        Some(DeviceKind::Atapi) => {
            ide_write(io, channel, ATA_REG_COMMAND, ATA_CMD_IDENTIFY_PACKET);
            settle(io, channel);
            DeviceKind::Atapi
        }
        Some(DeviceKind::Ata) if polled.is_ok() => DeviceKind::Ata,
        _ => {
            log_debug!(
                "IDE {:#x} drive {}: unknown signature {:#04x}/{:#04x}",
                channel.base,
                drive,
                lba1,
                lba2
            );
            return None;
        }
    };

    ide_read_buffer(io, channel, ATA_REG_DATA, &mut data.words);
    Some(kind)
}

/// Common LBA28 command setup for a single-sector transfer.
fn start_transfer<P: PortIo + ?Sized>(io: &mut P, channel: &IdeChannel, drive: u8, lba: u32, command: u8) -> IdeResult<()> {
    if drive >= IDE_DRIVES_PER_CHANNEL {
        return Err(IdeError::InvalidDrive(drive));
    }

    wait_not_busy(io, channel);

    let head = ((lba >> 24) & 0x0F) as u8;
    ide_write(io, channel, ATA_REG_HDDEVSEL, ATA_SELECT_LBA | (drive << 4) | head);

    ide_write(io, channel, ATA_REG_SECCOUNT0, 1);
    ide_write(io, channel, ATA_REG_LBA0, lba as u8);
    ide_write(io, channel, ATA_REG_LBA1, (lba >> 8) as u8);
    ide_write(io, channel, ATA_REG_LBA2, (lba >> 16) as u8);

    ide_write(io, channel, ATA_REG_COMMAND, command);

    ide_polling(io, channel, true).map_err(|err| {
        log_warn!("IDE {:#x} drive {}: command {:#04x} failed: {}", channel.base, drive, command, err);
        IdeError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_kernel::sim::SimulatedPorts;

    const PRIMARY_STATUS: u16 = 0x1F7;
    const SECONDARY_STATUS: u16 = 0x177;

    fn ata_words(text: &str) -> Vec<u16> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(40, b' ');
        bytes.chunks(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect()
    }

    fn identify_words(model: &str, sectors: u32, lba48: bool) -> Vec<u16> {
        let mut words = vec![0u16; IDENTIFY_WORDS];
        words[0] = 0x0040;
        words[49] = 0x0200;
        words[27..47].copy_from_slice(&ata_words(model));
        words[60] = sectors as u16;
        words[61] = (sectors >> 16) as u16;
        if lba48 {
            words[83] = 0x0400;
        }
        words
    }

    #[test]
    fn test_init_disables_interrupts_on_both_channels() {
        let mut io = SimulatedPorts::new();
        IdeBus::LEGACY.init(&mut io);

        assert_eq!(io.writes_to(0x3F8), vec![ATA_CTRL_NIEN as u32]);
        assert_eq!(io.writes_to(0x378), vec![ATA_CTRL_NIEN as u32]);
    }

    #[test]
    fn test_latched_write_hits_control_first() {
        let mut io = SimulatedPorts::new();
        ide_write(&mut io, &IdeChannel::PRIMARY, ATA_REG_LBA3, 0x12);

        let writes: Vec<(u16, u32)> = io.writes().iter().map(|w| (w.port, w.value)).collect();
        assert_eq!(writes, vec![(0x3F8, 0xF6), (0x1F3, 0x12)]);
    }

    #[test]
    fn test_latched_read_touches_control_first() {
        let mut io = SimulatedPorts::new();
        io.set(0x374, 0xAB);
        assert_eq!(ide_read(&mut io, &IdeChannel::SECONDARY, ATA_REG_LBA4), 0xAB);
        assert_eq!(io.read_count(0x378), 1);

        ide_read(&mut io, &IdeChannel::SECONDARY, ATA_REG_STATUS);
        assert_eq!(io.read_count(0x378), 1);
    }

    #[test]
    fn test_poll_classification_order() {
        let cases = [
            (0x58, Ok(())),
            (0x59, Err(PollError::CommandError)),
            (0x79, Err(PollError::CommandError)),
            (0x68, Err(PollError::DeviceFault)),
            (0x50, Err(PollError::DataNotReady)),
        ];
        for (status, expected) in cases {
            let mut io = SimulatedPorts::new();
            io.set(PRIMARY_STATUS, status);
            assert_eq!(ide_polling(&mut io, &IdeChannel::PRIMARY, true), expected);
        }

        assert_eq!(PollError::DeviceFault.code(), 1);
        assert_eq!(PollError::CommandError.code(), 2);
        assert_eq!(PollError::DataNotReady.code(), 3);
    }

    #[test]
    fn test_poll_waits_for_busy_to_clear() {
        let mut io = SimulatedPorts::new();
        io.set(PRIMARY_STATUS, 0x58);
        for _ in 0..5 {
            io.queue(PRIMARY_STATUS, 0x80);
        }

        assert_eq!(ide_polling(&mut io, &IdeChannel::PRIMARY, false), Ok(()));
        assert_eq!(io.read_count(0x3F8), 4);
        assert_eq!(io.read_count(PRIMARY_STATUS), 6);
    }

    #[test]
    fn test_detection_probes_all_four_positions() {
        let mut io = SimulatedPorts::new();

        // Primary master: ATA disk. Primary slave: nothing.
        io.queue(PRIMARY_STATUS, 0x58).queue(PRIMARY_STATUS, 0x80).queue(PRIMARY_STATUS, 0x58);
        io.queue(PRIMARY_STATUS, 0x00);
        io.queue_words(0x1F0, &identify_words("HueOSDisk", 0x0003_2000, true));

        // Secondary master: ATAPI. Secondary slave: nothing (sticky 0).
        io.queue(SECONDARY_STATUS, 0x41).queue(SECONDARY_STATUS, 0x00);
        io.queue(0x174, 0x14).queue(0x175, 0xEB);
        io.queue_words(0x170, &identify_words("HueOS CD-ROM", 0, false));

        let registry = IdeBus::LEGACY.detect_devices(&mut io);

        assert_eq!(registry.count(), 2);
        let disk = registry.get(0).unwrap();
        assert_eq!((disk.channel, disk.drive, disk.kind), (0, 0, DeviceKind::Ata));
        assert_eq!(disk.model(), "HueOSDisk");
        assert_eq!(disk.size, 0x0003_2000);
        assert_eq!(disk.signature, 0x0040);
        assert_eq!(disk.capabilities, 0x0200);

        let cd = registry.get(1).unwrap();
        assert_eq!((cd.channel, cd.drive, cd.kind), (1, 0, DeviceKind::Atapi));
        assert_eq!(cd.model(), "HueOS CD-ROM");
        assert_eq!(cd.size, 0);
        assert!(registry.get(2).is_none());

        // Every position was selected and sent IDENTIFY.
        assert_eq!(io.writes_to(0x1F6), vec![0xA0, 0xB0]);
        assert_eq!(io.writes_to(0x176), vec![0xA0, 0xB0]);
        assert_eq!(io.writes_to(0x1F7), vec![0xEC, 0xEC]);
        assert_eq!(io.writes_to(0x177), vec![0xEC, 0xA1, 0xEC]);

        // Settle delays: two per probe, a third after IDENTIFY PACKET.
        assert_eq!(io.read_count(0x3F6), 4 * 1000);
        assert_eq!(io.read_count(0x376), 5 * 1000);
        assert_eq!(io.pending_reads(0x1F0), 0);
        assert_eq!(io.pending_reads(0x170), 0);
    }

    #[test]
    fn test_unknown_signature_is_skipped_without_reading_data() {
        let mut io = SimulatedPorts::new();
        io.queue(PRIMARY_STATUS, 0x50).queue(PRIMARY_STATUS, 0x50);
        io.queue(0x1F4, 0x3C).queue(0x1F5, 0xC3);
        io.queue_words(0x1F0, &[0xBEEF; 4]);

        let registry = IdeBus::LEGACY.detect_devices(&mut io);

        assert!(registry.is_empty());
        assert_eq!(io.pending_reads(0x1F0), 4);
        // Later positions are still probed.
        assert_eq!(io.writes_to(0x176), vec![0xA0, 0xB0]);
    }

    #[test]
    fn test_read_sector_programs_task_file() {
        let mut io = SimulatedPorts::new();
        io.set(PRIMARY_STATUS, 0x58);
        let words: Vec<u16> = (0..256).map(|i| i as u16 | 0xA500).collect();
        io.queue_words(0x1F0, &words);

        let mut buffer = [0u8; SECTOR_SIZE];
        IdeBus::LEGACY
            .read_sector(&mut io, 0, 1, 0x0ABC_DEF1, &mut buffer)
            .unwrap();

        assert_eq!(io.writes_to(0x1F6), vec![0xE0 | 0x10 | 0x0A]);
        assert_eq!(io.writes_to(0x1F2), vec![1]);
        assert_eq!(io.writes_to(0x1F3), vec![0xF1]);
        assert_eq!(io.writes_to(0x1F4), vec![0xDE]);
        assert_eq!(io.writes_to(0x1F5), vec![0xBC]);
        assert_eq!(io.writes_to(0x1F7), vec![ATA_CMD_READ_PIO as u32]);
        assert_eq!(&buffer[..4], &[0x00, 0xA5, 0x01, 0xA5]);
        assert_eq!(io.pending_reads(0x1F0), 0);
    }

    #[test]
    fn test_read_sector_reports_poll_failure() {
        let mut io = SimulatedPorts::new();
        io.set(SECONDARY_STATUS, 0x51);

        let mut buffer = [0u8; SECTOR_SIZE];
        let err = IdeBus::LEGACY
            .read_sector(&mut io, 1, 0, 7, &mut buffer)
            .unwrap_err();

        assert_eq!(err, IdeError::Poll(PollError::CommandError));
        assert_eq!(err.code(), 1);
        assert_eq!(io.read_count(0x170), 0);
    }

    #[test]
    fn test_write_sector_flushes_cache() {
        let mut io = SimulatedPorts::new();
        io.set(PRIMARY_STATUS, 0x58);

        let mut buffer = [0u8; SECTOR_SIZE];
        buffer[0] = 0x34;
        buffer[1] = 0x12;
        IdeBus::LEGACY.write_sector(&mut io, 0, 0, 42, &buffer).unwrap();

        let data = io.writes_to(0x1F0);
        assert_eq!(data.len(), SECTOR_WORDS);
        assert_eq!(data[0], 0x1234);
        assert_eq!(io.writes_to(0x1F7), vec![ATA_CMD_WRITE_PIO as u32, ATA_CMD_CACHE_FLUSH as u32]);
    }

    #[test]
    fn test_write_sector_flush_poll_is_unchecked() {
        let mut io = SimulatedPorts::new();
        io.set(PRIMARY_STATUS, 0x51);
        // BSY wait, WRITE poll and its status check see DRQ; the flush
        // poll then sees ERR and is ignored.
        for _ in 0..3 {
            io.queue(PRIMARY_STATUS, 0x58);
        }

        let buffer = [0u8; SECTOR_SIZE];
        assert!(IdeBus::LEGACY.write_sector(&mut io, 0, 0, 0, &buffer).is_ok());
    }

    #[test]
    fn test_invalid_positions() {
        let mut io = SimulatedPorts::new();
        let mut buffer = [0u8; SECTOR_SIZE];

        assert_eq!(
            IdeBus::LEGACY.read_sector(&mut io, 2, 0, 0, &mut buffer),
            Err(IdeError::InvalidChannel(2))
        );
        assert_eq!(
            IdeBus::LEGACY.write_sector(&mut io, 0, 2, 0, &buffer),
            Err(IdeError::InvalidDrive(2))
        );
        assert!(io.writes().is_empty());
    }
}
