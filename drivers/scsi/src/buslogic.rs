//! BusLogic (BT-958 family) host adapter bring-up.
//!
//! Unlike the IDE BSY waits, every wait here is bounded: the host-ready
//! poll gives up after [`BusLogicConfig::ready_retries`] status reads.

use lib_kernel::port::spin_delay;
use lib_kernel::{log_info, log_warn, PortIo};

use crate::consts::*;
use crate::error::{ScsiError, ScsiResult};

/// Timing knobs for adapter bring-up, in spin iterations and status reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusLogicConfig {
    /// Status reads before a ready-wait gives up.
    pub ready_retries: u32,
    /// Spin iterations after writing the soft-reset bit.
    pub reset_delay: u32,
    /// Spin iterations between two status reads.
    pub poll_delay: u32,
}

impl Default for BusLogicConfig {
    fn default() -> Self {
        BusLogicConfig {
            ready_retries: BUSLOGIC_READY_RETRIES,
            reset_delay: BUSLOGIC_RESET_DELAY,
            poll_delay: BUSLOGIC_POLL_DELAY,
        }
    }
}

/// One adapter, addressed by its I/O base.
#[derive(Debug, Clone, Copy)]
pub struct BusLogic {
    io_base: u16,
    config: BusLogicConfig,
}

impl BusLogic {
    pub const fn new(io_base: u16, config: BusLogicConfig) -> Self {
        BusLogic { io_base, config }
    }

    pub const fn io_base(&self) -> u16 {
        self.io_base
    }

    /// Polls the host-ready bit. Returns `false` once the retry budget is
    /// spent.
    pub fn wait_ready<P: PortIo + ?Sized>(&self, io: &mut P) -> bool {
        for _ in 0..self.config.ready_retries {
            let status = io.inb(self.io_base + BUSLOGIC_REG_STATUS);
            if status & BUSLOGIC_STATUS_HOST_READY != 0 {
                return true;
            }
            spin_delay(self.config.poll_delay);
        }
        false
    }

    /// Writes the soft-reset bit, lets the adapter settle and waits for it.
    /// The outcome of that wait is not reported.
    pub fn soft_reset<P: PortIo + ?Sized>(&self, io: &mut P) {
        io.outb(self.io_base + BUSLOGIC_REG_CONTROL, BUSLOGIC_CTRL_SOFT_RESET);
        spin_delay(self.config.reset_delay);
        self.wait_ready(io);
    }

    /// Resets the adapter and checks that it comes back ready.
    pub fn init<P: PortIo + ?Sized>(&self, io: &mut P) -> ScsiResult<()> {
        log_info!("Initializing BusLogic controller at I/O {:#06x}", self.io_base);

        self.soft_reset(io);

        if !self.wait_ready(io) {
            log_warn!("  Controller not ready");
            return Err(ScsiError::ControllerNotReady);
        }

        log_info!("  BusLogic controller initialized");
        Ok(())
    }
}
