//! Bus enumeration driven by a [`ScanPlan`].

use core::fmt;

use heapless::Vec;
use lib_kernel::{log_debug, log_info, PortIo};

use crate::class::{mass_storage_label, PciClass, CLASS_MASS_STORAGE};
use crate::config::{read_config_dword, vendor_absent, REG_CLASS_REVISION, REG_VENDOR_ID};

/// How many functions the boot inventory keeps.
pub const PCI_INVENTORY_CAPACITY: usize = 64;

/// Which slice of configuration space to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPlan {
    /// Buses `0..bus_count`.
    pub bus_count: u16,
    /// Slots `0..slot_count` on every bus.
    pub slot_count: u8,
    /// Functions `0..function_count` in every slot.
    pub function_count: u8,
    /// Stop after finishing this bus if the visitor has not claimed anything.
    pub give_up_after_bus: Option<u16>,
}

/// Buses 0-7, every function. Feeds the verbose hardware report.
pub const HARDWARE_INVENTORY_SCAN: ScanPlan = ScanPlan {
    bus_count: 8,
    slot_count: 32,
    function_count: 8,
    give_up_after_bus: None,
};

/// All 256 buses at function 0, abandoned after bus 3 when nothing was claimed.
pub const STORAGE_CONTROLLER_SCAN: ScanPlan = ScanPlan {
    bus_count: 256,
    slot_count: 32,
    function_count: 1,
    give_up_after_bus: Some(3),
};

impl Default for ScanPlan {
    fn default() -> Self {
        HARDWARE_INVENTORY_SCAN
    }
}

/// One responding PCI function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciFunction {
    pub bus: u8,
    pub slot: u8,
    pub func: u8,
    pub vendor_id: u16,
    pub device_id: u16,
    pub class_code: u8,
    pub subclass: u8,
    pub prog_if: u8,
    pub revision: u8,
}

impl PciFunction {
    /// Reads the identification dwords, or `None` when nothing answers.
    pub fn probe<P: PortIo + ?Sized>(io: &mut P, bus: u8, slot: u8, func: u8) -> Option<Self> {
        let id = read_config_dword(io, bus, slot, func, REG_VENDOR_ID);
        let vendor_id = id as u16;
        if vendor_absent(vendor_id) {
            return None;
        }

        let class_rev = read_config_dword(io, bus, slot, func, REG_CLASS_REVISION);
        Some(PciFunction {
            bus,
            slot,
            func,
            vendor_id,
            device_id: (id >> 16) as u16,
            class_code: (class_rev >> 24) as u8,
            subclass: (class_rev >> 16) as u8,
            prog_if: (class_rev >> 8) as u8,
            revision: class_rev as u8,
        })
    }

    pub fn class(&self) -> PciClass {
        PciClass::from_code(self.class_code)
    }

    /// Interface label for mass-storage functions ("IDE", "SATA", ...).
    pub fn storage_interface(&self) -> Option<&'static str> {
        if self.class_code == CLASS_MASS_STORAGE {
            mass_storage_label(self.subclass)
        } else {
            None
        }
    }
}

impl fmt::Display for PciFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{} - {}", self.bus, self.slot, self.func, self.class())?;
        if let Some(label) = self.storage_interface() {
            write!(f, " ({})", label)?;
        }
        Ok(())
    }
}

/// What a walk saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Functions with a valid vendor id.
    pub found: usize,
    /// Functions the visitor claimed.
    pub claimed: usize,
    /// Buses actually walked.
    pub buses_scanned: u16,
}

/// Walks the configuration space described by `plan`.
///
/// Every responding function passing `filter` is handed to `visit` together
/// with the port capability, so the visitor can program the device. The
/// visitor returns `true` when it claimed the function; the early-exit rule
/// of the plan counts claims, not sightings.
pub fn enumerate<P, F, V>(io: &mut P, plan: &ScanPlan, mut filter: F, mut visit: V) -> ScanSummary
where
    P: PortIo + ?Sized,
    F: FnMut(&PciFunction) -> bool,
    V: FnMut(&mut P, &PciFunction) -> bool,
{
    let mut summary = ScanSummary::default();

    for bus in 0..plan.bus_count.min(256) {
        for slot in 0..plan.slot_count.min(32) {
            for func in 0..plan.function_count.min(8) {
                let Some(function) = PciFunction::probe(io, bus as u8, slot, func) else {
                    continue;
                };
                summary.found += 1;

                if filter(&function) && visit(&mut *io, &function) {
                    summary.claimed += 1;
                }
            }
        }
        summary.buses_scanned += 1;

        if let Some(limit) = plan.give_up_after_bus {
            if bus >= limit && summary.claimed == 0 {
                log_debug!("PCI: nothing claimed by bus {}, stopping scan", bus);
                break;
            }
        }
    }

    summary
}

/// Every function found by [`HARDWARE_INVENTORY_SCAN`].
#[derive(Debug, Clone, Default)]
pub struct PciInventory {
    functions: Vec<PciFunction, PCI_INVENTORY_CAPACITY>,
    total_found: usize,
}

impl PciInventory {
    pub fn scan<P: PortIo + ?Sized>(io: &mut P) -> Self {
        Self::scan_with(io, &HARDWARE_INVENTORY_SCAN)
    }

    pub fn scan_with<P: PortIo + ?Sized>(io: &mut P, plan: &ScanPlan) -> Self {
        let mut functions = Vec::new();
        let summary = enumerate(io, plan, |_| true, |_, function| {
            log_debug!("PCI {} [{:04x}:{:04x}]", function, function.vendor_id, function.device_id);
            functions.push(*function).is_ok()
        });

        if summary.found > functions.len() {
            log_info!(
                "PCI: {} functions found, keeping the first {}",
                summary.found,
                functions.len()
            );
        }

        PciInventory {
            functions,
            total_found: summary.found,
        }
    }

    pub fn functions(&self) -> &[PciFunction] {
        &self.functions
    }

    /// Functions seen, including any that did not fit.
    pub fn total_found(&self) -> usize {
        self.total_found
    }

    pub fn is_empty(&self) -> bool {
        self.total_found == 0
    }
}
