//! Human-readable PCI class names for the boot report.

use core::fmt;

pub const CLASS_MASS_STORAGE: u8 = 0x01;
pub const SUBCLASS_SCSI: u8 = 0x00;

/// PCI base class codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciClass {
    Unclassified,
    MassStorage,
    Network,
    Display,
    Multimedia,
    Memory,
    Bridge,
    Communication,
    System,
    Input,
    SerialBus,
    Other(u8),
}

impl PciClass {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x00 => PciClass::Unclassified,
            0x01 => PciClass::MassStorage,
            0x02 => PciClass::Network,
            0x03 => PciClass::Display,
            0x04 => PciClass::Multimedia,
            0x05 => PciClass::Memory,
            0x06 => PciClass::Bridge,
            0x07 => PciClass::Communication,
            0x08 => PciClass::System,
            0x09 => PciClass::Input,
            0x0C => PciClass::SerialBus,
            other => PciClass::Other(other),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            PciClass::Unclassified => "Unclassified",
            PciClass::MassStorage => "Mass Storage",
            PciClass::Network => "Network",
            PciClass::Display => "Display",
            PciClass::Multimedia => "Multimedia",
            PciClass::Memory => "Memory",
            PciClass::Bridge => "Bridge",
            PciClass::Communication => "Communication",
            PciClass::System => "System",
            PciClass::Input => "Input",
            PciClass::SerialBus => "Serial Bus",
            PciClass::Other(_) => "Other",
        }
    }
}

impl fmt::Display for PciClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interface label for a mass-storage subclass, if it has one.
pub const fn mass_storage_label(subclass: u8) -> Option<&'static str> {
    match subclass {
        0x01 => Some("IDE"),
        0x05 => Some("ATA"),
        0x06 => Some("SATA"),
        0x07 => Some("SAS"),
        0x08 => Some("NVMe"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(PciClass::from_code(0x01).name(), "Mass Storage");
        assert_eq!(PciClass::from_code(0x0C).name(), "Serial Bus");
        assert_eq!(PciClass::from_code(0x0B), PciClass::Other(0x0B));
        assert_eq!(PciClass::from_code(0xFF).name(), "Other");
    }

    #[test]
    fn test_mass_storage_labels() {
        assert_eq!(mass_storage_label(0x01), Some("IDE"));
        assert_eq!(mass_storage_label(0x08), Some("NVMe"));
        assert_eq!(mass_storage_label(SUBCLASS_SCSI), None);
    }
}
