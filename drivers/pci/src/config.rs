//! Configuration-space access through ports 0xCF8/0xCFC.

use lib_kernel::PortIo;

pub const CONFIG_ADDRESS_PORT: u16 = 0xCF8;
pub const CONFIG_DATA_PORT: u16 = 0xCFC;

/// Enable bit of a configuration address.
const CONFIG_ENABLE: u32 = 0x8000_0000;

// Standard header offsets.
pub const REG_VENDOR_ID: u8 = 0x00;
pub const REG_DEVICE_ID: u8 = 0x02;
pub const REG_CLASS_REVISION: u8 = 0x08;
pub const REG_PROG_IF: u8 = 0x09;
pub const REG_SUBCLASS: u8 = 0x0A;
pub const REG_CLASS: u8 = 0x0B;
pub const REG_BAR0: u8 = 0x10;
pub const REG_INTERRUPT_LINE: u8 = 0x3C;

/// Vendor ids that mean "nothing answered".
pub const fn vendor_absent(vendor_id: u16) -> bool {
    vendor_id == 0xFFFF || vendor_id == 0x0000
}

/// Composes a mechanism #1 configuration address.
///
/// `slot` is 5 bits and `func` 3 bits wide; the offset is rounded down to a
/// dword boundary.
pub const fn config_address(bus: u8, slot: u8, func: u8, offset: u8) -> u32 {
    CONFIG_ENABLE
        | (bus as u32) << 16
        | ((slot & 0x1F) as u32) << 11
        | ((func & 0x07) as u32) << 8
        | (offset & 0xFC) as u32
}

pub fn read_config_dword<P: PortIo + ?Sized>(io: &mut P, bus: u8, slot: u8, func: u8, offset: u8) -> u32 {
    io.outl(CONFIG_ADDRESS_PORT, config_address(bus, slot, func, offset));
    io.inl(CONFIG_DATA_PORT)
}

pub fn read_config_word<P: PortIo + ?Sized>(io: &mut P, bus: u8, slot: u8, func: u8, offset: u8) -> u16 {
    let dword = read_config_dword(io, bus, slot, func, offset);
    (dword >> ((offset & 2) as u32 * 8)) as u16
}

pub fn read_config_byte<P: PortIo + ?Sized>(io: &mut P, bus: u8, slot: u8, func: u8, offset: u8) -> u8 {
    let dword = read_config_dword(io, bus, slot, func, offset);
    (dword >> ((offset & 3) as u32 * 8)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_kernel::sim::SimulatedPorts;
    use proptest::prelude::*;

    #[test]
    fn test_address_fixture() {
        assert_eq!(config_address(1, 2, 3, 0x08), 0x8001_1308);
        assert_eq!(config_address(0, 0, 0, 0x0B), 0x8000_0008);
    }

    #[test]
    fn test_sub_dword_reads_shift_the_dword() {
        let mut io = SimulatedPorts::new();
        // class 0x01, subclass 0x00, prog-if 0x00, revision 0x01
        io.set_config_dword(0, 3, 0, 0x08, 0x0100_0001);
        io.set_config_dword(0, 3, 0, 0x00, 0x1040_104B);

        assert_eq!(read_config_word(&mut io, 0, 3, 0, REG_VENDOR_ID), 0x104B);
        assert_eq!(read_config_word(&mut io, 0, 3, 0, REG_DEVICE_ID), 0x1040);
        assert_eq!(read_config_byte(&mut io, 0, 3, 0, REG_CLASS), 0x01);
        assert_eq!(read_config_byte(&mut io, 0, 3, 0, REG_SUBCLASS), 0x00);
        assert_eq!(read_config_byte(&mut io, 0, 3, 0, REG_CLASS_REVISION), 0x01);
    }

    #[test]
    fn test_every_read_latches_the_address_first() {
        let mut io = SimulatedPorts::new();
        read_config_dword(&mut io, 1, 2, 3, 0x08);
        read_config_byte(&mut io, 0, 31, 7, 0x3C);

        assert_eq!(io.writes_to(CONFIG_ADDRESS_PORT), vec![0x8001_1308, 0x8000_FF3C]);
        assert_eq!(io.read_count(CONFIG_DATA_PORT), 2);
    }

    #[test]
    fn test_absent_vendor_ids() {
        assert!(vendor_absent(0xFFFF));
        assert!(vendor_absent(0x0000));
        assert!(!vendor_absent(0x8086));
    }

    proptest! {
        #[test]
        fn address_fields_round_trip(bus in any::<u8>(), slot in 0u8..32, func in 0u8..8, offset in any::<u8>()) {
            let address = config_address(bus, slot, func, offset);
            prop_assert_eq!(address & 0x8000_0000, 0x8000_0000);
            prop_assert_eq!((address >> 16) & 0xFF, bus as u32);
            prop_assert_eq!((address >> 11) & 0x1F, slot as u32);
            prop_assert_eq!((address >> 8) & 0x07, func as u32);
            prop_assert_eq!(address & 0xFF, (offset & 0xFC) as u32);
            prop_assert_eq!(address & 0x7F00_0003, 0);
        }
    }
}
