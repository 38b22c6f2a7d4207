//! Fixed-size formatting buffer used by the logging and print macros.

use core::fmt;

const LINE_CAPACITY: usize = 512;

/// Formats into a fixed 512-byte buffer, silently truncating overflow.
pub struct LineWriter {
    buffer: [u8; LINE_CAPACITY],
    pos: usize,
}

impl LineWriter {
    pub const fn new() -> Self {
        Self {
            buffer: [0; LINE_CAPACITY],
            pos: 0,
        }
    }

    pub fn finish(&self) -> &[u8] {
        &self.buffer[..self.pos]
    }

    /// The formatted text. A multi-byte character cut by truncation is dropped.
    pub fn as_str(&self) -> &str {
        let bytes = self.finish();
        match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => core::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

impl Default for LineWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for LineWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buffer.len() - self.pos;
        let to_copy = bytes.len().min(remaining);
        self.buffer[self.pos..self.pos + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.pos += to_copy;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_buffer_formatting() {
        let mut writer = LineWriter::new();
        write!(writer, "Device {}: {:#06x}", 2, 0x1F0).unwrap();
        assert_eq!(writer.as_str(), "Device 2: 0x01f0");
        assert_eq!(writer.len(), 16);
    }

    #[test]
    fn test_overflow_is_truncated() {
        let mut writer = LineWriter::new();
        for _ in 0..100 {
            write!(writer, "0123456789").unwrap();
        }
        assert_eq!(writer.len(), LINE_CAPACITY);
        assert!(writer.as_str().starts_with("0123456789"));
    }

    #[test]
    fn test_truncated_multibyte_char_is_dropped() {
        let mut writer = LineWriter::new();
        write!(writer, "{}", "a".repeat(LINE_CAPACITY - 1)).unwrap();
        write!(writer, "é").unwrap();
        assert_eq!(writer.len(), LINE_CAPACITY);
        assert_eq!(writer.as_str().len(), LINE_CAPACITY - 1);
    }
}
