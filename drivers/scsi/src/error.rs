use core::fmt;

/// SCSI Error types for no-std environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScsiError {
    /// Device id outside the device registry
    InvalidDevice(u8),
    /// Controller id outside the controller registry
    InvalidController(u8),
    /// Host-ready bit never set within the retry budget
    ControllerNotReady,
    /// The executor has no answer for this opcode
    UnsupportedCommand(u8),
    /// Response shorter than the command's fixed layout
    ShortResponse { expected: usize, actual: usize },
    /// Registry at capacity
    RegistryFull,
    /// (controller, target, LUN) already registered
    DuplicateTarget,
}

impl ScsiError {
    /// Status code of the per-sector entry points.
    pub const fn sector_code(&self) -> u8 {
        1
    }

    /// Status code of the per-block entry points.
    pub const fn block_code(&self) -> i32 {
        -1
    }
}

impl fmt::Display for ScsiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScsiError::InvalidDevice(id) => write!(f, "no SCSI device {}", id),
            ScsiError::InvalidController(id) => write!(f, "no SCSI controller {}", id),
            ScsiError::ControllerNotReady => write!(f, "controller not ready"),
            ScsiError::UnsupportedCommand(op) => write!(f, "unsupported command {:#04x}", op),
            ScsiError::ShortResponse { expected, actual } => {
                write!(f, "short response: {} of {} bytes", actual, expected)
            }
            ScsiError::RegistryFull => write!(f, "registry full"),
            ScsiError::DuplicateTarget => write!(f, "target already registered"),
        }
    }
}

/// Result type for SCSI operations
pub type ScsiResult<T> = Result<T, ScsiError>;
