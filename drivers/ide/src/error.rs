use core::fmt;

/// Failure classes of an advanced status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollError {
    /// DF set after BSY cleared.
    DeviceFault,
    /// ERR set after BSY cleared.
    CommandError,
    /// BSY cleared without DRQ.
    DataNotReady,
}

impl PollError {
    pub const fn code(&self) -> u8 {
        match self {
            PollError::DeviceFault => 1,
            PollError::CommandError => 2,
            PollError::DataNotReady => 3,
        }
    }
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::DeviceFault => write!(f, "device fault"),
            PollError::CommandError => write!(f, "command error"),
            PollError::DataNotReady => write!(f, "data not ready"),
        }
    }
}

/// IDE Error types for no-std environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeError {
    /// Channel index outside the channel table
    InvalidChannel(u8),
    /// Drive index other than master (0) or slave (1)
    InvalidDrive(u8),
    /// Status poll reported a failure
    Poll(PollError),
}

impl IdeError {
    /// Status code of the sector I/O contract: every failure is 1.
    pub const fn code(&self) -> u8 {
        1
    }
}

impl From<PollError> for IdeError {
    fn from(err: PollError) -> Self {
        IdeError::Poll(err)
    }
}

impl fmt::Display for IdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdeError::InvalidChannel(channel) => write!(f, "no IDE channel {}", channel),
            IdeError::InvalidDrive(drive) => write!(f, "no IDE drive {}", drive),
            IdeError::Poll(err) => write!(f, "IDE poll failed: {} (code {})", err, err.code()),
        }
    }
}

/// Result type for IDE operations
pub type IdeResult<T> = Result<T, IdeError>;
