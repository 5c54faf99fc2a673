//! Bus transaction error taxonomy.
//!
//! Every operation in the crate reports failure through [`BusError`], a
//! closed set of codes shared by validation (detected before any hardware
//! access) and the numeric status returned by the physical bus primitive.
//! Success is `Ok(..)` and carries machine code `0`.
//!
//! All variants are `Copy` so a result can be rendered, logged, and
//! compared without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Primitive status codes
// ---------------------------------------------------------------------------

/// Transaction acknowledged.
pub const STATUS_OK: u8 = 0;
/// Transmit buffer overflow; reported by most Wire-style drivers as `1`.
pub const STATUS_DATA_TOO_LONG: u8 = 1;
/// Address byte was not acknowledged.
pub const STATUS_NACK_ADDRESS: u8 = 2;
/// A data byte was not acknowledged.
pub const STATUS_NACK_DATA: u8 = 3;
/// Any other bus fault (arbitration loss, bus error, overrun).
pub const STATUS_OTHER: u8 = 4;
/// Driver-level timeout, reported by newer Wire drivers as `5`.
pub const STATUS_TIMEOUT: u8 = 5;

/// Machine code reported alongside a successful result.
pub const SUCCESS_CODE: u8 = 0;

// ---------------------------------------------------------------------------
// BusError
// ---------------------------------------------------------------------------

/// Failure codes for every bus, device, and transaction operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BusError {
    /// Short or failed read, or status `1` from the primitive.
    Timeout = 1,
    /// The device did not acknowledge its address.
    NackAddress = 2,
    /// The device did not acknowledge a data byte.
    NackData = 3,
    /// Hardware bring-up failed or the primitive reported another fault.
    Other = 4,
    /// The bus id does not refer to an initialized bus.
    BusNotInitialized = 5,
    /// Bad bus id, address outside `1..=127`, or an empty buffer.
    InvalidParameters = 6,
}

impl BusError {
    /// Numeric machine code (`1..=6`).
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Stable upper-case identifier, e.g. `"NACK_ADDRESS"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::NackAddress => "NACK_ADDRESS",
            Self::NackData => "NACK_DATA",
            Self::Other => "OTHER_ERROR",
            Self::BusNotInitialized => "BUS_NOT_INITIALIZED",
            Self::InvalidParameters => "INVALID_PARAMETERS",
        }
    }

    /// Map a primitive status onto the taxonomy. `0` is not an error.
    pub const fn from_status(status: u8) -> Option<Self> {
        match status {
            STATUS_OK => None,
            STATUS_DATA_TOO_LONG | STATUS_TIMEOUT => Some(Self::Timeout),
            STATUS_NACK_ADDRESS => Some(Self::NackAddress),
            STATUS_NACK_DATA => Some(Self::NackData),
            _ => Some(Self::Other),
        }
    }

    /// `Ok(())` for status `0`, the mapped error otherwise.
    pub fn check_status(status: u8) -> Result<()> {
        match Self::from_status(status) {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "Timeout"),
            Self::NackAddress => write!(f, "NACK on address"),
            Self::NackData => write!(f, "NACK on data"),
            Self::Other => write!(f, "Other error"),
            Self::BusNotInitialized => write!(f, "Bus not initialized"),
            Self::InvalidParameters => write!(f, "Invalid parameters"),
        }
    }
}

impl core::error::Error for BusError {}

/// Machine code for any operation result: `0` on success.
pub fn result_code<T>(result: &Result<T>) -> u8 {
    match result {
        Ok(_) => SUCCESS_CODE,
        Err(e) => e.code(),
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, BusError>;
