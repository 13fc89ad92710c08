// crates/plk-supervisor/src/sdo/abort.rs
//! SDO abort codes and their operator-facing descriptions.
//!
//! (Reference: EPSG DS 301, Table 58)

use alloc::format;
use alloc::string::{String, ToString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdoAbortCode {
    ProtocolTimedOut,
    InvalidCommandSpecifier,
    InvalidBlockSize,
    InvalidSequenceNumber,
    CrcError,
    OutOfMemory,
    UnsupportedAccess,
    WriteOnly,
    ReadOnly,
    ObjectDoesNotExist,
    ObjectNotMappable,
    PdoLengthExceeded,
    ParameterIncompatibility,
    InternalIncompatibility,
    HardwareError,
    LengthMismatch,
    LengthTooHigh,
    LengthTooLow,
    SubIndexDoesNotExist,
    ValueRangeExceeded,
    ValueTooHigh,
    ValueTooLow,
    MaxLessThanMin,
    GeneralError,
    TransferOrStorageFailed,
    LocalControl,
    DeviceState,
    DictionaryGenerationFailed,
    ConfigurationDataEmpty,
}

/// Static code table, one row per variant.
#[rustfmt::skip]
const ABORT_CODES: &[(u32, SdoAbortCode, &str)] = &[
    (0x0504_0000, SdoAbortCode::ProtocolTimedOut, "SDO protocol timed out"),
    (0x0504_0001, SdoAbortCode::InvalidCommandSpecifier, "Client/server command specifier not valid or unknown"),
    (0x0504_0002, SdoAbortCode::InvalidBlockSize, "Invalid block size"),
    (0x0504_0003, SdoAbortCode::InvalidSequenceNumber, "Invalid sequence number"),
    (0x0504_0004, SdoAbortCode::CrcError, "CRC error"),
    (0x0504_0005, SdoAbortCode::OutOfMemory, "Out of memory"),
    (0x0601_0000, SdoAbortCode::UnsupportedAccess, "Unsupported access to an object"),
    (0x0601_0001, SdoAbortCode::WriteOnly, "Attempt to read a write-only object"),
    (0x0601_0002, SdoAbortCode::ReadOnly, "Attempt to write a read-only object"),
    (0x0602_0000, SdoAbortCode::ObjectDoesNotExist, "Object does not exist in the object dictionary"),
    (0x0604_0041, SdoAbortCode::ObjectNotMappable, "Object cannot be mapped to the PDO"),
    (0x0604_0042, SdoAbortCode::PdoLengthExceeded, "The number and length of the objects to be mapped would exceed the PDO length"),
    (0x0604_0043, SdoAbortCode::ParameterIncompatibility, "General parameter incompatibility"),
    (0x0604_0047, SdoAbortCode::InternalIncompatibility, "General internal incompatibility in the device"),
    (0x0606_0000, SdoAbortCode::HardwareError, "Access failed due to a hardware error"),
    (0x0607_0010, SdoAbortCode::LengthMismatch, "Data type does not match, length of service parameter does not match"),
    (0x0607_0012, SdoAbortCode::LengthTooHigh, "Data type does not match, length of service parameter too high"),
    (0x0607_0013, SdoAbortCode::LengthTooLow, "Data type does not match, length of service parameter too low"),
    (0x0609_0011, SdoAbortCode::SubIndexDoesNotExist, "Sub-index does not exist"),
    (0x0609_0030, SdoAbortCode::ValueRangeExceeded, "Value range of parameter exceeded"),
    (0x0609_0031, SdoAbortCode::ValueTooHigh, "Value of parameter written too high"),
    (0x0609_0032, SdoAbortCode::ValueTooLow, "Value of parameter written too low"),
    (0x0609_0036, SdoAbortCode::MaxLessThanMin, "Maximum value is less than minimum value"),
    (0x0800_0000, SdoAbortCode::GeneralError, "General error"),
    (0x0800_0020, SdoAbortCode::TransferOrStorageFailed, "Data cannot be transferred or stored to the application"),
    (0x0800_0021, SdoAbortCode::LocalControl, "Data cannot be transferred or stored to the application because of local control"),
    (0x0800_0022, SdoAbortCode::DeviceState, "Data cannot be transferred or stored to the application because of the present device state"),
    (0x0800_0023, SdoAbortCode::DictionaryGenerationFailed, "Object dictionary dynamic generation failed or no object dictionary present"),
    (0x0800_0024, SdoAbortCode::ConfigurationDataEmpty, "EDS, DCF or Concise DCF data set empty"),
];

impl SdoAbortCode {
    /// Looks up a raw abort code. Returns `None` for codes outside the table.
    pub fn from_code(code: u32) -> Option<Self> {
        ABORT_CODES
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, variant, _)| *variant)
    }

    pub fn code(&self) -> u32 {
        self.row().0
    }

    pub fn description(&self) -> &'static str {
        self.row().2
    }

    fn row(&self) -> &'static (u32, SdoAbortCode, &'static str) {
        // Every variant has exactly one row.
        ABORT_CODES
            .iter()
            .find(|(_, variant, _)| variant == self)
            .unwrap_or(&ABORT_CODES[0])
    }
}

impl core::fmt::Display for SdoAbortCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.description())
    }
}

/// Human-readable description of any 32-bit abort code. Codes outside the
/// table render as `unknown abort code 0xXXXXXXXX`.
pub fn abort_code_description(code: u32) -> String {
    match SdoAbortCode::from_code(code) {
        Some(known) => known.description().to_string(),
        None => format!("unknown abort code 0x{:08X}", code),
    }
}
