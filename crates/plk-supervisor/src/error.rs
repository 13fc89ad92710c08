// crates/plk-supervisor/src/error.rs

use crate::sdo::JobId;
use crate::types::{DataTypeKeyError, Direction, IecDataType, NodeIdError};
use alloc::string::String;
use core::fmt;

/// Errors raised while building a [`Channel`](crate::pi::Channel) descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A channel must carry a non-empty name.
    EmptyName,
    /// The bit offset inside the first byte must be 0-7.
    InvalidBitOffset { name: String, bit_offset: u8 },
    /// The bit size is zero or wider than the data type allows.
    InvalidBitSize {
        name: String,
        data_type: IecDataType,
        bit_size: u8,
    },
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Channel name must not be empty"),
            Self::InvalidBitOffset { name, bit_offset } => write!(
                f,
                "Channel '{}': bit offset {} is outside 0-7",
                name, bit_offset
            ),
            Self::InvalidBitSize {
                name,
                data_type,
                bit_size,
            } => write!(
                f,
                "Channel '{}': bit size {} is not valid for {}",
                name, bit_size, data_type
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ChannelError {}

/// Errors produced by the value codec. Parsing and range failures are the
/// operator-facing validation errors, the buffer variants guard the
/// process image and SDO payload boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text to validate is empty.
    Empty,
    /// The text is not a number in the base expected by the data type.
    InvalidNumber { data_type: IecDataType },
    /// The number parsed but lies outside the domain of the data type
    /// (or of the channel's narrower bit size).
    OutOfRange { data_type: IecDataType, bit_size: u8 },
    /// The value's type does not match the channel it is written into.
    TypeMismatch {
        expected: IecDataType,
        actual: IecDataType,
    },
    /// The buffer does not cover the bytes spanned by the channel.
    BufferTooShort { needed: usize, actual: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "No value entered"),
            Self::InvalidNumber { data_type } => {
                write!(f, "Value is not a valid {} number", data_type)
            }
            Self::OutOfRange {
                data_type,
                bit_size,
            } => write!(
                f,
                "Value is out of range for {} ({} bits)",
                data_type, bit_size
            ),
            Self::TypeMismatch { expected, actual } => write!(
                f,
                "Value of type {} cannot be stored in a {} channel",
                actual, expected
            ),
            Self::BufferTooShort { needed, actual } => write!(
                f,
                "Buffer is too short: {} bytes needed, {} available",
                needed, actual
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

/// Errors raised while assembling or accessing a process image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessImageError {
    /// Two channels share the same name.
    DuplicateChannel(String),
    /// A channel spans bits past the end of its direction's buffer.
    ChannelOutOfBounds {
        name: String,
        direction: Direction,
        end_bit: usize,
        buffer_bits: usize,
    },
    /// No channel with this name exists.
    UnknownChannel(String),
    /// The channel descriptor itself is invalid.
    Channel(ChannelError),
    /// Encoding or decoding the channel value failed.
    Codec(CodecError),
}

impl fmt::Display for ProcessImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateChannel(name) => write!(f, "Duplicate channel name '{}'", name),
            Self::ChannelOutOfBounds {
                name,
                direction,
                end_bit,
                buffer_bits,
            } => write!(
                f,
                "Channel '{}' ends at bit {} but the {} image has only {} bits",
                name, end_bit, direction, buffer_bits
            ),
            Self::UnknownChannel(name) => write!(f, "Unknown channel '{}'", name),
            Self::Channel(e) => write!(f, "Invalid channel: {}", e),
            Self::Codec(e) => write!(f, "Channel value error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProcessImageError {}

impl From<ChannelError> for ProcessImageError {
    fn from(err: ChannelError) -> Self {
        ProcessImageError::Channel(err)
    }
}

impl From<CodecError> for ProcessImageError {
    fn from(err: CodecError) -> Self {
        ProcessImageError::Codec(err)
    }
}

/// Synchronous rejection of an SDO request by the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The stack is not initialised or not running.
    StackNotRunning,
    /// The target node is not part of the network configuration.
    UnknownNode(u8),
    /// The stack refused the request for another reason.
    Rejected(String),
    /// The job is not in the `Created` state and cannot be dispatched.
    AlreadyDispatched(JobId),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackNotRunning => write!(f, "POWERLINK stack is not running"),
            Self::UnknownNode(id) => write!(f, "Node {} is not configured", id),
            Self::Rejected(reason) => write!(f, "SDO request rejected: {}", reason),
            Self::AlreadyDispatched(id) => write!(f, "SDO job {} was already dispatched", id),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DispatchError {}

/// A state transition that the job state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStateError {
    /// Completion arrived for a job that was never dispatched or already completed.
    NotDispatched(JobId),
    /// The result belongs to another job.
    JobMismatch { expected: JobId, actual: JobId },
}

impl fmt::Display for JobStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDispatched(id) => write!(f, "SDO job {} is not awaiting a result", id),
            Self::JobMismatch { expected, actual } => write!(
                f,
                "Result for SDO job {} delivered to job {}",
                actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for JobStateError {}

/// Failure of `execute_transfer`. None of these leave a job outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The value entered for a write is not valid for the selected type.
    Validation(CodecError),
    /// The stack rejected the request synchronously.
    Dispatch(DispatchError),
    /// Another transfer is still awaiting its result.
    Busy(JobId),
    /// The data type key selected by the operator is unknown.
    UnknownDataType(DataTypeKeyError),
    /// The node id entered by the operator is not a valid target.
    InvalidNode(NodeIdError),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "Invalid value: {}", e),
            Self::Dispatch(e) => write!(f, "SDO transfer failed: {}", e),
            Self::Busy(id) => write!(f, "SDO job {} is still in progress", id),
            Self::UnknownDataType(e) => write!(f, "{}", e),
            Self::InvalidNode(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransferError {}

impl From<CodecError> for TransferError {
    fn from(err: CodecError) -> Self {
        TransferError::Validation(err)
    }
}

impl From<DispatchError> for TransferError {
    fn from(err: DispatchError) -> Self {
        TransferError::Dispatch(err)
    }
}

impl From<DataTypeKeyError> for TransferError {
    fn from(err: DataTypeKeyError) -> Self {
        TransferError::UnknownDataType(err)
    }
}

impl From<NodeIdError> for TransferError {
    fn from(err: NodeIdError) -> Self {
        TransferError::InvalidNode(err)
    }
}
