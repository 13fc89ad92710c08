// crates/plk-supervisor/src/pi/channel.rs
use crate::error::ChannelError;
use crate::types::{Direction, IecDataType};
use alloc::string::String;

/// A named, typed, bit-addressed view into one process image buffer.
///
/// Built once from the process image description and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    name: String,
    data_type: IecDataType,
    /// Offset of the first byte within the direction's buffer.
    byte_offset: usize,
    /// Position of the least significant bit within the first byte, 0-7.
    bit_offset: u8,
    /// Length of the field in bits.
    bit_size: u8,
    direction: Direction,
}

impl Channel {
    /// Creates a channel, checking the descriptor invariants that do not
    /// depend on the owning buffer. Buffer bounds are checked by
    /// [`ProcessImage::new`](super::ProcessImage::new).
    pub fn new(
        name: impl Into<String>,
        data_type: IecDataType,
        byte_offset: usize,
        bit_offset: u8,
        bit_size: u8,
        direction: Direction,
    ) -> Result<Self, ChannelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ChannelError::EmptyName);
        }
        if bit_offset > 7 {
            return Err(ChannelError::InvalidBitOffset { name, bit_offset });
        }
        // Floats are only meaningful at their full width.
        let size_ok = if data_type.is_float() {
            bit_size == data_type.bit_size()
        } else {
            (1..=data_type.max_channel_bits()).contains(&bit_size)
        };
        if !size_ok {
            return Err(ChannelError::InvalidBitSize {
                name,
                data_type,
                bit_size,
            });
        }
        Ok(Self {
            name,
            data_type,
            byte_offset,
            bit_offset,
            bit_size,
            direction,
        })
    }

    /// A full-width channel at offset zero, used to lay out SDO payloads.
    pub fn scalar(data_type: IecDataType) -> Self {
        Self {
            name: String::from(data_type.key()),
            data_type,
            byte_offset: 0,
            bit_offset: 0,
            bit_size: data_type.bit_size(),
            direction: Direction::Output,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> IecDataType {
        self.data_type
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    pub fn bit_size(&self) -> u8 {
        self.bit_size
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Absolute position of the first bit in the buffer.
    pub fn start_bit(&self) -> usize {
        self.byte_offset * 8 + self.bit_offset as usize
    }

    /// Absolute position one past the last bit in the buffer.
    pub fn end_bit(&self) -> usize {
        self.start_bit() + self.bit_size as usize
    }

    /// Number of bytes touched by the field, starting at `byte_offset`.
    pub fn byte_len(&self) -> usize {
        (self.bit_offset as usize + self.bit_size as usize).div_ceil(8)
    }

    /// Returns true if both channels live in the same buffer and share at least one bit.
    pub fn overlaps(&self, other: &Channel) -> bool {
        self.direction == other.direction
            && self.start_bit() < other.end_bit()
            && other.start_bit() < self.end_bit()
    }
}
