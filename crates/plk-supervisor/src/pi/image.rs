// crates/plk-supervisor/src/pi/image.rs
use super::Channel;
use crate::codec::{self, IecValue};
use crate::error::{CodecError, ProcessImageError};
use crate::types::Direction;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use log::{debug, info};

/// The two raw process image buffers and the channels describing them.
///
/// Every channel access goes through a borrow of the whole image, so a read
/// never observes a half-written neighbour: the bytes a channel spans are
/// read or modified under one exclusive or shared borrow. Sharing the image
/// between threads means wrapping it in a lock.
#[derive(Debug, Clone)]
pub struct ProcessImage {
    input: Vec<u8>,
    output: Vec<u8>,
    /// Channels keyed by name, in the order they were described.
    channels: Vec<Channel>,
    by_name: BTreeMap<String, usize>,
}

impl ProcessImage {
    /// Builds a zeroed process image of the given sizes from already parsed
    /// channel descriptors. Fails if two channels share a name or a channel
    /// does not fit its buffer.
    pub fn new(
        input_size: usize,
        output_size: usize,
        channels: Vec<Channel>,
    ) -> Result<Self, ProcessImageError> {
        let mut by_name: BTreeMap<String, usize> = BTreeMap::new();
        for (i, channel) in channels.iter().enumerate() {
            let buffer_bits = match channel.direction() {
                Direction::Input => input_size * 8,
                Direction::Output => output_size * 8,
            };
            if channel.end_bit() > buffer_bits {
                return Err(ProcessImageError::ChannelOutOfBounds {
                    name: channel.name().into(),
                    direction: channel.direction(),
                    end_bit: channel.end_bit(),
                    buffer_bits,
                });
            }
            if by_name.insert(channel.name().into(), i).is_some() {
                return Err(ProcessImageError::DuplicateChannel(channel.name().into()));
            }
        }
        info!(
            "Process image ready: {} input bytes, {} output bytes, {} channels.",
            input_size,
            output_size,
            channels.len()
        );
        Ok(Self {
            input: vec![0; input_size],
            output: vec![0; output_size],
            channels,
            by_name,
        })
    }

    /// Raw buffer of one direction, e.g. for a memory view.
    pub fn buffer(&self, direction: Direction) -> &[u8] {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// Mutable raw buffer of one direction, for the exchange with the stack.
    pub fn buffer_mut(&mut self, direction: Direction) -> &mut [u8] {
        match direction {
            Direction::Input => &mut self.input,
            Direction::Output => &mut self.output,
        }
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.by_name.get(name).map(|&i| &self.channels[i])
    }

    /// All channels of one direction, in description order.
    pub fn channels(&self, direction: Direction) -> impl Iterator<Item = &Channel> {
        self.channels
            .iter()
            .filter(move |c| c.direction() == direction)
    }

    fn lookup(&self, name: &str) -> Result<&Channel, ProcessImageError> {
        self.channel(name)
            .ok_or_else(|| ProcessImageError::UnknownChannel(name.into()))
    }

    /// Copies the bytes spanned by `channel`. Bits of sibling channels sharing
    /// the first or last byte are included as they are.
    pub fn read_bits(&self, channel: &Channel) -> Result<Vec<u8>, ProcessImageError> {
        let buffer = self.buffer(channel.direction());
        let start = channel.byte_offset();
        let end = start + channel.byte_len();
        buffer
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(ProcessImageError::Codec(CodecError::BufferTooShort {
                needed: end,
                actual: buffer.len(),
            }))
    }

    /// Merges the field bits of `bytes` (laid out as returned by
    /// [`read_bits`](Self::read_bits)) into the image. Only the channel's own
    /// bits change.
    pub fn write_bits(&mut self, channel: &Channel, bytes: &[u8]) -> Result<(), ProcessImageError> {
        // Re-anchor the channel at offset zero to read the field out of `bytes`.
        let local = Channel::new(
            channel.name(),
            channel.data_type(),
            0,
            channel.bit_offset(),
            channel.bit_size(),
            channel.direction(),
        )?;
        let raw = codec::read_field(bytes, &local)?;
        codec::write_field(self.buffer_mut(channel.direction()), channel, raw)?;
        Ok(())
    }

    /// Decodes the current value of the named channel.
    pub fn read_value(&self, name: &str) -> Result<IecValue, ProcessImageError> {
        let channel = self.lookup(name)?;
        Ok(codec::decode(self.buffer(channel.direction()), channel)?)
    }

    /// Encodes `value` into the named channel in place.
    pub fn write_value(&mut self, name: &str, value: &IecValue) -> Result<(), ProcessImageError> {
        let channel = self.lookup(name)?.clone();
        codec::encode(value, &channel, self.buffer_mut(channel.direction()))?;
        debug!("Channel '{}' set to {}", name, value);
        Ok(())
    }
}
