use zerocopy::byteorder::little_endian::I32 as I32LE;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{Error, Result};

/// Message frame header
///
/// Every message on the wire is `[int32 length][length bytes of payload]`.
/// The length is little-endian and counts the payload only.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, IntoBytes)]
pub struct MessageHeader {
    pub length: I32LE,
}

impl MessageHeader {
    pub const SIZE: usize = 4;

    pub fn encode(length: usize) -> Result<Self> {
        let length = i32::try_from(length).map_err(|_| Error::InvalidPacket)?;
        Ok(Self {
            length: I32LE::new(length),
        })
    }

    /// Payload length; a negative prefix is a framing error.
    pub fn length(&self) -> Result<usize> {
        usize::try_from(self.length.get()).map_err(|_| Error::InvalidPacket)
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        let head = data.get(..Self::SIZE).ok_or(Error::InvalidPacket)?;
        Self::ref_from_bytes(head).map_err(|_| Error::InvalidPacket)
    }
}
