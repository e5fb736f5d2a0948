//! The remote node's type-tagged binary object format.
//!
//! Every value starts with a one-byte [`WireType`] tag. Primitive values and the
//! null marker are read by consuming the tag; strings, GUIDs and full objects
//! are read by readers that consume their own tag, so a tag peek over those
//! must rewind.

use std::ops::{Deref, DerefMut};

use zerocopy::byteorder::little_endian::{I32 as I32LE, U16 as U16LE};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::constant::{PROTO_VER, WireType};
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::protocol::primitive::*;

bitflags::bitflags! {
    /// Flags of a full object header
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BinaryObjectFlags: u16 {
        const USER_TYPE = 0x0001;
        const HAS_SCHEMA = 0x0002;
        const HAS_RAW = 0x0004;
        const OFFSET_ONE_BYTE = 0x0008;
        const OFFSET_TWO_BYTES = 0x0010;
        const COMPACT_FOOTER = 0x0020;
    }
}

/// Full object header
///
/// Layout:
/// - header: 1 byte, always [`WireType::Full`]
/// - proto_ver: 1 byte
/// - flags: 2 bytes
/// - type_id: 4 bytes
/// - hash_code: 4 bytes
/// - length: 4 bytes, total object length counted from the header tag
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, IntoBytes)]
pub struct FullHeader {
    pub header: u8,
    pub proto_ver: u8,
    pub flags: U16LE,
    pub type_id: I32LE,
    pub hash_code: I32LE,
    pub length: I32LE,
}

impl FullHeader {
    pub const SIZE: usize = 16;

    pub fn new(flags: BinaryObjectFlags, type_id: i32, hash_code: i32, length: i32) -> Self {
        Self {
            header: WireType::Full as u8,
            proto_ver: PROTO_VER,
            flags: U16LE::new(flags.bits()),
            type_id: I32LE::new(type_id),
            hash_code: I32LE::new(hash_code),
            length: I32LE::new(length),
        }
    }

    pub fn flags(&self) -> BinaryObjectFlags {
        BinaryObjectFlags::from_bits_retain(self.flags.get())
    }

    pub fn type_id(&self) -> i32 {
        self.type_id.get()
    }

    pub fn hash_code(&self) -> i32 {
        self.hash_code.get()
    }

    pub fn length(&self) -> i32 {
        self.length.get()
    }
}

/// Cursor over a borrowed byte slice with an explicit position
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reader positioned at `pos` (clamped to the end of `data`)
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn advance_to(&mut self, rest: &'a [u8]) {
        self.pos = self.data.len() - rest.len();
    }

    /// Start a speculative read. The position is restored when the guard is
    /// dropped unless [`SavedPosition::commit`] was called.
    pub fn save_position(&mut self) -> SavedPosition<'_, 'a> {
        let saved = self.pos;
        SavedPosition {
            reader: self,
            saved,
            committed: false,
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let (value, rest) = read_int_1(self.remaining())?;
        self.advance_to(rest);
        Ok(value)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let (value, rest) = read_int_2(self.remaining())?;
        self.advance_to(rest);
        Ok(value)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let (value, rest) = read_int_4(self.remaining())?;
        self.advance_to(rest);
        Ok(value as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let (value, rest) = read_int_8(self.remaining())?;
        self.advance_to(rest);
        Ok(value as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let (value, rest) = read_int_4(self.remaining())?;
        self.advance_to(rest);
        Ok(f32::from_bits(value))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let (value, rest) = read_int_8(self.remaining())?;
        self.advance_to(rest);
        Ok(f64::from_bits(value))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let (bytes, rest) = read_bytes_fix(self.remaining(), len)?;
        self.advance_to(rest);
        Ok(bytes)
    }

    /// Read a non-negative `int32` length prefix
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| Error::InvalidPacket)
    }

    /// Peek the tag of the next value.
    ///
    /// The tag is consumed when its payload follows it directly (primitives
    /// and null); for every other tag the reader is left in front of it.
    pub fn read_column_header(&mut self) -> Result<u8> {
        let mut guard = self.save_position();
        let tag = guard.read_u8()?;
        if WireType::from_u8(tag).is_some_and(WireType::is_consumed_on_peek) {
            guard.commit();
        }
        Ok(tag)
    }

    /// Tagged string; `None` for the null marker
    pub fn read_string(&mut self) -> Result<Option<&'a str>> {
        let mut guard = self.save_position();
        let tag = guard.read_u8()?;
        let value = match WireType::from_u8(tag) {
            Some(WireType::Null) => None,
            Some(WireType::String) => {
                let len = guard.read_len()?;
                let bytes = guard.read_bytes(len)?;
                Some(simdutf8::basic::from_utf8(bytes).map_err(|_| Error::InvalidPacket)?)
            }
            _ => return Err(Error::UnsupportedWireType(tag)),
        };
        guard.commit();
        Ok(value)
    }

    /// Tagged GUID; `None` for the null marker
    pub fn read_guid(&mut self) -> Result<Option<Guid>> {
        let mut guard = self.save_position();
        let tag = guard.read_u8()?;
        let value = match WireType::from_u8(tag) {
            Some(WireType::Null) => None,
            Some(WireType::Uuid) => {
                let most = guard.read_i64()?;
                let least = guard.read_i64()?;
                Some(Guid::new(most, least))
            }
            _ => return Err(Error::UnsupportedWireType(tag)),
        };
        guard.commit();
        Ok(value)
    }

    /// Recognize a full object header without moving the reader.
    ///
    /// Returns `None` when the next tag is not a full header or carries an
    /// unexpected protocol version.
    pub fn peek_full_header(&mut self) -> Result<Option<FullHeader>> {
        let mut guard = self.save_position();
        if guard.read_u8()? != WireType::Full as u8 {
            return Ok(None);
        }
        if guard.read_u8()? != PROTO_VER {
            return Ok(None);
        }
        let start = guard.saved();
        let bytes = guard
            .data
            .get(start..start + FullHeader::SIZE)
            .ok_or(Error::UnexpectedEof)?;
        let header = FullHeader::ref_from_bytes(bytes).map_err(|_| Error::InvalidPacket)?;
        Ok(Some(*header))
    }

    /// A whole full object, header included, as one byte slice
    pub fn read_full_object(&mut self) -> Result<&'a [u8]> {
        let header = self.peek_full_header()?.ok_or(Error::InvalidPacket)?;
        let len = usize::try_from(header.length()).map_err(|_| Error::InvalidPacket)?;
        if len < FullHeader::SIZE {
            return Err(Error::InvalidPacket);
        }
        self.read_bytes(len)
    }
}

/// Scoped speculative read over a [`BinaryReader`]
pub struct SavedPosition<'r, 'a> {
    reader: &'r mut BinaryReader<'a>,
    saved: usize,
    committed: bool,
}

impl SavedPosition<'_, '_> {
    /// Keep the position reached through this guard
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Position at the time the guard was taken
    pub fn saved(&self) -> usize {
        self.saved
    }
}

impl<'a> Deref for SavedPosition<'_, 'a> {
    type Target = BinaryReader<'a>;

    fn deref(&self) -> &Self::Target {
        self.reader
    }
}

impl DerefMut for SavedPosition<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.reader
    }
}

impl Drop for SavedPosition<'_, '_> {
    fn drop(&mut self) {
        if !self.committed {
            self.reader.pos = self.saved;
        }
    }
}

// ============================================================================
// Writers
// ============================================================================

/// Untagged one-byte boolean, used in request bodies
pub fn write_bool(out: &mut Vec<u8>, value: bool) {
    write_int_1(out, u8::from(value));
}

/// Untagged `int32`
pub fn write_i32(out: &mut Vec<u8>, value: i32) {
    write_int_4(out, value as u32);
}

/// Untagged `int64`
pub fn write_i64(out: &mut Vec<u8>, value: i64) {
    write_int_8(out, value as u64);
}

/// A length or count as the wire's `int32`
pub(crate) fn wire_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::ValueTooLong(len))
}

/// `int32` length prefix followed by the bytes
fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    write_i32(out, wire_len(bytes.len())?);
    write_bytes_fix(out, bytes);
    Ok(())
}

/// Tagged string, or the null marker for `None`
pub fn write_string(out: &mut Vec<u8>, value: Option<&str>) -> Result<()> {
    match value {
        Some(s) => {
            write_int_1(out, WireType::String as u8);
            write_len_prefixed(out, s.as_bytes())
        }
        None => {
            write_int_1(out, WireType::Null as u8);
            Ok(())
        }
    }
}

/// A single tagged value
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    Uuid(Guid),
    ByteArray(Vec<u8>),
}

impl WireValue {
    /// Fails when a string or byte array is too long for its `int32` length
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            WireValue::Null => write_int_1(out, WireType::Null as u8),
            WireValue::Byte(v) => {
                write_int_1(out, WireType::Byte as u8);
                write_int_1(out, *v as u8);
            }
            WireValue::Short(v) => {
                write_int_1(out, WireType::Short as u8);
                write_int_2(out, *v as u16);
            }
            WireValue::Char(v) => {
                write_int_1(out, WireType::Char as u8);
                write_int_2(out, *v);
            }
            WireValue::Int(v) => {
                write_int_1(out, WireType::Int as u8);
                write_i32(out, *v);
            }
            WireValue::Long(v) => {
                write_int_1(out, WireType::Long as u8);
                write_i64(out, *v);
            }
            WireValue::Float(v) => {
                write_int_1(out, WireType::Float as u8);
                write_int_4(out, v.to_bits());
            }
            WireValue::Double(v) => {
                write_int_1(out, WireType::Double as u8);
                write_int_8(out, v.to_bits());
            }
            WireValue::Bool(v) => {
                write_int_1(out, WireType::Bool as u8);
                write_bool(out, *v);
            }
            WireValue::String(s) => return write_string(out, Some(s)),
            WireValue::Uuid(guid) => {
                write_int_1(out, WireType::Uuid as u8);
                write_i64(out, guid.most_significant_bits());
                write_i64(out, guid.least_significant_bits());
            }
            WireValue::ByteArray(bytes) => {
                write_int_1(out, WireType::ArrayByte as u8);
                return write_len_prefixed(out, bytes);
            }
        }
        Ok(())
    }
}
