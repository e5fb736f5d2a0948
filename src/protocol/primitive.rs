//! Fixed-width little-endian codecs shared by the framing layer and the binary object format.

use crate::error::{Error, Result};
use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U32 as U32LE, U64 as U64LE};

/// Read 1-byte integer
pub fn read_int_1(data: &[u8]) -> Result<(u8, &[u8])> {
    match data.split_first() {
        Some((&first, rest)) => Ok((first, rest)),
        None => Err(Error::UnexpectedEof),
    }
}

/// Read 2-byte little-endian integer
pub fn read_int_2(data: &[u8]) -> Result<(u16, &[u8])> {
    let (head, rest) = data.split_at_checked(2).ok_or(Error::UnexpectedEof)?;
    let value = U16LE::ref_from_bytes(head)
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, rest))
}

/// Read 4-byte little-endian integer
pub fn read_int_4(data: &[u8]) -> Result<(u32, &[u8])> {
    let (head, rest) = data.split_at_checked(4).ok_or(Error::UnexpectedEof)?;
    let value = U32LE::ref_from_bytes(head)
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, rest))
}

/// Read 8-byte little-endian integer
pub fn read_int_8(data: &[u8]) -> Result<(u64, &[u8])> {
    let (head, rest) = data.split_at_checked(8).ok_or(Error::UnexpectedEof)?;
    let value = U64LE::ref_from_bytes(head)
        .map_err(|_| Error::InvalidPacket)?
        .get();
    Ok((value, rest))
}

/// Read fixed-length bytes
pub fn read_bytes_fix(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    data.split_at_checked(len).ok_or(Error::UnexpectedEof)
}

/// Write 1-byte integer
pub fn write_int_1(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Write 2-byte little-endian integer
pub fn write_int_2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write 4-byte little-endian integer
pub fn write_int_4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write 8-byte little-endian integer
pub fn write_int_8(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write fixed-length bytes
pub fn write_bytes_fix(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ints_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xAA];
        let (v1, rest) = read_int_1(&data).unwrap();
        assert_eq!(v1, 0x01);
        assert_eq!(rest.len(), 8);

        let (v2, _) = read_int_2(&data).unwrap();
        assert_eq!(v2, 0x0201);

        let (v4, _) = read_int_4(&data).unwrap();
        assert_eq!(v4, 0x04030201);

        let (v8, rest) = read_int_8(&data).unwrap();
        assert_eq!(v8, 0x0807060504030201);
        assert_eq!(rest, &[0xAA]);
    }

    #[test]
    fn test_short_input_is_eof() {
        assert!(matches!(read_int_1(&[]), Err(Error::UnexpectedEof)));
        assert!(matches!(read_int_2(&[1]), Err(Error::UnexpectedEof)));
        assert!(matches!(read_int_4(&[1, 2, 3]), Err(Error::UnexpectedEof)));
        assert!(matches!(read_int_8(&[0; 7]), Err(Error::UnexpectedEof)));
        assert!(matches!(read_bytes_fix(b"abc", 4), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_write_ints() {
        let mut out = Vec::new();
        write_int_1(&mut out, 0xFF);
        write_int_2(&mut out, 0x1234);
        write_int_4(&mut out, (-2i32) as u32);
        write_int_8(&mut out, 1);
        write_bytes_fix(&mut out, b"ok");
        assert_eq!(
            out,
            [
                0xFF, 0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF, 0x01, 0, 0, 0, 0, 0, 0, 0, b'o', b'k'
            ]
        );
    }
}
