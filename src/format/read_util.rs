//! Primitive readers and writers shared by the clip and space-requirement codecs.
//!
//! Every read names what it was reading so that a truncated stream reports
//! where it ended.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::format::MAX_LENGTH_PREFIX_BYTES;
use crate::util::{Error, Result};

pub(crate) fn read_u8(r: &mut impl Read, what: &'static str) -> Result<u8> {
    r.read_u8().map_err(|e| Error::eof_or_io(e, what))
}

pub(crate) fn read_i8(r: &mut impl Read, what: &'static str) -> Result<i8> {
    r.read_i8().map_err(|e| Error::eof_or_io(e, what))
}

pub(crate) fn read_bool(r: &mut impl Read, what: &'static str) -> Result<bool> {
    Ok(read_u8(r, what)? != 0)
}

pub(crate) fn read_i16(r: &mut impl Read, what: &'static str) -> Result<i16> {
    r.read_i16::<LittleEndian>().map_err(|e| Error::eof_or_io(e, what))
}

pub(crate) fn read_i32(r: &mut impl Read, what: &'static str) -> Result<i32> {
    r.read_i32::<LittleEndian>().map_err(|e| Error::eof_or_io(e, what))
}

pub(crate) fn read_f32(r: &mut impl Read, what: &'static str) -> Result<f32> {
    r.read_f32::<LittleEndian>().map_err(|e| Error::eof_or_io(e, what))
}

/// Read an `i32` count, rejecting negative values.
pub(crate) fn read_count(r: &mut impl Read, what: &'static str) -> Result<usize> {
    let count = read_i32(r, what)?;
    usize::try_from(count).map_err(|_| Error::invalid(format!("negative {what}: {count}")))
}

/// Read a 7-bit encoded unsigned length.
pub fn read_7bit_len(r: &mut impl Read) -> Result<usize> {
    let mut value: u32 = 0;
    for i in 0..MAX_LENGTH_PREFIX_BYTES {
        let byte = read_u8(r, "string length")?;
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value as usize);
        }
    }
    Err(Error::invalid("string length prefix too long"))
}

/// Write a 7-bit encoded unsigned length.
pub fn write_7bit_len(w: &mut impl Write, len: usize) -> Result<()> {
    let mut value = u32::try_from(len).map_err(|_| Error::invalid(format!("string too long: {len} bytes")))?;
    while value >= 0x80 {
        w.write_u8((value as u8) | 0x80)?;
        value >>= 7;
    }
    w.write_u8(value as u8)?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn read_string(r: &mut impl Read, what: &'static str) -> Result<String> {
    let len = read_7bit_len(r)?;
    let mut buf = Vec::with_capacity(len.min(super::format::PREALLOC_LIMIT * 64));
    r.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(Error::UnexpectedEof(what));
    }
    Ok(String::from_utf8(buf)?)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_string(w: &mut impl Write, s: &str) -> Result<()> {
    write_7bit_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

pub(crate) fn write_bool(w: &mut impl Write, value: bool) -> Result<()> {
    w.write_u8(u8::from(value))?;
    Ok(())
}

/// Write a count as `i32`.
pub(crate) fn write_count(w: &mut impl Write, count: usize, what: &str) -> Result<()> {
    let count = i32::try_from(count).map_err(|_| Error::invalid(format!("too many {what}: {count}")))?;
    w.write_i32::<LittleEndian>(count)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_7bit_len_encoding() {
        let cases: [(usize, &[u8]); 4] = [
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
        ];
        for (len, bytes) in cases {
            let mut buf = Vec::new();
            write_7bit_len(&mut buf, len).unwrap();
            assert_eq!(buf, bytes, "len {len}");
            assert_eq!(read_7bit_len(&mut Cursor::new(bytes)).unwrap(), len);
        }
    }

    #[test]
    fn test_string_roundtrip() {
        let mut buf = Vec::new();
        write_string(&mut buf, "Körper/Arm").unwrap();
        let s = read_string(&mut Cursor::new(&buf), "name").unwrap();
        assert_eq!(s, "Körper/Arm");
    }

    #[test]
    fn test_truncated_string() {
        let bytes = [0x05, b'a', b'b'];
        let err = read_string(&mut Cursor::new(&bytes[..]), "name").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof("name")));
    }

    #[test]
    fn test_overlong_prefix() {
        let bytes = [0xff; 6];
        assert!(read_7bit_len(&mut Cursor::new(&bytes[..])).is_err());
    }

    #[test]
    fn test_negative_count() {
        let bytes = (-1i32).to_le_bytes();
        let err = read_count(&mut Cursor::new(&bytes[..]), "part count").unwrap_err();
        assert!(matches!(err, Error::InvalidStructure(_)));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0x02, 0xc3, 0x28];
        let err = read_string(&mut Cursor::new(&bytes[..]), "name").unwrap_err();
        assert!(matches!(err, Error::Utf8(_)));
    }
}
