//! Binary primitives shared by the index, filebase and package formats
//!
//! - strings: 7-bit variable-length byte count (low group first) + UTF-8 bytes
//! - int32: 4 bytes little endian
//! - bool: 1 byte, nonzero = true

use crate::error::{Error, Result};
use std::io::{self, Read, Write};

/// A 32-bit length never needs more than five 7-bit groups
const MAX_PREFIX_BYTES: usize = 5;

pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| Error::Corrupt(format!("string of {} bytes is too long", value.len())))?;
    write_7bit(writer, len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Read a string that must be present
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    read_string_or_eof(reader)?
        .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))
}

/// Read a string, or `None` when the stream ends cleanly before its first byte
pub fn read_string_or_eof<R: Read>(reader: &mut R) -> Result<Option<String>> {
    let mut first = [0u8; 1];
    loop {
        match reader.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = read_7bit_continue(reader, first[0])? as u64;
    // Grow with the data actually read; a damaged prefix can claim up to 4 GiB
    let mut bytes = Vec::new();
    if reader.take(len).read_to_end(&mut bytes)? as u64 != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("string of {} bytes ends after {}", len, bytes.len()),
        )
        .into());
    }

    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| Error::Corrupt(format!("string is not valid UTF-8: {}", e)))
}

/// Encoded size of a string, prefix included
pub fn string_len(value: &str) -> u64 {
    let mut len = value.len() as u64;
    let mut prefix = 1;
    while len >= 0x80 {
        len >>= 7;
        prefix += 1;
    }
    prefix + value.len() as u64
}

pub fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

pub fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<()> {
    writer.write_all(&[value as u8])?;
    Ok(())
}

pub fn read_bool<R: Read>(reader: &mut R) -> Result<bool> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0] != 0)
}

fn write_7bit<W: Write>(writer: &mut W, mut value: u32) -> Result<()> {
    let mut buf = [0u8; MAX_PREFIX_BYTES];
    let mut n = 0;
    while value >= 0x80 {
        buf[n] = (value as u8) | 0x80;
        value >>= 7;
        n += 1;
    }
    buf[n] = value as u8;
    writer.write_all(&buf[..=n])?;
    Ok(())
}

fn read_7bit_continue<R: Read>(reader: &mut R, first: u8) -> Result<u32> {
    let mut result = (first & 0x7f) as u32;
    let mut byte = first;
    let mut shift = 7;

    for _ in 1..MAX_PREFIX_BYTES {
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        let mut next = [0u8; 1];
        reader.read_exact(&mut next)?;
        byte = next[0];
        result |= ((byte & 0x7f) as u32) << shift;
        shift += 7;
    }

    // The fifth group may only carry the top 4 bits and must end the prefix
    if byte > 0x0f {
        return Err(Error::Corrupt("string length prefix overflows 32 bits".into()));
    }
    Ok(result)
}
