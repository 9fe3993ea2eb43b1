//! Little-endian fixed-width integer access into a length-bounded buffer.
//!
//! This is the lowest layer of the stack: every other coder ultimately
//! bottoms out in one of these accessors. Unlike the C original, which
//! trusts the caller to have checked bounds, every accessor here is
//! bounds-checked and returns [`Error::Protocol`] on overrun rather than
//! relying on the caller.

use crate::error::{Error, Result};

fn oob(offset: usize, len: usize, buf_len: usize) -> Error {
    Error::Protocol(format!(
        "buffer access out of bounds: offset {offset} len {len} buffer size {buf_len}"
    ))
}

pub fn get_u8(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset).copied().ok_or_else(|| oob(offset, 1, buf.len()))
}

pub fn get_u16(buf: &[u8], offset: usize) -> Result<u16> {
    let bytes = buf
        .get(offset..offset + 2)
        .ok_or_else(|| oob(offset, 2, buf.len()))?;
    Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn get_u32(buf: &[u8], offset: usize) -> Result<u32> {
    let bytes = buf
        .get(offset..offset + 4)
        .ok_or_else(|| oob(offset, 4, buf.len()))?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn get_u64(buf: &[u8], offset: usize) -> Result<u64> {
    let bytes = buf
        .get(offset..offset + 8)
        .ok_or_else(|| oob(offset, 8, buf.len()))?;
    Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn set_u8(buf: &mut [u8], offset: usize, val: u8) -> Result<()> {
    let slot = buf.get_mut(offset).ok_or_else(|| oob(offset, 1, 0))?;
    *slot = val;
    Ok(())
}

pub fn set_u16(buf: &mut [u8], offset: usize, val: u16) -> Result<()> {
    let len = buf.len();
    let slot = buf
        .get_mut(offset..offset + 2)
        .ok_or_else(|| oob(offset, 2, len))?;
    slot.copy_from_slice(&val.to_le_bytes());
    Ok(())
}

pub fn set_u32(buf: &mut [u8], offset: usize, val: u32) -> Result<()> {
    let len = buf.len();
    let slot = buf
        .get_mut(offset..offset + 4)
        .ok_or_else(|| oob(offset, 4, len))?;
    slot.copy_from_slice(&val.to_le_bytes());
    Ok(())
}

pub fn set_u64(buf: &mut [u8], offset: usize, val: u64) -> Result<()> {
    let len = buf.len();
    let slot = buf
        .get_mut(offset..offset + 8)
        .ok_or_else(|| oob(offset, 8, len))?;
    slot.copy_from_slice(&val.to_le_bytes());
    Ok(())
}

/// Rounds `offset` up to the next multiple of `align` (a power of two).
pub fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}
