//! Fragment reassembly (SPEC_FULL.md §4.G), grounded in the original
//! implementation's `dce_unfragment_ioctl`: coalesces one or more RESPONSE
//! PDUs, concatenated in a single buffer exactly as the transport
//! delivered them, into one logical PDU.

use crate::error::{Error, Result};
use crate::ndr::{NdrDecoder, TransferSyntax};
use crate::pdu::{PduHeader, PduType, PFC_LAST_FRAG, RESPONSE_HEADER_LEN};
use crate::wire;

const COMMON_HEADER_LEN: usize = 16;
const MIN_FRAGMENT_LEN: usize = COMMON_HEADER_LEN + RESPONSE_HEADER_LEN;

/// Coalesces every RESPONSE fragment in `buf` into a single logical PDU in
/// place, truncating `buf` to the unfragmented length. No-op if the first
/// fragment already carries `LAST_FRAG`.
///
/// `buf` must start with a complete common header; anything beyond the
/// last fragment's declared `frag_length` is an error, since the pipe
/// transport never delivers a partial fragment's trailing bytes mixed
/// with the next PDU (SPEC_FULL.md §6).
pub fn unfragment(buf: &mut Vec<u8>) -> Result<()> {
    if buf.len() < COMMON_HEADER_LEN {
        return Err(Error::Protocol(
            "fragment buffer shorter than a common header".to_string(),
        ));
    }

    let first_header = decode_header(&buf[..])?;
    if first_header.ptype != PduType::Response {
        return Err(Error::Protocol(format!(
            "expected RESPONSE PDU, got {:?}",
            first_header.ptype
        )));
    }
    if first_header.is_last_frag() {
        return Ok(());
    }

    let mut unfragment_len = first_header.frag_length as usize;
    let mut read_pos = unfragment_len;
    let mut total_len: usize = unfragment_len;
    let mut last_seen = false;

    while !last_seen {
        let remaining = buf.len().saturating_sub(read_pos);
        if remaining < MIN_FRAGMENT_LEN {
            return Err(Error::Protocol(format!(
                "truncated fragment: {remaining} bytes remain, need at least {MIN_FRAGMENT_LEN}"
            )));
        }
        let header = decode_header(&buf[read_pos..])?;
        if header.ptype != PduType::Response {
            return Err(Error::Protocol(format!(
                "expected RESPONSE fragment, got {:?}",
                header.ptype
            )));
        }
        let frag_len = header.frag_length as usize;
        if frag_len < COMMON_HEADER_LEN || read_pos + frag_len > buf.len() {
            return Err(Error::Protocol(format!(
                "fragment frag_length {frag_len} inconsistent with buffer bounds"
            )));
        }

        let stub_start = read_pos + COMMON_HEADER_LEN;
        let stub_len = frag_len - COMMON_HEADER_LEN;
        buf.copy_within(stub_start..stub_start + stub_len, unfragment_len);

        unfragment_len += stub_len;
        read_pos += frag_len;
        total_len += frag_len;
        last_seen = header.is_last_frag();
    }

    wire::set_u16(
        buf,
        8,
        u16::try_from(total_len).unwrap_or(u16::MAX),
    )?;
    let pfc_flags_offset = 3;
    let mut pfc_flags = wire::get_u8(buf, pfc_flags_offset)?;
    pfc_flags |= PFC_LAST_FRAG;
    wire::set_u8(buf, pfc_flags_offset, pfc_flags)?;

    buf.truncate(unfragment_len);
    Ok(())
}

fn decode_header(bytes: &[u8]) -> Result<PduHeader> {
    let mut dec = NdrDecoder::new(TransferSyntax::Ndr32, bytes);
    PduHeader::decode(&mut dec)
}
