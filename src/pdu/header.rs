//! The 16-byte common header every PDU starts with (SPEC_FULL.md §4.D).

use super::PduType;
use crate::error::{Error, Result};
use crate::ndr::{NdrDecoder, NdrEncoder};

pub const PFC_FIRST_FRAG: u8 = 0x01;
pub const PFC_LAST_FRAG: u8 = 0x02;

/// `drep[0]`: little-endian integers, ASCII characters. The only packed_drep
/// this client ever emits or accepts (SPEC_FULL.md Non-goals: no
/// big-endian support).
const DREP_LITTLE_ENDIAN_ASCII: u8 = 0x10;

const RPC_VERS: u8 = 5;
const RPC_VERS_MINOR: u8 = 0;

pub const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub ptype: PduType,
    pub pfc_flags: u8,
    pub frag_length: u16,
    pub call_id: u32,
}

impl PduHeader {
    pub fn new(ptype: PduType, call_id: u32) -> Self {
        PduHeader {
            ptype,
            pfc_flags: PFC_FIRST_FRAG | PFC_LAST_FRAG,
            frag_length: 0,
            call_id,
        }
    }

    /// Writes the header and returns the buffer offset of `frag_length`,
    /// so the caller can backfill it once the body's length is known.
    pub fn encode(&self, enc: &mut NdrEncoder) -> Result<usize> {
        enc.put_u8(RPC_VERS)?;
        enc.put_u8(RPC_VERS_MINOR)?;
        enc.put_u8(self.ptype.to_wire())?;
        enc.put_u8(self.pfc_flags)?;
        enc.put_u8(DREP_LITTLE_ENDIAN_ASCII)?;
        enc.put_u8(0)?;
        enc.put_u8(0)?;
        enc.put_u8(0)?;
        let frag_length_offset = enc.len();
        enc.put_u16(self.frag_length)?;
        enc.put_u16(0)?; // auth_length, always 0
        enc.put_u32(self.call_id)?;
        Ok(frag_length_offset)
    }

    pub fn decode(dec: &mut NdrDecoder) -> Result<Self> {
        let rpc_vers = dec.get_u8()?;
        let rpc_vers_minor = dec.get_u8()?;
        if rpc_vers != RPC_VERS || rpc_vers_minor != RPC_VERS_MINOR {
            return Err(Error::Protocol(format!(
                "unsupported rpc version {rpc_vers}.{rpc_vers_minor}"
            )));
        }
        let ptype_raw = dec.get_u8()?;
        let ptype = PduType::from_wire(ptype_raw)
            .ok_or_else(|| Error::Protocol(format!("unrecognized PTYPE {ptype_raw}")))?;
        let pfc_flags = dec.get_u8()?;
        let _drep0 = dec.get_u8()?;
        let _drep1 = dec.get_u8()?;
        let _drep2 = dec.get_u8()?;
        let _drep3 = dec.get_u8()?;
        let frag_length = dec.get_u16()?;
        let auth_length = dec.get_u16()?;
        if auth_length != 0 {
            return Err(Error::Protocol(
                "auth_length must be 0: authenticated responses are unsupported".to_string(),
            ));
        }
        let call_id = dec.get_u32()?;
        Ok(PduHeader {
            ptype,
            pfc_flags,
            frag_length,
            call_id,
        })
    }

    pub fn is_last_frag(&self) -> bool {
        self.pfc_flags & PFC_LAST_FRAG != 0
    }
}
