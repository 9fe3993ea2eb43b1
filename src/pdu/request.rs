//! REQUEST/RESPONSE bodies (SPEC_FULL.md §4.F). Both are thin fixed
//! headers that precede the user's own NDR-encoded stub data.

use crate::error::{Error, Result};
use crate::ndr::{NdrDecoder, NdrEncoder};

/// `u32 alloc_hint, u16 context_id, u8 cancel_count, u8 reserved`.
pub const RESPONSE_HEADER_LEN: usize = 8;

const MAX_ALLOC_HINT: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPdu {
    pub context_id: u16,
    pub opnum: u16,
}

impl RequestPdu {
    /// Writes the fixed REQUEST header and returns the buffer offset of
    /// `alloc_hint`, to be backfilled once the stub has been encoded.
    pub fn encode(&self, enc: &mut NdrEncoder) -> Result<usize> {
        let alloc_hint_offset = enc.len();
        enc.put_u32(0)?; // alloc_hint, backfilled by the caller
        enc.put_u16(self.context_id)?;
        enc.put_u16(self.opnum)?;
        Ok(alloc_hint_offset)
    }
}

/// Decoded RESPONSE fixed header. `alloc_hint` has already been range
/// checked against [`MAX_ALLOC_HINT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePdu {
    pub alloc_hint: u32,
    pub context_id: u16,
    pub cancel_count: u8,
}

impl ResponsePdu {
    pub fn decode(dec: &mut NdrDecoder) -> Result<Self> {
        let alloc_hint = dec.get_u32()?;
        if alloc_hint > MAX_ALLOC_HINT {
            return Err(Error::Protocol(format!(
                "RESPONSE alloc_hint {alloc_hint} exceeds {MAX_ALLOC_HINT} byte limit"
            )));
        }
        let context_id = dec.get_u16()?;
        let cancel_count = dec.get_u8()?;
        let _reserved = dec.get_u8()?;
        Ok(ResponsePdu {
            alloc_hint,
            context_id,
            cancel_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndr::TransferSyntax;

    #[test]
    fn request_header_backfill_offset() {
        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        let req = RequestPdu {
            context_id: 0,
            opnum: 5,
        };
        let offset = req.encode(&mut enc).unwrap();
        assert_eq!(offset, 0);
        enc.backfill_u32(offset, 123).unwrap();
        let bytes = enc.into_inner();
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 123);
        assert_eq!(u16::from_le_bytes(bytes[6..8].try_into().unwrap()), 5);
    }

    #[test]
    fn response_rejects_oversized_alloc_hint() {
        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        enc.put_u32(MAX_ALLOC_HINT + 1).unwrap();
        enc.put_u16(0).unwrap();
        enc.put_u8(0).unwrap();
        enc.put_u8(0).unwrap();
        let bytes = enc.into_inner();
        let mut dec = NdrDecoder::new(TransferSyntax::Ndr32, &bytes);
        assert!(ResponsePdu::decode(&mut dec).is_err());
    }

    #[test]
    fn response_accepts_boundary_alloc_hint() {
        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        enc.put_u32(MAX_ALLOC_HINT).unwrap();
        enc.put_u16(1).unwrap();
        enc.put_u8(0).unwrap();
        enc.put_u8(0).unwrap();
        let bytes = enc.into_inner();
        let mut dec = NdrDecoder::new(TransferSyntax::Ndr32, &bytes);
        let resp = ResponsePdu::decode(&mut dec).unwrap();
        assert_eq!(resp.alloc_hint, MAX_ALLOC_HINT);
        assert_eq!(resp.context_id, 1);
    }
}
