use super::{NdrCodec, NdrDecoder, NdrEncoder};
use crate::error::Result;

/// A DCE/RPC UUID. `v1`/`v2`/`v3` are encoded little-endian like everything
/// else on the wire; `v4` is the odd one out (SPEC_FULL.md §3, §9): it is
/// emitted as the eight big-endian bytes of the 64-bit integer, regardless
/// of the packet's declared little-endian drep. Preserve this exactly —
/// real DCE/RPC peers depend on it.
#[binrw::binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[brw(little)]
pub struct Uuid {
    pub v1: u32,
    pub v2: u16,
    pub v3: u16,
    #[brw(big)]
    pub v4: u64,
}

impl Uuid {
    pub const ZERO: Uuid = Uuid {
        v1: 0,
        v2: 0,
        v3: 0,
        v4: 0,
    };

    pub const fn new(v1: u32, v2: u16, v3: u16, v4: u64) -> Self {
        Uuid { v1, v2, v3, v4 }
    }
}

impl NdrCodec for Uuid {
    fn ndr_encode(&self, enc: &mut NdrEncoder, _top_level: bool) -> Result<()> {
        enc.put_u32(self.v1)?;
        enc.put_u16(self.v2)?;
        enc.put_u16(self.v3)?;
        enc.put_raw(&self.v4.to_be_bytes())
    }

    fn ndr_decode(dec: &mut NdrDecoder, _top_level: bool) -> Result<Self> {
        let v1 = dec.get_u32()?;
        let v2 = dec.get_u16()?;
        let v3 = dec.get_u16()?;
        let v4_bytes = dec.get_bytes(8)?;
        let v4 = u64::from_be_bytes(v4_bytes.try_into().unwrap());
        Ok(Uuid { v1, v2, v3, v4 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndr::TransferSyntax;
    use binrw::{BinRead, BinWrite};
    use std::io::Cursor;

    const NDR32_UUID: Uuid = Uuid::new(0x8a885d04, 0x1ceb, 0x11c9, 0x9fe808002b104860);

    #[test]
    fn ndr_round_trip() {
        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        NDR32_UUID.ndr_encode(&mut enc, false).unwrap();
        let bytes = enc.into_inner();
        assert_eq!(bytes.len(), 16);
        let mut dec = NdrDecoder::new(TransferSyntax::Ndr32, &bytes);
        assert_eq!(Uuid::ndr_decode(&mut dec, false).unwrap(), NDR32_UUID);
    }

    #[test]
    fn v4_is_big_endian_on_the_wire() {
        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        NDR32_UUID.ndr_encode(&mut enc, false).unwrap();
        let bytes = enc.into_inner();
        // v1 (4) + v2 (2) + v3 (2) = 8 bytes in, v4 starts.
        assert_eq!(&bytes[8..16], &NDR32_UUID.v4.to_be_bytes());
    }

    #[test]
    fn binrw_impl_matches_ndr_encoding() {
        let mut cursor = Cursor::new(Vec::new());
        NDR32_UUID.write_le(&mut cursor).unwrap();
        let via_binrw = cursor.into_inner();

        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        NDR32_UUID.ndr_encode(&mut enc, false).unwrap();
        let via_ndr = enc.into_inner();

        assert_eq!(via_binrw, via_ndr);

        let mut cursor = Cursor::new(via_binrw);
        let parsed = Uuid::read_le(&mut cursor).unwrap();
        assert_eq!(parsed, NDR32_UUID);
    }
}
