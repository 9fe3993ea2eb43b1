use super::{NdrCodec, NdrDecoder, NdrEncoder};
use crate::error::Result;

/// A word whose on-wire width depends on the negotiated transfer syntax:
/// 4 bytes under NDR32, 8 bytes under NDR64. Decoded NDR32 values are
/// widened to 64 bits, so callers always see a `u64` regardless of which
/// syntax was negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size3264(pub u64);

impl From<u64> for Size3264 {
    fn from(v: u64) -> Self {
        Size3264(v)
    }
}

impl From<Size3264> for u64 {
    fn from(v: Size3264) -> Self {
        v.0
    }
}

impl NdrCodec for Size3264 {
    fn ndr_encode(&self, enc: &mut NdrEncoder, _top_level: bool) -> Result<()> {
        enc.put_3264(self.0)
    }

    fn ndr_decode(dec: &mut NdrDecoder, _top_level: bool) -> Result<Self> {
        Ok(Size3264(dec.get_3264()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndr::TransferSyntax;

    #[test]
    fn round_trips_under_both_syntaxes() {
        for syntax in [TransferSyntax::Ndr32, TransferSyntax::Ndr64] {
            let mut enc = NdrEncoder::new(syntax);
            Size3264(0x1234_5678).ndr_encode(&mut enc, false).unwrap();
            let bytes = enc.into_inner();
            let mut dec = NdrDecoder::new(syntax, &bytes);
            assert_eq!(Size3264::ndr_decode(&mut dec, false).unwrap().0, 0x1234_5678);
        }
    }
}
