use super::{NdrCodec, NdrDecoder, NdrEncoder};
use crate::error::{Error, Result};

/// A NUL-terminated, counted UCS-2 conformant-varying array — the NDR
/// encoding DCE/RPC uses for strings (SPEC_FULL.md §4.B).
///
/// Wire layout: `{max_count, offset=0, actual_count, data[actual_count],
/// u16 NUL}` where `max_count == actual_count == code_units + 1`. UCS-2
/// proper has no surrogate pairs, but real-world peers (and this crate)
/// treat it as UTF-16, which is a strict superset and round-trips ASCII
/// and BMP text identically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ucs2zString(pub String);

impl From<String> for Ucs2zString {
    fn from(s: String) -> Self {
        Ucs2zString(s)
    }
}

impl From<&str> for Ucs2zString {
    fn from(s: &str) -> Self {
        Ucs2zString(s.to_string())
    }
}

impl NdrCodec for Ucs2zString {
    fn ndr_encode(&self, enc: &mut NdrEncoder, _top_level: bool) -> Result<()> {
        let units: Vec<u16> = self.0.encode_utf16().collect();
        let count = (units.len() + 1) as u64; // including the NUL terminator
        enc.put_3264(count)?; // max_count
        enc.put_3264(0)?; // offset
        enc.put_3264(count)?; // actual_count
        for unit in &units {
            enc.put_u16(*unit)?;
        }
        enc.put_u16(0) // terminator
    }

    fn ndr_decode(dec: &mut NdrDecoder, _top_level: bool) -> Result<Self> {
        let max_count = dec.get_3264()?;
        let offset = dec.get_3264()?;
        if offset != 0 {
            return Err(Error::Protocol(format!(
                "ucs2z conformant array offset must be 0, got {offset}"
            )));
        }
        let actual_count = dec.get_3264()?;
        if actual_count == 0 || actual_count > max_count {
            return Err(Error::Protocol(format!(
                "ucs2z actual_count {actual_count} out of range for max_count {max_count}"
            )));
        }

        let mut units = Vec::with_capacity(actual_count as usize);
        for _ in 0..actual_count {
            units.push(dec.get_u16()?);
        }
        if units.pop() != Some(0) {
            return Err(Error::Protocol(
                "ucs2z string missing NUL terminator".to_string(),
            ));
        }

        let s = String::from_utf16(&units)
            .map_err(|e| Error::Protocol(format!("invalid UTF-16 in ucs2z string: {e}")))?;
        Ok(Ucs2zString(s))
    }
}
