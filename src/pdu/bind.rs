//! BIND / BIND_ACK / BIND_NAK bodies (SPEC_FULL.md §4.E). The two
//! presentation contexts proposed in every BIND — {abstract syntax, NDR32}
//! and {abstract syntax, NDR64} — are fixed by this client; only the
//! abstract syntax varies per [`crate::syntax::AbstractSyntax`].

use crate::error::{Error, Result};
use crate::ndr::{NdrCodec, NdrDecoder, NdrEncoder, Uuid};

const MAX_XMIT_FRAG: u16 = 32768;
const MAX_RECV_FRAG: u16 = 32768;

/// `{uuid, version, version_minor}` identifying either an abstract
/// interface or a transfer syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxId {
    pub uuid: Uuid,
    pub version: u16,
    pub version_minor: u16,
}

impl SyntaxId {
    pub const NDR32: SyntaxId = SyntaxId {
        uuid: Uuid::new(0x8a885d04, 0x1ceb, 0x11c9, 0x9fe808002b104860),
        version: 2,
        version_minor: 0,
    };

    pub const NDR64: SyntaxId = SyntaxId {
        uuid: Uuid::new(0x71710533, 0xbeba, 0x4937, 0x8319b5dbef9ccc36),
        version: 1,
        version_minor: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationContext {
    pub ctx_id: u16,
    pub abstract_syntax: SyntaxId,
    pub transfer_syntax: SyntaxId,
}

impl PresentationContext {
    fn encode(&self, enc: &mut NdrEncoder) -> Result<()> {
        enc.put_u16(self.ctx_id)?;
        enc.put_u8(1)?; // num_trans
        enc.put_u8(0)?; // padding
        self.abstract_syntax.uuid.ndr_encode(enc, false)?;
        enc.put_u16(self.abstract_syntax.version)?;
        enc.put_u16(self.abstract_syntax.version_minor)?;
        self.transfer_syntax.uuid.ndr_encode(enc, false)?;
        enc.put_u16(self.transfer_syntax.version)?;
        enc.put_u16(0)?; // padding
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindPdu {
    pub abstract_syntax: SyntaxId,
}

impl BindPdu {
    pub fn contexts(&self) -> [PresentationContext; 2] {
        [
            PresentationContext {
                ctx_id: 0,
                abstract_syntax: self.abstract_syntax,
                transfer_syntax: SyntaxId::NDR32,
            },
            PresentationContext {
                ctx_id: 1,
                abstract_syntax: self.abstract_syntax,
                transfer_syntax: SyntaxId::NDR64,
            },
        ]
    }

    pub fn encode(&self, enc: &mut NdrEncoder) -> Result<()> {
        enc.put_u16(MAX_XMIT_FRAG)?;
        enc.put_u16(MAX_RECV_FRAG)?;
        enc.put_u32(0)?; // assoc_group_id
        enc.put_u8(2)?; // num_ctx
        enc.put_u8(0)?;
        enc.put_u8(0)?;
        enc.put_u8(0)?;
        for ctx in self.contexts() {
            ctx.encode(enc)?;
        }
        Ok(())
    }
}

/// Result code for a single proposed presentation context, per DCE/RPC 1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckResult {
    Acceptance,
    UserRejection,
    ProviderRejection,
    Other(u16),
}

impl AckResult {
    fn from_wire(val: u16) -> Self {
        match val {
            0 => AckResult::Acceptance,
            1 => AckResult::UserRejection,
            2 => AckResult::ProviderRejection,
            other => AckResult::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationResult {
    pub ack_result: AckResult,
    pub ack_reason: u16,
    pub transfer_syntax: Uuid,
    pub syntax_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindAckPdu {
    pub results: Vec<PresentationResult>,
}

impl BindAckPdu {
    /// Decodes the BIND_ACK body. The common header has already been
    /// consumed by the caller.
    pub fn decode(dec: &mut NdrDecoder) -> Result<Self> {
        let _max_xmit = dec.get_u16()?;
        let _max_recv = dec.get_u16()?;
        let _assoc_group = dec.get_u32()?;
        let sec_addr_len = dec.get_u16()? as usize;
        for _ in 0..sec_addr_len {
            dec.get_u8()?;
        }
        dec.align(4)?;
        let num_results = dec.get_u8()?;
        dec.get_u8()?;
        dec.get_u8()?;
        dec.get_u8()?;

        let mut results = Vec::with_capacity(num_results as usize);
        for _ in 0..num_results {
            let ack_result = AckResult::from_wire(dec.get_u16()?);
            let ack_reason = dec.get_u16()?;
            let transfer_syntax = Uuid::ndr_decode(dec, false)?;
            let syntax_version = dec.get_u32()?;
            results.push(PresentationResult {
                ack_result,
                ack_reason,
                transfer_syntax,
                syntax_version,
            });
        }
        Ok(BindAckPdu { results })
    }

    /// Lowest-indexed accepted result, if any. Its index is the
    /// negotiated `tctx_id` (SPEC_FULL.md §4.E selection rule).
    pub fn accepted_tctx_id(&self) -> Option<u8> {
        self.results
            .iter()
            .position(|r| r.ack_result == AckResult::Acceptance)
            .map(|idx| idx as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindNakPdu {
    pub reject_reason: u16,
    pub versions: Vec<(u8, u8)>,
}

impl BindNakPdu {
    pub fn decode(dec: &mut NdrDecoder) -> Result<Self> {
        let reject_reason = dec.get_u16()?;
        let num_protocols = dec.get_u8()?;
        let mut versions = Vec::with_capacity(num_protocols as usize);
        for _ in 0..num_protocols {
            let major = dec.get_u8()?;
            let minor = dec.get_u8()?;
            versions.push((major, minor));
        }
        Ok(BindNakPdu {
            reject_reason,
            versions,
        })
    }

    pub fn as_error(&self) -> Error {
        Error::Protocol(format!(
            "BIND rejected by peer: reject_reason={}",
            self.reject_reason
        ))
    }
}
