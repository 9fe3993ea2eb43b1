//! The RPC orchestrator (SPEC_FULL.md §4.H): ties the PDU codec, the NDR
//! engine, and a [`PipeTransport`] together into `open`/`bind`/`call`.

use maybe_async::maybe_async;

use crate::error::{Error, Result};
use crate::ndr::{NdrCodec, NdrDecoder, NdrEncoder, TransferSyntax};
use crate::pdu::{BindAckPdu, BindNakPdu, BindPdu, PduHeader, PduType, RequestPdu, ResponsePdu};
use crate::reassembly::unfragment;
use crate::syntax::AbstractSyntax;
use crate::transport::{FileId, PipeTransport};

/// Tunable bounds, all defaulted to the fixed values SPEC_FULL.md §5
/// names. The same shape as a connection-level config elsewhere in this
/// crate's lineage: documented defaults a caller can override for a slow
/// or constrained transport without patching the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub scratch_buffer_size: usize,
    pub max_deferred_ptr: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            max_xmit_frag: 32768,
            max_recv_frag: 32768,
            scratch_buffer_size: 128 * 1024,
            max_deferred_ptr: crate::ndr::MAX_DEFERRED_PTR,
        }
    }
}

/// One (pipe path, abstract syntax) binding. Not concurrency-safe: the
/// fields touched mid-lifecycle are `handle` (set once, by `open`) and
/// `call_id` (advanced at call submission, SPEC_FULL.md §5).
#[derive(Debug, Clone)]
pub struct Context {
    pub path: String,
    pub abstract_syntax: AbstractSyntax,
    pub tctx_id: u8,
    handle: Option<FileId>,
    call_id: u32,
}

impl Context {
    pub fn new(path: impl Into<String>, abstract_syntax: AbstractSyntax) -> Self {
        Context {
            path: path.into(),
            abstract_syntax,
            tctx_id: 0,
            handle: None,
            call_id: 2,
        }
    }

    pub fn transfer_syntax(&self) -> TransferSyntax {
        TransferSyntax::from_tctx_id(self.tctx_id)
    }

    /// The file-id `open` stored, or `None` before the pipe has been opened.
    pub fn handle(&self) -> Option<FileId> {
        self.handle
    }

    fn next_call_id(&mut self) -> u32 {
        let id = self.call_id;
        self.call_id += 1;
        id
    }
}

/// Orchestrates `open`/`bind`/`call` against a [`PipeTransport`] and a
/// bound [`Context`]. `#[maybe_async]` compiles every method to either an
/// `async fn` or a blocking `fn` depending on the `async`/`sync` feature.
pub struct Client<T: PipeTransport> {
    transport: T,
    config: ClientConfig,
}

impl<T: PipeTransport> Client<T> {
    pub fn new(transport: T) -> Self {
        Client {
            transport,
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Client { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Opens the pipe at `ctx.path`, storing the returned file-id on `ctx`
    /// (SPEC_FULL.md §4.H item 1).
    #[maybe_async]
    pub async fn open(&mut self, ctx: &mut Context) -> Result<()> {
        log::debug!("opening pipe {}", ctx.path);
        ctx.handle = Some(self.transport.open(&ctx.path).await?);
        Ok(())
    }

    /// Negotiates a transfer syntax, storing the selection on `ctx`.
    #[maybe_async]
    pub async fn bind(&mut self, ctx: &mut Context) -> Result<()> {
        let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
        enc.buffer_hint(self.config.scratch_buffer_size);
        let header = PduHeader::new(PduType::Bind, ctx.next_call_id());
        let frag_length_offset = header.encode(&mut enc)?;
        BindPdu {
            abstract_syntax: ctx.abstract_syntax,
        }
        .encode(&mut enc)?;
        let total = enc.len() as u16;
        enc.backfill_u16(frag_length_offset, total)?;

        log::trace!("sending BIND for {:?}", ctx.abstract_syntax.uuid);
        let reply = self.transport.transceive(enc.bytes()).await?;

        let mut dec = NdrDecoder::new(TransferSyntax::Ndr32, &reply);
        let reply_header = PduHeader::decode(&mut dec)?;
        match reply_header.ptype {
            PduType::BindAck => {
                let ack = BindAckPdu::decode(&mut dec)?;
                let tctx_id = ack.accepted_tctx_id().ok_or_else(|| {
                    Error::Protocol("BIND_ACK rejected every proposed context".to_string())
                })?;
                log::debug!("BIND accepted, tctx_id={tctx_id}");
                ctx.tctx_id = tctx_id;
                Ok(())
            }
            PduType::BindNak => {
                let nak = BindNakPdu::decode(&mut dec)?;
                Err(nak.as_error())
            }
            other => Err(Error::Protocol(format!(
                "expected BIND_ACK or BIND_NAK, got {other:?}"
            ))),
        }
    }

    /// Marshals `req`, issues a REQUEST, reassembles the RESPONSE
    /// fragments, and unmarshals the reply as `Resp`.
    #[maybe_async]
    pub async fn call<Req: NdrCodec, Resp: NdrCodec>(
        &mut self,
        ctx: &mut Context,
        opnum: u16,
        req: &Req,
    ) -> Result<Resp> {
        let syntax = ctx.transfer_syntax();
        let mut enc = NdrEncoder::new(syntax);
        enc.buffer_hint(self.config.scratch_buffer_size);
        let header = PduHeader::new(PduType::Request, ctx.next_call_id());
        let frag_length_offset = header.encode(&mut enc)?;
        let request = RequestPdu {
            context_id: ctx.tctx_id as u16,
            opnum,
        };
        let alloc_hint_offset = request.encode(&mut enc)?;
        req.ndr_encode(&mut enc, true)?;
        enc.process_deferred()?;

        let total = enc.len();
        enc.backfill_u16(frag_length_offset, total as u16)?;
        let stub_len = (total - alloc_hint_offset - 8) as u32;
        enc.backfill_u32(alloc_hint_offset, stub_len)?;

        log::trace!("sending REQUEST opnum={opnum} ({total} bytes)");
        let mut reply = self.transport.transceive(enc.bytes()).await?;
        unfragment(&mut reply)?;

        let mut dec = NdrDecoder::new(syntax, &reply);
        let reply_header = PduHeader::decode(&mut dec)?;
        if reply_header.ptype != PduType::Response {
            return Err(Error::Protocol(format!(
                "expected RESPONSE, got {:?}",
                reply_header.ptype
            )));
        }
        let _response = ResponsePdu::decode(&mut dec)?;
        let result = Resp::ndr_decode(&mut dec, true)?;
        dec.process_deferred()?;
        Ok(result)
    }
}
