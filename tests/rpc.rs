mod common;

use common::MockTransport;
use dcerpc_pipe::client::{ClientConfig, Context};
use dcerpc_pipe::error::Error;
use dcerpc_pipe::ndr::{NdrCodec, NdrDecoder, NdrEncoder, TransferSyntax, UniquePtr};
use dcerpc_pipe::pdu::{PduHeader, PduType, SyntaxId};
use dcerpc_pipe::syntax::SRVSVC;
use dcerpc_pipe::Client;

fn bind_ack_reply(results: &[(u16, u32)]) -> Vec<u8> {
    let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
    let header = PduHeader::new(PduType::BindAck, 2);
    let frag_length_offset = header.encode(&mut enc).unwrap();
    enc.put_u16(32768).unwrap(); // max_xmit
    enc.put_u16(32768).unwrap(); // max_recv
    enc.put_u32(0).unwrap(); // assoc_group
    enc.put_u16(0).unwrap(); // sec_addr_len
    enc.align(4).unwrap();
    enc.put_u8(results.len() as u8).unwrap();
    enc.put_u8(0).unwrap();
    enc.put_u8(0).unwrap();
    enc.put_u8(0).unwrap();
    for (ack_result, syntax_version) in results {
        enc.put_u16(*ack_result).unwrap();
        enc.put_u16(0).unwrap(); // ack_reason
        SyntaxId::NDR32.uuid.ndr_encode(&mut enc, false).unwrap();
        enc.put_u32(*syntax_version).unwrap();
    }
    let total = enc.len() as u16;
    enc.backfill_u16(frag_length_offset, total).unwrap();
    enc.into_inner()
}

fn bind_nak_reply(reject_reason: u16) -> Vec<u8> {
    let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
    let header = PduHeader::new(PduType::BindNak, 2);
    let frag_length_offset = header.encode(&mut enc).unwrap();
    enc.put_u16(reject_reason).unwrap();
    enc.put_u8(0).unwrap(); // num_protocols
    let total = enc.len() as u16;
    enc.backfill_u16(frag_length_offset, total).unwrap();
    enc.into_inner()
}

#[test_log::test(maybe_async::test(
    not(feature = "async"),
    async(feature = "async", tokio::test(flavor = "multi_thread"))
))]
async fn bind_accepts_context_zero_selects_ndr32() -> dcerpc_pipe::Result<()> {
    let reply = bind_ack_reply(&[(0, 2), (0, 1)]);
    let transport = MockTransport::new(vec![reply]);
    let mut client = Client::new(transport);
    let mut ctx = Context::new("\\PIPE\\srvsvc", SRVSVC);
    client.bind(&mut ctx).await?;
    assert_eq!(ctx.tctx_id, 0);
    Ok(())
}

#[test_log::test(maybe_async::test(
    not(feature = "async"),
    async(feature = "async", tokio::test(flavor = "multi_thread"))
))]
async fn bind_accepts_context_one_only_selects_ndr64() -> dcerpc_pipe::Result<()> {
    let reply = bind_ack_reply(&[(2, 2), (0, 1)]); // 2 = provider rejection
    let transport = MockTransport::new(vec![reply]);
    let mut client = Client::new(transport);
    let mut ctx = Context::new("\\PIPE\\srvsvc", SRVSVC);
    client.bind(&mut ctx).await?;
    assert_eq!(ctx.tctx_id, 1);
    Ok(())
}

#[test_log::test(maybe_async::test(
    not(feature = "async"),
    async(feature = "async", tokio::test(flavor = "multi_thread"))
))]
async fn bind_all_rejected_fails() -> dcerpc_pipe::Result<()> {
    let reply = bind_ack_reply(&[(1, 2), (2, 1)]);
    let transport = MockTransport::new(vec![reply]);
    let mut client = Client::new(transport);
    let mut ctx = Context::new("\\PIPE\\srvsvc", SRVSVC);
    let err = client.bind(&mut ctx).await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
    Ok(())
}

#[test_log::test(maybe_async::test(
    not(feature = "async"),
    async(feature = "async", tokio::test(flavor = "multi_thread"))
))]
async fn bind_nak_fails_with_reject_reason() -> dcerpc_pipe::Result<()> {
    let reply = bind_nak_reply(7);
    let transport = MockTransport::new(vec![reply]);
    let mut client = Client::new(transport);
    let mut ctx = Context::new("\\PIPE\\srvsvc", SRVSVC);
    let err = client.bind(&mut ctx).await.unwrap_err();
    match err {
        Error::Protocol(msg) => assert!(msg.contains('7')),
        other => panic!("expected Protocol error, got {other:?}"),
    }
    Ok(())
}

/// Call argument exercising both pointer placements named in the full
/// end-to-end scenario: `top` is threaded with whatever `top_level` value
/// the caller passes to the struct itself (so it behaves like a top-level
/// procedure-argument pointer), `embedded` is always marshalled as a
/// non-top-level referent.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallArgs {
    top: UniquePtr<u32>,
    embedded: UniquePtr<u32>,
}

impl NdrCodec for CallArgs {
    fn ndr_encode(&self, enc: &mut NdrEncoder, top_level: bool) -> dcerpc_pipe::Result<()> {
        self.top.ndr_encode(enc, top_level)?;
        self.embedded.ndr_encode(enc, false)
    }

    fn ndr_decode(dec: &mut NdrDecoder, top_level: bool) -> dcerpc_pipe::Result<Self> {
        let top = UniquePtr::ndr_decode(dec, top_level)?;
        let embedded = UniquePtr::ndr_decode(dec, false)?;
        Ok(CallArgs { top, embedded })
    }
}

fn response_reply(call_id: u32, body: &[u8]) -> Vec<u8> {
    let mut enc = NdrEncoder::new(TransferSyntax::Ndr32);
    let header = PduHeader::new(PduType::Response, call_id);
    let frag_length_offset = header.encode(&mut enc).unwrap();
    enc.put_u32(0).unwrap(); // alloc_hint
    enc.put_u16(0).unwrap(); // context_id
    enc.put_u8(0).unwrap(); // cancel_count
    enc.put_u8(0).unwrap(); // reserved
    for b in body {
        enc.put_u8(*b).unwrap();
    }
    let total = enc.len() as u16;
    enc.backfill_u16(frag_length_offset, total).unwrap();
    enc.into_inner()
}

#[test_log::test(maybe_async::test(
    not(feature = "async"),
    async(feature = "async", tokio::test(flavor = "multi_thread"))
))]
async fn full_call_through_mock_transport_round_trips() -> dcerpc_pipe::Result<()> {
    let bind_reply = bind_ack_reply(&[(0, 2), (0, 1)]);

    let mut body_enc = NdrEncoder::new(TransferSyntax::Ndr32);
    let response_value = CallArgs {
        top: UniquePtr::some(11),
        embedded: UniquePtr::some(22),
    };
    response_value.ndr_encode(&mut body_enc, true)?;
    body_enc.process_deferred()?;
    let call_reply = response_reply(3, &body_enc.into_inner());

    let transport = MockTransport::new(vec![bind_reply, call_reply]);
    let mut client = Client::with_config(transport, ClientConfig::default());
    let mut ctx = Context::new("\\PIPE\\srvsvc", SRVSVC);
    client.open(&mut ctx).await?;
    client.bind(&mut ctx).await?;

    let request = CallArgs {
        top: UniquePtr::some(1),
        embedded: UniquePtr::some(2),
    };
    let result: CallArgs = client.call(&mut ctx, 0, &request).await?;
    assert_eq!(result.top.into_inner(), Some(11));
    assert_eq!(result.embedded.into_inner(), Some(22));
    Ok(())
}
