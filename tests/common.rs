#![allow(dead_code)]
use dcerpc_pipe::{FileId, PipeTransport, Result};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A scripted [`PipeTransport`]: `transceive` pops and returns the next
/// queued reply, recording every request it was given. Exercises the
/// client orchestrator end-to-end without a real SMB2 session, since
/// that transport is out of scope for this crate.
pub struct MockTransport {
    replies: RefCell<VecDeque<Vec<u8>>>,
    pub requests: RefCell<Vec<Vec<u8>>>,
}

impl MockTransport {
    pub fn new(replies: Vec<Vec<u8>>) -> Self {
        MockTransport {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
        }
    }
}

#[maybe_async::maybe_async(AFIT)]
impl PipeTransport for MockTransport {
    async fn open(&self, _path: &str) -> Result<FileId> {
        Ok(FileId(1))
    }

    async fn transceive(&self, request: &[u8]) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(request.to_vec());
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| dcerpc_pipe::Error::Protocol("mock transport exhausted".to_string()))
    }
}
