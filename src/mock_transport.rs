//! Scripted transport for driver unit tests.

use crate::error::Result;
use crate::transport::Transport;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every byte handed to `write_bytes`
    pub written: Vec<u8>,
    /// Number of `write_bytes` calls
    pub writes: usize,
    pub flushes: usize,
    /// Reply bytes, `read_byte` times out once empty
    pub replies: VecDeque<u8>,
    /// Successive `bytes_to_write` results, zero once empty
    pub pending: VecDeque<u32>,
}

impl MockTransport {
    pub fn with_replies(replies: &[u8]) -> Self {
        MockTransport {
            replies: replies.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Transport for MockTransport {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.replies.pop_front())
    }

    fn bytes_to_write(&mut self) -> Result<u32> {
        Ok(self.pending.pop_front().unwrap_or(0))
    }
}
