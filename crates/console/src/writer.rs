use crate::bridge::BridgeSender;
use std::io::{Result as IoResult, Write};

/// Standard-stream replacement for code running in an isolated runtime.
///
/// Every `write` is posted as one tagged console message. A UTF-8 character
/// cut off at the end of a write is held back and posted with the next write.
/// Writes always report success, even if the host has gone away.
#[derive(Debug)]
pub struct ConsoleWriter {
    sender: BridgeSender,
    pending: Vec<u8>,
}

impl ConsoleWriter {
    #[inline]
    pub fn new(sender: BridgeSender) -> Self {
        Self {
            sender,
            pending: Vec::new(),
        }
    }
}

/// Length of a trailing UTF-8 sequence that is still missing bytes.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let Some(&byte) = bytes.get(bytes.len() - back) else {
            return 0;
        };
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.pending.extend_from_slice(buf);
        let complete = self.pending.len() - incomplete_tail(&self.pending);
        if complete > 0 {
            let tail = self.pending.split_off(complete);
            let text = String::from_utf8_lossy(&self.pending);
            self.sender.post_console(&text);
            self.pending = tail;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            self.sender.post_console(&String::from_utf8_lossy(&self.pending));
        }
    }
}
