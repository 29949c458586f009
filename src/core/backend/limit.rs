//! Size-bounded output capture.

use std::io::{self, Read, Write};

/// A write sink that refuses writes once `cap` bytes would be exceeded.
///
/// The rejected write is not retained, so memory use never exceeds `cap`.
#[derive(Debug)]
pub struct LimitBuffer {
    cap: usize,
    buf: Vec<u8>,
    exceeded: bool,
}

impl LimitBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            buf: Vec::new(),
            exceeded: false,
        }
    }

    /// Whether a write was rejected for exceeding the cap.
    pub fn exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for LimitBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len() + data.len() > self.cap {
            self.exceeded = true;
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("command output was too long: exceeded {} bytes", self.cap),
            ));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Outcome of draining a pipe into a [`LimitBuffer`].
#[derive(Debug)]
pub enum Capture {
    Complete(Vec<u8>),
    Overflow,
    Failed(io::Error),
}

/// Drain `source` until EOF or until `cap` is exceeded.
pub fn capture<R: Read>(mut source: R, cap: usize) -> Capture {
    let mut sink = LimitBuffer::new(cap);
    match io::copy(&mut source, &mut sink) {
        Ok(_) => Capture::Complete(sink.into_inner()),
        Err(_) if sink.exceeded() => Capture::Overflow,
        Err(e) => Capture::Failed(e),
    }
}

/// Drain `source` keeping at most `cap` bytes and discarding the rest.
///
/// Used for stderr, which only feeds error messages.
pub fn capture_truncated<R: Read>(mut source: R, cap: usize) -> Vec<u8> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let room = cap.saturating_sub(kept.len());
                kept.extend_from_slice(&chunk[..n.min(room)]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    kept
}
