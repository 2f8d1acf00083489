//! Bounded newline framing for the stream transport.

use std::io::{self, BufRead};

/// One unit read from the inbound channel.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FrameRead {
    /// A complete frame, including its delimiter when present.
    Frame(Vec<u8>),
    /// A frame larger than the limit. Its bytes were drained and dropped.
    Oversized {
        /// Number of bytes drained.
        size: usize,
    },
    /// The channel closed with no pending bytes.
    Eof,
}

/// Reads one newline-delimited frame of at most `max_bytes` bytes.
///
/// A final frame without a trailing newline is still returned. Interrupted
/// reads are retried.
pub(crate) fn read_frame<R: BufRead>(reader: &mut R, max_bytes: usize) -> io::Result<FrameRead> {
    let mut buffer = Vec::new();
    let mut size = 0_usize;
    let mut overflowed = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };

        if available.is_empty() {
            return Ok(finish(buffer, size, overflowed, true));
        }

        let (chunk, complete) = match available.iter().position(|byte| *byte == b'\n') {
            Some(pos) => (available.split_at(pos + 1).0, true),
            None => (available, false),
        };
        let used = chunk.len();
        size += used;
        if !overflowed {
            if buffer.len() + used > max_bytes {
                overflowed = true;
                buffer = Vec::new();
            } else {
                buffer.extend_from_slice(chunk);
            }
        }
        reader.consume(used);

        if complete {
            return Ok(finish(buffer, size, overflowed, false));
        }
    }
}

fn finish(buffer: Vec<u8>, size: usize, overflowed: bool, at_eof: bool) -> FrameRead {
    if overflowed {
        FrameRead::Oversized { size }
    } else if at_eof && buffer.is_empty() {
        FrameRead::Eof
    } else {
        FrameRead::Frame(buffer)
    }
}
