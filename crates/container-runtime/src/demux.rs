//! Multiplexed stream demultiplexing
//!
//! When an exec session attaches stdout and stderr without a TTY, the runtime
//! sends both over one connection. Each frame starts with an 8-byte header:
//!
//! ```text
//! [stream selector: u8][0, 0, 0][payload length: u32 big-endian]
//! ```
//!
//! followed by `length` payload bytes. [`StreamDemuxer`] is an explicit state
//! machine over that framing: chunks of any size can be pushed as they arrive
//! from the network, and frame boundaries may fall anywhere inside a chunk.

use crate::constants::protocol::FRAME_HEADER_LEN;
use crate::error::{Result, RuntimeError};

/// Logical stream a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Map a frame selector byte to a stream.
    ///
    /// Selector 0 (stdin echo) is folded into stdout and selector 3 (runtime
    /// system error) into stderr.
    fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            0 | 1 => Some(Self::Stdout),
            2 | 3 => Some(Self::Stderr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DemuxState {
    /// Collecting header bytes; `filled` of them are in `header`
    Header { filled: usize },
    /// Copying payload bytes into the selected stream
    Payload { stream: StreamKind, remaining: usize },
}

/// Separated output of a multiplexed stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemuxedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Incremental demultiplexer for the runtime's framed stdout/stderr stream
#[derive(Debug)]
pub struct StreamDemuxer {
    state: DemuxState,
    header: [u8; FRAME_HEADER_LEN],
    output: DemuxedOutput,
}

impl Default for StreamDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDemuxer {
    pub fn new() -> Self {
        Self {
            state: DemuxState::Header { filled: 0 },
            header: [0; FRAME_HEADER_LEN],
            output: DemuxedOutput::default(),
        }
    }

    /// Feed the next chunk read from the connection.
    ///
    /// Fails only on an unknown stream selector, which means the stream is
    /// not multiplexed at all (e.g. the exec was created with a TTY).
    pub fn push(&mut self, mut chunk: &[u8]) -> Result<()> {
        while !chunk.is_empty() {
            match self.state {
                DemuxState::Header { filled } => {
                    let take = (FRAME_HEADER_LEN - filled).min(chunk.len());
                    self.header[filled..filled + take].copy_from_slice(&chunk[..take]);
                    chunk = &chunk[take..];

                    let filled = filled + take;
                    if filled < FRAME_HEADER_LEN {
                        self.state = DemuxState::Header { filled };
                        continue;
                    }

                    let stream = StreamKind::from_selector(self.header[0]).ok_or_else(|| {
                        RuntimeError::protocol(format!(
                            "Unknown stream selector {} in frame header",
                            self.header[0]
                        ))
                    })?;
                    let length = u32::from_be_bytes([
                        self.header[4],
                        self.header[5],
                        self.header[6],
                        self.header[7],
                    ]) as usize;

                    self.state = if length == 0 {
                        DemuxState::Header { filled: 0 }
                    } else {
                        DemuxState::Payload {
                            stream,
                            remaining: length,
                        }
                    };
                }
                DemuxState::Payload { stream, remaining } => {
                    let take = remaining.min(chunk.len());
                    let target = match stream {
                        StreamKind::Stdout => &mut self.output.stdout,
                        StreamKind::Stderr => &mut self.output.stderr,
                    };
                    target.extend_from_slice(&chunk[..take]);
                    chunk = &chunk[take..];

                    self.state = if remaining == take {
                        DemuxState::Header { filled: 0 }
                    } else {
                        DemuxState::Payload {
                            stream,
                            remaining: remaining - take,
                        }
                    };
                }
            }
        }
        Ok(())
    }

    /// Whether the stream ended on a frame boundary
    pub fn is_at_boundary(&self) -> bool {
        self.state == DemuxState::Header { filled: 0 }
    }

    /// Consume the demuxer and return everything collected so far.
    ///
    /// A stream that ends mid-frame keeps the payload bytes already received.
    pub fn finish(self) -> DemuxedOutput {
        if !self.is_at_boundary() {
            log::warn!("Multiplexed stream ended mid-frame ({:?})", self.state);
        }
        self.output
    }
}

/// Encode one frame in the runtime's multiplexed format.
///
/// Used by in-memory runtimes in tests of code that consumes exec streams.
pub fn encode_frame(stream: StreamKind, payload: &[u8]) -> Vec<u8> {
    let selector = match stream {
        StreamKind::Stdout => 1u8,
        StreamKind::Stderr => 2u8,
    };
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.push(selector);
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}
