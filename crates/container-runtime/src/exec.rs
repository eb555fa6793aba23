//! Exec sessions
//!
//! An exec session runs one command inside a container. The runtime hands
//! back a single multiplexed byte stream; [`collect_output`] pumps it to the
//! end through a [`StreamDemuxer`]. The stream must be drained for the command
//! to make progress: an unread exec looks exactly like a hung process.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Serialize;

use crate::demux::StreamDemuxer;
use crate::error::Result;

/// Raw multiplexed output of an exec session
pub type ExecStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Command to run inside a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecSpec {
    /// Argument vector, first element is the program
    pub cmd: Vec<String>,
    /// Working directory inside the container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Extra environment as `KEY=value` entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

impl ExecSpec {
    /// Run an explicit argument vector
    pub fn new<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Run a command line through `sh -c`
    pub fn shell(command_line: impl Into<String>) -> Self {
        Self::new(["sh".to_string(), "-c".to_string(), command_line.into()])
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.env.push(format!("{}={}", key, value.as_ref()));
        self
    }

    /// Human-readable command line, for logs
    pub fn display(&self) -> String {
        self.cmd.join(" ")
    }
}

/// Demultiplexed, UTF-8 decoded output of an exec session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// stdout followed by stderr, the text install heuristics look at
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Drain an exec stream to its end and split it into stdout and stderr.
pub async fn collect_output(mut stream: ExecStream) -> Result<ExecOutput> {
    let mut demuxer = StreamDemuxer::new();
    while let Some(chunk) = stream.next().await {
        demuxer.push(&chunk?)?;
    }

    let output = demuxer.finish();
    Ok(ExecOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
