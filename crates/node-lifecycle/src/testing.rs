//! In-memory container runtime for tests

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use container_runtime::demux::{encode_frame, StreamKind};
use container_runtime::{
    ContainerRuntime, ContainerSummary, ExecSpec, ExecStream, Result, RuntimeError,
};

/// What an exec whose command line contains a given key should do
#[derive(Debug, Clone)]
pub enum Scripted {
    Output { stdout: String, stderr: String },
    /// Never finishes
    Hang,
    Unreachable,
}

impl Scripted {
    pub fn stdout(text: &str) -> Self {
        Self::Output {
            stdout: text.to_string(),
            stderr: String::new(),
        }
    }

    pub fn stderr(text: &str) -> Self {
        Self::Output {
            stdout: String::new(),
            stderr: text.to_string(),
        }
    }
}

/// Runtime with one container whose execs answer from a script
pub struct ScriptedRuntime {
    containers: Vec<ContainerSummary>,
    unreachable: bool,
    responses: Vec<(String, Scripted)>,
    pub execs: Mutex<Vec<ExecSpec>>,
}

impl ScriptedRuntime {
    pub fn with_container(name: &str) -> Self {
        Self {
            containers: vec![ContainerSummary {
                id: format!("{}-id", name),
                names: vec![format!("/{}", name)],
                image: "n8nio/n8n".to_string(),
                state: "running".to_string(),
            }],
            unreachable: false,
            responses: Vec::new(),
            execs: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            containers: Vec::new(),
            ..Self::with_container("unused")
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::empty()
        }
    }

    /// Answer execs whose command line contains `key`
    pub fn respond(mut self, key: &str, response: Scripted) -> Self {
        self.responses.push((key.to_string(), response));
        self
    }

    pub fn recorded(&self) -> Vec<ExecSpec> {
        self.execs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn list_containers(&self, _all: bool) -> Result<Vec<ContainerSummary>> {
        if self.unreachable {
            return Err(RuntimeError::Unreachable("no socket".to_string()));
        }
        Ok(self.containers.clone())
    }

    async fn exec(&self, _container_id: &str, spec: &ExecSpec) -> Result<ExecStream> {
        self.execs.lock().unwrap().push(spec.clone());

        let line = spec.display();
        let response = self
            .responses
            .iter()
            .find(|(key, _)| line.contains(key.as_str()))
            .map(|(_, r)| r.clone())
            .unwrap_or(Scripted::stdout(""));

        match response {
            Scripted::Output { stdout, stderr } => {
                let mut bytes = encode_frame(StreamKind::Stdout, stdout.as_bytes());
                bytes.extend(encode_frame(StreamKind::Stderr, stderr.as_bytes()));
                Ok(Box::pin(futures_util::stream::iter(vec![Ok(Bytes::from(
                    bytes,
                ))])))
            }
            Scripted::Hang => Ok(Box::pin(futures_util::stream::pending())),
            Scripted::Unreachable => Err(RuntimeError::Unreachable("socket closed".to_string())),
        }
    }
}
