//! Control API client
//!
//! Speaks HTTP/1.1 directly over the runtime's socket, one connection per
//! request. Exec output is taken over the hijacked connection: the start
//! request asks for a protocol upgrade and the raw multiplexed stream is read
//! from the upgraded connection until the process exits.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use http_body_util::{BodyExt, BodyStream, Full};
use hyper::body::Incoming;
use hyper::header::{CONNECTION, CONTENT_TYPE, HOST, UPGRADE};
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::constants::protocol::API_VERSION;
use crate::endpoint::DockerEndpoint;
use crate::error::{Result, RuntimeError};
use crate::exec::{ExecSpec, ExecStream};
use crate::locator::ContainerSummary;
use crate::runtime::ContainerRuntime;

/// Read buffer size for hijacked exec connections
const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExecCreated {
    id: String,
}

/// Container runtime client over the control API
#[derive(Debug, Clone)]
pub struct DockerClient {
    endpoint: DockerEndpoint,
}

impl DockerClient {
    pub fn new(endpoint: DockerEndpoint) -> Self {
        Self { endpoint }
    }

    /// Client for the endpoint named by `DOCKER_HOST`, or the platform default
    pub fn from_env() -> Self {
        Self::new(DockerEndpoint::from_env())
    }

    pub fn endpoint(&self) -> &DockerEndpoint {
        &self.endpoint
    }

    /// Send one request on a fresh connection.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        upgrade: bool,
    ) -> Result<Response<Incoming>> {
        let io = TokioIo::new(self.endpoint.connect().await?);
        let (mut sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(io)
            .await
            .map_err(|e| RuntimeError::Unreachable(format!("{}: {}", self.endpoint, e)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.with_upgrades().await {
                log::debug!("Runtime connection closed with error: {}", e);
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/{}{}", API_VERSION, path))
            .header(HOST, self.endpoint.host_header());

        if upgrade {
            builder = builder.header(CONNECTION, "Upgrade").header(UPGRADE, "tcp");
        }

        let payload = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(serde_json::to_vec(&value)?))
            }
            None => Full::new(Bytes::new()),
        };

        let request = builder
            .body(payload)
            .map_err(|e| RuntimeError::protocol(format!("Invalid request: {}", e)))?;

        Ok(sender.send_request(request).await?)
    }

    /// Send a request and decode its JSON response.
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let response = check_status(self.send(method, path, body, false).await?).await?;
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Turn a non-success response into [`RuntimeError::Api`], using the
/// runtime's `{"message": ...}` body when present.
async fn check_status(response: Response<Incoming>) -> Result<Response<Incoming>> {
    let status = response.status();
    if status.is_success() || status == StatusCode::SWITCHING_PROTOCOLS {
        return Ok(response);
    }

    let bytes = response.into_body().collect().await?.to_bytes();
    let message = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());

    Err(RuntimeError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Stream raw bytes off a hijacked connection until EOF.
fn read_to_stream<R>(reader: R) -> ExecStream
where
    R: AsyncRead + Send + Unpin + 'static,
{
    Box::pin(futures_util::stream::unfold(
        Some(reader),
        |state| async move {
            let mut reader = state?;
            let mut buf = vec![0u8; READ_CHUNK];
            match reader.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(Bytes::from(buf)), Some(reader)))
                }
                Err(e) => Some((
                    Err(RuntimeError::protocol(format!("Exec stream read failed: {}", e))),
                    None,
                )),
            }
        },
    ))
}

/// Stream the data frames of a close-delimited response body.
fn body_to_stream(body: Incoming) -> ExecStream {
    Box::pin(BodyStream::new(body).filter_map(|frame| async move {
        match frame {
            Ok(frame) => frame.into_data().ok().map(Ok),
            Err(e) => Some(Err(RuntimeError::from(e))),
        }
    }))
}

#[async_trait]
impl ContainerRuntime for DockerClient {
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>> {
        let path = format!("/containers/json?all={}", all);
        self.request_json(Method::GET, &path, None).await
    }

    async fn exec(&self, container_id: &str, spec: &ExecSpec) -> Result<ExecStream> {
        log::debug!("exec in {}: {}", container_id, spec.display());

        let mut create = serde_json::to_value(spec)?;
        create["AttachStdout"] = serde_json::json!(true);
        create["AttachStderr"] = serde_json::json!(true);
        create["AttachStdin"] = serde_json::json!(false);
        create["Tty"] = serde_json::json!(false);

        let created: ExecCreated = self
            .request_json(
                Method::POST,
                &format!("/containers/{}/exec", container_id),
                Some(create),
            )
            .await?;

        let start = serde_json::json!({ "Detach": false, "Tty": false });
        let response = check_status(
            self.send(
                Method::POST,
                &format!("/exec/{}/start", created.id),
                Some(start),
                true,
            )
            .await?,
        )
        .await?;

        if response.status() == StatusCode::SWITCHING_PROTOCOLS {
            let upgraded = hyper::upgrade::on(response)
                .await
                .map_err(|e| RuntimeError::protocol(format!("Exec upgrade failed: {}", e)))?;
            Ok(read_to_stream(TokioIo::new(upgraded)))
        } else {
            Ok(body_to_stream(response.into_body()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demux::{encode_frame, StreamKind};
    use crate::exec::collect_output;

    #[tokio::test]
    async fn test_read_to_stream_drains_reader() {
        let mut bytes = encode_frame(StreamKind::Stdout, b"/home/node/.n8n/nodes/x.node.js\n");
        bytes.extend(encode_frame(StreamKind::Stderr, b""));
        let reader = std::io::Cursor::new(bytes);

        let output = collect_output(read_to_stream(reader)).await.unwrap();
        assert_eq!(output.stdout, "/home/node/.n8n/nodes/x.node.js\n");
        assert!(output.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_containers_without_daemon_is_unreachable() {
        let client = DockerClient::new(DockerEndpoint::Unix(
            "/nonexistent/upora/docker.sock".into(),
        ));
        let err = client.list_containers(true).await.unwrap_err();
        assert!(err.is_unreachable());
    }
}
