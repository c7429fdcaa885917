//! MCP streamable HTTP transport.
//!
//! Every JSON-RPC message is POSTed to the endpoint. The server answers with
//! either one `application/json` reply or a `text/event-stream` whose events
//! carry JSON-RPC messages; the first event replying to our request id wins.
//!
//! ```text
//! POST /mcp  {"method":"initialize",...}        -> 200 + Mcp-Session-Id: abc
//! POST /mcp  {"method":"notifications/initialized"}  (Mcp-Session-Id: abc) -> 202
//! POST /mcp  {"method":"tools/call",...}          (Mcp-Session-Id: abc) -> 200
//! DELETE /mcp                                     (Mcp-Session-Id: abc) on close
//! ```

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use sse_stream::SseStream;
use url::Url;

use crate::mcp::endpoint::Endpoint;
use crate::mcp::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, METHOD_INITIALIZE,
};
use crate::mcp::transport::{Connector, Transport, TransportFailure};

pub const HEADER_SESSION_ID: &str = "Mcp-Session-Id";
pub const HEADER_PROTOCOL_VERSION: &str = "MCP-Protocol-Version";

const EVENT_STREAM_MIME_TYPE: &str = "text/event-stream";
const JSON_MIME_TYPE: &str = "application/json";

/// Creates [`HttpTransport`]s. No network I/O happens on connect.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    client: Option<reqwest::Client>,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing `reqwest::Client` instead of building one per transport.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    type Transport = HttpTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<HttpTransport, TransportFailure> {
        let url = Url::parse(endpoint.as_str())
            .map_err(|e| TransportFailure::InvalidEndpoint(format!("{endpoint}: {e}")))?;

        let client = match &self.client {
            Some(client) => client.clone(),
            None => reqwest::Client::builder()
                .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| TransportFailure::network(&e))?,
        };

        Ok(HttpTransport {
            client,
            url,
            session_id: None,
            protocol_version: None,
        })
    }
}

/// One streamable HTTP connection to an MCP server.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    /// Assigned by the server on `initialize`
    session_id: Option<String>,
    /// Negotiated on `initialize`
    protocol_version: Option<String>,
}

impl HttpTransport {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    fn with_session_headers(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if let Some(session_id) = &self.session_id {
            builder = builder.header(HEADER_SESSION_ID, session_id);
        }
        if let Some(version) = &self.protocol_version {
            builder = builder.header(HEADER_PROTOCOL_VERSION, version);
        }
        builder
    }

    fn post(&self, body: &impl serde::Serialize) -> RequestBuilder {
        let builder = self
            .client
            .post(self.url.clone())
            .header(ACCEPT, format!("{JSON_MIME_TYPE}, {EVENT_STREAM_MIME_TYPE}"))
            .json(body);
        self.with_session_headers(builder)
    }

    /// Send and check the status. Records the session id the server assigns.
    async fn send(&mut self, builder: RequestBuilder) -> Result<Response, TransportFailure> {
        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::network(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(session_id) = response
            .headers()
            .get(HEADER_SESSION_ID)
            .and_then(|value| value.to_str().ok())
        {
            self.session_id = Some(session_id.to_string());
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&mut self, request: JsonRpcRequest) -> Result<Value, TransportFailure> {
        let builder = self.post(&request);
        let response = self.send(builder).await?;

        if matches!(
            response.status(),
            StatusCode::ACCEPTED | StatusCode::NO_CONTENT
        ) {
            return Err(TransportFailure::Protocol(format!(
                "server accepted '{}' without a reply",
                request.method
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let reply = if content_type.starts_with(EVENT_STREAM_MIME_TYPE) {
            read_event_stream(response, request.id).await?
        } else if content_type.starts_with(JSON_MIME_TYPE) {
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportFailure::network(&e))?;
            serde_json::from_slice::<JsonRpcResponse>(&body)
                .map_err(|e| TransportFailure::Protocol(format!("invalid JSON-RPC reply: {e}")))?
        } else {
            return Err(TransportFailure::Protocol(format!(
                "unexpected content type '{content_type}'"
            )));
        };

        let result = reply.into_result()?;

        if request.method == METHOD_INITIALIZE {
            self.protocol_version = result
                .get("protocolVersion")
                .and_then(Value::as_str)
                .map(str::to_string);
        }

        Ok(result)
    }

    async fn notify(
        &mut self,
        notification: JsonRpcNotification,
    ) -> Result<(), TransportFailure> {
        let builder = self.post(&notification);
        self.send(builder).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportFailure> {
        let Some(session_id) = self.session_id.take() else {
            return Ok(());
        };

        let response = self
            .client
            .delete(self.url.clone())
            .header(HEADER_SESSION_ID, session_id)
            .send()
            .await
            .map_err(|e| TransportFailure::network(&e))?;

        // Servers without explicit session termination answer 405.
        let status = response.status();
        if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
            return Ok(());
        }
        Err(TransportFailure::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// Read SSE events until the reply to `id` arrives.
///
/// Server notifications and requests on the stream are skipped.
async fn read_event_stream(
    response: Response,
    id: u64,
) -> Result<JsonRpcResponse, TransportFailure> {
    let mut events = SseStream::from_byte_stream(response.bytes_stream()).boxed();

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| TransportFailure::Network(e.to_string()))?;
        let Some(data) = event.data else {
            continue;
        };
        let Ok(message) = serde_json::from_str::<JsonRpcResponse>(&data) else {
            tracing::debug!(%data, "skipping non JSON-RPC event");
            continue;
        };
        if message.is_reply_to(id) {
            return Ok(message);
        }
    }

    Err(TransportFailure::Protocol(format!(
        "event stream ended before the reply to request {id}"
    )))
}
