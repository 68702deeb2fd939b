//! Client side of the code execution channel.
//!
//! [`BridgeClient`] posts method calls to a `code-exec-server` and decodes the
//! structured replies.

use code_exec::channel::{MethodCall, MethodResponse};
use code_exec::{ExecutionReply, ExecutionRequest};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub use code_exec::channel;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Method not implemented: {0}")]
    NotImplemented(String),
    #[error("Remote failure ({code}): {message}")]
    Remote { code: String, message: String },
}

#[derive(Clone, Debug)]
pub struct BridgeClient {
    base_url: String,
    channel: String,
    http_client: Client,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>, channel: impl Into<String>) -> Result<Self, ClientError> {
        let http_client = Client::builder().timeout(Duration::from_secs(120)).build()?;
        Ok(Self::with_client(base_url, channel, http_client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        channel: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            channel: channel.into(),
            http_client,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Send one method call and return the channel's response as-is.
    ///
    /// Error responses carry a 500 status, so the body is decoded whatever the status.
    pub async fn invoke(&self, call: &MethodCall) -> Result<MethodResponse, ClientError> {
        debug!("Invoking {} on channel {}", call.method, self.channel);
        let response = self
            .http_client
            .post(format!("{}/channels/{}", self.base_url, self.channel))
            .json(call)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::Remote {
                code: "NOT_FOUND".to_string(),
                message: response.text().await?,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReply, ClientError> {
        let call = MethodCall::from(request);
        match self.invoke(&call).await? {
            MethodResponse::Success { result } => Ok(serde_json::from_value(result)?),
            MethodResponse::NotImplemented => Err(ClientError::NotImplemented(call.method)),
            MethodResponse::Error { code, message } => Err(ClientError::Remote { code, message }),
        }
    }

    pub async fn execute_code(
        &self,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<ExecutionReply, ClientError> {
        self.execute(&ExecutionRequest::new(code, language)).await
    }
}
