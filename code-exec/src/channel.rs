//! Method-call boundary in front of the execution service.
//!
//! A caller names a method and passes a map of arguments; the channel always
//! answers with a [`MethodResponse`]. Execution outcomes, failed ones included,
//! travel as `success` replies. `error` is reserved for host failures.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::{
    service::CodeExecutionService,
    types::{ExecutionReply, ExecutionRequest},
};

pub const EXECUTE_CODE: &str = "executeCode";
pub const HOST_FAILURE: &str = "HOST_FAILURE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Typed argument lookup; `None` when absent or of another type.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.arguments
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }
}

impl From<&ExecutionRequest> for MethodCall {
    fn from(request: &ExecutionRequest) -> Self {
        let mut call = MethodCall::new(EXECUTE_CODE)
            .with_argument("code", request.code.clone())
            .with_argument("language", request.language.clone());
        if let Some(input) = &request.input {
            call = call.with_argument("input", input.clone());
        }
        if let Some(timeout) = request.timeout {
            call = call.with_argument("timeout", timeout.as_millis() as u64);
        }
        call
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success { result: Value },
    NotImplemented,
    Error { code: String, message: String },
}

impl From<ExecutionReply> for MethodResponse {
    fn from(reply: ExecutionReply) -> Self {
        MethodResponse::Success {
            result: json!({
                "output": reply.output,
                "error": reply.error,
                "executionTime": reply.execution_time,
            }),
        }
    }
}

/// The code execution channel: a closed dispatch table over the service
#[derive(Clone)]
pub struct CodeExecutionChannel {
    name: String,
    service: CodeExecutionService,
}

impl CodeExecutionChannel {
    pub fn new(service: CodeExecutionService) -> Self {
        Self {
            name: service.config().channel.clone(),
            service,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &CodeExecutionService {
        &self.service
    }

    pub async fn handle(&self, call: MethodCall) -> MethodResponse {
        match call.method.as_str() {
            EXECUTE_CODE => self.execute_code(&call).await,
            other => {
                debug!("Method {} is not implemented on channel {}", other, self.name);
                MethodResponse::NotImplemented
            }
        }
    }

    async fn execute_code(&self, call: &MethodCall) -> MethodResponse {
        let request = ExecutionRequest {
            code: call.argument("code").unwrap_or_default(),
            language: call.argument("language").unwrap_or_default(),
            input: call.argument("input"),
            timeout: call.argument::<u64>("timeout").map(Duration::from_millis),
        };

        match self.service.execute(request).await {
            Ok(result) => ExecutionReply::from(result).into(),
            Err(e) => MethodResponse::Error {
                code: HOST_FAILURE.to_string(),
                message: e.to_string(),
            },
        }
    }
}
