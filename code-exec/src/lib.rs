//! # Code Execution Service
//!
//! Runs untrusted code snippets in per-request sandboxes under time, memory
//! and output ceilings, behind a method-call channel that always answers with
//! a structured result.

pub mod channel;
mod config;
mod error;
mod executor;
mod languages;
mod sandbox;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::{ServiceConfig, DEFAULT_CHANNEL};
pub use error::Error;
pub use executor::{CodeExecutor, LanguageExecutor, LanguageStatus};
pub use languages::ToolCheck;
pub use sandbox::{CommandSpec, MemoryRlimit, ProcessOutput, RunLimits, Sandbox, Termination};
pub use service::CodeExecutionService;
pub use types::{
    ExecutionReply, ExecutionRequest, ExecutionResult, ExecutionStatus, FailureKind, Language,
    ResourceLimits,
};

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
