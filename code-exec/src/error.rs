use thiserror::Error;

use crate::types::FailureKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Execution failed: empty code")]
    EmptyCode,

    #[error("sandbox failure: {0}")]
    Sandbox(String),

    #[error("compilation failed: {0}")]
    Compilation(String),

    #[error("{0}")]
    Execution(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error("service busy")]
    Busy,

    #[error("host failure: {0}")]
    Host(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category under which this error is reported to callers.
    ///
    /// Host and configuration errors have no category: they mean the service
    /// itself is unusable and are never folded into an execution result.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Error::UnsupportedLanguage(_) | Error::EmptyCode => Some(FailureKind::Validation),
            Error::Sandbox(_) | Error::Io(_) => Some(FailureKind::Sandbox),
            Error::Compilation(_) | Error::Execution(_) => Some(FailureKind::Execution),
            Error::ResourceLimit(_) | Error::Busy => Some(FailureKind::ResourceLimit),
            Error::Host(_) | Error::Config(_) => None,
        }
    }

    pub fn is_host_failure(&self) -> bool {
        self.kind().is_none()
    }

    pub(crate) fn timeout() -> Self {
        Error::ResourceLimit("timeout".to_string())
    }

    pub(crate) fn memory() -> Self {
        Error::ResourceLimit("memory".to_string())
    }

    pub(crate) fn file_size() -> Self {
        Error::ResourceLimit("file size".to_string())
    }
}
