use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Cpp,
    Java,
    Php,
    Shell,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::Rust,
        Language::Cpp,
        Language::Java,
        Language::Php,
        Language::Shell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Php => "php",
            Language::Shell => "shell",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(Language::Python),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "go" | "golang" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            "cpp" | "c++" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "php" => Ok(Language::Php),
            "shell" | "sh" | "bash" => Ok(Language::Shell),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Code execution request as it arrives from a caller.
///
/// `language` stays the caller's raw identifier until [`ExecutionRequest::validate`]
/// resolves it, so that unknown values can be echoed back verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source code to execute
    #[serde(default)]
    pub code: String,
    /// Language identifier
    #[serde(default)]
    pub language: String,
    /// Data written to the program's stdin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Wall-clock ceiling requested by the caller, in milliseconds on the wire
    #[serde(
        default,
        with = "duration_millis::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            input: None,
            timeout: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks the request without touching the host.
    pub fn validate(&self) -> Result<Language, Error> {
        let language = self.language.parse::<Language>()?;
        if self.code.is_empty() {
            return Err(Error::EmptyCode);
        }
        Ok(language)
    }
}

/// Terminal state of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    TimedOut,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Succeeded => f.write_str("succeeded"),
            ExecutionStatus::Failed => f.write_str("failed"),
            ExecutionStatus::TimedOut => f.write_str("timed_out"),
        }
    }
}

/// Category of a failure that is reported inside a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Sandbox,
    Execution,
    ResourceLimit,
}

/// Execution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Program output (stdout), empty on failure
    pub output: String,
    /// Diagnostic text, empty on success
    pub error: String,
    #[serde(with = "duration_millis")]
    pub execution_time: Duration,
    pub status: ExecutionStatus,
    pub failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn success(output: String, execution_time: Duration) -> Self {
        Self {
            output,
            error: String::new(),
            execution_time,
            status: ExecutionStatus::Succeeded,
            failure: None,
        }
    }

    /// Encodes a non-host error into a result.
    pub fn from_error(error: &Error, execution_time: Duration) -> Self {
        let status = match error {
            Error::ResourceLimit(which) if which == "timeout" => ExecutionStatus::TimedOut,
            _ => ExecutionStatus::Failed,
        };
        Self {
            output: String::new(),
            error: error.to_string(),
            execution_time,
            status,
            failure: error.kind(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }

    pub fn execution_time_millis(&self) -> u64 {
        self.execution_time.as_millis() as u64
    }
}

/// Reply map crossing the call boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReply {
    pub output: String,
    pub error: String,
    #[serde(rename = "executionTime")]
    pub execution_time: u64,
}

impl From<&ExecutionResult> for ExecutionReply {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            output: result.output.clone(),
            error: result.error.clone(),
            execution_time: result.execution_time_millis(),
        }
    }
}

impl From<ExecutionResult> for ExecutionReply {
    fn from(result: ExecutionResult) -> Self {
        let execution_time = result.execution_time_millis();
        Self {
            output: result.output,
            error: result.error,
            execution_time,
        }
    }
}

/// Resource limits for code execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Default wall-clock ceiling per execution
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,
    /// Upper bound for caller-supplied timeouts
    #[serde(rename = "max_timeout_ms", with = "duration_millis")]
    pub max_timeout: Duration,
    /// Wall-clock ceiling for the compile step
    #[serde(rename = "compile_timeout_ms", with = "duration_millis")]
    pub compile_timeout: Duration,
    /// Maximum memory (bytes) of the running program
    pub memory: u64,
    /// Maximum memory (bytes) of the compiler
    pub compile_memory: u64,
    /// Maximum file size (bytes)
    pub file_size: u64,
    /// Maximum captured bytes per output stream
    pub output: usize,
    /// Maximum number of processes for the sandbox user, unset by default
    pub processes: Option<u64>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(60),
            compile_timeout: Duration::from_secs(30),
            memory: 512 * 1024 * 1024,          // 512MB
            compile_memory: 2 * 1024 * 1024 * 1024, // 2GB
            file_size: 10 * 1024 * 1024,        // 10MB
            output: 1024 * 1024,                // 1MB
            processes: None,
        }
    }
}

impl ResourceLimits {
    /// Wall-clock ceiling for a request, honoring the caller's choice up to `max_timeout`.
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(t) if !t.is_zero() => t.min(self.max_timeout),
            _ => self.timeout,
        }
    }

    /// Kernel CPU-time limit in whole seconds, always past the wall-clock deadline.
    pub(crate) fn cpu_seconds(deadline: Duration) -> u64 {
        deadline.as_secs() + 2
    }
}

pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let millis = Option::<u64>::deserialize(deserializer)?;
            Ok(millis.map(Duration::from_millis))
        }
    }
}
