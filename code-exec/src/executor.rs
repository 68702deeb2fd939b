use async_trait::async_trait;
use nix::sys::signal::Signal;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    error::Error,
    languages::{
        CppExecutor, GoExecutor, JavaExecutor, JavaScriptExecutor, PhpExecutor, PythonExecutor,
        RustExecutor, ShellExecutor, ToolCheck, TypeScriptExecutor,
    },
    sandbox::{CommandSpec, MemoryRlimit, ProcessOutput, RunLimits, Sandbox, Termination},
    types::{ExecutionRequest, Language, ResourceLimits},
};

/// Diagnostics printed when a write runs into `RLIMIT_FSIZE` (EFBIG), matched case-insensitively
pub(crate) const FILE_SIZE_MARKERS: &[&str] =
    &["file too large", "file size limit exceeded", "efbig"];

/// Trait for language-specific code executors
#[async_trait]
pub trait LanguageExecutor: ToolCheck + Send + Sync {
    fn language(&self) -> Language;

    /// Name of the source file written into the sandbox root
    fn source_file(&self) -> &str;

    /// Command that builds the program, if the language is compiled
    fn compile_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> Option<CommandSpec> {
        None
    }

    /// Command that runs the program
    fn run_command(&self, workdir: &Path, limits: &ResourceLimits) -> CommandSpec;

    /// Kernel limit that enforces the memory ceiling. Runtimes that reserve
    /// large address ranges up front cannot start under `RLIMIT_AS`.
    fn memory_rlimit(&self) -> MemoryRlimit {
        MemoryRlimit::AddressSpace
    }

    /// Diagnostics the runtime prints when it runs out of memory
    fn out_of_memory_markers(&self) -> &[&str] {
        &[]
    }

    /// Diagnostics that mean a write hit the file size ceiling. Interpreters
    /// that ignore `SIGXFSZ` report the failed write instead of dying.
    fn file_size_markers(&self) -> &[&str] {
        FILE_SIZE_MARKERS
    }

    /// Write any extra files the toolchain needs next to the source
    async fn setup_environment(&self, _sandbox_dir: &Path) -> Result<(), Error> {
        Ok(())
    }
}

/// Availability of one language on this host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStatus {
    pub language: Language,
    pub available: bool,
    pub tools: Vec<String>,
}

/// Dispatches requests to the executor registered for their language
pub struct CodeExecutor {
    executors: HashMap<Language, Box<dyn LanguageExecutor>>,
    tool_overrides: HashMap<String, PathBuf>,
}

impl CodeExecutor {
    pub fn new(tool_overrides: HashMap<String, PathBuf>) -> Self {
        let executors: Vec<Box<dyn LanguageExecutor>> = vec![
            Box::new(PythonExecutor::new(None)),
            Box::new(JavaScriptExecutor),
            Box::new(TypeScriptExecutor),
            Box::new(GoExecutor),
            Box::new(RustExecutor),
            Box::new(CppExecutor),
            Box::new(JavaExecutor),
            Box::new(PhpExecutor),
            Box::new(ShellExecutor),
        ];

        Self {
            executors: executors
                .into_iter()
                .map(|executor| (executor.language(), executor))
                .collect(),
            tool_overrides,
        }
    }

    pub fn executor(&self, language: Language) -> Result<&dyn LanguageExecutor, Error> {
        self.executors
            .get(&language)
            .map(|executor| executor.as_ref())
            .ok_or_else(|| Error::UnsupportedLanguage(language.to_string()))
    }

    pub fn languages(&self) -> Vec<LanguageStatus> {
        Language::ALL
            .iter()
            .filter_map(|language| self.executors.get(language))
            .map(|executor| LanguageStatus {
                language: executor.language(),
                available: executor.missing_tools(&self.tool_overrides).is_empty(),
                tools: executor
                    .required_tools()
                    .iter()
                    .map(|tool| tool.to_string())
                    .collect(),
            })
            .collect()
    }

    /// Execute a validated request in its own sandbox, returning stdout on success.
    pub async fn execute_in_sandbox(
        &self,
        language: Language,
        request: &ExecutionRequest,
        sandbox: &Sandbox,
        limits: &ResourceLimits,
    ) -> Result<String, Error> {
        let executor = self.executor(language)?;

        for tool in executor.required_tools() {
            sandbox.resolve(tool)?;
        }

        sandbox
            .write_source(executor.source_file(), &request.code)
            .await?;
        executor.setup_environment(&sandbox.root_dir).await?;

        if let Some(compile) = executor.compile_command(&sandbox.root_dir, limits) {
            let compile_limits = RunLimits::new(limits, limits.compile_timeout)
                .memory_ceiling(executor.memory_rlimit(), limits.compile_memory);

            let output = sandbox.execute(&compile, None, &compile_limits).await?;
            check_compilation(output)?;
        }

        let deadline = limits.effective_timeout(request.timeout);
        let run_limits =
            RunLimits::new(limits, deadline).memory_ceiling(executor.memory_rlimit(), limits.memory);

        let output = sandbox
            .execute(
                &executor.run_command(&sandbox.root_dir, limits),
                request.input.as_deref(),
                &run_limits,
            )
            .await?;

        classify(
            output,
            executor.out_of_memory_markers(),
            executor.file_size_markers(),
        )
    }
}

fn check_compilation(output: ProcessOutput) -> Result<(), Error> {
    match output.termination {
        Termination::Exited(0) => {
            debug!("Compilation finished in {}ms", output.elapsed.as_millis());
            Ok(())
        }
        Termination::TimedOut => Err(Error::timeout()),
        Termination::OutputExceeded => Err(Error::ResourceLimit("output".to_string())),
        Termination::Exited(code) => {
            // Some compilers (tsc) report on stdout.
            let diagnostics = if output.stderr.trim().is_empty() {
                output.stdout
            } else {
                output.stderr
            };
            Err(Error::Compilation(non_blank(
                diagnostics,
                format!("compiler exited with status {}", code),
            )))
        }
        Termination::Signaled(signal) => Err(Error::Compilation(non_blank(
            output.stderr,
            format!("compiler terminated by signal {}", signal),
        ))),
    }
}

/// Map how a run ended onto the failure taxonomy.
///
/// A file size overrun wins even over a clean exit: a shell script keeps going
/// after one of its commands dies of `SIGXFSZ`.
pub(crate) fn classify(
    output: ProcessOutput,
    oom_markers: &[&str],
    file_size_markers: &[&str],
) -> Result<String, Error> {
    let out_of_memory = oom_markers
        .iter()
        .any(|marker| output.stderr.contains(marker));
    let stderr = output.stderr.to_lowercase();
    let file_too_large = file_size_markers
        .iter()
        .any(|marker| stderr.contains(&marker.to_lowercase()));

    match output.termination {
        Termination::TimedOut => Err(Error::timeout()),
        Termination::OutputExceeded => Err(Error::ResourceLimit("output".to_string())),
        Termination::Signaled(signal) if signal == Signal::SIGXCPU as i32 => Err(Error::timeout()),
        Termination::Signaled(signal) if signal == Signal::SIGXFSZ as i32 => Err(Error::file_size()),
        _ if file_too_large => Err(Error::file_size()),
        Termination::Exited(0) => {
            if !output.stderr.is_empty() {
                debug!("Discarding stderr of successful run: {}", output.stderr);
            }
            Ok(output.stdout)
        }
        _ if out_of_memory => Err(Error::memory()),
        Termination::Signaled(signal) if signal == Signal::SIGKILL as i32 => Err(Error::memory()),
        Termination::Exited(code) => Err(Error::Execution(non_blank(
            output.stderr,
            format!("process exited with status {}", code),
        ))),
        Termination::Signaled(signal) => Err(Error::Execution(non_blank(
            output.stderr,
            format!("process terminated by signal {}", signal),
        ))),
    }
}

fn non_blank(text: String, fallback: String) -> String {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}
