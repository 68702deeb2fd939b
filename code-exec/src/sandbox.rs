use nix::errno::Errno;
use nix::sys::resource::{setrlimit, Resource};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{setpgid, Pid};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Instant,
};
use tokio::{
    fs,
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{ChildStdin, Command},
    runtime::Handle,
    time::{self, Duration},
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{config::ServiceConfig, error::Error, types::ResourceLimits};

/// A program invocation inside a sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Kernel limit that carries a runtime's memory ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRlimit {
    /// `RLIMIT_AS`
    AddressSpace,
    /// `RLIMIT_DATA`, which skips `PROT_NONE` reservations (V8, Go)
    Data,
    /// No rlimit; the runtime's own heap flag is the ceiling (JVM)
    HeapFlag,
}

/// Ceilings applied to a single process run
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    pub deadline: Duration,
    /// `RLIMIT_AS`
    pub address_space: Option<u64>,
    /// `RLIMIT_DATA`
    pub data: Option<u64>,
    pub file_size: u64,
    pub processes: Option<u64>,
    pub output: usize,
}

impl RunLimits {
    pub fn new(limits: &ResourceLimits, deadline: Duration) -> Self {
        Self {
            deadline,
            address_space: Some(limits.memory),
            data: None,
            file_size: limits.file_size,
            processes: limits.processes,
            output: limits.output,
        }
    }

    /// Put a `bytes` memory ceiling on the rlimit `kind` and clear the other one.
    pub fn memory_ceiling(mut self, kind: MemoryRlimit, bytes: u64) -> Self {
        self.address_space = None;
        self.data = None;
        match kind {
            MemoryRlimit::AddressSpace => self.address_space = Some(bytes),
            MemoryRlimit::Data => self.data = Some(bytes),
            MemoryRlimit::HeapFlag => {}
        }
        self
    }
}

/// How a sandboxed process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    TimedOut,
    OutputExceeded,
}

impl Termination {
    fn from_status(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match (status.code(), status.signal()) {
            (Some(code), _) => Termination::Exited(code),
            (None, Some(signal)) => Termination::Signaled(signal),
            (None, None) => Termination::Exited(-1),
        }
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub termination: Termination,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

enum CaptureError {
    Overflow,
    Io(std::io::Error),
}

/// Kills every process in the sandboxed group when the run ends or is abandoned.
struct ProcessGroup {
    pgid: Option<Pid>,
}

impl ProcessGroup {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.map(|pid| Pid::from_raw(pid as i32)),
        }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            match killpg(pgid, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
            }
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Sandbox environment for secure code execution
pub struct Sandbox {
    /// Root directory for the sandbox
    pub root_dir: PathBuf,
    /// Unique ID for this sandbox instance
    id: String,
    sandbox_path: String,
    tools: HashMap<String, PathBuf>,
}

impl Sandbox {
    /// Create a new sandbox environment under the configured workspace root
    pub async fn new(config: &ServiceConfig) -> Result<Self, Error> {
        let id = Uuid::new_v4().to_string();
        let root_dir = config.workspace_root().join(format!("sandbox-{}", id));

        fs::create_dir_all(&root_dir)
            .await
            .map_err(|e| Error::Host(format!("failed to create sandbox directory: {}", e)))?;

        for dir in &["tmp", "home"] {
            fs::create_dir_all(root_dir.join(dir))
                .await
                .map_err(|e| Error::Host(format!("failed to create {} directory: {}", dir, e)))?;
        }

        debug!("Created sandbox {} at {}", id, root_dir.display());

        Ok(Sandbox {
            root_dir,
            id,
            sandbox_path: config.sandbox_path.clone(),
            tools: config.tools.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn write_source(&self, file_name: &str, code: &str) -> Result<PathBuf, Error> {
        let path = self.root_dir.join(file_name);
        fs::write(&path, code)
            .await
            .map_err(|e| Error::Sandbox(format!("failed to write source file: {}", e)))?;
        Ok(path)
    }

    /// Locate the executable for `program`.
    ///
    /// `./name` refers to a build artifact inside the sandbox; anything else is
    /// looked up in the tool overrides, then on the host `PATH`.
    pub fn resolve(&self, program: &str) -> Result<PathBuf, Error> {
        if let Some(artifact) = program.strip_prefix("./") {
            return Ok(self.root_dir.join(artifact));
        }
        if let Some(path) = self.tools.get(program) {
            return Ok(path.clone());
        }
        which::which(program)
            .map_err(|_| Error::Sandbox(format!("toolchain not available: {}", program)))
    }

    /// Run a command in the sandbox and wait for it under `limits`.
    pub async fn execute(
        &self,
        spec: &CommandSpec,
        input: Option<&str>,
        limits: &RunLimits,
    ) -> Result<ProcessOutput, Error> {
        let cmd_path = self.resolve(&spec.program)?;

        debug!("Sandbox {} execute - Command: {}", self.id, cmd_path.display());
        debug!("Sandbox {} execute - Args: {:?}", self.id, spec.args);

        let mut command = Command::new(&cmd_path);
        command
            .args(&spec.args)
            .env_clear()
            .env("PATH", &self.sandbox_path)
            .env("HOME", self.root_dir.join("home"))
            .env("TMPDIR", self.root_dir.join("tmp"))
            .env("LANG", "C.UTF-8")
            .envs(spec.env.iter().map(|(k, v)| (k, v)))
            .current_dir(&self.root_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        apply_rlimits(&mut command, limits);

        let started = Instant::now();
        let mut child = command
            .spawn()
            .map_err(|e| Error::Sandbox(format!("failed to spawn {}: {}", spec.program, e)))?;
        let mut group = ProcessGroup::new(child.id());

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Sandbox("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Sandbox("stderr was not captured".to_string()))?;

        let cap = limits.output;
        let run = async {
            let ((), out, err) = tokio::try_join!(
                write_input(stdin, input),
                read_capped(stdout, cap),
                read_capped(stderr, cap)
            )?;
            let status = child.wait().await.map_err(CaptureError::Io)?;
            Ok::<_, CaptureError>((status, out, err))
        };
        let outcome = time::timeout(limits.deadline, run).await;

        let (termination, stdout, stderr) = match outcome {
            Ok(Ok((status, out, err))) => {
                // Reap anything the program left running in its group.
                group.kill();
                (Termination::from_status(status), out, err)
            }
            Ok(Err(CaptureError::Overflow)) => {
                warn!("Sandbox {} exceeded the output limit of {} bytes", self.id, cap);
                group.kill();
                let _ = child.kill().await;
                (Termination::OutputExceeded, Vec::new(), Vec::new())
            }
            Ok(Err(CaptureError::Io(e))) => {
                group.kill();
                let _ = child.kill().await;
                return Err(Error::Sandbox(format!("failed to collect output: {}", e)));
            }
            Err(_) => {
                warn!(
                    "Sandbox {} timed out after {}ms",
                    self.id,
                    limits.deadline.as_millis()
                );
                group.kill();
                let _ = child.kill().await;
                (Termination::TimedOut, Vec::new(), Vec::new())
            }
        };

        let elapsed = started.elapsed();
        debug!(
            "Sandbox {} finished with {:?} in {}ms",
            self.id,
            termination,
            elapsed.as_millis()
        );

        Ok(ProcessOutput {
            termination,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            elapsed,
        })
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        // Build trees can be large; keep the removal off the async workers.
        let root_dir = std::mem::take(&mut self.root_dir);
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_sandbox_dir(&root_dir));
            }
            Err(_) => remove_sandbox_dir(&root_dir),
        }
    }
}

fn remove_sandbox_dir(root_dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(root_dir) {
        error!(
            "Failed to clean up sandbox directory {}: {}",
            root_dir.display(),
            e
        );
    }
}

fn apply_rlimits(command: &mut Command, limits: &RunLimits) {
    let cpu_time = ResourceLimits::cpu_seconds(limits.deadline);
    let file_size = limits.file_size;
    let address_space = limits.address_space;
    let data = limits.data;
    let processes = limits.processes;

    // SAFETY: the hook only issues setpgid(2) and setrlimit(2), both async-signal-safe.
    unsafe {
        command.pre_exec(move || {
            // Own process group, so the whole tree can be killed at once.
            setpgid(Pid::from_raw(0), Pid::from_raw(0))?;
            setrlimit(Resource::RLIMIT_CORE, 0, 0)?;
            // The hard limit sits one second above the soft limit so SIGXCPU arrives first.
            setrlimit(Resource::RLIMIT_CPU, cpu_time, cpu_time + 1)?;
            setrlimit(Resource::RLIMIT_FSIZE, file_size, file_size)?;

            #[cfg(target_os = "linux")]
            {
                if let Some(bytes) = address_space {
                    setrlimit(Resource::RLIMIT_AS, bytes, bytes)?;
                }
                if let Some(bytes) = data {
                    setrlimit(Resource::RLIMIT_DATA, bytes, bytes)?;
                }
                if let Some(count) = processes {
                    setrlimit(Resource::RLIMIT_NPROC, count, count)?;
                }
            }
            #[cfg(not(target_os = "linux"))]
            let _ = (address_space, data, processes);

            Ok(())
        });
    }
}

async fn write_input(stdin: Option<ChildStdin>, input: Option<&str>) -> Result<(), CaptureError> {
    if let (Some(mut stdin), Some(data)) = (stdin, input) {
        // A program that exits without reading its input is not an error.
        if let Err(e) = stdin.write_all(data.as_bytes()).await {
            debug!("Sandbox input not fully consumed: {}", e);
        }
    }
    Ok(())
}

async fn read_capped<R>(mut reader: R, cap: usize) -> Result<Vec<u8>, CaptureError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await.map_err(CaptureError::Io)?;
        if n == 0 {
            return Ok(buf);
        }
        if buf.len() + n > cap {
            return Err(CaptureError::Overflow);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

