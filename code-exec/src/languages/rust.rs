use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor, languages::ToolCheck, sandbox::CommandSpec, Language,
    ResourceLimits,
};

pub struct RustExecutor;

impl RustExecutor {
    /// rustup proxies locate their toolchains through these; the sandbox clears
    /// the environment, so forward the host's values.
    fn toolchain_env(mut command: CommandSpec) -> CommandSpec {
        for key in ["RUSTUP_HOME", "CARGO_HOME", "RUSTUP_TOOLCHAIN"] {
            if let Ok(value) = std::env::var(key) {
                command = command.env(key, value);
            }
        }
        if std::env::var_os("RUSTUP_HOME").is_none() {
            if let Some(home) = std::env::var_os("HOME") {
                let rustup_home = Path::new(&home).join(".rustup");
                if rustup_home.is_dir() {
                    command = command.env("RUSTUP_HOME", rustup_home.display().to_string());
                }
            }
        }
        command
    }
}

impl ToolCheck for RustExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["rustc"]
    }
}

#[async_trait]
impl LanguageExecutor for RustExecutor {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn source_file(&self) -> &str {
        "main.rs"
    }

    fn compile_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> Option<CommandSpec> {
        Some(Self::toolchain_env(CommandSpec::new(
            "rustc",
            ["--edition", "2021", "-O", "-o", "main", "main.rs"],
        )))
    }

    fn run_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new("./main", Vec::<String>::new())
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        &["memory allocation of"]
    }
}
