use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::ToolCheck,
    sandbox::{CommandSpec, MemoryRlimit},
    Language, ResourceLimits,
};

pub struct GoExecutor;

impl ToolCheck for GoExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["go"]
    }
}

#[async_trait]
impl LanguageExecutor for GoExecutor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn source_file(&self) -> &str {
        "main.go"
    }

    fn compile_command(&self, workdir: &Path, _limits: &ResourceLimits) -> Option<CommandSpec> {
        // The go tool needs writable caches; keep them inside the sandbox.
        Some(
            CommandSpec::new("go", ["build", "-o", "main", "main.go"])
                .env("GOCACHE", workdir.join("tmp/go-build").display().to_string())
                .env("GOPATH", workdir.join("tmp/go").display().to_string())
                .env("GOTOOLCHAIN", "local"),
        )
    }

    fn run_command(&self, _workdir: &Path, limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new("./main", Vec::<String>::new())
            .env("GOMEMLIMIT", limits.memory.to_string())
    }

    // The Go runtime reserves arenas far beyond its live heap. GOMEMLIMIT only
    // steers the collector; RLIMIT_DATA is the hard ceiling.
    fn memory_rlimit(&self) -> MemoryRlimit {
        MemoryRlimit::Data
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        &["runtime: out of memory", "runtime: cannot allocate memory"]
    }
}
