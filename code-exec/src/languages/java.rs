use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{heap_megabytes, ToolCheck},
    sandbox::{CommandSpec, MemoryRlimit},
    Language, ResourceLimits,
};

/// Runs a single `Main` class; the source must declare `public class Main`.
pub struct JavaExecutor;

impl ToolCheck for JavaExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["javac", "java"]
    }
}

#[async_trait]
impl LanguageExecutor for JavaExecutor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn source_file(&self) -> &str {
        "Main.java"
    }

    fn compile_command(&self, _workdir: &Path, limits: &ResourceLimits) -> Option<CommandSpec> {
        Some(CommandSpec::new(
            "javac",
            [
                format!("-J-Xmx{}m", heap_megabytes(limits.compile_memory)),
                "Main.java".to_string(),
            ],
        ))
    }

    fn run_command(&self, _workdir: &Path, limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new(
            "java",
            [
                format!("-Xmx{}m", heap_megabytes(limits.memory)),
                "-cp".to_string(),
                ".".to_string(),
                "Main".to_string(),
            ],
        )
    }

    // The JVM reserves its heap and code cache as address space at startup,
    // and commits metaspace outside -Xmx.
    fn memory_rlimit(&self) -> MemoryRlimit {
        MemoryRlimit::HeapFlag
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        &["java.lang.OutOfMemoryError"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_heap_flags() {
        let limits = ResourceLimits::default();
        let workdir = Path::new("/tmp/x");
        let compile = JavaExecutor.compile_command(workdir, &limits).unwrap();
        assert_eq!(compile.args[0], "-J-Xmx2048m");
        let run = JavaExecutor.run_command(workdir, &limits);
        assert_eq!(run.args, vec!["-Xmx512m", "-cp", ".", "Main"]);
    }
}
