use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor, languages::ToolCheck, sandbox::CommandSpec, Language,
    ResourceLimits,
};

/// POSIX shell scripts, run with `sh`
pub struct ShellExecutor;

impl ToolCheck for ShellExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["sh"]
    }
}

#[async_trait]
impl LanguageExecutor for ShellExecutor {
    fn language(&self) -> Language {
        Language::Shell
    }

    fn source_file(&self) -> &str {
        "main.sh"
    }

    fn run_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new("sh", ["main.sh"])
    }
}
