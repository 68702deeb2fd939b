use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{heap_megabytes, ToolCheck},
    sandbox::CommandSpec,
    Language, ResourceLimits,
};

pub struct PhpExecutor;

impl ToolCheck for PhpExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["php"]
    }
}

#[async_trait]
impl LanguageExecutor for PhpExecutor {
    fn language(&self) -> Language {
        Language::Php
    }

    fn source_file(&self) -> &str {
        "main.php"
    }

    fn run_command(&self, _workdir: &Path, limits: &ResourceLimits) -> CommandSpec {
        // The CLI prints fatal errors on stdout unless told otherwise.
        CommandSpec::new(
            "php",
            [
                "-d".to_string(),
                format!("memory_limit={}M", heap_megabytes(limits.memory)),
                "-d".to_string(),
                "display_errors=stderr".to_string(),
                "main.php".to_string(),
            ],
        )
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        &["Allowed memory size of"]
    }
}
