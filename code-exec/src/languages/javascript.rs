use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{heap_megabytes, ToolCheck},
    sandbox::{CommandSpec, MemoryRlimit},
    Language, ResourceLimits,
};

/// What V8 prints when the heap flag or the data ceiling stops an allocation
pub(crate) const V8_OUT_OF_MEMORY: &[&str] = &[
    "JavaScript heap out of memory",
    "Array buffer allocation failed",
];

pub struct JavaScriptExecutor;

impl ToolCheck for JavaScriptExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["node"]
    }
}

#[async_trait]
impl LanguageExecutor for JavaScriptExecutor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn source_file(&self) -> &str {
        "main.js"
    }

    fn run_command(&self, _workdir: &Path, limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new(
            "node",
            [
                format!("--max-old-space-size={}", heap_megabytes(limits.memory)),
                "main.js".to_string(),
            ],
        )
    }

    // V8 reserves far more address space than it ever touches. The heap flag
    // bounds the JS heap, RLIMIT_DATA bounds Buffers and everything else.
    fn memory_rlimit(&self) -> MemoryRlimit {
        MemoryRlimit::Data
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        V8_OUT_OF_MEMORY
    }
}
