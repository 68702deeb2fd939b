use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor, languages::ToolCheck, sandbox::CommandSpec, Language,
    ResourceLimits,
};

pub struct CppExecutor;

impl ToolCheck for CppExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["g++"]
    }
}

#[async_trait]
impl LanguageExecutor for CppExecutor {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_file(&self) -> &str {
        "main.cpp"
    }

    fn compile_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> Option<CommandSpec> {
        Some(CommandSpec::new(
            "g++",
            ["-O2", "-std=c++17", "-o", "main", "main.cpp"],
        ))
    }

    fn run_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new("./main", Vec::<String>::new())
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        &["std::bad_alloc"]
    }
}
