use async_trait::async_trait;
use std::path::Path;

use crate::{
    executor::LanguageExecutor, languages::ToolCheck, sandbox::CommandSpec, Language,
    ResourceLimits,
};

pub struct PythonExecutor {
    interpreter: String,
}

impl PythonExecutor {
    pub fn new(interpreter: Option<String>) -> Self {
        Self {
            interpreter: interpreter.unwrap_or_else(|| "python3".to_string()),
        }
    }
}

impl ToolCheck for PythonExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec![self.interpreter.as_str()]
    }
}

#[async_trait]
impl LanguageExecutor for PythonExecutor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_file(&self) -> &str {
        "main.py"
    }

    fn run_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> CommandSpec {
        // -I ignores PYTHON* variables and user site-packages, -B skips .pyc writes
        CommandSpec::new(self.interpreter.clone(), ["-I", "-B", "main.py"])
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        &["MemoryError"]
    }
}
