use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use crate::{
    error::Error,
    executor::LanguageExecutor,
    languages::{heap_megabytes, javascript::V8_OUT_OF_MEMORY, ToolCheck},
    sandbox::{CommandSpec, MemoryRlimit},
    Language, ResourceLimits,
};

pub struct TypeScriptExecutor;

impl ToolCheck for TypeScriptExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["tsc", "node"]
    }
}

#[async_trait]
impl LanguageExecutor for TypeScriptExecutor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn source_file(&self) -> &str {
        "main.ts"
    }

    fn compile_command(&self, _workdir: &Path, _limits: &ResourceLimits) -> Option<CommandSpec> {
        Some(CommandSpec::new("tsc", ["-p", "tsconfig.json"]))
    }

    fn run_command(&self, _workdir: &Path, limits: &ResourceLimits) -> CommandSpec {
        CommandSpec::new(
            "node",
            [
                format!("--max-old-space-size={}", heap_megabytes(limits.memory)),
                "build/main.js".to_string(),
            ],
        )
    }

    fn memory_rlimit(&self) -> MemoryRlimit {
        MemoryRlimit::Data
    }

    fn out_of_memory_markers(&self) -> &[&str] {
        V8_OUT_OF_MEMORY
    }

    async fn setup_environment(&self, sandbox_dir: &Path) -> Result<(), Error> {
        let tsconfig = serde_json::json!({
            "compilerOptions": {
                "target": "ES2020",
                "module": "commonjs",
                "strict": false,
                "skipLibCheck": true,
                "outDir": "./build"
            },
            "files": ["main.ts"]
        });

        fs::write(sandbox_dir.join("tsconfig.json"), tsconfig.to_string())
            .await
            .map_err(|e| Error::Sandbox(format!("failed to write tsconfig.json: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_typescript_setup() -> Result<(), Error> {
        let dir = tempdir()?;
        TypeScriptExecutor.setup_environment(dir.path()).await?;

        let tsconfig: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("tsconfig.json"))?)
                .expect("tsconfig.json is valid JSON");
        assert_eq!(tsconfig["compilerOptions"]["outDir"], "./build");
        assert_eq!(tsconfig["files"][0], "main.ts");
        Ok(())
    }
}
