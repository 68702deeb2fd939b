//! Language-specific executor implementations

mod cpp;
mod go;
mod java;
mod javascript;
mod php;
mod python;
mod rust;
mod shell;
mod typescript;

pub use cpp::CppExecutor;
pub use go::GoExecutor;
pub use java::JavaExecutor;
pub use javascript::JavaScriptExecutor;
pub use php::PhpExecutor;
pub use python::PythonExecutor;
pub use rust::RustExecutor;
pub use shell::ShellExecutor;
pub use typescript::TypeScriptExecutor;

use crate::error::Error;
use std::collections::HashMap;
use std::path::PathBuf;
use which::which;

pub trait ToolCheck {
    fn required_tools(&self) -> Vec<&str>;

    /// Tools that are neither overridden in configuration nor on the host `PATH`
    fn missing_tools(&self, overrides: &HashMap<String, PathBuf>) -> Vec<String> {
        self.required_tools()
            .iter()
            .filter(|tool| !overrides.contains_key(**tool) && which(tool).is_err())
            .map(|s| (*s).to_string())
            .collect()
    }

    fn check_tools(&self) -> Result<(), Error> {
        let missing = self.missing_tools(&HashMap::new());
        if !missing.is_empty() {
            return Err(Error::Sandbox(format!(
                "toolchain not available: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Heap ceiling in MiB for runtimes configured through flags
pub(crate) fn heap_megabytes(bytes: u64) -> u64 {
    (bytes / (1024 * 1024)).max(16)
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(**tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}
