use super::fixtures::{
    code_samples::PYTHON_HELLO,
    test_scenarios::{PYTHON_MULTILINE, PYTHON_RAISES, PYTHON_WITH_INPUT, PYTHON_WRITES_BIG_FILE},
};
use crate::{FailureKind, ToolCheck};

use super::*;

const TOOLS: &[&str] = &["python3"];

#[tokio::test]
async fn test_python_basic() -> Result<()> {
    test_language_execution(Language::Python, TOOLS, PYTHON_HELLO).await
}

#[tokio::test]
async fn test_python_timeout() -> Result<()> {
    test_language_timeout(Language::Python, TOOLS, "while True:\n    pass\n").await
}

#[tokio::test]
async fn test_python_multiline() -> Result<()> {
    let request = ExecutionRequest::new(PYTHON_MULTILINE, "py");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert_eq!(result.output, "Factorial of 5 is 120\n");
    }
    Ok(())
}

#[tokio::test]
async fn test_python_input() -> Result<()> {
    let request = ExecutionRequest::new(PYTHON_WITH_INPUT, "python").with_input("test user\n");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert_eq!(result.output, "Hello, test user!\n");
        assert!(result.error.is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn test_python_traceback_is_reported() -> Result<()> {
    let request = ExecutionRequest::new(PYTHON_RAISES, "python");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.contains("Traceback"));
        assert_eq!(result.failure, Some(FailureKind::Execution));
    }
    Ok(())
}

#[tokio::test]
async fn test_python_file_size_limit() -> Result<()> {
    let request = ExecutionRequest::new(PYTHON_WRITES_BIG_FILE, "python");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert_eq!(result.error, "resource limit exceeded: file size");
        assert_eq!(result.failure, Some(FailureKind::ResourceLimit));
    }
    Ok(())
}

#[test]
fn test_python_requirements() {
    if skip_if_not_available(TOOLS) {
        return;
    }
    let executor = crate::languages::PythonExecutor::new(None);
    executor.check_tools().unwrap();
}
