use super::fixtures::{code_samples::TS_HELLO, test_scenarios::TS_TYPE_ERROR};
use crate::FailureKind;

use super::*;

const TOOLS: &[&str] = &["tsc", "node"];

#[tokio::test]
async fn test_typescript_basic() -> Result<()> {
    test_language_execution(Language::TypeScript, TOOLS, TS_HELLO).await
}

#[tokio::test]
async fn test_typescript_timeout() -> Result<()> {
    test_language_timeout(Language::TypeScript, TOOLS, "while (true) {}").await
}

#[tokio::test]
async fn test_typescript_type_error() -> Result<()> {
    let request = ExecutionRequest::new(TS_TYPE_ERROR, "ts");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.error.starts_with("compilation failed:"));
        assert!(result.error.contains("TS2322"));
        assert_eq!(result.failure, Some(FailureKind::Execution));
    }
    Ok(())
}
