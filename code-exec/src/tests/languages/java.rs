use super::fixtures::{
    code_samples::JAVA_HELLO,
    test_scenarios::{JAVA_SLEEPS, JAVA_SYNTAX_ERROR, JAVA_THROWS},
};
use crate::FailureKind;

use super::*;

const TOOLS: &[&str] = &["javac", "java"];

#[tokio::test]
async fn test_java_basic() -> Result<()> {
    test_language_execution(Language::Java, TOOLS, JAVA_HELLO).await
}

#[tokio::test]
async fn test_java_timeout() -> Result<()> {
    test_language_timeout(Language::Java, TOOLS, JAVA_SLEEPS).await
}

#[tokio::test]
async fn test_java_compile_error() -> Result<()> {
    let request = ExecutionRequest::new(JAVA_SYNTAX_ERROR, "java");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.starts_with("compilation failed:"));
        assert!(result.error.contains("Main.java"));
    }
    Ok(())
}

#[tokio::test]
async fn test_java_uncaught_exception() -> Result<()> {
    let request = ExecutionRequest::new(JAVA_THROWS, "java");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.contains("IllegalStateException: kaboom"));
        assert_eq!(result.failure, Some(FailureKind::Execution));
    }
    Ok(())
}
