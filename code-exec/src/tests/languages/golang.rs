use super::fixtures::{
    code_samples::GO_HELLO,
    test_scenarios::{GO_SYNTAX_ERROR, GO_WITH_TIMEOUT},
};

use super::*;

const TOOLS: &[&str] = &["go"];

#[tokio::test]
async fn test_go_basic() -> Result<()> {
    test_language_execution(Language::Go, TOOLS, GO_HELLO).await
}

#[tokio::test]
async fn test_go_timeout() -> Result<()> {
    test_language_timeout(Language::Go, TOOLS, GO_WITH_TIMEOUT).await
}

#[tokio::test]
async fn test_go_compile_error() -> Result<()> {
    let request = ExecutionRequest::new(GO_SYNTAX_ERROR, "golang");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.starts_with("compilation failed:"));
    }
    Ok(())
}
