use super::fixtures::{
    code_samples::PHP_HELLO,
    test_scenarios::{PHP_BUSY_LOOP, PHP_THROWS},
};

use super::*;

const TOOLS: &[&str] = &["php"];

#[tokio::test]
async fn test_php_basic() -> Result<()> {
    test_language_execution(Language::Php, TOOLS, PHP_HELLO).await
}

#[tokio::test]
async fn test_php_timeout() -> Result<()> {
    test_language_timeout(Language::Php, TOOLS, PHP_BUSY_LOOP).await
}

#[tokio::test]
async fn test_php_uncaught_exception() -> Result<()> {
    let request = ExecutionRequest::new(PHP_THROWS, "php");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.contains("kaboom"));
    }
    Ok(())
}
