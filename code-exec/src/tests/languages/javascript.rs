use super::fixtures::{
    code_samples::JS_HELLO,
    test_scenarios::{JS_BUFFER_HOG, JS_INFINITE_LOOP},
};

use super::*;

const TOOLS: &[&str] = &["node"];

#[tokio::test]
async fn test_javascript_basic() -> Result<()> {
    test_language_execution(Language::JavaScript, TOOLS, JS_HELLO).await
}

#[tokio::test]
async fn test_javascript_timeout() -> Result<()> {
    test_language_timeout(Language::JavaScript, TOOLS, JS_INFINITE_LOOP).await
}

#[tokio::test]
async fn test_javascript_uncaught_error() -> Result<()> {
    let request = ExecutionRequest::new("throw new Error('kaboom')", "js");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.contains("kaboom"));
    }
    Ok(())
}

#[tokio::test]
async fn test_javascript_buffer_respects_memory_limit() -> Result<()> {
    let request = ExecutionRequest::new(JS_BUFFER_HOG, "javascript");
    if let Some(result) = run_with_config_if_available(TOOLS, with_memory(256), request).await? {
        assert!(result.output.is_empty());
        assert_eq!(result.error, "resource limit exceeded: memory");
    }
    Ok(())
}

#[tokio::test]
async fn test_javascript_heap_respects_memory_limit() -> Result<()> {
    let code = "const a = []; while (true) a.push(new Array(1e6).fill(1.5));";
    let request = ExecutionRequest::new(code, "node");
    if let Some(result) = run_with_config_if_available(TOOLS, with_memory(256), request).await? {
        assert_eq!(result.error, "resource limit exceeded: memory");
    }
    Ok(())
}
