use super::fixtures::{
    code_samples::CPP_HELLO,
    test_scenarios::{CPP_ALLOCATES, CPP_BUSY_LOOP, CPP_SYNTAX_ERROR},
};

use super::*;

const TOOLS: &[&str] = &["g++"];

#[tokio::test]
async fn test_cpp_basic() -> Result<()> {
    test_language_execution(Language::Cpp, TOOLS, CPP_HELLO).await
}

#[tokio::test]
async fn test_cpp_timeout() -> Result<()> {
    test_language_timeout(Language::Cpp, TOOLS, CPP_BUSY_LOOP).await
}

#[tokio::test]
async fn test_cpp_compile_error() -> Result<()> {
    let request = ExecutionRequest::new(CPP_SYNTAX_ERROR, "c++");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.starts_with("compilation failed:"));
    }
    Ok(())
}

#[tokio::test]
async fn test_cpp_memory_limit() -> Result<()> {
    let request = ExecutionRequest::new(CPP_ALLOCATES, "cpp");
    if let Some(result) = run_with_config_if_available(TOOLS, with_memory(256), request).await? {
        assert!(result.output.is_empty());
        assert_eq!(result.error, "resource limit exceeded: memory");
    }
    Ok(())
}
