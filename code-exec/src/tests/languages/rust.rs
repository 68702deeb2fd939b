use super::fixtures::{
    code_samples::RUST_HELLO,
    test_scenarios::{RUST_PANICS, RUST_WITH_TIMEOUT},
};

use super::*;

const TOOLS: &[&str] = &["rustc"];

#[tokio::test]
async fn test_rust_basic() -> Result<()> {
    test_language_execution(Language::Rust, TOOLS, RUST_HELLO).await
}

#[tokio::test]
async fn test_rust_timeout() -> Result<()> {
    test_language_timeout(Language::Rust, TOOLS, RUST_WITH_TIMEOUT).await
}

#[tokio::test]
async fn test_rust_panic() -> Result<()> {
    let request = ExecutionRequest::new(RUST_PANICS, "rs");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.is_empty());
        assert!(result.error.contains("explicit failure"));
    }
    Ok(())
}
