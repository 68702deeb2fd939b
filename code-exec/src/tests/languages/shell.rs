use super::fixtures::{code_samples::SHELL_HELLO, test_scenarios::SHELL_BUSY_LOOP};

use super::*;

const TOOLS: &[&str] = &["sh"];

#[tokio::test]
async fn test_shell_basic() -> Result<()> {
    test_language_execution(Language::Shell, TOOLS, SHELL_HELLO).await
}

#[tokio::test]
async fn test_shell_timeout() -> Result<()> {
    test_language_timeout(Language::Shell, TOOLS, SHELL_BUSY_LOOP).await
}

#[tokio::test]
async fn test_shell_sees_sandbox_home() -> Result<()> {
    let request = ExecutionRequest::new("cd && pwd && ls -A", "bash");
    if let Some(result) = run_if_available(TOOLS, request).await? {
        assert!(result.output.starts_with('/'));
        assert!(result.output.trim_end().ends_with("/home"));
    }
    Ok(())
}
