use super::utils::defaults::*;
use super::*;
use crate::{
    languages::skip_if_not_available, CodeExecutionService, ExecutionRequest, ExecutionResult,
    ExecutionStatus, Language, Result, ServiceConfig,
};
use tokio::time::Duration;

pub mod cpp;
pub mod golang;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
pub mod rust;
pub mod shell;
pub mod typescript;

/// Run `request` on a single-slot service, or `None` when `tools` are missing on this host.
pub(crate) async fn run_if_available(
    tools: &[&str],
    request: ExecutionRequest,
) -> Result<Option<ExecutionResult>> {
    run_with_config_if_available(tools, test_config(), request).await
}

pub(crate) async fn run_with_config_if_available(
    tools: &[&str],
    config: ServiceConfig,
    request: ExecutionRequest,
) -> Result<Option<ExecutionResult>> {
    if skip_if_not_available(tools) {
        return Ok(None);
    }

    let service = CodeExecutionService::new(ServiceConfig {
        max_concurrent: 1,
        ..config
    })?;
    service.execute(request).await.map(Some)
}

pub(crate) fn with_memory(megabytes: u64) -> ServiceConfig {
    let mut config = test_config();
    config.limits.memory = megabytes * 1024 * 1024;
    config
}

// Common test utilities for language tests
pub(crate) async fn test_language_execution(
    language: Language,
    tools: &[&str],
    code: &str,
) -> Result<()> {
    let request = ExecutionRequest::new(code, language.as_str());
    let Some(result) = run_if_available(tools, request).await? else {
        return Ok(());
    };

    assert!(
        result.output.contains("Hello from"),
        "unexpected result for {}: {:?}",
        language,
        result
    );
    assert!(result.error.is_empty());
    Ok(())
}

pub(crate) async fn test_language_timeout(
    language: Language,
    tools: &[&str],
    code: &str,
) -> Result<()> {
    let request =
        ExecutionRequest::new(code, language.as_str()).with_timeout(Duration::from_millis(1000));
    let Some(result) = run_if_available(tools, request).await? else {
        return Ok(());
    };

    assert_eq!(result.status, ExecutionStatus::TimedOut);
    assert_eq!(result.error, "resource limit exceeded: timeout");
    Ok(())
}
