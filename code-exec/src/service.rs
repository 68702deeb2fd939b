use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::{
    config::ServiceConfig,
    error::Error,
    executor::{CodeExecutor, LanguageStatus},
    sandbox::Sandbox,
    types::{ExecutionRequest, ExecutionResult, FailureKind},
};

#[derive(Clone)]
pub struct CodeExecutionService {
    executor: Arc<CodeExecutor>,
    semaphore: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
    config: Arc<ServiceConfig>,
}

/// Holds a place in the admission queue until dropped.
struct QueueTicket<'a>(&'a AtomicUsize);

impl Drop for QueueTicket<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CodeExecutionService {
    pub fn new(config: ServiceConfig) -> Result<Self, Error> {
        config.validate()?;
        let executor = CodeExecutor::new(config.tools.clone());

        Ok(Self {
            executor: Arc::new(executor),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            queued: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run one request to completion.
    ///
    /// Every validation, sandbox, execution and resource-limit failure comes
    /// back as `Ok` with the `error` field set. `Err` means the service itself
    /// could not take the request.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, Error> {
        let started = Instant::now();

        debug!("Validating request for language {:?}", request.language);
        let language = match request.validate() {
            Ok(language) => language,
            Err(e) => {
                info!("Rejected execution request: {}", e);
                return Ok(ExecutionResult::from_error(&e, started.elapsed()));
            }
        };

        let _permit = match self.admit().await {
            Ok(permit) => permit,
            Err(e) if e.is_host_failure() => return Err(host_failure(e)),
            Err(e) => {
                warn!("Turned away {} request: {}", language, e);
                return Ok(ExecutionResult::from_error(&e, started.elapsed()));
            }
        };

        let sandbox = Sandbox::new(&self.config).await.map_err(host_failure)?;
        debug!(
            "Starting sandboxed execution of {} in sandbox {}",
            language,
            sandbox.id()
        );

        let outcome = self
            .executor
            .execute_in_sandbox(language, &request, &sandbox, &self.config.limits)
            .await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(output) => ExecutionResult::success(output, elapsed),
            Err(e) if e.is_host_failure() => return Err(host_failure(e)),
            Err(e) => ExecutionResult::from_error(&e, elapsed),
        };

        match result.failure {
            None => info!(
                "Code execution of {} succeeded in {}ms",
                language,
                result.execution_time_millis()
            ),
            Some(FailureKind::Sandbox) => warn!(
                "Sandbox failure running {}: {}",
                language, result.error
            ),
            Some(kind) => info!(
                "Code execution of {} ended as {} ({:?}) in {}ms",
                language,
                result.status,
                kind,
                result.execution_time_millis()
            ),
        }

        Ok(result)
    }

    pub async fn execute_code(
        &self,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<ExecutionResult, Error> {
        self.execute(ExecutionRequest::new(code, language)).await
    }

    /// Languages known to the service and whether their toolchains are installed
    pub fn languages(&self) -> Vec<LanguageStatus> {
        self.executor.languages()
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Stop admitting work. Requests still queued fail as host failures.
    pub fn shutdown(&self) {
        info!("Code execution service shutting down");
        self.semaphore.close();
    }

    async fn admit(&self) -> Result<OwnedSemaphorePermit, Error> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => return Ok(permit),
            Err(TryAcquireError::Closed) => return Err(shut_down()),
            Err(TryAcquireError::NoPermits) => {}
        }

        let position = self.queued.fetch_add(1, Ordering::SeqCst);
        let _ticket = QueueTicket(&self.queued);
        if position >= self.config.queue_capacity {
            return Err(Error::Busy);
        }

        debug!("Execution queued at position {}", position + 1);
        match time::timeout(
            self.config.queue_timeout,
            self.semaphore.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(shut_down()),
            Err(_) => Err(Error::Busy),
        }
    }
}

fn shut_down() -> Error {
    Error::Host("execution service is shut down".to_string())
}

fn host_failure(e: Error) -> Error {
    error!(target: "code_exec::host", "Host failure: {}", e);
    e
}
