pub mod defaults {
    use crate::{CodeExecutionService, ResourceLimits, Result, ServiceConfig};
    use std::path::Path;
    use tokio::time::Duration;

    pub fn default_test_limits() -> ResourceLimits {
        ResourceLimits {
            timeout: default_timeout(),
            max_timeout: Duration::from_secs(30),
            compile_timeout: extended_timeout(),
            ..ResourceLimits::default()
        }
    }

    pub fn test_config() -> ServiceConfig {
        ServiceConfig {
            max_concurrent: 4,
            limits: default_test_limits(),
            ..ServiceConfig::default()
        }
    }

    pub fn test_config_in(workspace: &Path) -> ServiceConfig {
        ServiceConfig {
            workspace_root: Some(workspace.to_path_buf()),
            ..test_config()
        }
    }

    pub fn test_service() -> Result<CodeExecutionService> {
        CodeExecutionService::new(test_config())
    }

    pub fn default_timeout() -> Duration {
        Duration::from_secs(5)
    }

    pub fn extended_timeout() -> Duration {
        Duration::from_secs(60)
    }
}

pub mod process {
    use std::path::Path;
    use tokio::time::{sleep, Duration, Instant};

    /// True while `pid` exists and is not a zombie
    pub fn is_running(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit_once(") ")
                .and_then(|(_, rest)| rest.chars().next())
                .map(|state| state != 'Z' && state != 'X')
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Poll until `path` holds a non-empty line, giving up after `limit`
    pub async fn wait_for_contents(path: &Path, limit: Duration) -> Option<String> {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if let Ok(contents) = std::fs::read_to_string(path) {
                if contents.ends_with('\n') {
                    return Some(contents.trim().to_string());
                }
            }
            sleep(Duration::from_millis(20)).await;
        }
        None
    }

    pub async fn wait_until_stopped(pid: i32, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if !is_running(pid) {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }
        !is_running(pid)
    }

    /// Poll until `path` no longer exists. Sandbox cleanup runs on a blocking task.
    pub async fn wait_until_removed(path: &Path, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while path.exists() && Instant::now() < deadline {
            sleep(Duration::from_millis(20)).await;
        }
        !path.exists()
    }

    pub async fn wait_until_empty(dir: &Path, limit: Duration) -> bool {
        let is_empty = || {
            std::fs::read_dir(dir)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false)
        };
        let deadline = Instant::now() + limit;
        while !is_empty() && Instant::now() < deadline {
            sleep(Duration::from_millis(20)).await;
        }
        is_empty()
    }
}
