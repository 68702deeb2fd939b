use clap::Parser;
use code_exec::ServiceConfig;
use code_exec_server::{run_server, AppState};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML service configuration; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// Maximum number of concurrent executions
    #[arg(short, long)]
    max_concurrent: Option<usize>,

    /// Maximum number of requests waiting for a slot
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Default wall-clock limit per execution, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Memory limit in bytes
    #[arg(long)]
    memory_limit: Option<u64>,

    /// Directory sandboxes are created under
    #[arg(long)]
    workspace_root: Option<PathBuf>,
}

impl Args {
    fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::load(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent = max_concurrent;
        }
        if let Some(queue_capacity) = self.queue_capacity {
            config.queue_capacity = queue_capacity;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            let timeout = Duration::from_millis(timeout_ms);
            config.limits.timeout = timeout;
            config.limits.max_timeout = config.limits.max_timeout.max(timeout);
        }
        if let Some(memory) = self.memory_limit {
            config.limits.memory = memory;
        }
        if let Some(root) = &self.workspace_root {
            config.workspace_root = Some(root.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.service_config()?;
    info!(
        "Admitting {} concurrent executions with {} queued, {}ms default timeout",
        config.max_concurrent,
        config.queue_capacity,
        config.limits.timeout.as_millis()
    );

    let state = AppState::new(config)?;
    run_server(state, args.addr).await?;

    Ok(())
}
