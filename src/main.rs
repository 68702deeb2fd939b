use anyhow::Context;
use clap::Parser;
use code_exec::{ExecutionRequest, DEFAULT_CHANNEL};
use code_execution_bridge::BridgeClient;
use std::{
    io::Read,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the code execution server
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Channel name served by the server
    #[arg(long, default_value = DEFAULT_CHANNEL)]
    channel: String,

    /// Language of the submitted source
    #[arg(short, long)]
    language: String,

    /// Wall-clock limit in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// File fed to the program's stdin
    #[arg(long)]
    stdin: Option<PathBuf>,

    /// Source file, `-` for standard input
    source: PathBuf,
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut request = ExecutionRequest::new(read_source(&args.source)?, args.language.clone());
    if let Some(path) = &args.stdin {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        request = request.with_input(input);
    }
    if let Some(ms) = args.timeout {
        request = request.with_timeout(Duration::from_millis(ms));
    }

    let client = BridgeClient::new(&args.url, &args.channel)?;
    let reply = client.execute(&request).await?;
    debug!("Execution took {}ms", reply.execution_time);

    print!("{}", reply.output);
    if reply.error.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", reply.error);
        Ok(ExitCode::FAILURE)
    }
}
