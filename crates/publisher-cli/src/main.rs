use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use publisher_core::domain::parse_task_identifier;
use publisher_core::impls::HttpSparqlClient;
use publisher_core::ingest::download_with_progress;
use publisher_core::{Pipeline, PipelineBuilder, PublisherConfig};

/// Publish the triples of scheduled tasks into the target graph.
#[derive(Debug, Parser)]
#[command(name = "publisher", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recover busy tasks, then run the given tasks concurrently.
    Run {
        #[arg(required = true, value_name = "TASK_URI")]
        tasks: Vec<String>,
    },
    /// Wait for the store and move orphaned busy tasks to failed.
    Recover,
    /// Download a remote file with progress logging.
    Download {
        url: String,
        dest: PathBuf,
    },
}

fn build_pipeline(config: PublisherConfig) -> anyhow::Result<(Arc<Pipeline>, HttpSparqlClient)> {
    let client = HttpSparqlClient::new(config.sparql_endpoint.clone(), config.request_timeout)
        .context("failed to build store client")?
        .with_default_header("mu-auth-sudo", "true")
        .with_retry_delay(config.retry_delay);

    let pipeline = PipelineBuilder::new(config)
        .client(Arc::new(client.clone()))
        .build()?;
    Ok((Arc::new(pipeline), client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("publisher=info".parse()?)
                .add_directive("publisher_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = PublisherConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        endpoint = %config.sparql_endpoint,
        high_load_endpoint = %config.high_load_endpoint,
        target_graph = %config.target_graph,
        "configuration loaded"
    );
    let (pipeline, client) = build_pipeline(config)?;

    match cli.command {
        Command::Run { tasks } => {
            // 不正な識別子があれば何もしないで終了する
            let subjects = tasks
                .iter()
                .map(|raw| parse_task_identifier(raw))
                .collect::<Result<Vec<_>, _>>()?;

            pipeline.tasks().startup_recovery().await?;

            let handles: Vec<_> = subjects
                .into_iter()
                .map(|subject| pipeline.dispatch(subject))
                .collect();
            for handle in handles {
                handle.await.context("task run panicked")?;
            }
        }
        Command::Recover => {
            pipeline.tasks().startup_recovery().await?;
        }
        Command::Download { url, dest } => {
            let report = download_with_progress(client.http(), &url, &dest).await?;
            tracing::info!(bytes = report.bytes, dest = %dest.display(), "saved");
        }
    }

    Ok(())
}
