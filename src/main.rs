use clap::{Parser, Subcommand};
use pulseatlas::context::AppContextBuilder;
use pulseatlas::supervisor::Supervisor;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the health-check monitor.
    Run {
        /// Directory containing app.yaml. Defaults to `configs`.
        #[arg(long)]
        config_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config_dir } => run_monitor(config_dir).await?,
    }

    Ok(())
}

async fn run_monitor(config_dir: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let context = AppContextBuilder::new(config_dir).build().await?;
    let repo = context.repo.clone();

    let supervisor = Supervisor::builder()
        .config(context.config)
        .repository(context.repo)
        .dedup_store(context.dedup)
        .publisher(context.publisher)
        .notifier(context.notifier)
        .metrics(context.metrics)
        .build()?;

    supervisor.run().await?;

    repo.close().await;
    Ok(())
}
