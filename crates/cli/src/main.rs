use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "careerflow", version)]
#[command(about = "Drive the CareerOS resume pipeline from the terminal", long_about = None)]
struct Cli {
    /// Directory containing the `.careerflow/` configuration
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a CV (PDF, DOC, DOCX) and follow the live pipeline
    Run {
        file: PathBuf,

        /// MIME type of the file; inferred from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Run the simulated pipeline without a backend
    Demo,
    /// Check whether the backend is reachable
    Health,
    /// Poll the status of a session
    Status { session_id: String },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cf_core=info,cf_cli=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cf_core::config::loader::load_config(&cli.root).await?;

    match cli.command {
        Commands::Run { file, mime } => commands::run(config, &file, mime.as_deref()).await,
        Commands::Demo => commands::demo(config).await,
        Commands::Health => commands::health(config).await,
        Commands::Status { session_id } => commands::status(config, &session_id).await,
    }
}
