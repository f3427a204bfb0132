mod check_cmd;
mod render_cmd;
mod serve;
mod wiring;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "claimdesk")]
#[command(about = "ClaimDesk: Telegram assistant for insurance claim assessment")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Serve {
        /// Config file (defaults to $CLAIMDESK_CONFIG, ./claimdesk.yaml, ~/.claimdesk/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate the configuration and print it with secrets masked
    CheckConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render a text file into a watermarked PDF report, without Telegram
    RenderReport {
        /// UTF-8 text file with the report body
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the PDF
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        watermark: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(claimdesk_config::default_config_path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve::run(&config_path(config)).await,
        Commands::CheckConfig { config } => check_cmd::run(&config_path(config)).await,
        Commands::RenderReport {
            input,
            output,
            title,
            watermark,
            config,
        } => {
            let options = render_cmd::RenderOptions {
                input,
                output,
                title,
                watermark,
            };
            render_cmd::run(&config_path(config), options).await
        }
    }
}
