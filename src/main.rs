use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spytcli::{
    cli::{self, ConvertOptions},
    config, error,
    types::{PkceToken, Service},
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify or YouTube
    Auth(AuthOptions),

    /// Convert Spotify playlists to YouTube playlists
    Convert(ConvertArgs),

    /// Show statistics of the candidate cache
    Cache,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Service to authorize with
    #[clap(value_enum)]
    pub service: Service,
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    /// Spotify playlist ids, URIs or URLs
    #[clap(required = true, num_args = 1..)]
    pub playlists: Vec<String>,

    /// Minimum similarity (0-1) for a match to be accepted
    #[clap(long)]
    pub threshold: Option<f64>,

    /// Attempts per search before the quota counts as exhausted
    #[clap(long)]
    pub max_retries: Option<u32>,

    /// Number of YouTube results to score per search
    #[clap(long)]
    pub max_results: Option<u32>,

    /// File unresolved tracks are appended to
    #[clap(long)]
    pub report: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(opt.service, Arc::clone(&oauth_result)).await;
        }
        Command::Convert(opt) => {
            cli::convert(
                opt.playlists,
                ConvertOptions {
                    threshold: opt.threshold,
                    max_retries: opt.max_retries,
                    max_results: opt.max_results,
                    report: opt.report,
                },
            )
            .await
        }
        Command::Cache => cli::cache().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
