use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::Level;

use anifetch::utils::target_season;
use anifetch::{Aggregator, Config, ProviderId};

mod ui;

use ui::{print_episodes, select_from_list, spinner};

#[derive(Parser)]
#[command(name = "anifetch", version, about = "Busca episódios de anime em vários sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Request timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Alternative config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search episodes for a title
    Search {
        /// Anime title, season markers included ("Oshi no Ko 3rd Season")
        title: String,

        /// Override the season derived from the title
        #[arg(short, long)]
        season: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Pick an episode and resolve its video URL
        #[arg(short, long)]
        pick: bool,
    },

    /// Resolve the video URL of an episode page
    Video {
        /// Provider that produced the episode (animefire, animesonline)
        provider: String,

        /// Episode page URL
        url: String,
    },

    /// Show recent releases
    Latest {
        #[arg(short, long, default_value = "animesonline")]
        provider: ProviderId,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let aggregator = Aggregator::from_config(&config).context("Falha ao montar os providers")?;

    match cli.command {
        Commands::Search {
            title,
            season,
            json,
            pick,
        } => {
            let season = season.unwrap_or_else(|| target_season(&title));

            let bar = spinner(&format!("Buscando \"{}\" (temporada {})...", title, season));
            let episodes = aggregator.search(&title, season).await;
            bar.finish_and_clear();

            if episodes.is_empty() {
                println!("Nenhum episódio encontrado para: {}", title);
                return Ok(ExitCode::FAILURE);
            }

            if !pick {
                print_episodes(&episodes, json)?;
                return Ok(ExitCode::SUCCESS);
            }

            let items: Vec<String> = episodes.iter().map(ui::episode_line).collect();
            let index = select_from_list(&items, "Escolha o episódio:")?;
            let episode = &episodes[index];

            print_video(
                aggregator
                    .extract_video(&episode.link, episode.provider.as_str())
                    .await,
            )
        }

        Commands::Video { provider, url } => {
            let registered = aggregator.registry().ids();
            let known = provider
                .parse::<ProviderId>()
                .is_ok_and(|id| registered.contains(&id));
            if !known {
                let names: Vec<&str> = registered.iter().map(ProviderId::as_str).collect();
                bail!("Provider desconhecido: {} (disponíveis: {})", provider, names.join(", "));
            }
            print_video(aggregator.extract_video(&url, &provider).await)
        }

        Commands::Latest { provider, json } => {
            let bar = spinner("Buscando lançamentos...");
            let episodes = aggregator.latest(provider).await;
            bar.finish_and_clear();

            if episodes.is_empty() {
                println!("Nenhum lançamento encontrado em {}", provider);
                return Ok(ExitCode::FAILURE);
            }
            print_episodes(&episodes, json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// "Não encontrado" não é erro: só muda o código de saída
fn print_video(url: Option<String>) -> Result<ExitCode> {
    match url {
        Some(url) => {
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("URL do vídeo não encontrada");
            Ok(ExitCode::FAILURE)
        }
    }
}
