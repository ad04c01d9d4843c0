use anyhow::{Context, Result};
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use anifetch::Episode;

// Função para selecionar um item de uma lista
pub fn select_from_list(items: &[String], prompt: &str) -> Result<usize> {
    let selection = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .context("Falha ao selecionar da lista")?;

    Ok(selection)
}

// Spinner enquanto os providers respondem
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// Uma linha por episódio: temporada, provider, título
pub fn episode_line(episode: &Episode) -> String {
    match episode.season {
        Some(season) => format!("[T{}] [{}] {}", season, episode.provider, episode.title),
        None => format!("[{}] {}", episode.provider, episode.title),
    }
}

pub fn print_episodes(episodes: &[Episode], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(episodes)?);
        return Ok(());
    }

    for episode in episodes {
        println!("{}", episode_line(episode));
        println!("    {}", episode.link);
    }
    Ok(())
}
