use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fetcher::{ACCEPT_LANG, FetchOptions, USER_AGENT};
use crate::season::DEFAULT_SEASON_LENGTH;

pub const ANIMEFIRE_URL: &str = "https://animefire.plus";
pub const ANIMESONLINE_URL: &str = "https://animesonlinecc.to";

// Configuração lida de <config_dir>/anifetch/config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    pub provider_timeout_secs: u64,
    pub animefire_url: String,
    pub animesonline_url: String,
    /// Episódios por temporada quando não há valor específico do título
    pub season_length: usize,
    /// Episódios por temporada de títulos conhecidos (título → quantidade)
    pub season_lengths: HashMap<String, usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            accept_language: ACCEPT_LANG.to_string(),
            timeout_secs: 10,
            provider_timeout_secs: 20,
            animefire_url: ANIMEFIRE_URL.to_string(),
            animesonline_url: ANIMESONLINE_URL.to_string(),
            season_length: DEFAULT_SEASON_LENGTH,
            season_lengths: HashMap::new(),
        }
    }
}

impl Config {
    // Carrega do caminho padrão, ou cria a configuração padrão se não existir
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Falha ao ler configuração em {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Falha ao interpretar configuração em {}", path.display()))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            referer: None,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(self.timeout_secs))
    }
}

// Obtém o caminho para o arquivo de configuração
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir()
        .context("Não foi possível determinar o diretório de configuração")?;

    path.push("anifetch");
    path.push("config.json");

    Ok(path)
}
