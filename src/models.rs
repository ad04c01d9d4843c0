use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::episode_number;

// Identificador de cada provider registrado
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    AnimeFire,
    AnimesOnline,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::AnimeFire, ProviderId::AnimesOnline];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::AnimeFire => "animefire",
            ProviderId::AnimesOnline => "animesonline",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| format!("Provider desconhecido: {}", s))
    }
}

// Episódio como sai de um provider (e, depois, do agregador)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub link: String,      // Página do episódio no provider, nunca o vídeo
    pub image_url: String,
    pub provider: ProviderId,
    pub season: Option<u32>,
}

impl Episode {
    /// Número do episódio extraído do título, quando houver.
    pub fn number(&self) -> Option<u32> {
        episode_number(&self.title)
    }
}

/// Temporada reservada para especiais, OVAs e filmes listados à parte.
pub const SPECIALS_SEASON: u32 = 0;

// Temporada exposta explicitamente pelo site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonGroup {
    pub season: u32,
    pub title: String,
    pub episodes: Vec<Episode>,
}

impl SeasonGroup {
    /// Monta o grupo já ordenado pelo número do episódio na temporada.
    ///
    /// Empates (e títulos sem número) mantêm a ordem do DOM; títulos sem
    /// número ficam no fim.
    pub fn new(season: u32, title: impl Into<String>, mut episodes: Vec<Episode>) -> Self {
        for episode in &mut episodes {
            episode.season = Some(season);
        }
        episodes.sort_by_key(|e| e.number().unwrap_or(u32::MAX));

        Self {
            season,
            title: title.into(),
            episodes,
        }
    }
}

// Resultado bruto de um provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Lista corrida, sem noção de temporada
    Flat(Vec<Episode>),
    /// Temporadas separadas pelo próprio site
    Seasons(Vec<SeasonGroup>),
}

impl SearchOutcome {
    pub fn empty() -> Self {
        SearchOutcome::Flat(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Flat(episodes) => episodes.len(),
            SearchOutcome::Seasons(groups) => groups.iter().map(|g| g.episodes.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_episodes(self) -> Vec<Episode> {
        match self {
            SearchOutcome::Flat(episodes) => episodes,
            SearchOutcome::Seasons(groups) => {
                groups.into_iter().flat_map(|g| g.episodes).collect()
            }
        }
    }
}

// Consulta recebida do chamador; a temporada alvo já vem decidida
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub raw_title: String,
    pub target_season: u32,
}

impl SearchQuery {
    pub fn new(raw_title: impl Into<String>, target_season: u32) -> Self {
        Self {
            raw_title: raw_title.into(),
            target_season: target_season.max(1),
        }
    }
}
