//! Normalização de temporadas.
//!
//! Os sites não concordam se a numeração recomeça a cada temporada ou se é
//! absoluta. Dada uma lista corrida sem temporada, decide quais episódios
//! pertencem à temporada pedida. É heurística: o limite de episódios por
//! temporada é um palpite, por isso pode ser trocado por título.

use regex::Regex;
use tracing::debug;

use crate::models::Episode;

/// Episódios por temporada quando nada melhor é conhecido.
pub const DEFAULT_SEASON_LENGTH: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonNormalizer {
    threshold: usize,
}

impl Default for SeasonNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEASON_LENGTH)
    }
}

impl SeasonNormalizer {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    // Ordem das tentativas:
    // 1. temporada 1: os primeiros `threshold` episódios
    // 2. numeração absoluta: números acima do limite
    // 3. marcador de temporada no título
    // 4. posição: tudo depois do índice `threshold`
    pub fn normalize(&self, episodes: Vec<Episode>, target_season: u32) -> Vec<Episode> {
        let selected = if target_season <= 1 {
            let mut first = episodes;
            first.truncate(self.threshold);
            first
        } else {
            let absolute = self.by_absolute_number(&episodes);
            if !absolute.is_empty() {
                debug!(season = target_season, count = absolute.len(), "numeração absoluta");
                absolute
            } else {
                let labelled = by_season_label(&episodes, target_season);
                if !labelled.is_empty() {
                    debug!(season = target_season, count = labelled.len(), "marcador de temporada");
                    labelled
                } else {
                    let tail = self.by_position(&episodes);
                    debug!(season = target_season, count = tail.len(), "corte por posição");
                    tail
                }
            }
        };

        selected
            .into_iter()
            .map(|mut episode| {
                episode.season = Some(target_season.max(1));
                episode
            })
            .collect()
    }

    /// Episódios cujo número passa do limite, ou seja, da 2ª temporada em diante.
    pub fn by_absolute_number(&self, episodes: &[Episode]) -> Vec<Episode> {
        let limit = self.threshold as u32;
        episodes
            .iter()
            .filter(|e| e.number().is_some_and(|n| n > limit))
            .cloned()
            .collect()
    }

    /// Tudo depois do índice `threshold`, assumindo que o site reiniciou a
    /// numeração sem avisar. Vazio se a lista não passa do limite.
    pub fn by_position(&self, episodes: &[Episode]) -> Vec<Episode> {
        if episodes.len() > self.threshold {
            episodes[self.threshold..].to_vec()
        } else {
            Vec::new()
        }
    }
}

/// Episódios cujo título marca exatamente a temporada pedida
/// ("3rd Season", "3ª Temporada", "Temporada 3", "Temp 3", "Season 3", "S03").
pub fn by_season_label(episodes: &[Episode], season: u32) -> Vec<Episode> {
    let Some(re) = season_label(season) else {
        return Vec::new();
    };

    episodes
        .iter()
        .filter(|e| re.is_match(&e.title))
        .cloned()
        .collect()
}

fn season_label(season: u32) -> Option<Regex> {
    let pattern = format!(
        r"(?i)\b0*{n}\s*(?:st|nd|rd|th|ª|º|a|o)?\s*(?:season|temporada|temp)\b|\b(?:season|temporada|temp)\.?\s*0*{n}\b|\bs0*{n}(?:\b|e\d)",
        n = season
    );
    Regex::new(&pattern).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderId;

    fn flat(titles: impl IntoIterator<Item = String>) -> Vec<Episode> {
        titles
            .into_iter()
            .map(|title| Episode {
                link: format!("https://animefire.plus/animes/x/{}", title.len()),
                title,
                image_url: String::new(),
                provider: ProviderId::AnimeFire,
                season: None,
            })
            .collect()
    }

    fn numbered(range: std::ops::RangeInclusive<u32>) -> Vec<Episode> {
        flat(range.map(|n| format!("Episódio {}", n)))
    }

    fn numbers(episodes: &[Episode]) -> Vec<u32> {
        episodes.iter().filter_map(Episode::number).collect()
    }

    #[test]
    fn first_season_is_capped_at_threshold() {
        let result = SeasonNormalizer::default().normalize(numbered(1..=40), 1);
        assert_eq!(result.len(), 28);
        assert_eq!(numbers(&result), (1..=28).collect::<Vec<_>>());
        assert!(result.iter().all(|e| e.season == Some(1)));
    }

    #[test]
    fn short_first_season_is_kept_whole() {
        let result = SeasonNormalizer::default().normalize(numbered(1..=12), 1);
        assert_eq!(result.len(), 12);
    }

    #[test]
    fn second_season_uses_absolute_numbers() {
        let result = SeasonNormalizer::default().normalize(numbered(1..=40), 2);
        assert_eq!(numbers(&result), (29..=40).collect::<Vec<_>>());
        assert!(result.iter().all(|e| e.season == Some(2)));
    }

    #[test]
    fn second_season_falls_back_to_labels() {
        let mut episodes = numbered(1..=12);
        episodes.extend(flat((1..=5).map(|n| format!("2nd Season Episódio {}", n))));
        episodes.extend(flat((1..=3).map(|n| format!("Temporada 3 Episódio {}", n))));

        let result = SeasonNormalizer::default().normalize(episodes, 2);
        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|e| e.title.starts_with("2nd Season")));
    }

    #[test]
    fn second_season_falls_back_to_position() {
        // Numeração reiniciada sem marcador: 1..=20 duas vezes
        let mut episodes = numbered(1..=20);
        episodes.extend(numbered(1..=20));

        let result = SeasonNormalizer::default().normalize(episodes, 2);
        assert_eq!(result.len(), 12);
        assert_eq!(numbers(&result), (9..=20).collect::<Vec<_>>());
    }

    #[test]
    fn nothing_matches_gives_empty() {
        let result = SeasonNormalizer::default().normalize(numbered(1..=12), 2);
        assert!(result.is_empty());
    }

    #[test]
    fn third_season_of_fifty_takes_the_tail() {
        // Limitação conhecida: a numeração absoluta não separa 2ª de 3ª temporada
        let result = SeasonNormalizer::default().normalize(numbered(1..=50), 3);
        assert_eq!(numbers(&result), (29..=50).collect::<Vec<_>>());
    }

    #[test]
    fn threshold_is_injectable() {
        let normalizer = SeasonNormalizer::new(12);
        let result = normalizer.normalize(numbered(1..=24), 2);
        assert_eq!(numbers(&result), (13..=24).collect::<Vec<_>>());
    }

    #[test]
    fn label_regex_matches_only_the_exact_season() {
        let episodes = flat(
            [
                "Kimetsu 2ª Temporada Ep 1",
                "Kimetsu Temp 2 Ep 2",
                "Kimetsu S02E03",
                "Kimetsu Season 12 Ep 1",
                "Kimetsu 12th Season Ep 1",
            ]
            .map(String::from),
        );

        let titles: Vec<_> = by_season_label(&episodes, 2)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(
            titles,
            ["Kimetsu 2ª Temporada Ep 1", "Kimetsu Temp 2 Ep 2", "Kimetsu S02E03"]
        );
    }
}
