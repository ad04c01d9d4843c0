//! Cache de metadados por título.
//!
//! Guarda quantos episódios cada temporada de um título tem, para o
//! normalizador não depender só do limite padrão. É montado uma vez na
//! inicialização e passado ao agregador; durante as buscas é só leitura.

use std::collections::HashMap;

use crate::season::{DEFAULT_SEASON_LENGTH, SeasonNormalizer};
use crate::utils::{clean_title, slugify};

#[derive(Debug, Clone)]
pub struct MetadataCache {
    default_length: usize,
    season_lengths: HashMap<String, usize>,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(DEFAULT_SEASON_LENGTH)
    }
}

impl MetadataCache {
    pub fn new(default_length: usize) -> Self {
        Self {
            default_length: default_length.max(1),
            season_lengths: HashMap::new(),
        }
    }

    pub fn from_entries<I, S>(default_length: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        let mut cache = Self::new(default_length);
        for (title, length) in entries {
            cache.insert(title.as_ref(), length);
        }
        cache
    }

    /// Registra a duração de temporada de um título. Zero é ignorado.
    pub fn insert(&mut self, title: &str, season_length: usize) {
        if season_length > 0 {
            self.season_lengths.insert(key(title), season_length);
        }
    }

    pub fn season_length(&self, title: &str) -> usize {
        self.season_lengths
            .get(&key(title))
            .copied()
            .unwrap_or(self.default_length)
    }

    pub fn normalizer_for(&self, title: &str) -> SeasonNormalizer {
        SeasonNormalizer::new(self.season_length(title))
    }
}

// "One Piece (2nd Season)" e "one-piece" caem na mesma chave
fn key(title: &str) -> String {
    slugify(&clean_title(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_title_uses_default() {
        let cache = MetadataCache::default();
        assert_eq!(cache.season_length("Naruto"), DEFAULT_SEASON_LENGTH);
    }

    #[test]
    fn lookup_ignores_case_accents_and_season_markers() {
        let cache = MetadataCache::from_entries(28, [("Shingeki no Kyojin", 25)]);

        assert_eq!(cache.season_length("shingeki no kyojin"), 25);
        assert_eq!(cache.season_length("Shingeki no Kyojin Season 2"), 25);
        assert_eq!(cache.season_length("Shingékì no Kyojin"), 25);
        assert_eq!(cache.normalizer_for("Shingeki no Kyojin").threshold(), 25);
    }

    #[test]
    fn zero_length_is_ignored() {
        let mut cache = MetadataCache::new(28);
        cache.insert("Frieren", 0);
        assert_eq!(cache.season_length("Frieren"), 28);
    }
}
