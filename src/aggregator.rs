//! Orquestrador da busca.
//!
//! Dispara a busca em todos os providers ao mesmo tempo, junta o que voltar,
//! aplica a normalização de temporadas e entrega a lista final já ordenada.
//! Provider que falha, demora demais ou entra em pânico contribui com nada;
//! os outros seguem normalmente.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::cache::MetadataCache;
use crate::config::Config;
use crate::error::Result;
use crate::extractor::resolve_video;
use crate::models::{Episode, ProviderId, SPECIALS_SEASON, SearchOutcome, SearchQuery};
use crate::providers::{Provider, ProviderRegistry};
use crate::season::SeasonNormalizer;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

pub struct Aggregator {
    registry: ProviderRegistry,
    cache: MetadataCache,
    provider_timeout: Duration,
}

impl Aggregator {
    pub fn new(registry: ProviderRegistry, cache: MetadataCache) -> Self {
        Self {
            registry,
            cache,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Providers padrão e cache de temporadas vindos da configuração.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = ProviderRegistry::with_defaults(config)?;
        let cache = MetadataCache::from_entries(
            config.season_length,
            config.season_lengths.iter().map(|(title, n)| (title.as_str(), *n)),
        );

        Ok(Self::new(registry, cache).with_provider_timeout(config.provider_timeout()))
    }

    pub fn with_provider_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn search(&self, raw_title: &str, target_season: u32) -> Vec<Episode> {
        self.resolve(&SearchQuery::new(raw_title, target_season)).await
    }

    /// Episódios da temporada pedida, de todos os providers.
    ///
    /// Nunca falha: lista vazia quer dizer "nada encontrado" ou "todos
    /// falharam", sem distinção.
    pub async fn resolve(&self, query: &SearchQuery) -> Vec<Episode> {
        let target = query.target_season.max(1);

        let searches = self.registry.iter().map(|provider| {
            let title = provider.prepare_query(&query.raw_title);
            guarded_search(Arc::clone(provider), title, self.provider_timeout)
        });

        // join_all devolve na ordem de entrada (a do registro), não na de chegada
        let outcomes: Vec<SearchOutcome> = join_all(searches).await;

        let normalizer = self.cache.normalizer_for(&query.raw_title);
        let episodes = merge(outcomes, target, &normalizer);

        info!(title = %query.raw_title, season = target, count = episodes.len(), "busca concluída");
        episodes
    }

    pub async fn extract_video(&self, page_url: &str, provider_id: &str) -> Option<String> {
        resolve_video(&self.registry, page_url, provider_id).await
    }

    pub async fn latest(&self, provider_id: ProviderId) -> Vec<Episode> {
        match self.registry.get(provider_id) {
            Some(provider) => provider.latest().await,
            None => {
                warn!(provider = %provider_id, "provider não registrado");
                Vec::new()
            }
        }
    }
}

// Busca de um provider com prazo e isolada de pânico
async fn guarded_search(provider: Arc<dyn Provider>, title: String, deadline: Duration) -> SearchOutcome {
    let id = provider.id();
    let search = AssertUnwindSafe(provider.search(&title)).catch_unwind();

    match timeout(deadline, search).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => {
            warn!(provider = %id, %title, "provider entrou em pânico durante a busca");
            SearchOutcome::empty()
        }
        Err(_) => {
            warn!(provider = %id, %title, "tempo esgotado na busca");
            SearchOutcome::empty()
        }
    }
}

/// Junta os resultados dos providers para a temporada pedida.
///
/// Temporada explícita que bate com o pedido entra direto; o resto vira
/// uma lista corrida que passa pelo normalizador. Cada provider é
/// normalizado sozinho, porque a numeração é de cada site. O resultado sai
/// ordenado por (temporada, número do episódio), estável entre providers,
/// e a primeira temporada nunca passa do limite do normalizador.
pub fn merge(outcomes: Vec<SearchOutcome>, target_season: u32, normalizer: &SeasonNormalizer) -> Vec<Episode> {
    let target = target_season.max(1);
    let mut episodes: Vec<Episode> = Vec::new();

    for outcome in outcomes {
        match outcome {
            SearchOutcome::Seasons(groups) => {
                let (matching, others): (Vec<_>, Vec<_>) = groups
                    .into_iter()
                    .partition(|g| g.season == target && !g.episodes.is_empty());

                if matching.is_empty() {
                    // Temporadas do site não batem com o pedido: vira lista corrida,
                    // sem os especiais
                    let flat: Vec<Episode> = others
                        .into_iter()
                        .filter(|g| g.season != SPECIALS_SEASON)
                        .flat_map(|g| g.episodes)
                        .collect();
                    episodes.extend(normalizer.normalize(flat, target));
                } else {
                    episodes.extend(matching.into_iter().flat_map(|g| g.episodes));
                }
            }
            SearchOutcome::Flat(flat) => episodes.extend(normalizer.normalize(flat, target)),
        }
    }

    for episode in &mut episodes {
        episode.season = Some(target);
    }
    episodes.sort_by_key(|e| (e.season, e.number().unwrap_or(u32::MAX)));

    if target == 1 {
        episodes.truncate(normalizer.threshold());
    }

    episodes
}
