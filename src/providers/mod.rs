//! Providers: cada site de onde tiramos episódios e vídeos.
//!
//! Um provider sabe montar a busca, ler o HTML do seu site e achar o
//! player na página do episódio. Nenhum erro escapa daqui: falhas viram
//! lista vazia ou `None`, com o motivo no log.

mod animefire;
mod animesonline;

pub use animefire::AnimeFire;
pub use animesonline::AnimesOnline;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::models::{Episode, ProviderId, SearchOutcome};
use crate::utils::clean_title;

#[async_trait]
pub trait Provider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Título que este site entende, a partir do que o usuário digitou.
    fn prepare_query(&self, raw_title: &str) -> String {
        clean_title(raw_title)
    }

    /// Busca os episódios do título. Nunca falha: sem resultado é vazio.
    async fn search(&self, title: &str) -> SearchOutcome;

    /// URL reproduzível a partir da página do episódio, se alguma tentativa achar.
    async fn extract_video(&self, page_url: &str) -> Option<String>;

    /// Lançamentos recentes do site (só alguns providers têm).
    async fn latest(&self) -> Vec<Episode> {
        Vec::new()
    }
}

// Providers registrados, indexados pelo id
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra AnimeFire e AnimesOnline com as opções da configuração.
    pub fn with_defaults(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(AnimeFire::new(&config.animefire_url, config.fetch_options())?);
        registry.register(AnimesOnline::new(&config.animesonline_url, config.fetch_options())?);
        Ok(registry)
    }

    // Substitui o provider que já tiver o mesmo id
    pub fn register<P: Provider + 'static>(&mut self, provider: P) -> &mut Self {
        self.providers.insert(provider.id(), Arc::new(provider));
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn Provider>> {
        self.providers.get(&id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.values()
    }

    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
