//! anifetch: resolve um título de anime digitado pelo usuário em uma lista
//! de episódios da temporada pedida, consultando vários sites ao mesmo
//! tempo, e encontra a URL do vídeo de um episódio sob demanda.
//!
//! Contratos expostos:
//! - [`Aggregator::search`]: título + temporada → episódios (nunca falha)
//! - [`Aggregator::extract_video`]: página do episódio + provider → URL do vídeo

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod providers;
pub mod season;
pub mod utils;

pub use aggregator::Aggregator;
pub use cache::MetadataCache;
pub use config::Config;
pub use error::ScrapeError;
pub use models::{Episode, ProviderId, SearchOutcome, SearchQuery, SeasonGroup};
pub use providers::{Provider, ProviderRegistry};
pub use season::SeasonNormalizer;
