use thiserror::Error;

/// Erros internos dos providers.
///
/// Nenhum deles atravessa a fronteira do provider: `search` devolve lista
/// vazia e `extract_video` devolve `None`. Servem para log e para os testes.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Falha de rede, timeout ou status fora de 2xx
    #[error("Falha ao buscar {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// A página veio, mas sem a estrutura esperada
    #[error("Estrutura HTML inesperada: {0}")]
    ParseMismatch(String),

    /// Busca ou extração sem resultado depois de todos os fallbacks
    #[error("Nada encontrado para: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
