use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use tracing::debug;

use crate::error::{Result, ScrapeError};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const ACCEPT_LANG: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Cabeçalhos e timeout usados por um provider
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: Option<String>,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            accept_language: ACCEPT_LANG.to_string(),
            referer: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FetchOptions {
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

// Página baixada
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub status: u16,
}

/// Cliente HTTP que se passa por navegador.
///
/// Os sites recusam a assinatura padrão do reqwest, então todo provider
/// busca suas páginas por aqui.
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, header_value(&options.accept_language)?);
        if let Some(referer) = &options.referer {
            headers.insert(REFERER, header_value(referer)?);
        }

        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| ScrapeError::FetchFailed {
                url: String::new(),
                reason: format!("cliente HTTP inválido: {}", e),
            })?;

        Ok(Self { client })
    }

    // Rede, timeout e status fora de 2xx viram todos FetchFailed.
    // Soft-404 com status 200 passa; quem decide é o parser do provider.
    pub async fn fetch(&self, url: &str) -> Result<Page> {
        let failed = |reason: String| ScrapeError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = resp.status();
        debug!(%url, status = status.as_u16(), "página recebida");

        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status)));
        }

        let html = resp.text().await.map_err(|e| failed(e.to_string()))?;

        Ok(Page {
            html,
            status: status.as_u16(),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ScrapeError::ParseMismatch(format!("cabeçalho inválido {:?}: {}", value, e)))
}
