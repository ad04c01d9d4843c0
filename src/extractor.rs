// src/extractor.rs

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::models::ProviderId;
use crate::providers::ProviderRegistry;
use crate::utils::absolute_url;

/// Uma tentativa de achar o vídeo na página já baixada.
///
/// `run` recebe o documento e o texto bruto da página (para os padrões
/// de script).
#[derive(Clone, Copy)]
pub struct Attempt {
    pub name: &'static str,
    pub run: fn(&Html, &str) -> Option<String>,
}

/// Roda as tentativas na ordem do slice; a primeira que der certo vence.
pub fn run_chain(html: &str, page_url: &str, attempts: &[Attempt]) -> Option<String> {
    let document = Html::parse_document(html);

    for attempt in attempts {
        if let Some(raw) = (attempt.run)(&document, html) {
            if let Some(url) = normalize_video_url(&raw, page_url) {
                debug!(attempt = attempt.name, %url, "vídeo encontrado");
                return Some(url);
            }
        }
    }

    debug!(%page_url, "nenhuma tentativa encontrou vídeo");
    None
}

// Primeiro atributo não vazio, percorrendo seletores e atributos em ordem
pub fn first_attr(document: &Html, selectors: &[&str], attrs: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| {
            document.select(&selector).find_map(|el| {
                attrs
                    .iter()
                    .filter_map(|attr| el.value().attr(attr))
                    .map(str::trim)
                    .find(|value| !value.is_empty() && *value != "about:blank")
                    .map(str::to_string)
            })
        })
}

// Primeiro grupo capturado, percorrendo os padrões em ordem
pub fn first_capture(text: &str, patterns: &[&Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Deixa a URL do vídeo absoluta.
///
/// `\/` de literais JSON volta a ser `/`; `//host/path` vira
/// `https://host/path`; caminhos relativos são resolvidos contra a página.
pub fn normalize_video_url(raw: &str, page_url: &str) -> Option<String> {
    let unescaped = raw.trim().replace("\\/", "/").replace("&amp;", "&");

    if unescaped.starts_with("http://") || unescaped.starts_with("https://") {
        return Some(unescaped);
    }

    absolute_url(page_url, &unescaped)
}

/// Manda a página do episódio para o provider dono dela.
///
/// Provider desconhecido ou cadeia esgotada resultam em `None`, que o
/// chamador deve tratar como "não encontrado".
pub async fn resolve_video(
    registry: &ProviderRegistry,
    page_url: &str,
    provider_id: &str,
) -> Option<String> {
    let id = match provider_id.parse::<ProviderId>() {
        Ok(id) => id,
        Err(e) => {
            warn!("{}", e);
            return None;
        }
    };

    let Some(provider) = registry.get(id) else {
        warn!(provider = %id, "provider não registrado");
        return None;
    };

    provider.extract_video(page_url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static FILE_PATTERN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#""file"\s*:\s*"([^"]+)""#).unwrap());

    fn frame(document: &Html, _: &str) -> Option<String> {
        first_attr(document, &["div.player iframe", "iframe"], &["src", "data-src"])
    }

    fn script(_: &Html, text: &str) -> Option<String> {
        first_capture(text, &[&*FILE_PATTERN])
    }

    const CHAIN: [Attempt; 2] = [
        Attempt { name: "frame", run: frame },
        Attempt { name: "script", run: script },
    ];

    #[test]
    fn chain_stops_at_first_success() {
        let html = r#"<div class="player"><iframe src="//embed.example/v/1"></iframe></div>
            <script>var cfg = {"file":"https:\/\/cdn.example\/1.mp4"};</script>"#;

        assert_eq!(
            run_chain(html, "https://site.example/ep/1", &CHAIN).as_deref(),
            Some("https://embed.example/v/1")
        );
    }

    #[test]
    fn chain_falls_through_to_script_pattern() {
        let html = r#"<script>var cfg = {"file":"https:\/\/cdn.example\/1.mp4"};</script>"#;

        assert_eq!(
            run_chain(html, "https://site.example/ep/1", &CHAIN).as_deref(),
            Some("https://cdn.example/1.mp4")
        );
    }

    #[test]
    fn exhausted_chain_is_none() {
        assert_eq!(run_chain("<p>nada</p>", "https://site.example/ep/1", &CHAIN), None);
    }

    #[test]
    fn first_attr_skips_blank_frames() {
        let document = Html::parse_document(
            r#"<iframe src="about:blank" data-src="/player/2"></iframe><iframe src="/player/3"></iframe>"#,
        );
        assert_eq!(
            first_attr(&document, &["iframe"], &["src", "data-src"]).as_deref(),
            Some("/player/2")
        );
    }

    #[test]
    fn protocol_relative_becomes_https() {
        assert_eq!(
            normalize_video_url("//cdn.example/v.m3u8", "http://site.example/ep").as_deref(),
            Some("https://cdn.example/v.m3u8")
        );
        assert_eq!(
            normalize_video_url("/embed/9", "https://site.example/ep/1").as_deref(),
            Some("https://site.example/embed/9")
        );
    }

    #[tokio::test]
    async fn unknown_provider_resolves_to_none() {
        let registry = ProviderRegistry::new();
        assert_eq!(resolve_video(&registry, "https://site.example/ep/1", "gogo").await, None);
        assert_eq!(resolve_video(&registry, "https://site.example/ep/1", "animefire").await, None);
    }
}
