use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::Provider;
use crate::error::{Result, ScrapeError};
use crate::extractor::{Attempt, first_attr, first_capture, run_chain};
use crate::fetcher::{FetchOptions, HtmlFetcher};
use crate::models::{Episode, ProviderId, SearchOutcome};
use crate::utils::{absolute_url, slugify};

static EPISODE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.div_video_list a.lEp").expect("seletor válido"));
static COVER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.sub_animepage_img img").expect("seletor válido"));

static FILE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""file"\s*:\s*"([^"]+)""#).expect("regex válida"));
static MEDIA_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']((?:https?:)?(?:\\?/){2}[^"'\s]+?\.(?:mp4|m3u8)[^"'\s]*)["']"#).expect("regex válida")
});

// Ordem das tentativas na página do episódio
const ATTEMPTS: [Attempt; 3] = [
    Attempt { name: "animefire:iframe", run: player_frame },
    Attempt { name: "animefire:data-video-src", run: player_attribute },
    Attempt { name: "animefire:script", run: player_script },
];

/// AnimeFire: uma página com todos os episódios por título, sem temporadas.
pub struct AnimeFire {
    fetcher: HtmlFetcher,
    base_url: String,
}

impl AnimeFire {
    pub fn new(base_url: &str, options: FetchOptions) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let fetcher = HtmlFetcher::new(&options.with_referer(format!("{}/", base_url)))?;
        Ok(Self { fetcher, base_url })
    }

    // Página "todos os episódios" do título
    pub fn listing_url(&self, title: &str) -> String {
        format!("{}/animes/{}-todos-os-episodios", self.base_url, slugify(title))
    }

    async fn try_search(&self, title: &str) -> Result<Vec<Episode>> {
        let url = self.listing_url(title);
        let page = self.fetcher.fetch(&url).await?;
        parse_listing(&page.html, &url)
    }

    async fn try_extract(&self, page_url: &str) -> Result<String> {
        let page = self.fetcher.fetch(page_url).await?;
        extract_from_page(&page.html, page_url)
            .ok_or_else(|| ScrapeError::NotFound(page_url.to_string()))
    }
}

#[async_trait]
impl Provider for AnimeFire {
    fn id(&self) -> ProviderId {
        ProviderId::AnimeFire
    }

    async fn search(&self, title: &str) -> SearchOutcome {
        match self.try_search(title).await {
            Ok(episodes) => {
                info!(provider = %self.id(), count = episodes.len(), "episódios encontrados");
                SearchOutcome::Flat(episodes)
            }
            Err(e) => {
                warn!(provider = %self.id(), %title, "{}", e);
                SearchOutcome::empty()
            }
        }
    }

    async fn extract_video(&self, page_url: &str) -> Option<String> {
        match self.try_extract(page_url).await {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(provider = %self.id(), "{}", e);
                None
            }
        }
    }
}

/// Lê a lista de episódios na ordem do DOM.
///
/// Página sem lista (soft-404 com status 200) é `ParseMismatch`.
pub fn parse_listing(html: &str, page_url: &str) -> Result<Vec<Episode>> {
    let document = Html::parse_document(html);

    let image_url = document
        .select(&COVER)
        .next()
        .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
        .and_then(|src| absolute_url(page_url, src))
        .unwrap_or_default();

    let episodes: Vec<Episode> = document
        .select(&EPISODE_LINKS)
        .filter_map(|a| {
            let link = absolute_url(page_url, a.value().attr("href")?)?;
            let title = a.text().collect::<String>().trim().to_string();
            Some(Episode {
                title,
                link,
                image_url: image_url.clone(),
                provider: ProviderId::AnimeFire,
                season: None,
            })
        })
        .collect();

    if episodes.is_empty() {
        return Err(ScrapeError::ParseMismatch(format!(
            "nenhum episódio em {}",
            page_url
        )));
    }

    Ok(episodes)
}

pub fn extract_from_page(html: &str, page_url: &str) -> Option<String> {
    run_chain(html, page_url, &ATTEMPTS)
}

// 1. iframe dentro do player conhecido
pub fn player_frame(document: &Html, _: &str) -> Option<String> {
    first_attr(
        document,
        &["div#div_video iframe", "iframe#iframe-player", "div.video-player iframe"],
        &["src", "data-src"],
    )
}

// 2. atributo do controle do player
pub fn player_attribute(document: &Html, _: &str) -> Option<String> {
    first_attr(document, &["[data-video-src]"], &["data-video-src"])
}

// 3. literal de URL no script embutido
pub fn player_script(_: &Html, text: &str) -> Option<String> {
    first_capture(text, &[&*FILE_LITERAL, &*MEDIA_LITERAL])
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="sub_animepage_img"><img data-src="/img/animes/frieren-large.webp" src="/img/lazy.gif"></div>
          <div class="div_video_list">
            <a class="lEp epT divNumEp" href="https://animefire.plus/animes/frieren/1">Episódio 1</a>
            <a class="lEp epT divNumEp" href="/animes/frieren/2">Episódio 2</a>
            <a class="lEp epT divNumEp" href="/animes/frieren/3"> Episódio 3 </a>
          </div>
        </body></html>"#;

    const SOFT_404: &str = r#"<html><body><h1>Página não encontrada</h1></body></html>"#;

    #[test]
    fn listing_keeps_dom_order_and_absolute_links() {
        let episodes =
            parse_listing(LISTING, "https://animefire.plus/animes/frieren-todos-os-episodios").unwrap();

        let titles: Vec<_> = episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Episódio 1", "Episódio 2", "Episódio 3"]);
        assert_eq!(episodes[1].link, "https://animefire.plus/animes/frieren/2");
        assert_eq!(episodes[0].image_url, "https://animefire.plus/img/animes/frieren-large.webp");
        assert!(episodes.iter().all(|e| e.provider == ProviderId::AnimeFire && e.season.is_none()));
    }

    #[test]
    fn soft_404_is_parse_mismatch() {
        let err = parse_listing(SOFT_404, "https://animefire.plus/animes/x-todos-os-episodios").unwrap_err();
        assert!(matches!(err, ScrapeError::ParseMismatch(_)));
    }

    #[test]
    fn frame_wins_over_script_literal() {
        let html = r#"
            <div id="div_video"><iframe src="//www.blogger.com/video.g?token=abc"></iframe></div>
            <script>var player = {"file":"https:\/\/cdn.animefire.plus\/v\/1.mp4"};</script>"#;

        assert_eq!(
            extract_from_page(html, "https://animefire.plus/animes/frieren/1").as_deref(),
            Some("https://www.blogger.com/video.g?token=abc")
        );
    }

    #[test]
    fn data_attribute_before_script() {
        let html = r#"
            <video id="my-video" data-video-src="https://animefire.plus/video/frieren/1"></video>
            <script>var player = {"file":"https:\/\/cdn.animefire.plus\/v\/1.mp4"};</script>"#;

        assert_eq!(
            player_attribute(&Html::parse_document(html), html).as_deref(),
            Some("https://animefire.plus/video/frieren/1")
        );
        assert_eq!(
            extract_from_page(html, "https://animefire.plus/animes/frieren/1").as_deref(),
            Some("https://animefire.plus/video/frieren/1")
        );
    }

    #[test]
    fn script_patterns_in_order() {
        let with_file = r#"<script>jwplayer().setup({"file":"\/\/cdn.example\/a.m3u8"});</script>"#;
        assert_eq!(
            extract_from_page(with_file, "https://animefire.plus/animes/x/1").as_deref(),
            Some("https://cdn.example/a.m3u8")
        );

        let bare = r#"<script>var src = 'https://cdn.example/b/720p.mp4?t=1';</script>"#;
        assert_eq!(
            player_script(&Html::parse_document(bare), bare).as_deref(),
            Some("https://cdn.example/b/720p.mp4?t=1")
        );
    }

    #[test]
    fn page_without_player_is_none() {
        assert_eq!(extract_from_page(SOFT_404, "https://animefire.plus/animes/x/1"), None);
    }

    #[tokio::test]
    async fn search_fetches_slugged_listing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/animes/sousou-no-frieren-todos-os-episodios");
                then.status(200).body(LISTING);
            })
            .await;

        let provider = AnimeFire::new(&server.base_url(), FetchOptions::default()).unwrap();
        let outcome = provider.search("Sousou no Frieren").await;

        mock.assert_async().await;
        assert!(matches!(&outcome, SearchOutcome::Flat(eps) if eps.len() == 3));
    }

    #[tokio::test]
    async fn search_failure_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503);
            })
            .await;

        let provider = AnimeFire::new(&server.base_url(), FetchOptions::default()).unwrap();
        assert!(provider.search("Frieren").await.is_empty());
    }

    #[tokio::test]
    async fn extract_video_fetches_episode_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/animes/frieren/1");
                then.status(200)
                    .body(r#"<div id="div_video"><iframe src="/embed/frieren/1"></iframe></div>"#);
            })
            .await;

        let provider = AnimeFire::new(&server.base_url(), FetchOptions::default()).unwrap();
        let url = provider.extract_video(&server.url("/animes/frieren/1")).await;

        assert_eq!(url, Some(server.url("/embed/frieren/1")));
    }
}
