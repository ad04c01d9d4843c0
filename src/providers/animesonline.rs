use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::Provider;
use crate::error::{Result, ScrapeError};
use crate::extractor::{Attempt, first_attr, first_capture, run_chain};
use crate::fetcher::{FetchOptions, HtmlFetcher};
use crate::models::{Episode, ProviderId, SPECIALS_SEASON, SearchOutcome, SeasonGroup};
use crate::utils::{absolute_url, keyword_episode_number, season_marker};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("seletor válido")
}

// Página de busca
static RESULT_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector("div.result-item article div.title a"));

// Página do anime: temporadas aninhadas
static SEASON_BLOCKS: LazyLock<Selector> = LazyLock::new(|| selector("div#seasons div.se-c"));
static SEASON_NUMBER: LazyLock<Selector> = LazyLock::new(|| selector("span.se-t"));
static SEASON_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("span.title"));
static SEASON_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector("ul.episodios li"));
static LOOSE_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector("ul.episodios li, li.episode-item"));
static ITEM_NUMBER: LazyLock<Selector> = LazyLock::new(|| selector("div.numerando"));
static ITEM_LINK: LazyLock<Selector> = LazyLock::new(|| selector("div.episodiotitle a"));
static ITEM_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("div.imagen img"));

// Lançamentos
static RELEASES: LazyLock<Selector> = LazyLock::new(|| selector("article.item.se.episodes"));
static RELEASE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("div.data h3 a"));
static RELEASE_SERIE: LazyLock<Selector> = LazyLock::new(|| selector("div.data span.serie"));
static RELEASE_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("div.poster img"));

static SPECIALS_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:especia(?:l|is)|specials?|ovas?|oads?|filmes?|movies?)\b").expect("regex válida")
});

static EMBED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""embed_url"\s*:\s*"([^"]+)""#).expect("regex válida"));
static SOURCE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:file|source)\s*:\s*["']([^"']+)["']"#).expect("regex válida")
});

// Ordem das tentativas na página do episódio
const ATTEMPTS: [Attempt; 3] = [
    Attempt { name: "animesonline:iframe", run: player_frame },
    Attempt { name: "animesonline:player-option", run: player_option },
    Attempt { name: "animesonline:script", run: player_script },
];

/// AnimesOnline: busca própria, página do anime com temporadas separadas
/// e uma listagem de lançamentos.
pub struct AnimesOnline {
    fetcher: HtmlFetcher,
    base_url: String,
}

impl AnimesOnline {
    pub fn new(base_url: &str, options: FetchOptions) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let fetcher = HtmlFetcher::new(&options.with_referer(format!("{}/", base_url)))?;
        Ok(Self { fetcher, base_url })
    }

    pub fn search_url(&self, title: &str) -> String {
        format!("{}/?s={}", self.base_url, urlencoding::encode(title))
    }

    pub fn releases_url(&self) -> String {
        format!("{}/episodio/", self.base_url)
    }

    // Busca, depois o primeiro resultado cuja página abrir
    async fn try_search(&self, title: &str) -> Result<SearchOutcome> {
        let url = self.search_url(title);
        let page = self.fetcher.fetch(&url).await?;
        let links = parse_search_results(&page.html, &url);

        if links.is_empty() {
            return Err(ScrapeError::NotFound(title.to_string()));
        }

        for link in &links {
            match self.fetcher.fetch(link).await {
                Ok(detail) => {
                    let outcome = parse_detail(&detail.html, link);
                    if outcome.is_empty() {
                        return Err(ScrapeError::ParseMismatch(format!(
                            "nenhum episódio em {}",
                            link
                        )));
                    }
                    return Ok(outcome);
                }
                Err(e) => debug!(provider = %self.id(), "{}", e),
            }
        }

        Err(ScrapeError::FetchFailed {
            url: links.join(", "),
            reason: "nenhum resultado acessível".to_string(),
        })
    }

    async fn try_extract(&self, page_url: &str) -> Result<String> {
        let page = self.fetcher.fetch(page_url).await?;
        extract_from_page(&page.html, page_url)
            .ok_or_else(|| ScrapeError::NotFound(page_url.to_string()))
    }

    async fn try_latest(&self) -> Result<Vec<Episode>> {
        let url = self.releases_url();
        let page = self.fetcher.fetch(&url).await?;
        let episodes = parse_releases(&page.html, &url);

        if episodes.is_empty() {
            return Err(ScrapeError::ParseMismatch(format!("nenhum lançamento em {}", url)));
        }
        Ok(episodes)
    }
}

#[async_trait]
impl Provider for AnimesOnline {
    fn id(&self) -> ProviderId {
        ProviderId::AnimesOnline
    }

    async fn search(&self, title: &str) -> SearchOutcome {
        match self.try_search(title).await {
            Ok(outcome) => {
                info!(provider = %self.id(), count = outcome.len(), "episódios encontrados");
                outcome
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

    async fn latest(&self) -> Vec<Episode> {
        match self.try_latest().await {
            Ok(episodes) => episodes,
            Err(e) => {
                warn!(provider = %self.id(), "{}", e);
                Vec::new()
            }
        }
    }
}

// Links dos resultados, na ordem da página
pub fn parse_search_results(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut links: Vec<String> = Vec::new();
    for a in document.select(&RESULT_LINKS) {
        if let Some(link) = a.value().attr("href").and_then(|href| absolute_url(page_url, href)) {
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}

/// Lê a página do anime.
///
/// Com blocos de temporada, devolve `Seasons`. Sem nenhum bloco, tenta o
/// seletor solto de itens e trata tudo como uma temporada sem rótulo
/// (`Flat`). Se nem isso achar nada, devolve vazio.
pub fn parse_detail(html: &str, page_url: &str) -> SearchOutcome {
    let document = Html::parse_document(html);

    let groups = season_groups(&document, page_url);
    if !groups.is_empty() {
        return SearchOutcome::Seasons(groups);
    }

    debug!(%page_url, "sem blocos de temporada, usando seletor solto");
    let episodes: Vec<Episode> = document
        .select(&LOOSE_ITEMS)
        .filter_map(|li| parse_item(li, page_url))
        .collect();

    SearchOutcome::Flat(episodes)
}

fn season_groups(document: &Html, page_url: &str) -> Vec<SeasonGroup> {
    let mut groups: Vec<SeasonGroup> = Vec::new();

    for block in document.select(&SEASON_BLOCKS) {
        let episodes: Vec<Episode> = block
            .select(&SEASON_ITEMS)
            .filter_map(|li| parse_item(li, page_url))
            .collect();
        if episodes.is_empty() {
            continue;
        }

        let title = text_of(block, &SEASON_TITLE);
        // Sem número no bloco: especiais vão para a temporada 0, o resto
        // segue a última temporada numerada
        let season = text_of(block, &SEASON_NUMBER)
            .parse::<u32>()
            .ok()
            .or_else(|| season_marker(&title))
            .filter(|n| *n > 0)
            .unwrap_or_else(|| {
                if SPECIALS_TITLE.is_match(&title) {
                    SPECIALS_SEASON
                } else {
                    groups
                        .iter()
                        .rev()
                        .find(|g| g.season != SPECIALS_SEASON)
                        .map_or(1, |g| g.season + 1)
                }
            });

        let title = if title.is_empty() {
            format!("Temporada {}", season)
        } else {
            title
        };

        groups.push(SeasonGroup::new(season, title, episodes));
    }

    groups
}

// Um <li> de episódio; sem link, é descartado
fn parse_item(li: ElementRef, page_url: &str) -> Option<Episode> {
    let anchor = li.select(&ITEM_LINK).next()?;
    let link = absolute_url(page_url, anchor.value().attr("href")?)?;
    let name = anchor.text().collect::<String>().trim().to_string();

    // "2 - 5": temporada 2, episódio 5
    let numerando = text_of(li, &ITEM_NUMBER);
    let in_season = numerando
        .rsplit('-')
        .next()
        .and_then(|n| n.trim().parse::<u32>().ok());

    // O número do numerando vale mais que dígitos soltos no nome
    let title = match in_season {
        Some(n) if name.is_empty() => format!("Episódio {}", n),
        Some(n) if keyword_episode_number(&name) != Some(n) => format!("Episódio {} - {}", n, name),
        _ => name,
    };

    let image_url = li
        .select(&ITEM_IMAGE)
        .next()
        .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
        .and_then(|src| absolute_url(page_url, src))
        .unwrap_or_default();

    Some(Episode {
        title,
        link,
        image_url,
        provider: ProviderId::AnimesOnline,
        season: None,
    })
}

/// Lê a listagem de lançamentos, que não pertence a nenhum título.
pub fn parse_releases(html: &str, page_url: &str) -> Vec<Episode> {
    let document = Html::parse_document(html);

    document
        .select(&RELEASES)
        .filter_map(|article| {
            let anchor = article.select(&RELEASE_LINK).next()?;
            let link = absolute_url(page_url, anchor.value().attr("href")?)?;
            let episode = anchor.text().collect::<String>().trim().to_string();
            let serie = text_of(article, &RELEASE_SERIE);

            let title = if serie.is_empty() {
                episode
            } else {
                format!("{} - {}", serie, episode)
            };

            let image_url = article
                .select(&RELEASE_IMAGE)
                .next()
                .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
                .and_then(|src| absolute_url(page_url, src))
                .unwrap_or_default();

            Some(Episode {
                season: season_marker(&title),
                title,
                link,
                image_url,
                provider: ProviderId::AnimesOnline,
            })
        })
        .collect()
}

pub fn extract_from_page(html: &str, page_url: &str) -> Option<String> {
    run_chain(html, page_url, &ATTEMPTS)
}

// 1. iframe do player
pub fn player_frame(document: &Html, _: &str) -> Option<String> {
    first_attr(
        document,
        &["div#dooplay_player_content iframe", "div.pframe iframe", "iframe.metaframe"],
        &["src", "data-src"],
    )
}

// 2. opção de player com a URL no atributo
pub fn player_option(document: &Html, _: &str) -> Option<String> {
    first_attr(document, &["li.dooplay_player_option[data-url]"], &["data-url"])
}

// 3. configuração do player embutida no script
pub fn player_script(_: &Html, text: &str) -> Option<String> {
    first_capture(text, &[&*EMBED_URL, &*SOURCE_LITERAL])
}

fn text_of(element: ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
