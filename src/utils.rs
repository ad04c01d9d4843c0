use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use url::Url;

// Marcadores de temporada/parte que aparecem nos títulos digitados
static SEASON_MARKERS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\b(?:season|temporada|temp|part|parte|cour)\.?\s*\d+\b").expect("regex válida"),
        Regex::new(r"(?i)\b\d+\s*(?:st|nd|rd|th|ª|º|a|o)?\s*(?:season|temporada|temp|part|parte|cour)\b")
            .expect("regex válida"),
        Regex::new(r"(?i)\bs\d{1,2}\b").expect("regex válida"),
    ]
});

static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[]([^\)\]]*)[\)\]]").expect("regex válida"));

static SEASON_NUMBER: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\b(?:season|temporada|temp)\.?\s*(\d+)\b").expect("regex válida"),
        Regex::new(r"(?i)\b(\d+)\s*(?:st|nd|rd|th|ª|º|a|o)?\s*(?:season|temporada|temp)\b")
            .expect("regex válida"),
        Regex::new(r"(?i)\bs(\d{1,2})\b").expect("regex válida"),
    ]
});

static EPISODE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:epis[oó]dio|episode|ep\.?)\s*(\d+)").expect("regex válida")
});

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("regex válida"));

// Monta o slug usado nas URLs do AnimeFire
//
// - Converte para minúsculas
// - Remove acentos (NFD + descarta marcas combinantes)
// - Remove tudo que não for letra, número, espaço ou hífen
// - Troca espaços por hífens, sem hífens repetidos nas pontas ou no meio
pub fn slugify(title: &str) -> String {
    let normalized: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    normalized
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Título alternativo entre parênteses/colchetes tem prioridade; se não
/// houver, o título sem os trechos entre colchetes.
pub fn prefer_bracketed(title: &str) -> String {
    let alternate = BRACKETS
        .captures_iter(title)
        .map(|cap| cap[1].trim().to_string())
        .find(|inner| inner.chars().filter(|c| c.is_alphabetic()).count() >= 3);

    match alternate {
        Some(inner) => inner,
        None => collapse_spaces(&BRACKETS.replace_all(title, " ")),
    }
}

// Remove "Season 2", "3rd Season", "2ª Temporada", "Part 2", "S2" etc.
pub fn strip_season_markers(title: &str) -> String {
    let mut cleaned = title.to_string();
    for re in SEASON_MARKERS.iter() {
        cleaned = re.replace_all(&cleaned, " ").to_string();
    }

    collapse_spaces(&cleaned)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ',' | '.'))
        .to_string()
}

/// Título pronto para a busca: alternativo entre parênteses e sem marcadores.
pub fn clean_title(raw: &str) -> String {
    let cleaned = strip_season_markers(&prefer_bracketed(raw));
    if cleaned.is_empty() {
        collapse_spaces(raw)
    } else {
        cleaned
    }
}

/// Temporada pedida no título livre ("3rd Season", "Temporada 2", "S2").
/// Sem marcador, é a primeira.
pub fn target_season(raw: &str) -> u32 {
    season_marker(raw).unwrap_or(1)
}

// Número de temporada escrito no texto, se houver marcador
pub fn season_marker(text: &str) -> Option<u32> {
    SEASON_NUMBER
        .iter()
        .find_map(|re| re.captures(text).and_then(|cap| cap[1].parse::<u32>().ok()))
        .filter(|n| *n > 0)
}

// Número do episódio a partir do título
//
// Primeiro procura "Episódio N"/"Episode N"/"Ep N"; senão, a primeira
// sequência de dígitos.
pub fn episode_number(title: &str) -> Option<u32> {
    keyword_episode_number(title).or_else(|| DIGITS.find(title).and_then(|m| m.as_str().parse().ok()))
}

/// Só o número que vem depois de "Episódio"/"Episode"/"Ep"; dígitos soltos
/// no nome ("Mob Psycho 100") não contam.
pub fn keyword_episode_number(title: &str) -> Option<u32> {
    EPISODE_KEYWORD
        .captures(title)
        .and_then(|cap| cap[1].parse().ok())
}

// Resolve href relativo contra a página de origem
pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .ok()
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
