//! Citation export for canonical articles.

use serde::{Deserialize, Serialize};

use crate::article::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationFormat {
    Apa,
    Abnt,
    Bibtex,
}

impl std::str::FromStr for CitationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apa" => Ok(CitationFormat::Apa),
            "abnt" => Ok(CitationFormat::Abnt),
            "bibtex" | "bib" => Ok(CitationFormat::Bibtex),
            other => Err(format!("unknown citation format: {}", other)),
        }
    }
}

/// Compact card citation: first author (+ "et al."), year, title, journal, link.
pub fn apa_short(article: &Article) -> String {
    let first = article.authors.first().map(String::as_str).unwrap_or("Autor");
    let rest = if article.authors.len() > 1 { " et al." } else { "" };
    format!(
        "{}{} ({}). {}. {}. {}",
        first,
        rest,
        article.year,
        article.title,
        article.journal,
        doi_or_url(article)
    )
}

/// Render a reference list in the requested format.
pub fn export(articles: &[&Article], format: CitationFormat) -> String {
    match format {
        CitationFormat::Apa => articles.iter().map(|a| apa(a)).collect::<Vec<_>>().join("\n\n"),
        CitationFormat::Abnt => articles.iter().map(|a| abnt(a)).collect::<Vec<_>>().join("\n\n"),
        CitationFormat::Bibtex => articles.iter().map(|a| bibtex(a)).collect::<Vec<_>>().join("\n"),
    }
}

fn doi_or_url(article: &Article) -> String {
    if article.doi.is_empty() {
        article.url.clone()
    } else {
        format!("https://doi.org/{}", article.doi)
    }
}

fn apa(article: &Article) -> String {
    let mut parts = Vec::new();
    if !article.authors.is_empty() {
        parts.push(article.authors.join(", "));
    }
    parts.push(format!("({})", article.year));
    parts.push(article.title.clone());
    parts.push(format!("*{}*", article.journal));
    if !article.doi.is_empty() {
        parts.push(format!("https://doi.org/{}", article.doi));
    }
    format!("{}.", parts.join(". "))
}

fn abnt(article: &Article) -> String {
    let mut parts = Vec::new();
    if !article.authors.is_empty() {
        let mut names: Vec<String> = article
            .authors
            .iter()
            .take(3)
            .map(|name| name.to_uppercase())
            .collect();
        if article.authors.len() > 3 {
            names.push("et al.".to_string());
        }
        parts.push(names.join("; "));
    }
    parts.push(article.title.clone());
    parts.push(format!("*{}*", article.journal));
    parts.push(article.year.to_string());
    if !article.doi.is_empty() {
        parts.push(format!("DOI: {}", article.doi));
    }
    format!("{}.", parts.join(". "))
}

fn bibtex(article: &Article) -> String {
    let surname = article
        .authors
        .first()
        .and_then(|name| name.split_whitespace().last())
        .unwrap_or("unknown")
        .to_lowercase();
    let mut entry = format!(
        "@article{{{}{},\n  title = {{{}}},\n",
        surname, article.year, article.title
    );
    if !article.authors.is_empty() {
        entry.push_str(&format!("  author = {{{}}},\n", article.authors.join(" and ")));
    }
    entry.push_str(&format!("  year = {{{}}},\n", article.year));
    entry.push_str(&format!("  journal = {{{}}},\n", article.journal));
    if !article.doi.is_empty() {
        entry.push_str(&format!("  doi = {{{}}},\n", article.doi));
    }
    entry.push_str("}\n");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::fixtures::article;
    use crate::article::Badge;

    #[test]
    fn test_apa_short_with_doi() {
        let mut a = article(1, 2021, vec![Badge::Article]);
        a.doi = "10.1/x".to_string();
        assert_eq!(
            apa_short(&a),
            "Ana Souza et al. (2021). Artigo 1. Revista Brasileira de Pesquisa. https://doi.org/10.1/x"
        );
    }

    #[test]
    fn test_apa_short_without_authors_uses_url() {
        let mut a = article(1, 2021, vec![Badge::Article]);
        a.authors.clear();
        a.url = "https://example.org".to_string();
        assert!(apa_short(&a).starts_with("Autor (2021)."));
        assert!(apa_short(&a).ends_with("https://example.org"));
    }

    #[test]
    fn test_abnt_caps_authors() {
        let mut a = article(1, 2020, vec![Badge::Article]);
        a.authors = vec!["a b".into(), "c d".into(), "e f".into(), "g h".into()];
        let text = export(&[&a], CitationFormat::Abnt);
        assert!(text.starts_with("A B; C D; E F; et al.. Artigo 1."));
        assert!(text.contains("2020"));
    }

    #[test]
    fn test_bibtex_key_and_fields() {
        let mut a = article(1, 2019, vec![Badge::Article]);
        a.doi = "10.2/y".to_string();
        let text = export(&[&a], CitationFormat::Bibtex);
        assert!(text.starts_with("@article{souza2019,"));
        assert!(text.contains("author = {Ana Souza and Bruno Lima}"));
        assert!(text.contains("doi = {10.2/y}"));
    }

    #[test]
    fn test_apa_list_joined_by_blank_line() {
        let a = article(1, 2019, vec![Badge::Article]);
        let b = article(2, 2020, vec![Badge::Article]);
        let text = export(&[&a, &b], CitationFormat::Apa);
        assert_eq!(text.split("\n\n").count(), 2);
        assert!(text.starts_with("Ana Souza, Bruno Lima. (2019). Artigo 1."));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("BibTeX".parse::<CitationFormat>(), Ok(CitationFormat::Bibtex));
        assert!("mla".parse::<CitationFormat>().is_err());
    }
}
