// src/sources/yahoo.rs
use crate::session::Session;
use crate::sources::{link_to_host, Source};
use crate::types::{QueryMode, SourceInfo, SourceKind};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

fn result_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<span class=" fz-ms fw-m fc-12th wr-bw lh-17">(.*?)</span>"#)
            .expect("valid regex")
    })
}

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?b>|<span.*?>|</span>").expect("valid regex"))
}

/// Yahoo web search, scraped through result-page pagination.
#[derive(Debug, Clone)]
pub struct YahooSource {
    name: String,
}

impl YahooSource {
    pub fn new() -> Self {
        Self {
            name: "yahoo".to_string(),
        }
    }
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for YahooSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            kind: SourceKind::SearchEngine,
            mode: QueryMode::Paged,
        }
    }

    fn build_query(&self, domain: &str, known: &[String]) -> String {
        if known.is_empty() {
            return format!("site:{domain} -subdomain:www.{domain}");
        }
        let found = known
            .iter()
            .take(self.exclusion_cap())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" -");
        format!("site:{domain} -www.{domain} -{found}")
    }

    async fn fetch(&self, session: &Session, query: &str, page: u32) -> Option<String> {
        let url = format!(
            "https://search.yahoo.com/search?p={}&b={}",
            urlencoding::encode(query),
            page
        );
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        result_regex()
            .captures_iter(body)
            .filter_map(|cap| {
                let link = markup_regex().replace_all(&cap[1], "");
                link_to_host(&link, domain)
            })
            .collect()
    }

    fn exclusion_cap(&self) -> usize {
        30
    }

    fn clone_source(&self) -> Box<dyn Source> {
        Box::new(self.clone())
    }
}
