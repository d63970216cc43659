// src/sources/bing.rs
use crate::session::Session;
use crate::sources::{link_to_host, Source};
use crate::types::{QueryMode, SourceInfo, SourceKind};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

fn result_regexes() -> &'static [Regex; 2] {
    static RES: OnceLock<[Regex; 2]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r#"<li class="b_algo"><h2><a href="(.*?)""#).expect("valid regex"),
            Regex::new(r#"<div class="b_title"><h2><a href="(.*?)""#).expect("valid regex"),
        ]
    })
}

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?strong>|<span.*?>|</span>").expect("valid regex"))
}

/// Bing web search, scraped through result-page pagination.
#[derive(Debug, Clone)]
pub struct BingSource {
    name: String,
}

impl BingSource {
    pub fn new() -> Self {
        Self {
            name: "bing".to_string(),
        }
    }
}

impl Default for BingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for BingSource {
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
            return format!("domain:{domain} -www.{domain}");
        }
        let found = known
            .iter()
            .take(self.exclusion_cap())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" -");
        format!("domain:{domain} -www.{domain} -{found}")
    }

    async fn fetch(&self, session: &Session, query: &str, page: u32) -> Option<String> {
        let url = format!(
            "https://www.bing.com/search?q={}&go=Submit&first={}",
            urlencoding::encode(query),
            page
        );
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        result_regexes()
            .iter()
            .flat_map(|re| re.captures_iter(body))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hostnames() {
        let source = BingSource::new();
        let body = concat!(
            r#"<li class="b_algo"><h2><a href="https://api.example.com/v1">api</a></h2></li>"#,
            r#"<div class="b_title"><h2><a href="http://cdn.example.com">cdn</a></h2></div>"#,
            r#"<li class="b_algo"><h2><a href="https://elsewhere.net/">x</a></h2></li>"#,
        );
        let hosts = source.extract_hostnames("example.com", body);
        assert_eq!(hosts, vec!["api.example.com", "cdn.example.com"]);
    }

    #[test]
    fn test_query_shape() {
        let source = BingSource::new();
        assert_eq!(
            source.build_query("example.com", &[]),
            "domain:example.com -www.example.com"
        );
        let known = vec!["a.example.com".to_string()];
        assert_eq!(
            source.build_query("example.com", &known),
            "domain:example.com -www.example.com -a.example.com"
        );
    }
}
