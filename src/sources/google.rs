// src/sources/google.rs
use crate::session::Session;
use crate::sources::{link_to_host, Source};
use crate::types::{QueryMode, SourceInfo, SourceKind};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

fn cite_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<cite.*?>(.*?)</cite>").expect("valid regex"))
}

fn span_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<span.*?>").expect("valid regex"))
}

/// Google web search, scraped through result-page pagination.
#[derive(Debug, Clone)]
pub struct GoogleSource {
    name: String,
}

impl GoogleSource {
    pub fn new() -> Self {
        Self {
            name: "google".to_string(),
        }
    }
}

impl Default for GoogleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for GoogleSource {
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
            return format!("site:{domain} -www.{domain}");
        }
        // Two exclusion slots are already taken by the site/-www pair.
        let cap = self.exclusion_cap().saturating_sub(2);
        let found = known
            .iter()
            .take(cap)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" -");
        format!("site:{domain} -www.{domain} -{found}")
    }

    async fn fetch(&self, session: &Session, query: &str, page: u32) -> Option<String> {
        let url = format!(
            "https://google.com/search?q={}&btnG=Search&hl=en-US&biw=&bih=&gbv=1&start={}&filter=0",
            urlencoding::encode(query),
            page
        );
        session.get_text(&url).await
    }

    fn is_response_usable(&self, body: &str) -> bool {
        !body.contains("Our systems have detected unusual traffic")
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        cite_regex()
            .captures_iter(body)
            .filter_map(|cap| {
                let link = span_regex().replace_all(&cap[1], "");
                link_to_host(&link, domain)
            })
            .collect()
    }

    fn page_limit(&self) -> u32 {
        200
    }

    fn exclusion_cap(&self) -> usize {
        11
    }

    fn pacing_delay(&self) -> Duration {
        Duration::from_secs(5)
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
        let source = GoogleSource::new();
        let body = concat!(
            "<cite>mail.example.com</cite>",
            "<cite>https://dev.example.com/login</cite>",
            "<cite><span class=\"x\">docs.example.com</span> &rsaquo; intro</cite>",
            "<cite>unrelated.org</cite>",
        );
        let hosts = source.extract_hostnames("example.com", body);
        assert!(hosts.contains(&"mail.example.com".to_string()));
        assert!(hosts.contains(&"dev.example.com".to_string()));
        assert!(!hosts.iter().any(|h| h.contains("unrelated")));
    }

    #[test]
    fn test_extract_on_garbage_is_empty() {
        let source = GoogleSource::new();
        assert!(source.extract_hostnames("example.com", "{not html").is_empty());
    }

    #[test]
    fn test_blocked_response_is_unusable() {
        let source = GoogleSource::new();
        assert!(!source.is_response_usable(
            "<html>Our systems have detected unusual traffic from your network</html>"
        ));
        assert!(source.is_response_usable("<html>results</html>"));
    }

    #[test]
    fn test_query_excludes_known_hosts_up_to_cap() {
        let source = GoogleSource::new();
        let known: Vec<String> = (0..20).map(|i| format!("s{i}.example.com")).collect();
        let query = source.build_query("example.com", &known);
        assert!(query.starts_with("site:example.com -www.example.com"));
        assert!(query.contains("-s0.example.com"));
        assert!(query.contains("-s8.example.com"));
        assert!(!query.contains("-s9.example.com"));
    }
}
