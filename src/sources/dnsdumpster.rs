// src/sources/dnsdumpster.rs
use crate::session::Session;
use crate::sources::Source;
use crate::types::{QueryMode, SourceInfo, SourceKind};
use crate::utils;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

const BASE_URL: &str = "https://dnsdumpster.com/";

fn csrf_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<input type="hidden" name="csrfmiddlewaretoken" value="(.*?)">"#)
            .expect("valid regex")
    })
}

fn cell_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<td class="col-md-4">([^<]+?)</td>"#).expect("valid regex"))
}

/// DNSdumpster report scraper. The single cycle hides a two-step
/// exchange: pull the form for its CSRF token, then post the domain.
#[derive(Debug, Clone)]
pub struct DnsDumpsterSource {
    name: String,
}

impl DnsDumpsterSource {
    pub fn new() -> Self {
        Self {
            name: "dnsdumpster".to_string(),
        }
    }
}

impl Default for DnsDumpsterSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for DnsDumpsterSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            kind: SourceKind::Intelligence,
            mode: QueryMode::SingleShot,
        }
    }

    async fn fetch(&self, session: &Session, query: &str, _page: u32) -> Option<String> {
        let form_page = session.get_text(BASE_URL).await?;
        let token = csrf_regex()
            .captures(&form_page)
            .map(|cap| cap[1].to_string())?;

        session
            .post_form_text(
                BASE_URL,
                &[("csrfmiddlewaretoken", token.as_str()), ("targetip", query)],
            )
            .await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        cell_regex()
            .captures_iter(body)
            .filter_map(|cap| utils::normalize_host(&cap[1]))
            .filter(|host| host != domain && utils::in_scope(host, domain))
            .collect()
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
        let source = DnsDumpsterSource::new();
        let body = concat!(
            r#"<td class="col-md-4">vpn.example.com</td>"#,
            r#"<td class="col-md-4">198.51.100.7</td>"#,
            r#"<td class="col-md-4">ns1.hosting.net</td>"#,
        );
        let hosts = source.extract_hostnames("example.com", body);
        assert_eq!(hosts, vec!["vpn.example.com"]);
    }

    #[test]
    fn test_csrf_token_parse() {
        let page = r#"<form><input type="hidden" name="csrfmiddlewaretoken" value="tok123"></form>"#;
        let token = csrf_regex().captures(page).map(|cap| cap[1].to_string());
        assert_eq!(token.as_deref(), Some("tok123"));
    }
}
