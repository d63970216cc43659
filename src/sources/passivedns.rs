// src/sources/passivedns.rs
use crate::session::Session;
use crate::sources::Source;
use crate::types::{QueryMode, SourceInfo, SourceKind};
use crate::utils;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PassiveDnsReport {
    #[serde(default)]
    subdomains: Vec<String>,
}

/// PassiveTotal enrichment API. Returns bare label prefixes which are
/// re-anchored onto the target domain.
#[derive(Debug, Clone)]
pub struct PassiveDnsSource {
    name: String,
}

impl PassiveDnsSource {
    pub fn new() -> Self {
        Self {
            name: "passivedns".to_string(),
        }
    }
}

impl Default for PassiveDnsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for PassiveDnsSource {
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
        let url = format!(
            "https://api.passivetotal.org/v1/enrichment/subdomains?query={}",
            urlencoding::encode(query)
        );
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        let report: PassiveDnsReport = match serde_json::from_str(body) {
            Ok(report) => report,
            Err(_) => return Vec::new(),
        };

        report
            .subdomains
            .iter()
            .filter_map(|prefix| utils::normalize_host(&format!("{}.{}", prefix, domain)))
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
        let source = PassiveDnsSource::new();
        let body = r#"{"subdomains": ["db", "internal", "*"]}"#;
        let hosts = source.extract_hostnames("example.com", body);
        assert_eq!(hosts, vec!["db.example.com", "internal.example.com"]);
    }
}
