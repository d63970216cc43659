// src/sources/hackertarget.rs
use crate::session::Session;
use crate::sources::Source;
use crate::types::{QueryMode, SourceInfo, SourceKind};
use crate::utils;
use async_trait::async_trait;

/// HackerTarget hostsearch API: `host,ip` CSV lines.
#[derive(Debug, Clone)]
pub struct HackerTargetSource {
    name: String,
}

impl HackerTargetSource {
    pub fn new() -> Self {
        Self {
            name: "hackertarget".to_string(),
        }
    }
}

impl Default for HackerTargetSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for HackerTargetSource {
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
            "https://api.hackertarget.com/hostsearch/?q={}",
            urlencoding::encode(query)
        );
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        body.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("error"))
            .filter_map(|line| line.split(',').next())
            .filter_map(utils::normalize_host)
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
        let source = HackerTargetSource::new();
        let body = "a.example.com,192.0.2.1\nb.example.com,192.0.2.2\nerror check your search parameters\n";
        let hosts = source.extract_hostnames("example.com", body);
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }
}
