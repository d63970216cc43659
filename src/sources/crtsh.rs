// src/sources/crtsh.rs
use crate::session::Session;
use crate::sources::Source;
use crate::types::{QueryMode, SourceInfo, SourceKind};
use crate::utils;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: String,
}

/// crt.sh certificate transparency logs, JSON endpoint.
#[derive(Debug, Clone)]
pub struct CrtShSource {
    name: String,
}

impl CrtShSource {
    pub fn new() -> Self {
        Self {
            name: "crtsh".to_string(),
        }
    }
}

impl Default for CrtShSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for CrtShSource {
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
        let url = format!("https://crt.sh/?q=%25.{}&output=json", query);
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        let entries: Vec<CrtShEntry> = match serde_json::from_str(body) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut hosts = Vec::new();
        for entry in entries {
            // name_value packs multiple SAN names separated by newlines;
            // certificate subjects may also be mailbox addresses.
            for line in entry.name_value.lines() {
                let name = match line.rsplit_once('@') {
                    Some((_, mailbox_domain)) => mailbox_domain,
                    None => line,
                };
                if let Some(host) = utils::normalize_host(name) {
                    if host != domain && utils::in_scope(&host, domain) {
                        hosts.push(host);
                    }
                }
            }
        }

        hosts.sort();
        hosts.dedup();
        hosts
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
        let source = CrtShSource::new();
        let body = r#"[
            {"name_value": "a.example.com\n*.example.com"},
            {"name_value": "admin@mail.example.com"},
            {"name_value": "A.EXAMPLE.COM"},
            {"name_value": "spoof.example.com.evil.net"}
        ]"#;
        let hosts = source.extract_hostnames("example.com", body);
        assert_eq!(hosts, vec!["a.example.com", "mail.example.com"]);
    }

    #[test]
    fn test_extract_on_malformed_body_is_empty() {
        let source = CrtShSource::new();
        assert!(source
            .extract_hostnames("example.com", "<html>rate limited</html>")
            .is_empty());
    }
}
