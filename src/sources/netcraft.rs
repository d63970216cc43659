// src/sources/netcraft.rs
use crate::session::Session;
use crate::sources::Source;
use crate::types::{QueryMode, SourceInfo, SourceKind};
use crate::utils;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

fn toolbar_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<a href="http://toolbar\.netcraft\.com.*?host=(.*?)&.*?">"#)
            .expect("valid regex")
    })
}

/// Netcraft site search. One result page carries everything we can get
/// without a session cookie dance, so this source is single-shot.
#[derive(Debug, Clone)]
pub struct NetcraftSource {
    name: String,
}

impl NetcraftSource {
    pub fn new() -> Self {
        Self {
            name: "netcraft".to_string(),
        }
    }
}

impl Default for NetcraftSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for NetcraftSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            kind: SourceKind::SearchEngine,
            mode: QueryMode::SingleShot,
        }
    }

    async fn fetch(&self, session: &Session, query: &str, _page: u32) -> Option<String> {
        let url = format!(
            "https://searchdns.netcraft.com/?restriction=site+contains&host={}",
            urlencoding::encode(query)
        );
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        toolbar_regex()
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
        let source = NetcraftSource::new();
        let body = concat!(
            r#"<a href="http://toolbar.netcraft.com/site_report?url=x&host=ftp.example.com&y=1">"#,
            r#"<a href="http://toolbar.netcraft.com/site_report?url=x&host=other.net&y=1">"#,
        );
        let hosts = source.extract_hostnames("example.com", body);
        assert_eq!(hosts, vec!["ftp.example.com"]);
    }
}
