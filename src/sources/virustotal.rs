// src/sources/virustotal.rs
use crate::session::Session;
use crate::sources::Source;
use crate::types::{QueryMode, SourceInfo, SourceKind};
use crate::utils;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct VirusTotalReport {
    #[serde(default)]
    subdomains: Vec<String>,
}

/// VirusTotal domain report. Works unauthenticated at a reduced quota;
/// configured API keys are rotated per request.
#[derive(Debug, Clone)]
pub struct VirusTotalSource {
    name: String,
    api_keys: Vec<String>,
}

impl VirusTotalSource {
    pub fn new() -> Self {
        Self {
            name: "virustotal".to_string(),
            api_keys: Vec::new(),
        }
    }

    pub fn with_api_keys(mut self, keys: Vec<String>) -> Self {
        self.api_keys = keys;
        self
    }

    fn pick_api_key(&self) -> &str {
        use rand::seq::SliceRandom;
        self.api_keys
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Default for VirusTotalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for VirusTotalSource {
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
            "https://www.virustotal.com/vtapi/v1/domain/report?apikey={}&domain={}",
            urlencoding::encode(self.pick_api_key()),
            urlencoding::encode(query)
        );
        session.get_text(&url).await
    }

    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String> {
        let report: VirusTotalReport = match serde_json::from_str(body) {
            Ok(report) => report,
            Err(_) => return Vec::new(),
        };

        report
            .subdomains
            .iter()
            .filter_map(|name| utils::normalize_host(name))
            .filter(|host| host != domain && utils::in_scope(host, domain))
            .collect()
    }

    fn clone_source(&self) -> Box<dyn Source> {
        Box::new(self.clone())
    }
}
