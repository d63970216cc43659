// src/sources/mod.rs
use crate::session::Session;
use crate::types::{Config, QueryMode, SourceInfo};
use crate::utils;
use async_trait::async_trait;
use std::time::Duration;

mod ask;
mod baidu;
mod bing;
mod crtsh;
mod dnsdumpster;
mod google;
mod hackertarget;
mod netcraft;
mod passivedns;
mod threatcrowd;
mod virustotal;
mod yahoo;

pub use ask::AskSource;
pub use baidu::BaiduSource;
pub use bing::BingSource;
pub use crtsh::CrtShSource;
pub use dnsdumpster::DnsDumpsterSource;
pub use google::GoogleSource;
pub use hackertarget::HackerTargetSource;
pub use netcraft::NetcraftSource;
pub use passivedns::PassiveDnsSource;
pub use threatcrowd::ThreatCrowdSource;
pub use virustotal::VirusTotalSource;
pub use yahoo::YahooSource;

/// One external data source. Paged sources are driven through the full
/// polling state machine; single-shot sources perform exactly one
/// query/extract cycle.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    fn info(&self) -> SourceInfo;

    fn mode(&self) -> QueryMode {
        self.info().mode
    }

    /// Construct the next query, folding already-discovered hosts in as
    /// negative filters where the source supports them. Implementations
    /// must not exceed `exclusion_cap` exclusions; excess known hosts
    /// are omitted, never an error.
    fn build_query(&self, domain: &str, _known: &[String]) -> String {
        domain.to_string()
    }

    /// Perform the network call for one cycle. Any transport failure
    /// yields `None`; the polling engine treats absence uniformly.
    async fn fetch(&self, session: &Session, query: &str, page: u32) -> Option<String>;

    /// Detect source-specific soft failures (rate-limiting, blocking)
    /// inside a well-formed response. `false` ends this source's run.
    fn is_response_usable(&self, _body: &str) -> bool {
        true
    }

    /// Parse hostnames out of a response body. Out-of-scope entries and
    /// wildcards are dropped here; a malformed body yields an empty
    /// vector, never an error.
    fn extract_hostnames(&self, domain: &str, body: &str) -> Vec<String>;

    fn next_page(&self, current: u32) -> u32 {
        current + 10
    }

    /// Upper bound on the page cursor; 0 means unlimited.
    fn page_limit(&self) -> u32 {
        0
    }

    /// Accumulator size past which the engine forces a page advance;
    /// 0 disables the check. Also caps `build_query` exclusions.
    fn exclusion_cap(&self) -> usize {
        0
    }

    /// Cooperative delay between paged cycles.
    fn pacing_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn clone_source(&self) -> Box<dyn Source>;
}

/// Shared by the search-engine sources: turn a raw result link into an
/// in-scope hostname. The bare target domain itself is not a finding.
pub(crate) fn link_to_host(link: &str, domain: &str) -> Option<String> {
    let host = utils::host_from_link(link)?;
    let host = utils::normalize_host(&host)?;
    if host != domain && utils::in_scope(&host, domain) {
        Some(host)
    } else {
        None
    }
}

pub fn create_source(name: &str, config: &Config) -> Option<Box<dyn Source>> {
    let api_keys = config.api_keys.get(name).cloned().unwrap_or_default();

    match name.to_lowercase().as_str() {
        "google" => Some(Box::new(GoogleSource::new())),
        "bing" => Some(Box::new(BingSource::new())),
        "yahoo" => Some(Box::new(YahooSource::new())),
        "baidu" => Some(Box::new(BaiduSource::new())),
        "ask" => Some(Box::new(AskSource::new())),
        "netcraft" => Some(Box::new(NetcraftSource::new())),
        "crtsh" | "crt" | "ssl" => Some(Box::new(CrtShSource::new())),
        "dnsdumpster" => Some(Box::new(DnsDumpsterSource::new())),
        "virustotal" => Some(Box::new(VirusTotalSource::new().with_api_keys(api_keys))),
        "threatcrowd" => Some(Box::new(ThreatCrowdSource::new())),
        "passivedns" => Some(Box::new(PassiveDnsSource::new())),
        "hackertarget" => Some(Box::new(HackerTargetSource::new())),
        _ => None,
    }
}

pub fn get_all_sources(config: &Config) -> Vec<Box<dyn Source>> {
    vec![
        "google",
        "bing",
        "yahoo",
        "baidu",
        "ask",
        "netcraft",
        "crtsh",
        "dnsdumpster",
        "virustotal",
        "threatcrowd",
        "passivedns",
        "hackertarget",
    ]
    .into_iter()
    .filter_map(|name| create_source(name, config))
    .collect()
}
