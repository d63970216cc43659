// src/bruteforce.rs
//! Wordlist brute-force stage. The orchestrator only depends on the
//! `BruteForcer` trait; the default implementation resolves candidate
//! names over DNS with a bounded number of in-flight lookups.

use crate::types::{BruteForceConfig, Config, SubScoutError};
use crate::utils;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use trust_dns_resolver::config::{
    NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
};
use trust_dns_resolver::TokioAsyncResolver;

#[async_trait]
pub trait BruteForcer: Send + Sync {
    /// Returns additional hostnames for the domain. Names already in
    /// `known` are not re-checked.
    async fn run(&self, domain: &str, known: &HashSet<String>) -> HashSet<String>;
}

pub fn default_bruteforcer(config: &Config) -> Result<Box<dyn BruteForcer>, SubScoutError> {
    Ok(Box::new(DnsBruteForcer::new(
        config.bruteforce.clone(),
        config.output.silent,
    )?))
}

/// Resolves `word.domain` candidates against a configured resolver set.
pub struct DnsBruteForcer {
    resolver: TokioAsyncResolver,
    config: BruteForceConfig,
    silent: bool,
}

impl DnsBruteForcer {
    pub fn new(config: BruteForceConfig, silent: bool) -> Result<Self, SubScoutError> {
        let nameservers = match &config.resolvers {
            Some(path) => utils::read_lines(path).map_err(|e| {
                SubScoutError::ConfigError(format!("Failed to read resolver list: {}", e))
            })?,
            None => Vec::new(),
        };

        let resolver = if nameservers.is_empty() {
            TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
                SubScoutError::ResolutionError(format!("Failed to create system resolver: {}", e))
            })?
        } else {
            let mut resolver_config = ResolverConfig::new();
            for ns in nameservers {
                let ns = ns.trim();
                if ns.is_empty() || ns.starts_with('#') {
                    continue;
                }
                let addr = if ns.contains(':') {
                    ns.to_string()
                } else {
                    format!("{}:53", ns)
                };
                let socket_addr = SocketAddr::from_str(&addr).map_err(|e| {
                    SubScoutError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e))
                })?;
                resolver_config.add_name_server(NameServerConfig {
                    socket_addr,
                    protocol: Protocol::Udp,
                    tls_dns_name: None,
                    trust_negative_responses: false,
                    bind_addr: None,
                });
            }

            let mut opts = ResolverOpts::default();
            opts.timeout = config.timeout;
            opts.attempts = 2;
            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        Ok(Self {
            resolver,
            config,
            silent,
        })
    }
}

/// Candidate hostnames for a wordlist, minus names already known.
fn candidates(domain: &str, words: &[String], known: &HashSet<String>) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for word in words {
        let word = word.trim().to_lowercase();
        if word.is_empty() || word.starts_with('#') {
            continue;
        }
        let host = format!("{}.{}", word, domain);
        if !known.contains(&host) && seen.insert(host.clone()) {
            out.push(host);
        }
    }
    out
}

#[async_trait]
impl BruteForcer for DnsBruteForcer {
    async fn run(&self, domain: &str, known: &HashSet<String>) -> HashSet<String> {
        let words = match &self.config.wordlist {
            Some(path) => match utils::read_lines(path) {
                Ok(words) => words,
                Err(e) => {
                    warn!("Failed to read wordlist: {}", e);
                    return HashSet::new();
                }
            },
            None => {
                warn!("Bruteforce enabled but no wordlist configured");
                return HashSet::new();
            }
        };

        let candidates = candidates(domain, &words, known);
        let progress = if self.silent {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(candidates.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message("bruteforce");
            bar
        };

        let semaphore = Arc::new(Semaphore::new(self.config.threads.max(1)));
        let mut futures = FuturesUnordered::new();
        for host in candidates {
            let resolver = self.resolver.clone();
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let _permit = semaphore.acquire().await.ok()?;
                resolver.lookup_ip(host.as_str()).await.ok()?;
                Some(host)
            });
        }

        let mut resolved = HashSet::new();
        while let Some(result) = futures.next().await {
            progress.inc(1);
            if let Some(host) = result {
                resolved.insert(host);
            }
        }
        progress.finish_and_clear();
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_skip_known_comments_and_duplicates() {
        let words = vec![
            "www".to_string(),
            "mail".to_string(),
            "mail".to_string(),
            "# comment".to_string(),
            "".to_string(),
            "DEV".to_string(),
        ];
        let known: HashSet<String> = ["mail.example.com".to_string()].into_iter().collect();

        let out = candidates("example.com", &words, &known);
        assert_eq!(out, vec!["www.example.com", "dev.example.com"]);
    }
}
