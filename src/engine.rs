// src/engine.rs
use crate::bruteforce::BruteForcer;
use crate::cli::Args;
use crate::config;
use crate::output::OutputManager;
use crate::polling::PollingEngine;
use crate::session::Session;
use crate::sources::{create_source, get_all_sources, Source};
use crate::types::{Config, DomainReport, EnumerationStats, SubScoutError};
use crate::utils;
use dashmap::DashSet;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

pub struct SubScoutEngine {
    config: Config,
    session: Session,
    sources: Vec<Box<dyn Source>>,
    bruteforcer: Option<Box<dyn BruteForcer>>,
    output_manager: OutputManager,
}

impl SubScoutEngine {
    pub fn new(args: &Args) -> Result<Self, SubScoutError> {
        let mut config = if let Some(config_path) = args.config_path.as_deref() {
            config::load_config(config_path)?
        } else {
            Config::default()
        };

        // Command line overrides.
        if let Some(output_file) = args.output_file.clone() {
            config.output.file = Some(output_file);
        }
        if args.silent {
            config.output.silent = true;
        }
        if args.bruteforce {
            config.bruteforce.enabled = true;
        }
        if let Some(threads) = args.threads {
            config.bruteforce.threads = threads;
        }
        if let Some(source_names) = &args.sources {
            config.sources = source_names.clone();
        }

        let sources = if config.sources.is_empty() {
            get_all_sources(&config)
        } else {
            let mut sources: Vec<Box<dyn Source>> = Vec::new();
            for name in &config.sources {
                match create_source(name, &config) {
                    Some(source) => sources.push(source),
                    None => warn!("Unknown source: {}", name),
                }
            }
            sources
        };

        if sources.is_empty() {
            return Err(SubScoutError::ConfigError(
                "No valid sources configured".to_string(),
            ));
        }

        let bruteforcer = if config.bruteforce.enabled {
            Some(crate::bruteforce::default_bruteforcer(&config)?)
        } else {
            None
        };

        Self::with_sources(config, sources, bruteforcer)
    }

    /// Assemble an engine from an explicit source set. The CLI path
    /// goes through `new`; this seam also lets tests inject mocks.
    pub fn with_sources(
        config: Config,
        sources: Vec<Box<dyn Source>>,
        bruteforcer: Option<Box<dyn BruteForcer>>,
    ) -> Result<Self, SubScoutError> {
        let session = Session::new(&config)?;
        let output_manager = OutputManager::new(config.output.clone());

        Ok(Self {
            config,
            session,
            sources,
            bruteforcer,
            output_manager,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_manager(&self) -> &OutputManager {
        &self.output_manager
    }

    /// Enumerate every domain in turn; per-domain failures are logged
    /// and skipped so one bad input cannot sink the batch.
    pub async fn run(&self, domains: Vec<String>) -> Result<Vec<DomainReport>, SubScoutError> {
        if domains.is_empty() {
            return Err(SubScoutError::ConfigError(
                "No domains provided".to_string(),
            ));
        }

        let mut reports = Vec::new();
        for domain in domains {
            match self.enumerate_domain(&domain).await {
                Ok(report) => {
                    self.output_manager.write_report(&report)?;
                    reports.push(report);
                }
                Err(e) => error!("Failed to enumerate {}: {}", domain, e),
            }
        }
        Ok(reports)
    }

    pub async fn enumerate_domain(&self, domain: &str) -> Result<DomainReport, SubScoutError> {
        let domain = utils::strip_scheme(domain).to_lowercase();
        if !utils::is_valid_domain(&domain) {
            return Err(SubScoutError::InvalidDomain(domain));
        }

        info!("Enumerating hostnames for: {}", domain);
        let start_time = Instant::now();

        // The one shared mutable structure: concurrent workers touch it
        // only through insert-if-absent.
        let found: Arc<DashSet<String>> = Arc::new(DashSet::new());
        let mut total_found = 0;

        let mut futures = FuturesUnordered::new();
        for source in &self.sources {
            let source = source.clone_source();
            let source_name = source.name().to_string();
            let session = self.session.clone();
            let domain = domain.clone();
            let found = Arc::clone(&found);

            futures.push(async move {
                let start = Instant::now();
                let outcome = PollingEngine::new(source, session, &domain).run().await;
                let count = outcome.hosts.len();

                for host in outcome.hosts {
                    if let Some(host) = utils::normalize_host(&host) {
                        if utils::in_scope(&host, &domain) {
                            found.insert(host);
                        }
                    }
                }

                info!(
                    "{}: {} hosts in {:?} ({:?})",
                    source_name,
                    count,
                    start.elapsed(),
                    outcome.termination
                );
                count
            });
        }

        // Join all engines; no adapter's accumulation is dropped
        // because a sibling finished or died first.
        while let Some(count) = futures.next().await {
            total_found += count;
        }

        if let Some(bruteforcer) = &self.bruteforcer {
            let known: HashSet<String> = found.iter().map(|h| h.key().clone()).collect();
            let extra = bruteforcer.run(&domain, &known).await;
            info!("bruteforce: {} additional hosts", extra.len());
            total_found += extra.len();
            for host in extra {
                if let Some(host) = utils::normalize_host(&host) {
                    if utils::in_scope(&host, &domain) {
                        found.insert(host);
                    }
                }
            }
        }

        // Freeze: the set becomes an ordered, read-only sequence.
        let mut hosts: Vec<String> = found.iter().map(|h| h.key().clone()).collect();
        hosts.sort_by(|a, b| utils::compare_hosts(a, b));

        let stats = EnumerationStats {
            total_found,
            unique_hosts: hosts.len(),
            sources_used: self.sources.iter().map(|s| s.name().to_string()).collect(),
            duration: start_time.elapsed(),
        };

        Ok(DomainReport {
            domain,
            hosts,
            stats,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}
