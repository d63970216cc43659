// src/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub rate_limits: HashMap<String, Option<u32>>,
    pub api_keys: HashMap<String, Vec<String>>,
    pub sources: Vec<String>,
    pub output: OutputConfig,
    pub bruteforce: BruteForceConfig,
    pub probe: ProbeConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut rate_limits = HashMap::new();
        rate_limits.insert("virustotal".to_string(), Some(4));
        rate_limits.insert("crtsh".to_string(), Some(1));
        rate_limits.insert("hackertarget".to_string(), Some(2));
        rate_limits.insert("threatcrowd".to_string(), Some(1));

        Self {
            // Per-request ceiling; individual fetches never outlive this.
            timeout: Duration::from_secs(25),
            user_agent: None,
            proxy: None,
            rate_limits,
            api_keys: HashMap::new(),
            sources: Vec::new(),
            output: OutputConfig::default(),
            bruteforce: BruteForceConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub file: Option<String>,
    pub silent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BruteForceConfig {
    pub enabled: bool,
    pub wordlist: Option<PathBuf>,
    pub resolvers: Option<PathBuf>,
    pub threads: usize,
    pub timeout: Duration,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            wordlist: None,
            resolvers: None,
            threads: 30,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            concurrency: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationStats {
    pub total_found: usize,
    pub unique_hosts: usize,
    pub sources_used: Vec<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub hosts: Vec<String>,
    pub stats: EnumerationStats,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryMode {
    Paged,
    SingleShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    SearchEngine,
    Intelligence,
}

pub struct SourceInfo {
    pub name: String,
    pub kind: SourceKind,
    pub mode: QueryMode,
}

#[derive(Debug, Error)]
pub enum SubScoutError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Source error in {source_name}: {message}")]
    SourceError {
        source_name: String,
        message: String,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}
