// src/config.rs
use crate::types::{Config, SubScoutError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file, then apply environment
/// overrides. Missing files fall back to defaults so a bare install
/// works out of the box.
pub fn load_config(config_path: &str) -> Result<Config, SubScoutError> {
    let mut config = Config::default();

    if Path::new(config_path).exists() {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| SubScoutError::ConfigError(format!("Failed to read config file: {}", e)))?;
        let value: toml::Value = toml::from_str(&contents)
            .map_err(|e| SubScoutError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        apply_file_values(&mut config, &value);
    }

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn apply_file_values(config: &mut Config, value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    if let Some(api_keys) = table.get("api_keys").and_then(|v| v.as_table()) {
        for (source, keys) in api_keys {
            if let Some(keys) = keys.as_array() {
                let keys: Vec<String> = keys
                    .iter()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect();
                config.api_keys.insert(source.clone(), keys);
            }
        }
    }

    if let Some(sources) = table.get("sources").and_then(|v| v.as_array()) {
        config.sources = sources
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect();
    }

    if let Some(proxy) = table.get("proxy").and_then(|v| v.as_str()) {
        config.proxy = Some(proxy.to_string());
    }

    if let Some(user_agent) = table.get("user_agent").and_then(|v| v.as_str()) {
        config.user_agent = Some(user_agent.to_string());
    }

    if let Some(bruteforce) = table.get("bruteforce").and_then(|v| v.as_table()) {
        if let Some(wordlist) = bruteforce.get("wordlist").and_then(|v| v.as_str()) {
            config.bruteforce.wordlist = Some(PathBuf::from(wordlist));
        }
        if let Some(resolvers) = bruteforce.get("resolvers").and_then(|v| v.as_str()) {
            config.bruteforce.resolvers = Some(PathBuf::from(resolvers));
        }
        if let Some(threads) = bruteforce.get("threads").and_then(|v| v.as_integer()) {
            config.bruteforce.threads = threads.max(1) as usize;
        }
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(keys) = env::var("VIRUSTOTAL_API_KEYS") {
        config.api_keys.insert(
            "virustotal".to_string(),
            keys.split(',').map(|k| k.trim().to_string()).collect(),
        );
    }
    if let Ok(proxy) = env::var("SUBSCOUT_PROXY") {
        config.proxy = Some(proxy);
    }
}

fn validate_config(config: &Config) -> Result<(), SubScoutError> {
    if config.timeout.as_secs() == 0 {
        return Err(SubScoutError::ConfigError(
            "Request timeout must be greater than 0".to_string(),
        ));
    }
    if config.bruteforce.threads == 0 {
        return Err(SubScoutError::ConfigError(
            "Bruteforce threads must be greater than 0".to_string(),
        ));
    }
    if config.probe.concurrency == 0 {
        return Err(SubScoutError::ConfigError(
            "Probe concurrency must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config("/nonexistent/subscout.toml").expect("defaults");
        assert_eq!(config.timeout.as_secs(), 25);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_file_values_applied() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            r#"
sources = ["crtsh", "google"]
proxy = "socks5://127.0.0.1:9050"

[api_keys]
virustotal = ["key-one", "key-two"]

[bruteforce]
wordlist = "names.txt"
threads = 10
"#
        )
        .expect("write");

        let config = load_config(file.path().to_str().expect("path")).expect("load");
        assert_eq!(config.sources, vec!["crtsh", "google"]);
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:9050"));
        assert_eq!(config.api_keys["virustotal"].len(), 2);
        assert_eq!(config.bruteforce.threads, 10);
        assert_eq!(
            config.bruteforce.wordlist.as_deref(),
            Some(Path::new("names.txt"))
        );
    }
}
