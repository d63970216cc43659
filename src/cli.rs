// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "subscout",
    about = "Fast passive hostname enumeration tool",
    long_about = "SubScout discovers hostnames belonging to a target domain by querying\nsearch engines and certificate/DNS intelligence services concurrently,\nwith optional DNS bruteforce and TCP port probing of the results."
)]
pub struct Args {
    /// Target domain(s) to enumerate
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Vec<String>,

    /// File containing list of domains
    #[arg(short = 'l', long = "list", value_name = "FILE")]
    pub domains_file: Option<PathBuf>,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Specific sources to use (comma-separated; unknown names are ignored)
    #[arg(short = 's', long = "sources", value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Enable DNS bruteforce of additional names
    #[arg(short = 'b', long = "bruteforce")]
    pub bruteforce: bool,

    /// Bruteforce thread count
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Probe these ports on discovered hosts (comma-separated)
    #[arg(short = 'p', long = "ports", value_name = "PORTS")]
    pub ports: Option<String>,

    /// Silent mode (only output hostnames)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// List all available sources
    #[arg(long = "list-sources")]
    pub list_sources: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

impl Args {
    /// True when no domain input was given and stdin is a pipe.
    pub fn use_stdin(&self) -> bool {
        self.domain.is_empty() && self.domains_file.is_none() && !atty::is(atty::Stream::Stdin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_list_is_comma_delimited() {
        let args = Args::parse_from(["subscout", "-d", "example.com", "-s", "crtsh,google"]);
        assert_eq!(
            args.sources,
            Some(vec!["crtsh".to_string(), "google".to_string()])
        );
    }

    #[test]
    fn test_ports_passthrough() {
        let args = Args::parse_from(["subscout", "-d", "example.com", "-p", "80,443"]);
        assert_eq!(args.ports.as_deref(), Some("80,443"));
    }
}
