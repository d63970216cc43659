// src/utils.rs
use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use url::Url;

/// Reads lines from a file into a vector of strings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader.lines().collect()
}

/// Check if a string is a valid domain
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}

/// Strip an http/https scheme and any path from a target string,
/// leaving only the host portion.
pub fn strip_scheme(target: &str) -> String {
    let target = target.trim();
    let host = target
        .strip_prefix("https://")
        .or_else(|| target.strip_prefix("http://"))
        .unwrap_or(target);
    host.split('/').next().unwrap_or("").to_string()
}

/// Normalize a raw hostname candidate: lowercase, trailing dots removed.
/// Returns `None` for empty strings and wildcard entries.
pub fn normalize_host(raw: &str) -> Option<String> {
    let mut host = raw.trim().to_lowercase();
    while host.ends_with('.') {
        host.pop();
    }
    if host.is_empty() || host.contains('*') {
        return None;
    }
    Some(host)
}

/// A host is in scope when it equals the target domain or is a proper
/// subdomain of it.
pub fn in_scope(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Extract the host portion from a search-result link, which may or may
/// not carry a scheme.
pub fn host_from_link(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let with_scheme = if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("http://{}", link)
    };
    let url = Url::parse(&with_scheme).ok()?;
    url.host_str().map(|h| h.to_string())
}

/// Sort key for discovered hosts: the label sequence reversed, so hosts
/// group by domain hierarchy from the root label down. A leading `www`
/// label is dropped from the key and ranked below any sibling at the
/// same depth, which places `www.<domain>` right after its bare
/// counterpart instead of interleaved alphabetically.
pub fn host_sort_key(host: &str) -> (Vec<String>, u8) {
    let mut parts: Vec<String> = host.split('.').rev().map(str::to_string).collect();
    if parts.last().map(String::as_str) == Some("www") {
        parts.pop();
        (parts, 1)
    } else {
        (parts, 0)
    }
}

pub fn compare_hosts(a: &str, b: &str) -> Ordering {
    host_sort_key(a).cmp(&host_sort_key(b))
}

/// Parse a comma-separated port list; entries that are not valid port
/// numbers are skipped.
pub fn parse_ports(spec: &str) -> Vec<u16> {
    spec.split(',')
        .filter_map(|p| p.trim().parse::<u16>().ok())
        .collect()
}
