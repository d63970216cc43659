// src/output.rs
use crate::probe::ProbeReport;
use crate::types::{DomainReport, OutputConfig, SubScoutError};
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn write_report(&self, report: &DomainReport) -> Result<(), SubScoutError> {
        if let Some(file_path) = &self.config.file {
            self.write_to_file(file_path, report)?;
        }
        if !self.config.silent {
            self.print_summary(report);
        }
        Ok(())
    }

    fn write_to_file(&self, file_path: &str, report: &DomainReport) -> Result<(), SubScoutError> {
        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SubScoutError::OutputError(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let mut file = File::create(file_path)
            .map_err(|e| SubScoutError::OutputError(format!("Failed to create file: {}", e)))?;
        self.write_hosts(&mut file, report)
            .map_err(|e| SubScoutError::OutputError(e.to_string()))?;

        if !self.config.silent {
            println!(
                "[+] Saved {} hosts to: {}",
                report.hosts.len(),
                file_path
            );
        }
        Ok(())
    }

    fn write_hosts<W: Write>(&self, writer: &mut W, report: &DomainReport) -> std::io::Result<()> {
        write!(writer, "# subscout results for {}{}", report.domain, LINE_ENDING)?;
        write!(
            writer,
            "# Generated: {}{}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            LINE_ENDING
        )?;
        write!(writer, "# Total: {}{}{}", report.hosts.len(), LINE_ENDING, LINE_ENDING)?;
        for host in &report.hosts {
            write!(writer, "{}{}", host, LINE_ENDING)?;
        }
        Ok(())
    }

    fn print_summary(&self, report: &DomainReport) {
        if report.hosts.is_empty() {
            println!("[-] No hostnames found for {}", report.domain);
            return;
        }

        println!(
            "\n[+] Found {} hostnames for {} in {:.2}s",
            report.stats.unique_hosts,
            report.domain,
            report.stats.duration.as_secs_f64()
        );
        for (i, host) in report.hosts.iter().enumerate() {
            println!("  {}. {}", i + 1, host);
        }
    }

    pub fn print_probe_reports(&self, reports: &[ProbeReport]) {
        for report in reports {
            let ports = report
                .open_ports
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("[+] {} -> {}", report.host, ports);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumerationStats, OutputConfig};
    use std::time::Duration;

    fn sample_report() -> DomainReport {
        DomainReport {
            domain: "example.com".to_string(),
            hosts: vec![
                "www.example.com".to_string(),
                "a.example.com".to_string(),
            ],
            stats: EnumerationStats {
                total_found: 3,
                unique_hosts: 2,
                sources_used: vec!["crtsh".to_string()],
                duration: Duration::from_secs(1),
            },
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hosts.txt");
        let config = OutputConfig {
            file: Some(path.to_string_lossy().into_owned()),
            silent: true,
            ..OutputConfig::default()
        };

        OutputManager::new(config)
            .write_report(&sample_report())
            .expect("write");

        let contents = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].starts_with("# subscout results for example.com"));
        assert!(lines[1].starts_with("# Generated: "));
        assert_eq!(lines[2], "# Total: 2");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "www.example.com");
        assert_eq!(lines[5], "a.example.com");
    }
}
