// src/probe.rs
//! TCP connect sweep over the finalized host list. A terminal stage:
//! nothing here flows back into enumeration.

use crate::types::ProbeConfig;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub host: String,
    pub open_ports: Vec<u16>,
}

pub struct PortProbe {
    ports: Vec<u16>,
    config: ProbeConfig,
}

impl PortProbe {
    pub fn new(ports: Vec<u16>, config: ProbeConfig) -> Self {
        Self { ports, config }
    }

    /// Probe every host concurrently under the global cap. Connect
    /// failures of any kind count as closed; only hosts with at least
    /// one open port produce a report.
    pub async fn scan(&self, hosts: &[String]) -> Vec<ProbeReport> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut futures = FuturesUnordered::new();

        for host in hosts {
            let host = host.clone();
            let ports = self.ports.clone();
            let connect_timeout = self.config.timeout;
            let semaphore = Arc::clone(&semaphore);

            futures.push(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return None;
                };
                let mut open_ports = Vec::new();
                for port in ports {
                    let attempt = timeout(
                        connect_timeout,
                        TcpStream::connect((host.as_str(), port)),
                    )
                    .await;
                    if matches!(attempt, Ok(Ok(_))) {
                        open_ports.push(port);
                    }
                }
                if open_ports.is_empty() {
                    None
                } else {
                    Some(ProbeReport { host, open_ports })
                }
            });
        }

        let mut reports = Vec::new();
        while let Some(report) = futures.next().await {
            if let Some(report) = report {
                reports.push(report);
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    fn reserve_closed_port() -> u16 {
        // Bind and immediately drop; connecting afterwards is refused.
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    }

    #[tokio::test]
    async fn test_open_port_reported_closed_port_silent() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let open_port = listener.local_addr().expect("addr").port();
        let closed_port = reserve_closed_port();

        let probe = PortProbe::new(
            vec![open_port, closed_port],
            ProbeConfig {
                timeout: Duration::from_secs(2),
                concurrency: 20,
            },
        );
        let reports = probe.scan(&["127.0.0.1".to_string()]).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].host, "127.0.0.1");
        assert_eq!(reports[0].open_ports, vec![open_port]);
    }

    #[tokio::test]
    async fn test_host_with_no_open_ports_produces_no_report() {
        let closed_port = reserve_closed_port();

        let probe = PortProbe::new(vec![closed_port], ProbeConfig::default());
        let reports = probe.scan(&["127.0.0.1".to_string()]).await;

        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_host_counts_as_closed() {
        let probe = PortProbe::new(vec![80], ProbeConfig::default());
        let reports = probe
            .scan(&["nonexistent.invalid".to_string()])
            .await;
        assert!(reports.is_empty());
    }
}
