// src/polling.rs
//! Drives one source through its query/extract/paginate cycles until a
//! termination condition is met. Every path yields whatever the source
//! accumulated so far; a source run never fails outright.

use crate::session::Session;
use crate::sources::Source;
use crate::types::QueryMode;
use log::debug;
use std::collections::HashSet;

/// Consecutive identical raw extractions tolerated before a paged
/// source is declared exhausted.
const STALL_LIMIT: u32 = 3;

/// Why a source's run ended. Diagnostic only; all variants carry the
/// same partial-results semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Single-shot source completed its one cycle.
    Completed,
    /// Raw extraction repeated `STALL_LIMIT` times in a row.
    Stalled,
    /// The page cursor reached the source's limit.
    PageLimit,
    /// The source signalled a soft block inside a well-formed response.
    Blocked,
    /// The transport layer produced no response.
    TransportFailure,
}

#[derive(Debug)]
pub struct PollOutcome {
    pub hosts: Vec<String>,
    pub termination: Termination,
}

pub struct PollingEngine {
    source: Box<dyn Source>,
    session: Session,
    domain: String,
}

impl PollingEngine {
    pub fn new(source: Box<dyn Source>, session: Session, domain: &str) -> Self {
        Self {
            source,
            session,
            domain: domain.to_string(),
        }
    }

    pub async fn run(self) -> PollOutcome {
        match self.source.mode() {
            QueryMode::SingleShot => self.run_single_shot().await,
            QueryMode::Paged => self.run_paged().await,
        }
    }

    /// One query/extract cycle, unconditionally terminal.
    async fn run_single_shot(self) -> PollOutcome {
        let name = self.source.name();
        let query = self.source.build_query(&self.domain, &[]);

        self.session.wait_for_rate_limit(name).await;
        let body = match self.source.fetch(&self.session, &query, 0).await {
            Some(body) => body,
            None => {
                debug!("{}: no response", name);
                return PollOutcome {
                    hosts: Vec::new(),
                    termination: Termination::TransportFailure,
                };
            }
        };

        if !self.source.is_response_usable(&body) {
            debug!("{}: response unusable, stopping", name);
            return PollOutcome {
                hosts: Vec::new(),
                termination: Termination::Blocked,
            };
        }

        let mut hosts = self.source.extract_hostnames(&self.domain, &body);
        let mut seen = HashSet::new();
        hosts.retain(|host| seen.insert(host.clone()));

        PollOutcome {
            hosts,
            termination: Termination::Completed,
        }
    }

    async fn run_paged(self) -> PollOutcome {
        let name = self.source.name();
        let mut accumulated: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut prev_batch: Vec<String> = Vec::new();
        let mut page: u32 = 0;
        let mut stalls: u32 = 0;

        let finish = |hosts: Vec<String>, termination: Termination| PollOutcome {
            hosts,
            termination,
        };

        loop {
            let query = self.source.build_query(&self.domain, &accumulated);

            // Once the exclusion list saturates, the query stops
            // shrinking the result set and only the cursor can move.
            let cap = self.source.exclusion_cap();
            if cap > 0 && accumulated.len() >= cap {
                page = self.source.next_page(page);
            }

            let limit = self.source.page_limit();
            if limit > 0 && page >= limit {
                debug!("{}: page limit {} reached", name, limit);
                return finish(accumulated, Termination::PageLimit);
            }

            self.session.wait_for_rate_limit(name).await;
            let body = match self.source.fetch(&self.session, &query, page).await {
                Some(body) => body,
                None => {
                    debug!("{}: no response, keeping {} hosts", name, accumulated.len());
                    return finish(accumulated, Termination::TransportFailure);
                }
            };

            if !self.source.is_response_usable(&body) {
                debug!("{}: response unusable, stopping", name);
                return finish(accumulated, Termination::Blocked);
            }

            let batch = self.source.extract_hostnames(&self.domain, &body);
            for host in &batch {
                if seen.insert(host.clone()) {
                    accumulated.push(host.clone());
                }
            }

            // Stall detection compares raw batches, not novelty against
            // the accumulator: an unchanged page is a repeat even when
            // all of its hosts were already known.
            if batch == prev_batch {
                stalls += 1;
                page = self.source.next_page(page);
                if stalls >= STALL_LIMIT {
                    debug!("{}: stalled after {} identical batches", name, stalls);
                    return finish(accumulated, Termination::Stalled);
                }
            } else {
                stalls = 0;
            }
            prev_batch = batch;

            let delay = self.source.pacing_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::Source;
    use crate::types::{Config, QueryMode, SourceInfo, SourceKind};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Scripted source: each fetch pops the next canned body; `None`
    /// entries simulate transport failures. Bodies are comma-separated
    /// host lists, `BLOCKED` marks a soft block.
    #[derive(Clone)]
    struct ScriptedSource {
        name: String,
        mode: QueryMode,
        script: Arc<Vec<Option<String>>>,
        fetches: Arc<AtomicUsize>,
        page_limit: u32,
        exclusion_cap: usize,
    }

    impl ScriptedSource {
        fn paged(bodies: Vec<Option<&str>>) -> Self {
            Self {
                name: "scripted".to_string(),
                mode: QueryMode::Paged,
                script: Arc::new(bodies.into_iter().map(|b| b.map(str::to_string)).collect()),
                fetches: Arc::new(AtomicUsize::new(0)),
                page_limit: 0,
                exclusion_cap: 0,
            }
        }

        fn single_shot(bodies: Vec<Option<&str>>) -> Self {
            Self {
                mode: QueryMode::SingleShot,
                ..Self::paged(bodies)
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Source for ScriptedSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn info(&self) -> SourceInfo {
            SourceInfo {
                name: self.name.clone(),
                kind: SourceKind::Intelligence,
                mode: self.mode,
            }
        }

        async fn fetch(&self, _session: &Session, _query: &str, _page: u32) -> Option<String> {
            let idx = self.fetches.fetch_add(1, Ordering::SeqCst);
            self.script.get(idx).cloned().flatten()
        }

        fn is_response_usable(&self, body: &str) -> bool {
            body != "BLOCKED"
        }

        fn extract_hostnames(&self, _domain: &str, body: &str) -> Vec<String> {
            body.split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect()
        }

        fn page_limit(&self) -> u32 {
            self.page_limit
        }

        fn exclusion_cap(&self) -> usize {
            self.exclusion_cap
        }

        fn pacing_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn clone_source(&self) -> Box<dyn Source> {
            Box::new(self.clone())
        }
    }

    fn session() -> Session {
        Session::new(&Config::default()).expect("session")
    }

    #[tokio::test]
    async fn test_stall_terminates_after_third_repetition() {
        let body = "a.example.com,www.example.com";
        let source = ScriptedSource::paged(vec![Some(body); 10]);
        let probe = source.clone();

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::Stalled);
        assert_eq!(outcome.hosts, vec!["a.example.com", "www.example.com"]);
        // First cycle seeds prev_batch; three repetitions follow.
        assert_eq!(probe.fetch_count(), 4);
    }

    #[tokio::test]
    async fn test_changing_batches_reset_the_stall_counter() {
        let source = ScriptedSource::paged(vec![
            Some("a.example.com"),
            Some("a.example.com"),
            Some("b.example.com"),
            Some("b.example.com"),
            Some("b.example.com"),
            Some("b.example.com"),
        ]);
        let probe = source.clone();

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::Stalled);
        assert_eq!(outcome.hosts, vec!["a.example.com", "b.example.com"]);
        assert_eq!(probe.fetch_count(), 6);
    }

    #[tokio::test]
    async fn test_soft_block_short_circuits_after_one_cycle() {
        let source = ScriptedSource::paged(vec![Some("BLOCKED"), Some("a.example.com")]);
        let probe = source.clone();

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::Blocked);
        assert!(outcome.hosts.is_empty());
        assert_eq!(probe.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_partial_accumulation() {
        let source = ScriptedSource::paged(vec![Some("a.example.com"), None]);

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::TransportFailure);
        assert_eq!(outcome.hosts, vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn test_page_limit_exhaustion() {
        // Distinct batches keep the stall counter at zero; the default
        // +10 cursor advance comes only from the saturated exclusion
        // cap, so the limit of 30 is hit on the fourth cycle.
        let mut source = ScriptedSource::paged(vec![
            Some("a1.example.com"),
            Some("a2.example.com"),
            Some("a3.example.com"),
            Some("a4.example.com"),
            Some("a5.example.com"),
        ]);
        source.page_limit = 30;
        source.exclusion_cap = 1;
        let probe = source.clone();

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::PageLimit);
        assert_eq!(probe.fetch_count(), 3);
        assert_eq!(outcome.hosts.len(), 3);
    }

    #[tokio::test]
    async fn test_single_shot_runs_exactly_one_cycle() {
        let source =
            ScriptedSource::single_shot(vec![Some("b.example.com"), Some("c.example.com")]);
        let probe = source.clone();

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.hosts, vec!["b.example.com"]);
        assert_eq!(probe.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_single_shot_transport_failure_is_empty() {
        let source = ScriptedSource::single_shot(vec![None]);

        let outcome = PollingEngine::new(Box::new(source), session(), "example.com")
            .run()
            .await;

        assert_eq!(outcome.termination, Termination::TransportFailure);
        assert!(outcome.hosts.is_empty());
    }
}
