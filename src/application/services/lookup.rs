//! Trial lookups with a session-long memo cache
//!
//! Counts and phase breakdowns are cached per sanitized+enriched query.
//! Registry failures degrade to zero and are never cached, so the next access
//! retries.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::application::services::registry::RegisteredTree;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::SearchTermSanitizer;
use crate::infrastructure::traits::{StudyQuery, StudySummary, TrialPhase, TrialRegistry};
use crate::infrastructure::InfraResult;

/// Cache-key prefix for phase breakdowns.
const PHASES_KEY_PREFIX: &str = "phases:";

/// Upper bound of the `Warm` band.
const WARM_MAX: u64 = 5;

/// Heatmap band for a recruiting-trial count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    /// No trials (red)
    Cold,
    /// 1..=5 trials (yellow)
    Warm,
    /// 6 or more (green)
    Hot,
}

impl HeatLevel {
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => HeatLevel::Cold,
            1..=WARM_MAX => HeatLevel::Warm,
            _ => HeatLevel::Hot,
        }
    }
}

impl fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HeatLevel::Cold => "cold",
            HeatLevel::Warm => "warm",
            HeatLevel::Hot => "hot",
        };
        f.write_str(s)
    }
}

/// Recruiting trials per phase; `total` is the sum, saturating at `u64::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseBreakdown {
    pub p1: u64,
    pub p2: u64,
    pub p3: u64,
    pub total: u64,
}

impl PhaseBreakdown {
    pub fn new(p1: u64, p2: u64, p3: u64) -> Self {
        Self {
            p1,
            p2,
            p3,
            total: p1.saturating_add(p2).saturating_add(p3),
        }
    }

    pub fn get(&self, phase: TrialPhase) -> u64 {
        match phase {
            TrialPhase::Phase1 => self.p1,
            TrialPhase::Phase2 => self.p2,
            TrialPhase::Phase3 => self.p3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CachedResult {
    Count(u64),
    Phases(PhaseBreakdown),
}

/// Detail view for one term: first page of studies and a link to the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyListing {
    pub query: String,
    pub total_count: u64,
    pub studies: Vec<StudySummary>,
    pub view_all_url: String,
}

/// Token identifying one whole-tree sweep; stale once a newer sweep begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepTicket {
    generation: u64,
}

impl SweepTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result for one queryable node of a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepEntry<T> {
    pub node_id: String,
    pub label: String,
    pub value: T,
}

/// Results gathered before the sweep finished or was superseded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepOutcome<T> {
    pub results: Vec<SweepEntry<T>>,
    pub cancelled: bool,
}

/// Memoizing front for a [`TrialRegistry`].
pub struct TrialLookupService {
    registry: Arc<dyn TrialRegistry>,
    sanitizer: SearchTermSanitizer,
    status: String,
    page_size: u32,
    cache: RwLock<HashMap<String, CachedResult>>,
    generation: AtomicU64,
}

impl TrialLookupService {
    pub fn new(
        registry: Arc<dyn TrialRegistry>,
        sanitizer: SearchTermSanitizer,
        status: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            registry,
            sanitizer,
            status: status.into(),
            page_size,
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn sanitizer(&self) -> &SearchTermSanitizer {
        &self.sanitizer
    }

    /// Number of cached entries.
    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Recruiting-trial count for a raw term; 0 on failure or empty query.
    #[instrument(level = "debug", skip(self))]
    pub async fn lookup_count(&self, term: &str, disease: Option<&str>) -> u64 {
        let Some(query) = self.sanitizer.query_term(term, disease) else {
            debug!("empty query, skipping registry");
            return 0;
        };

        if let Some(CachedResult::Count(count)) = self.cached(&query).await {
            debug!(%query, count, "cache hit");
            return count;
        }

        match self.fetch_count(&query, None).await {
            Ok(count) => match self.store(query, CachedResult::Count(count)).await {
                CachedResult::Count(stored) => stored,
                CachedResult::Phases(_) => count,
            },
            Err(e) => {
                warn!(%query, error = %e, "trial count lookup failed");
                0
            }
        }
    }

    /// Phase 1/2/3 breakdown for a raw term; all-zero on failure or empty query.
    ///
    /// The three phase queries run concurrently. If any fails the breakdown is
    /// not cached.
    #[instrument(level = "debug", skip(self))]
    pub async fn lookup_phases(&self, term: &str, disease: Option<&str>) -> PhaseBreakdown {
        let Some(query) = self.sanitizer.query_term(term, disease) else {
            debug!("empty query, skipping registry");
            return PhaseBreakdown::default();
        };
        let key = format!("{PHASES_KEY_PREFIX}{query}");

        if let Some(CachedResult::Phases(breakdown)) = self.cached(&key).await {
            debug!(%key, "cache hit");
            return breakdown;
        }

        let (p1, p2, p3) = tokio::join!(
            self.fetch_count(&query, Some(TrialPhase::Phase1)),
            self.fetch_count(&query, Some(TrialPhase::Phase2)),
            self.fetch_count(&query, Some(TrialPhase::Phase3)),
        );

        match (p1, p2, p3) {
            (Ok(p1), Ok(p2), Ok(p3)) => {
                let breakdown = PhaseBreakdown::new(p1, p2, p3);
                match self.store(key, CachedResult::Phases(breakdown)).await {
                    CachedResult::Phases(stored) => stored,
                    CachedResult::Count(_) => breakdown,
                }
            }
            (r1, r2, r3) => {
                for e in [r1.err(), r2.err(), r3.err()].into_iter().flatten() {
                    warn!(%query, error = %e, "phase lookup failed");
                }
                PhaseBreakdown::default()
            }
        }
    }

    /// First page of matching studies, uncached. Failures are returned.
    #[instrument(level = "debug", skip(self))]
    pub async fn study_listing(
        &self,
        term: &str,
        disease: Option<&str>,
    ) -> ApplicationResult<StudyListing> {
        let query = self.sanitizer.query_term(term, disease).unwrap_or_default();
        let view_all_url = self.registry.search_page_url(&query, &self.status);
        if query.is_empty() {
            return Ok(StudyListing {
                query,
                total_count: 0,
                studies: Vec::new(),
                view_all_url,
            });
        }

        let response = self
            .registry
            .search(&self.study_query(&query, None))
            .await
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("fetch studies for '{query}'"),
                source: Box::new(e),
            })?;

        Ok(StudyListing {
            query,
            total_count: response.total_count,
            studies: response.studies,
            view_all_url,
        })
    }

    /// Start a new sweep, invalidating every earlier ticket.
    pub fn begin_sweep(&self) -> SweepTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "sweep started");
        SweepTicket { generation }
    }

    pub fn is_current(&self, ticket: SweepTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Counts for every queryable node in pre-order, one node at a time.
    #[instrument(level = "debug", skip(self, tree), fields(tree_id = %tree.tree_id))]
    pub async fn sweep_counts(
        &self,
        tree: &RegisteredTree,
        ticket: SweepTicket,
    ) -> SweepOutcome<u64> {
        let mut results = Vec::new();
        for node in tree.root.queryable_nodes() {
            if !self.is_current(ticket) {
                return self.cancelled(results);
            }
            let term = node.search_term.as_deref().unwrap_or_default();
            let value = self.lookup_count(term, Some(&tree.disease)).await;
            if !self.is_current(ticket) {
                return self.cancelled(results);
            }
            results.push(SweepEntry {
                node_id: node.id.clone(),
                label: node.label.clone(),
                value,
            });
        }
        info!(nodes = results.len(), "count sweep complete");
        SweepOutcome {
            results,
            cancelled: false,
        }
    }

    /// Phase breakdowns for every queryable node in pre-order, one node at a time.
    #[instrument(level = "debug", skip(self, tree), fields(tree_id = %tree.tree_id))]
    pub async fn sweep_phases(
        &self,
        tree: &RegisteredTree,
        ticket: SweepTicket,
    ) -> SweepOutcome<PhaseBreakdown> {
        let mut results = Vec::new();
        for node in tree.root.queryable_nodes() {
            if !self.is_current(ticket) {
                return self.cancelled(results);
            }
            let term = node.search_term.as_deref().unwrap_or_default();
            let value = self.lookup_phases(term, Some(&tree.disease)).await;
            if !self.is_current(ticket) {
                return self.cancelled(results);
            }
            results.push(SweepEntry {
                node_id: node.id.clone(),
                label: node.label.clone(),
                value,
            });
        }
        info!(nodes = results.len(), "phase sweep complete");
        SweepOutcome {
            results,
            cancelled: false,
        }
    }

    fn cancelled<T>(&self, results: Vec<SweepEntry<T>>) -> SweepOutcome<T> {
        debug!(completed = results.len(), "sweep superseded");
        SweepOutcome {
            results,
            cancelled: true,
        }
    }

    fn study_query(&self, term: &str, phase: Option<TrialPhase>) -> StudyQuery {
        StudyQuery {
            term: term.to_string(),
            status: self.status.clone(),
            phase,
            page_size: self.page_size,
        }
    }

    async fn fetch_count(&self, query: &str, phase: Option<TrialPhase>) -> InfraResult<u64> {
        let response = self.registry.search(&self.study_query(query, phase)).await?;
        Ok(response.total_count)
    }

    async fn cached(&self, key: &str) -> Option<CachedResult> {
        self.cache.read().await.get(key).copied()
    }

    /// Insert unless present; the first stored value for a key is kept.
    async fn store(&self, key: String, value: CachedResult) -> CachedResult {
        *self.cache.write().await.entry(key).or_insert(value)
    }
}
