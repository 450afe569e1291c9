//! End-to-end pipeline: fetch, match, verify, detect, notify.
//!
//! One `run_once` is a full cycle against live venue state. The pipeline
//! owns no durable state of its own; everything that must survive a restart
//! lives behind the ledger's store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use market_arb_core::alerts::{CandidateAlert, OpportunityAlert};
use market_arb_core::error::{ArbError, Result};
use market_arb_core::traits::{Notifier, VenueAdapter, VerificationStore};
use market_arb_core::types::{ArbitrageOpportunity, MarketRecord, MatchCandidate, Venue};
use market_arb_core::validation::filter_valid;
use market_arb_matching::{MatchEngine, VerificationLedger};

use crate::detector::ArbDetector;

// =============================================================================
// Run Summary
// =============================================================================

/// What one pipeline cycle saw and produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Valid records fetched from venue A.
    pub records_a: usize,

    /// Valid records fetched from venue B.
    pub records_b: usize,

    /// Venues whose fetch failed this cycle.
    pub failed_venues: Vec<Venue>,

    /// Candidates the matching pass produced, new or not.
    pub candidates_found: usize,

    /// Candidates seen for the first time this cycle.
    pub new_pending: Vec<MatchCandidate>,

    /// Opportunities detected over the verified set.
    pub opportunities: Vec<ArbitrageOpportunity>,

    /// When the cycle finished.
    pub completed_at: DateTime<Utc>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Orchestrates the fetch-match-verify-detect-notify cycle across two
/// venues.
pub struct ArbPipeline<S: VerificationStore> {
    adapter_a: Arc<dyn VenueAdapter>,
    adapter_b: Arc<dyn VenueAdapter>,
    engine: MatchEngine,
    ledger: Arc<VerificationLedger<S>>,
    detector: ArbDetector,
    notifiers: Vec<Arc<dyn Notifier>>,
    auto_mode: bool,
    auto_confidence_threshold: f64,
}

impl<S: VerificationStore> ArbPipeline<S> {
    /// Creates a pipeline over two venue adapters.
    #[must_use]
    pub fn new(
        adapter_a: Arc<dyn VenueAdapter>,
        adapter_b: Arc<dyn VenueAdapter>,
        engine: MatchEngine,
        ledger: Arc<VerificationLedger<S>>,
        detector: ArbDetector,
    ) -> Self {
        Self {
            adapter_a,
            adapter_b,
            engine,
            ledger,
            detector,
            notifiers: Vec::new(),
            auto_mode: false,
            auto_confidence_threshold: 0.95,
        }
    }

    /// Registers a notifier. All registered notifiers receive every alert.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Enables auto mode: pending candidates at or above the confidence
    /// floor are priced alongside the confirmed set, without waiting for a
    /// human.
    #[must_use]
    pub fn with_auto_mode(mut self, confidence_threshold: f64) -> Self {
        self.auto_mode = true;
        self.auto_confidence_threshold = confidence_threshold;
        self
    }

    /// The ledger, for wiring up a decision source.
    #[must_use]
    pub fn ledger(&self) -> &Arc<VerificationLedger<S>> {
        &self.ledger
    }

    /// Runs one full cycle.
    ///
    /// A single venue failing degrades the cycle to zero candidates rather
    /// than failing it; detection still runs over previously verified
    /// matches with whatever snapshots the ledger holds.
    ///
    /// # Errors
    ///
    /// [`ArbError::AllVenuesUnavailable`] when neither venue produced
    /// records.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let (fetched_a, fetched_b) = tokio::join!(
            self.fetch_venue(&self.adapter_a),
            self.fetch_venue(&self.adapter_b),
        );

        let mut failed_venues = Vec::new();
        let records_a = fetched_a.unwrap_or_else(|venue| {
            failed_venues.push(venue);
            Vec::new()
        });
        let records_b = fetched_b.unwrap_or_else(|venue| {
            failed_venues.push(venue);
            Vec::new()
        });

        if failed_venues.len() == 2 {
            error!("no venue produced records, aborting cycle");
            return Err(ArbError::AllVenuesUnavailable);
        }

        let candidates = self.engine.find_candidates(&records_a, &records_b);
        let candidates_found = candidates.len();
        let new_pending = self.ledger.ingest(candidates);

        // Delivery failures are logged and never fail the cycle.
        for candidate in &new_pending {
            let alert = CandidateAlert::from(candidate);
            for notifier in &self.notifiers {
                if let Err(err) = notifier.notify_candidate(&alert).await {
                    warn!(error = %err, candidate = %candidate.id, "candidate alert delivery failed");
                }
            }
        }

        let mut verified = self.ledger.confirmed_candidates();
        if self.auto_mode {
            verified.extend(self.ledger.auto_confirmable(self.auto_confidence_threshold));
        }

        let opportunities = self.detector.detect(&verified, Utc::now());
        for opportunity in &opportunities {
            let alert = OpportunityAlert::from(opportunity);
            for notifier in &self.notifiers {
                if let Err(err) = notifier.notify_opportunity(&alert).await {
                    warn!(error = %err, candidate = %opportunity.candidate_id, "opportunity alert delivery failed");
                }
            }
        }

        let summary = RunSummary {
            records_a: records_a.len(),
            records_b: records_b.len(),
            failed_venues,
            candidates_found,
            new_pending,
            opportunities,
            completed_at: Utc::now(),
        };

        info!(
            records_a = summary.records_a,
            records_b = summary.records_b,
            candidates = summary.candidates_found,
            new_pending = summary.new_pending.len(),
            opportunities = summary.opportunities.len(),
            "pipeline cycle complete"
        );

        Ok(summary)
    }

    /// Runs cycles forever at a fixed interval. Per-cycle errors are logged
    /// and the loop keeps going.
    pub async fn run_every(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                error!(error = %err, "pipeline cycle failed");
            }
        }
    }

    /// Fetches and validates one venue's records; on failure returns the
    /// venue so the caller can record the degradation.
    async fn fetch_venue(
        &self,
        adapter: &Arc<dyn VenueAdapter>,
    ) -> std::result::Result<Vec<MarketRecord>, Venue> {
        match adapter.fetch_normalized_markets().await {
            Ok(records) => Ok(filter_valid(records)),
            Err(err) => {
                warn!(venue = %adapter.venue(), error = %err, "venue fetch failed");
                Err(adapter.venue())
            }
        }
    }
}
