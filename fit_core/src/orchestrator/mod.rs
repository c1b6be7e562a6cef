//! Fitting Compute Orchestrator - owns the computation lifecycle of a fitting
//!
//! Every submitted fitting gets a new revision and is computed on a blocking
//! task. Only the most recently submitted revision is ever delivered; older
//! computations may finish but their results are dropped.

use crate::catalog::ReferenceData;
use crate::compute::{compute_unless, ComputeOptions};
use crate::config::EngineConstants;
use crate::error::FitError;
use crate::fitting::Fitting;
use crate::skills::SkillSet;
use crate::stats::ComputedStats;
use crate::types::Revision;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{error, info, trace};

/// Result of one settled revision
#[derive(Debug, Clone)]
pub struct Delivery {
    pub revision: Revision,
    pub result: Result<Arc<ComputedStats>, FitError>,
}

/// Lifecycle of the orchestrated fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Nothing submitted yet
    Idle,
    /// The latest revision is being computed
    Computing,
    /// The latest revision was delivered successfully
    Ready,
    /// The latest revision failed
    Failed,
}

#[derive(Debug)]
struct Shared {
    state: OrchestratorState,
    requested: Revision,
    latest: Option<Arc<ComputedStats>>,
}

/// Computes fitting revisions in the background and delivers the latest
pub struct FittingOrchestrator<R: ReferenceData + ?Sized + 'static> {
    reference: Arc<R>,
    constants: Arc<EngineConstants>,
    options: Mutex<ComputeOptions>,
    shared: Arc<Mutex<Shared>>,
    /// Mirrors `Shared::requested` for the lock-free supersession check
    newest: Arc<AtomicU64>,
    sender: mpsc::UnboundedSender<Delivery>,
    runtime: Handle,
}

impl<R: ReferenceData + ?Sized + 'static> FittingOrchestrator<R> {
    /// Create an orchestrator on the current tokio runtime
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new(reference: Arc<R>, constants: EngineConstants) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        Self::with_handle(reference, constants, Handle::current())
    }

    /// Create an orchestrator spawning its work on `runtime`
    pub fn with_handle(
        reference: Arc<R>,
        constants: EngineConstants,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let orchestrator = FittingOrchestrator {
            reference,
            constants: Arc::new(constants),
            options: Mutex::new(ComputeOptions::default()),
            shared: Arc::new(Mutex::new(Shared {
                state: OrchestratorState::Idle,
                requested: Revision::default(),
                latest: None,
            })),
            newest: Arc::new(AtomicU64::new(0)),
            sender,
            runtime,
        };
        (orchestrator, receiver)
    }

    /// Options applied to revisions submitted from now on
    pub fn set_options(&self, options: ComputeOptions) {
        *self.options.lock() = options;
    }

    pub fn options(&self) -> ComputeOptions {
        *self.options.lock()
    }

    /// Submit a new fitting revision; returns immediately
    ///
    /// Any computation still running for an older revision is superseded.
    pub fn submit(&self, fitting: Fitting, skills: SkillSet) -> Revision {
        let revision = {
            let mut shared = self.shared.lock();
            shared.requested = shared.requested.next();
            shared.state = OrchestratorState::Computing;
            self.newest.store(shared.requested.0, Ordering::SeqCst);
            shared.requested
        };
        trace!(%revision, "revision submitted");

        let reference = Arc::clone(&self.reference);
        let constants = Arc::clone(&self.constants);
        let options = self.options();
        let newest = Arc::clone(&self.newest);
        let task = self.runtime.spawn_blocking(move || {
            compute_unless(
                &*reference,
                &fitting,
                &skills,
                &constants,
                &options,
                revision,
                || newest.load(Ordering::SeqCst) != revision.0,
            )
        });

        let shared = Arc::clone(&self.shared);
        let sender = self.sender.clone();
        self.runtime
            .spawn(async move { settle(&shared, &sender, revision, task.await) });

        revision
    }

    /// Current lifecycle state
    pub fn state(&self) -> OrchestratorState {
        self.shared.lock().state
    }

    /// Most recently submitted revision
    pub fn requested_revision(&self) -> Revision {
        self.shared.lock().requested
    }

    /// Last successfully delivered snapshot, if it is still current
    pub fn latest(&self) -> Option<Arc<ComputedStats>> {
        let shared = self.shared.lock();
        match &shared.latest {
            Some(stats) if stats.revision == shared.requested => Some(Arc::clone(stats)),
            _ => None,
        }
    }
}

/// Handle the outcome of a revision's blocking task
fn settle(
    shared: &Mutex<Shared>,
    sender: &mpsc::UnboundedSender<Delivery>,
    revision: Revision,
    outcome: Result<Option<Result<ComputedStats, FitError>>, JoinError>,
) {
    match outcome {
        Ok(Some(result)) => deliver(shared, sender, revision, result),
        Ok(None) => trace!(%revision, "superseded revision abandoned"),
        Err(e) => {
            error!(%revision, "fitting computation task failed: {}", e);
            deliver(shared, sender, revision, Err(FitError::ComputationAborted(e.to_string())));
        }
    }
}

/// Publish a finished computation if its revision is still the newest
fn deliver(
    shared: &Mutex<Shared>,
    sender: &mpsc::UnboundedSender<Delivery>,
    revision: Revision,
    result: Result<ComputedStats, FitError>,
) {
    let mut shared = shared.lock();
    if revision != shared.requested {
        trace!(%revision, requested = %shared.requested, "discarding superseded result");
        return;
    }

    let result = result.map(Arc::new);
    match &result {
        Ok(stats) => {
            shared.state = OrchestratorState::Ready;
            shared.latest = Some(Arc::clone(stats));
            info!(%revision, warnings = stats.warnings.len(), "fitting stats ready");
        }
        Err(e) => {
            shared.state = OrchestratorState::Failed;
            info!(%revision, kind = e.kind(), "fitting computation failed: {}", e);
        }
    }

    if sender.send(Delivery { revision, result }).is_err() {
        trace!(%revision, "delivery receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::compute::compute;
    use crate::config::default_catalog;
    use crate::types::TypeId;
    use std::time::Duration;

    fn shared_at(requested: u64) -> Mutex<Shared> {
        Mutex::new(Shared {
            state: OrchestratorState::Computing,
            requested: Revision(requested),
            latest: None,
        })
    }

    fn rifter_stats(revision: Revision) -> ComputedStats {
        let catalog = default_catalog().unwrap();
        let fitting = Fitting::new(catalog.find_hull("Rifter").unwrap());
        compute(
            &catalog,
            &fitting,
            &SkillSet::new(),
            &EngineConstants::default(),
            &ComputeOptions::default(),
            revision,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_orchestrator_is_idle() {
        let (orchestrator, _rx) = FittingOrchestrator::new(Arc::new(Catalog::new()), EngineConstants::default());
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
        assert_eq!(orchestrator.requested_revision(), Revision(0));
        assert!(orchestrator.latest().is_none());
    }

    #[tokio::test]
    async fn test_failed_revision_is_delivered_as_error() {
        let (orchestrator, mut rx) =
            FittingOrchestrator::new(Arc::new(Catalog::new()), EngineConstants::default());
        let revision = orchestrator.submit(Fitting::new(TypeId(42)), SkillSet::new());

        let delivery = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("delivery in time")
            .expect("channel open");
        assert_eq!(delivery.revision, revision);
        assert_eq!(delivery.result.unwrap_err(), FitError::UnknownType(TypeId(42)));
        assert_eq!(orchestrator.state(), OrchestratorState::Failed);
    }

    #[test]
    fn test_stale_result_after_newer_one_is_dropped() {
        let shared = shared_at(2);
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Revision 2 settles first, then the slower revision 1 finishes
        deliver(&shared, &tx, Revision(2), Ok(rifter_stats(Revision(2))));
        deliver(&shared, &tx, Revision(1), Ok(rifter_stats(Revision(1))));

        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.revision, Revision(2));
        assert!(rx.try_recv().is_err());

        let shared = shared.lock();
        assert_eq!(shared.state, OrchestratorState::Ready);
        assert_eq!(shared.latest.as_ref().map(|s| s.revision), Some(Revision(2)));
    }

    #[test]
    fn test_stale_error_does_not_fail_the_newest() {
        let shared = shared_at(2);
        let (tx, mut rx) = mpsc::unbounded_channel();

        deliver(&shared, &tx, Revision(2), Ok(rifter_stats(Revision(2))));
        deliver(&shared, &tx, Revision(1), Err(FitError::UnknownType(TypeId(7))));

        assert_eq!(rx.try_recv().unwrap().revision, Revision(2));
        assert!(rx.try_recv().is_err());
        assert_eq!(shared.lock().state, OrchestratorState::Ready);
    }

    #[tokio::test]
    async fn test_panicked_task_is_delivered_as_error() {
        let shared = shared_at(1);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = tokio::task::spawn_blocking(|| -> Option<Result<ComputedStats, FitError>> {
            panic!("aggregator blew up")
        })
        .await;
        settle(&shared, &tx, Revision(1), outcome);

        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.revision, Revision(1));
        assert_eq!(delivery.result.unwrap_err().kind(), "computation_aborted");
        assert_eq!(shared.lock().state, OrchestratorState::Failed);
    }

    #[tokio::test]
    async fn test_panicked_superseded_task_is_silent() {
        let shared = shared_at(2);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = tokio::task::spawn_blocking(|| -> Option<Result<ComputedStats, FitError>> {
            panic!("aggregator blew up")
        })
        .await;
        settle(&shared, &tx, Revision(1), outcome);

        assert!(rx.try_recv().is_err());
        assert_eq!(shared.lock().state, OrchestratorState::Computing);
    }
}
