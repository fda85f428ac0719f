//! OnboardingManager — shares one session with async callers, broadcasts
//! progress, and hands finished profiles to the store.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::error::{DatabaseError, SubmitError};
use crate::store::ProfileStore;

use super::model::Profile;
use super::session::{OnboardingSession, OnboardingStatus, SubmitOutcome};
use super::state::Step;
use super::steps::StepSubmission;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Progress notifications for the application shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnboardingEvent {
    /// The wizard is now showing this step.
    StepChanged { step: Step },
    /// The final step was submitted. Sent once per completed run.
    Completed { profile: Profile },
    /// The flow was restarted from scratch.
    Reset,
}

/// Work queued for the persistence task.
#[derive(Debug)]
enum PersistOp {
    Save(Profile),
    Delete,
    /// Acknowledged once everything queued before it has been applied.
    #[cfg(test)]
    Flush(tokio::sync::oneshot::Sender<()>),
}

/// Coordinates a single onboarding session for async callers.
///
/// Every operation takes the session's write lock and runs to completion
/// before the next one starts. Storage writes are queued under that lock
/// and applied by a background task in the same order.
pub struct OnboardingManager {
    session: RwLock<OnboardingSession>,
    tx: broadcast::Sender<OnboardingEvent>,
    persist_tx: mpsc::UnboundedSender<PersistOp>,
}

impl OnboardingManager {
    /// Wrap a session. Must be called inside a Tokio runtime; spawns the
    /// persistence task.
    pub fn new(session: OnboardingSession, store: Arc<dyn ProfileStore>) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        spawn_persistence_task(session.id().to_string(), store, persist_rx);
        Arc::new(Self {
            session: RwLock::new(session),
            tx,
            persist_tx,
        })
    }

    /// Resume a session: complete if the store already holds a profile for
    /// `session_id`, fresh otherwise.
    pub async fn restore(
        session_id: &str,
        store: Arc<dyn ProfileStore>,
    ) -> Result<Arc<Self>, DatabaseError> {
        let session = match store.load_profile(session_id).await? {
            Some(profile) => {
                info!(session_id, "Restored completed onboarding profile");
                OnboardingSession::restored(session_id, profile)
            }
            None => OnboardingSession::new(session_id),
        };
        Ok(Self::new(session, store))
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<OnboardingEvent> {
        self.tx.subscribe()
    }

    /// Apply a step submission.
    ///
    /// Events and storage writes are issued before the write lock is
    /// released, so a concurrent `reset` always lands after them.
    pub async fn submit(
        &self,
        submission: StepSubmission,
    ) -> Result<OnboardingStatus, SubmitError> {
        let mut session = self.session.write().await;
        let outcome = match session.submit_any(&submission) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(step = %submission.step(), error = %e, "Step submission rejected");
                return Err(e);
            }
        };
        let status = session.status();

        match outcome {
            SubmitOutcome::Advanced(step) => {
                let _ = self.tx.send(OnboardingEvent::StepChanged { step });
            }
            SubmitOutcome::Completed => {
                self.queue(PersistOp::Save(status.profile.clone()));
                let _ = self.tx.send(OnboardingEvent::Completed {
                    profile: status.profile.clone(),
                });
            }
        }
        drop(session);
        Ok(status)
    }

    /// Go back one step. A no-op on the first step or once complete.
    pub async fn back(&self) -> OnboardingStatus {
        let mut session = self.session.write().await;
        let before = session.current_step();
        let after = session.back();
        if let Some(step) = after.filter(|s| Some(*s) != before) {
            let _ = self.tx.send(OnboardingEvent::StepChanged { step });
        }
        session.status()
    }

    /// Restart onboarding and drop any stored profile for this session.
    pub async fn reset(&self) -> OnboardingStatus {
        let mut session = self.session.write().await;
        session.reset();
        self.queue(PersistOp::Delete);
        let _ = self.tx.send(OnboardingEvent::Reset);
        session.status()
    }

    pub async fn status(&self) -> OnboardingStatus {
        self.session.read().await.status()
    }

    /// The finished profile, or `None` while onboarding is in progress.
    pub async fn profile(&self) -> Option<Profile> {
        let session = self.session.read().await;
        session.is_complete().then(|| session.profile().clone())
    }

    /// Wait until every write queued so far has reached the store.
    #[cfg(test)]
    async fn flushed(&self) {
        let (done, wait) = tokio::sync::oneshot::channel();
        self.queue(PersistOp::Flush(done));
        let _ = wait.await;
    }

    fn queue(&self, op: PersistOp) {
        if self.persist_tx.send(op).is_err() {
            warn!("Persistence task stopped; profile change not stored");
        }
    }
}

/// Drain persistence work sequentially. Failures are logged, never
/// reported back to the caller that triggered them.
fn spawn_persistence_task(
    session_id: String,
    store: Arc<dyn ProfileStore>,
    mut rx: mpsc::UnboundedReceiver<PersistOp>,
) {
    tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            match op {
                PersistOp::Save(profile) => match store.save_profile(&session_id, &profile).await {
                    Ok(()) => info!(session_id = %session_id, "Profile saved"),
                    Err(e) => warn!(session_id = %session_id, "Failed to save profile: {}", e),
                },
                PersistOp::Delete => {
                    if let Err(e) = store.delete_profile(&session_id).await {
                        warn!(session_id = %session_id, "Failed to delete profile: {}", e);
                    }
                }
                #[cfg(test)]
                PersistOp::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!(session_id = %session_id, "Persistence task finished");
    });
}
