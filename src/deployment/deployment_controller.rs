use super::{
    deployment_state::{CancelOutcome, DeploymentState, DeploymentTarget, LaunchOutcome},
    mission_link::{AbortCapability, MissionGenerator},
};
use crate::error::{Conflict, DeployerError};
use crate::payload::{PayloadDescriptor, PayloadRegistry};
use crate::{deploy, warn};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// State machine arbitrating launch and cancel requests.
///
/// The controller only references payloads by index, the registry stays their
/// owner. Callers serialize access (the deployer keeps the controller behind a
/// mutex and always locks it before the registry).
pub struct DeploymentController {
    /// Current state, `Idle` or the target of the single active session.
    state: DeploymentState,
    /// Indices handed to the mission generator for the active session.
    committed: Vec<u16>,
    /// Launch time of the active session.
    since: Option<DateTime<Utc>>,
    /// Broadcasts every state change to observers.
    state_tx: watch::Sender<DeploymentState>,
    mission: Arc<dyn MissionGenerator>,
    abort: Arc<dyn AbortCapability>,
}

impl DeploymentController {
    /// Creates an idle controller and a receiver tracking its state.
    pub fn new(
        mission: Arc<dyn MissionGenerator>,
        abort: Arc<dyn AbortCapability>,
    ) -> (Self, watch::Receiver<DeploymentState>) {
        let (tx, rx) = watch::channel(DeploymentState::Idle);
        (
            Self {
                state: DeploymentState::Idle,
                committed: Vec::new(),
                since: None,
                state_tx: tx,
                mission,
                abort,
            },
            rx,
        )
    }

    pub fn state(&self) -> DeploymentState { self.state }

    pub fn since(&self) -> Option<DateTime<Utc>> { self.since }

    #[cfg(test)]
    pub fn committed(&self) -> &[u16] { &self.committed }

    /// Whether `index` belongs to the release sequence of the active session.
    pub fn is_committed(&self, index: u16) -> bool { self.committed.contains(&index) }

    /// Fails with [`Conflict::PayloadCommitted`] if `index` is part of the
    /// active session and therefore must not be changed.
    pub fn ensure_released(&self, index: u16) -> Result<(), DeployerError> {
        if self.is_committed(index) {
            Err(DeployerError::StateConflict(Conflict::PayloadCommitted(index)))
        } else {
            Ok(())
        }
    }

    /// Starts a session for a single payload or, with `None`, for all payloads
    /// in ascending index order.
    ///
    /// # Errors
    /// * [`Conflict::DeploymentActive`] if a session is already running.
    /// * [`DeployerError::NotFound`] if a single target is not registered.
    pub async fn launch(
        &mut self,
        registry: &PayloadRegistry,
        index: Option<u16>,
    ) -> Result<LaunchOutcome, DeployerError> {
        if let DeploymentState::Active(running) = self.state {
            warn!("Launch rejected, {running} is still being deployed.");
            return Err(DeployerError::StateConflict(Conflict::DeploymentActive));
        }
        let (target, sequence) = match index {
            Some(i) => (DeploymentTarget::Single(i), vec![PayloadDescriptor::from(registry.find(i)?)]),
            None if registry.is_empty() => {
                warn!("Launch requested but no payloads are registered.");
                return Ok(LaunchOutcome::NothingToDeploy);
            }
            None => (DeploymentTarget::All, registry.descriptors()),
        };

        self.committed = sequence.iter().map(|d| d.index).collect();
        self.since = Some(Utc::now());
        self.transition(DeploymentState::Active(target));
        let committed = sequence.len();
        deploy!("Deploying {target}, {committed} payload(s) committed.");
        self.mission.generate(sequence).await;
        Ok(LaunchOutcome::Started { target, committed })
    }

    /// Ends the active session and asks the vehicle to abort and hold.
    /// Cancelling while idle is a no-op.
    pub async fn cancel(&mut self) -> CancelOutcome {
        let DeploymentState::Active(target) = self.state else {
            return CancelOutcome::AlreadyIdle;
        };
        self.committed.clear();
        self.since = None;
        self.transition(DeploymentState::Idle);
        deploy!("Deployment of {target} cancelled.");
        self.abort.abort().await;
        CancelOutcome::Aborted(target)
    }

    fn transition(&mut self, next: DeploymentState) {
        self.state = next;
        // Receivers may all be gone, the state itself is authoritative.
        let _ = self.state_tx.send(next);
    }
}
