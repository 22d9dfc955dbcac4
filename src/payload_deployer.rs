use crate::deployment::{
    AbortCapability, ActuatorTest, CancelOutcome, DeploymentController, DeploymentState,
    LaunchOutcome, MissionGenerator, MissionLink,
};
use crate::error::DeployerError;
use crate::payload::{FieldEdit, Payload, PayloadRegistry};
use crate::supervisor::DeployerParams;
use crate::{info, log, warn};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};

/// Point-in-time summary reported by the `status` command.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployerStatus {
    pub payloads: usize,
    pub capacity: usize,
    pub state: DeploymentState,
    pub since: Option<DateTime<Utc>>,
}

/// Entry point for every payload and deployment operation.
///
/// Owns the registry and the deployment controller and serializes access to
/// both. Locks are always taken controller first, registry second. Mutating
/// operations, parameter updates included, hold the controller lock for their
/// whole duration so no two of them interleave; `list` only needs the registry
/// read lock.
pub struct PayloadDeployer {
    /// Payloads keyed by priority index.
    registry: RwLock<PayloadRegistry>,
    /// Deployment session state machine, doubles as the single-writer lock.
    controller: Mutex<DeploymentController>,
    /// Servo test collaborator.
    actuator: Arc<dyn ActuatorTest>,
    /// Mirror of the controller state for observers.
    state_rx: watch::Receiver<DeploymentState>,
}

impl PayloadDeployer {
    pub fn new(
        capacity: usize,
        mission: Arc<dyn MissionGenerator>,
        abort: Arc<dyn AbortCapability>,
        actuator: Arc<dyn ActuatorTest>,
    ) -> Self {
        let (controller, state_rx) = DeploymentController::new(mission, abort);
        Self {
            registry: RwLock::new(PayloadRegistry::new(capacity)),
            controller: Mutex::new(controller),
            actuator,
            state_rx,
        }
    }

    /// Wires all collaborators to one [`MissionLink`].
    pub fn with_link(capacity: usize, link: &Arc<MissionLink>) -> Self {
        Self::new(capacity, link.clone(), link.clone(), link.clone())
    }

    pub async fn add(&self, payload: Payload) -> Result<(), DeployerError> {
        let _controller = self.controller.lock().await;
        let index = payload.index();
        self.registry.write().await.add(payload).inspect_err(|e| warn!("Add rejected: {e}"))?;
        log!("Payload {index} added.");
        Ok(())
    }

    pub async fn edit(
        &self,
        index: u16,
        field: &str,
        value: &str,
    ) -> Result<FieldEdit, DeployerError> {
        let controller = self.controller.lock().await;
        let res = match controller.ensure_released(index) {
            Ok(()) => self.registry.write().await.edit(index, field, value),
            Err(e) => Err(e),
        };
        match &res {
            Ok(edit) => log!(
                "Payload {index}: {} changed from {} to {}.",
                edit.field,
                edit.previous,
                edit.current
            ),
            Err(e) => warn!("Edit of payload {index} rejected: {e}"),
        }
        res
    }

    pub async fn remove(&self, index: u16) -> Result<Payload, DeployerError> {
        let controller = self.controller.lock().await;
        controller.ensure_released(index).inspect_err(|e| warn!("Remove rejected: {e}"))?;
        let removed =
            self.registry.write().await.remove(index).inspect_err(|e| warn!("Remove rejected: {e}"))?;
        log!("Payload {index} removed.");
        Ok(removed)
    }

    /// Consistent copy of all payloads in ascending index order.
    pub async fn list(&self) -> Vec<Payload> { self.registry.read().await.snapshot() }

    pub async fn launch(&self, index: Option<u16>) -> Result<LaunchOutcome, DeployerError> {
        let mut controller = self.controller.lock().await;
        let registry = self.registry.read().await;
        controller.launch(&registry, index).await
    }

    pub async fn cancel(&self) -> CancelOutcome { self.controller.lock().await.cancel().await }

    /// Cycles the servo bound to a payload. Payloads of the active session are
    /// off limits.
    pub async fn test_servo(&self, index: u16) -> Result<u32, DeployerError> {
        let controller = self.controller.lock().await;
        controller.ensure_released(index).inspect_err(|e| warn!("Servo test rejected: {e}"))?;
        let pwm_id = self.registry.read().await.find(index)?.actuator().pwm_id;
        info!("Testing servo of payload {index} on pwm channel {pwm_id}.");
        self.actuator.test(pwm_id).await;
        Ok(pwm_id)
    }

    pub async fn status(&self) -> DeployerStatus {
        let controller = self.controller.lock().await;
        let registry = self.registry.read().await;
        DeployerStatus {
            payloads: registry.len(),
            capacity: registry.capacity(),
            state: controller.state(),
            since: controller.since(),
        }
    }

    /// Applies a parameter set received by the supervisor.
    pub async fn apply_params(&self, params: DeployerParams) {
        let _controller = self.controller.lock().await;
        let mut registry = self.registry.write().await;
        if registry.capacity() != params.max_items {
            info!("Registry capacity {} -> {}.", registry.capacity(), params.max_items);
            registry.set_capacity(params.max_items);
        }
    }

    pub fn state_monitor(&self) -> watch::Receiver<DeploymentState> { self.state_rx.clone() }
}

#[cfg(test)]
mod tests {
    use super::PayloadDeployer;
    use crate::deployment::tests::RecordingLink;
    use crate::supervisor::DeployerParams;
    use std::sync::Arc;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn test_parameter_update_waits_for_running_mutation() {
        let link = Arc::new(RecordingLink::default());
        let deployer = PayloadDeployer::new(8, link.clone(), link.clone(), link);
        let params = DeployerParams { max_items: 3 };

        let controller = deployer.controller.lock().await;
        assert!(timeout(Duration::from_millis(50), deployer.apply_params(params)).await.is_err());
        assert_eq!(deployer.registry.read().await.capacity(), 8);
        drop(controller);

        deployer.apply_params(params).await;
        assert_eq!(deployer.status().await.capacity, 3);
    }
}
