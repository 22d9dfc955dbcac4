use crate::payload::PayloadRegistry;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Runtime-tunable deployer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployerParams {
    /// Maximum number of payloads the registry accepts.
    pub max_items: usize,
}

impl Default for DeployerParams {
    fn default() -> Self { Self { max_items: PayloadRegistry::DEFAULT_CAPACITY } }
}

/// Notification source polled by the supervisor once per tick.
pub trait ParameterUpdateSource: Send {
    /// Whether a parameter change is pending.
    fn updated(&mut self) -> bool;
    /// Takes the current parameter set and marks it as seen.
    fn copy(&mut self) -> DeployerParams;
    /// Drops the subscription. Further polls report no update.
    fn unsubscribe(&mut self);
}

/// [`ParameterUpdateSource`] listening on a `watch` channel.
pub struct ParamSubscription {
    rx: Option<watch::Receiver<DeployerParams>>,
}

impl ParamSubscription {
    pub fn new(rx: watch::Receiver<DeployerParams>) -> Self { Self { rx: Some(rx) } }

    #[cfg(test)]
    pub fn is_subscribed(&self) -> bool { self.rx.is_some() }
}

impl ParameterUpdateSource for ParamSubscription {
    fn updated(&mut self) -> bool {
        self.rx.as_ref().is_some_and(|rx| rx.has_changed().unwrap_or(false))
    }

    fn copy(&mut self) -> DeployerParams {
        self.rx.as_mut().map(|rx| *rx.borrow_and_update()).unwrap_or_default()
    }

    fn unsubscribe(&mut self) { self.rx = None; }
}
