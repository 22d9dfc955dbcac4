use std::fmt;

/// What an active session is releasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentTarget {
    /// One payload, by priority index.
    Single(u16),
    /// Every payload present at launch, in ascending index order.
    All,
}

/// State of the deployment controller. There is at most one session at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentState {
    #[default]
    Idle,
    Active(DeploymentTarget),
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentTarget::Single(i) => write!(f, "payload {i}"),
            DeploymentTarget::All => write!(f, "all payloads"),
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentState::Idle => write!(f, "idle"),
            DeploymentState::Active(target) => write!(f, "active ({target})"),
        }
    }
}

/// Result of a successful `launch` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A session started and `committed` payloads were handed to the mission generator.
    Started { target: DeploymentTarget, committed: usize },
    /// Launch-all on an empty registry. Reported as a warning, the controller stays idle.
    NothingToDeploy,
}

/// Result of a `cancel` request. Cancelling never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Aborted(DeploymentTarget),
    AlreadyIdle,
}
