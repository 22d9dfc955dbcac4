//! Deployment session state machine and the collaborators it hands work to.

mod deployment_controller;
mod deployment_state;
mod mission_link;


pub use deployment_controller::DeploymentController;
pub use deployment_state::{CancelOutcome, DeploymentState, LaunchOutcome};
pub use mission_link::{AbortCapability, ActuatorTest, MissionGenerator, MissionLink};

#[cfg(test)]
pub use deployment_state::DeploymentTarget;
#[cfg(test)]
pub use mission_link::MissionRequest;
