//! Periodic tick driver and the parameter notifications it forwards.

mod parameter_source;
#[allow(clippy::module_inception)]
mod supervisor;

#[cfg(test)]
mod tests;

pub use parameter_source::{DeployerParams, ParamSubscription};
pub use supervisor::Supervisor;
