//! Text command boundary: tokens in, typed commands through the deployer, reply lines out.

#[allow(clippy::module_inception)]
mod command;
mod command_dispatcher;

#[cfg(test)]
mod tests;

pub use command_dispatcher::CommandDispatcher;
