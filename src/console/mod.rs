//! Operator console transport.

mod console_endpoint;

#[cfg(test)]
mod tests;

pub use console_endpoint::ConsoleEndpoint;
