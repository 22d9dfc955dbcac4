use crate::payload::PayloadRegistry;
use crate::warn;
use std::{env, str::FromStr};

/// Startup configuration taken from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerConfig {
    console_addr: String,
    max_items: usize,
}

impl DeployerConfig {
    const CONSOLE_ADDR_VAR: &'static str = "DEPLOYER_CONSOLE_ADDR";
    const MAX_ITEMS_VAR: &'static str = "DEPLOYER_MAX_ITEMS";
    const DEFAULT_CONSOLE_ADDR: &'static str = "127.0.0.1:4560";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Unparsable
    /// values are reported and replaced by their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let console_addr = lookup(Self::CONSOLE_ADDR_VAR)
            .unwrap_or_else(|| Self::DEFAULT_CONSOLE_ADDR.to_string());
        let max_items = Self::parse_or(&lookup, Self::MAX_ITEMS_VAR, PayloadRegistry::DEFAULT_CAPACITY);
        Self { console_addr, max_items }
    }

    fn parse_or<T: FromStr + Copy>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        default: T,
    ) -> T {
        match lookup(key) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring {key}='{raw}', not a valid value.");
                default
            }),
        }
    }

    pub fn console_addr(&self) -> &str { &self.console_addr }
    pub fn max_items(&self) -> usize { self.max_items }
}
