//! Client configuration for the Lighter SDK

use crate::constants::{MAINNET_CHAIN_ID, MAINNET_URL, TESTNET_CHAIN_ID, TESTNET_URL};
use eyre::{Context, Result};
use std::time::Duration;

/// Default HTTP timeout for exchange API calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Exchange endpoint, chain id and transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL
    pub url: String,
    /// Lighter chain ID mixed into every transaction hash (304 mainnet, 300 testnet)
    pub chain_id: u32,
    /// Timeout applied to every HTTP request
    pub timeout: Duration,
    /// Value of the `Channel-Name` header sent with transactions
    pub channel_name: String,
    /// Reject orders priced far from the mark price; sent as `price_protection=false` when off
    pub price_protection: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl ClientConfig {
    /// Mainnet configuration
    pub fn mainnet() -> Self {
        Self {
            url: MAINNET_URL.to_string(),
            chain_id: MAINNET_CHAIN_ID,
            timeout: DEFAULT_TIMEOUT,
            channel_name: String::new(),
            price_protection: true,
        }
    }

    /// Testnet configuration
    pub fn testnet() -> Self {
        Self {
            url: TESTNET_URL.to_string(),
            chain_id: TESTNET_CHAIN_ID,
            ..Self::mainnet()
        }
    }

    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// Reads `LIGHTER_URL`, `LIGHTER_CHAIN_ID`, `LIGHTER_TIMEOUT_SECS` and
    /// `LIGHTER_CHANNEL_NAME`; unset variables keep their mainnet defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::mainnet();

        if let Some(url) = lookup("LIGHTER_URL") {
            config.url = url;
        }
        if let Some(chain_id) = lookup("LIGHTER_CHAIN_ID") {
            config.chain_id = chain_id
                .trim()
                .parse()
                .context("LIGHTER_CHAIN_ID must be an unsigned integer")?;
        }
        if let Some(secs) = lookup("LIGHTER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .context("LIGHTER_TIMEOUT_SECS must be an unsigned integer")?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(channel) = lookup("LIGHTER_CHANNEL_NAME") {
            config.channel_name = channel;
        }

        eyre::ensure!(!config.url.is_empty(), "LIGHTER_URL must not be empty");
        Ok(config)
    }

    /// Set the API base URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the chain ID
    pub fn with_chain_id(mut self, chain_id: u32) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the channel name header
    pub fn with_channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = channel_name.into();
        self
    }

    /// Enable or disable fat-finger price protection
    pub fn with_price_protection(mut self, enabled: bool) -> Self {
        self.price_protection = enabled;
        self
    }
}
