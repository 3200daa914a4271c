//! Runtime configuration for the client and the onboarding wizard.
//!
//! [`ClientConfig`] is resolved from the environment (see
//! [`ENV_BASE_URL`](crate::constants::ENV_BASE_URL) and friends).
//! [`WizardRules`] carries the product whitelists that drive the draft's
//! cascade and drawdown rules.

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use crate::constants::{
    API_BASE_URL, COMMITMENT_PRODUCTS, DEFAULT_TIMEOUT_SECS, DRAWDOWN_PRODUCTS, ENV_ACCESS_TOKEN,
    ENV_BASE_URL, ENV_TIMEOUT_SECS,
};
use crate::error::{OnboardError, Result};

/// Connection settings for [`BackofficeClient`](crate::client::BackofficeClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Resolve the configuration from environment variables.
    ///
    /// The access token is mandatory; base URL and timeout fall back to the
    /// crate defaults.
    pub fn from_env() -> Result<Self> {
        let access_token = env::var(ENV_ACCESS_TOKEN)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| OnboardError::InvalidArgument(format!("{ENV_ACCESS_TOKEN} is not set")))?;

        let base_url = env::var(ENV_BASE_URL)
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| API_BASE_URL.to_owned());
        url::Url::parse(&base_url)?;

        let timeout = match env::var(ENV_TIMEOUT_SECS) {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                OnboardError::InvalidArgument(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}"))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            access_token,
            timeout,
        })
    }
}

/// Product whitelists consulted by the draft reducer and validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardRules {
    /// Products that keep `capitalCommitment` and `currency` on selection.
    pub commitment_products: BTreeSet<String>,
    /// Products whose applications carry drawdown terms.
    pub drawdown_products: BTreeSet<String>,
}

impl WizardRules {
    pub fn requires_commitment(&self, product_id: &str) -> bool {
        self.commitment_products.contains(product_id)
    }

    pub fn requires_drawdown(&self, product_id: &str) -> bool {
        self.drawdown_products.contains(product_id)
    }
}

impl Default for WizardRules {
    fn default() -> Self {
        Self {
            commitment_products: COMMITMENT_PRODUCTS.iter().map(|p| (*p).to_owned()).collect(),
            drawdown_products: DRAWDOWN_PRODUCTS.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}
