use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::GatewayError, typed_data::Domain};

/// Gateway settings, usually loaded from JSON. Missing fields take defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    pub chain_id: u64,
    /// Compressed Ristretto network public key.
    #[serde(with = "hex::serde")]
    pub network_key: [u8; 32],
    pub domain_name: String,
    pub domain_version: String,
    #[serde(with = "hex::serde")]
    pub verifying_contract: Vec<u8>,
    /// Validity window of a decryption authorization.
    pub validity_days: u64,
    /// Upper bound on one decryption round trip.
    pub request_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            chain_id: 0,
            network_key: [0u8; 32],
            domain_name: "Decryption".into(),
            domain_version: "1".into(),
            verifying_contract: Vec::new(),
            validity_days: 10,
            request_timeout_ms: 30_000,
        }
    }
}

impl GatewayConfig {
    pub fn from_json(json: &str) -> Result<Self, GatewayError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.validity_days == 0 {
            return Err(GatewayError::InvalidConfig("validityDays must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(GatewayError::InvalidConfig("requestTimeoutMs must be positive"));
        }
        Ok(())
    }

    pub fn domain(&self) -> Domain {
        Domain {
            name: self.domain_name.clone(),
            version: self.domain_version.clone(),
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
