//! Decryption service: wire types, the service trait, and an in-process
//! implementation backed by a snapshot of the executor state.

use std::{
    collections::BTreeMap,
    future::Future,
    sync::{PoisonError, RwLock},
};

use fhe_primitives::{Handle, InputCiphertext, point_from_bytes};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    clock::Clock,
    eval::{CiphertextStore, EvalError, evaluate},
    keys::{NetworkSecretKey, REENCRYPT_MASK, random_scalar, seal},
    typed_data::{DecryptAuthorization, Domain, TypedSignature, hex_list},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDecryptRequest {
    #[serde(with = "hex::serde")]
    pub handle: Handle,
    #[serde(with = "hex::serde")]
    pub contract_address: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub caller_address: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub public_key: [u8; 32],
    #[serde(with = "hex_list")]
    pub contract_addresses: Vec<Vec<u8>>,
    pub start_timestamp: u64,
    pub duration_days: u64,
    pub signature: TypedSignature,
}

impl UserDecryptRequest {
    pub fn authorization(&self) -> DecryptAuthorization {
        DecryptAuthorization {
            public_key: self.public_key,
            contract_addresses: self.contract_addresses.clone(),
            start_timestamp: self.start_timestamp,
            duration_days: self.duration_days,
        }
    }
}

/// A value re-encrypted to the session key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedValue {
    #[serde(with = "hex::serde")]
    pub ephemeral: [u8; 32],
    #[serde(with = "hex::serde")]
    pub masked: [u8; 8],
}

impl From<InputCiphertext> for SealedValue {
    fn from(ct: InputCiphertext) -> Self {
        Self {
            ephemeral: ct.ephemeral,
            masked: ct.masked,
        }
    }
}

impl From<SealedValue> for InputCiphertext {
    fn from(v: SealedValue) -> Self {
        Self {
            ephemeral: v.ephemeral,
            masked: v.masked,
        }
    }
}

/// Sealed results keyed by hex handle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecryptResponse {
    pub results: BTreeMap<String, SealedValue>,
}

impl UserDecryptResponse {
    pub fn get(&self, handle: &Handle) -> Option<&SealedValue> {
        self.results.get(&hex::encode(handle))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("authorization signature does not verify")]
    BadSignature,
    #[error("authorization is not valid at {now}")]
    OutsideWindow { now: u64 },
    #[error("contract is not covered by the authorization")]
    ContractNotAuthorized,
    #[error("session public key is not a valid point")]
    BadPublicKey,
    #[error("{0} may not decrypt this handle")]
    NotAllowed(&'static str),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("{0}")]
    Unavailable(String),
}

pub trait DecryptionService: Send + Sync {
    fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> impl Future<Output = Result<UserDecryptResponse, ServiceError>> + Send;
}

/// Holds the network secret and answers from a local [`CiphertextStore`].
pub struct LocalDecryptionService<S, C> {
    key: NetworkSecretKey,
    domain: Domain,
    store: RwLock<S>,
    clock: C,
}

impl<S: CiphertextStore + Send + Sync, C: Clock> LocalDecryptionService<S, C> {
    pub fn new(key: NetworkSecretKey, domain: Domain, store: S, clock: C) -> Self {
        Self {
            key,
            domain,
            store: RwLock::new(store),
            clock,
        }
    }

    /// Swap in a fresher view of chain state.
    pub fn replace_store(&self, store: S) {
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = store;
    }

    fn answer(&self, request: &UserDecryptRequest) -> Result<UserDecryptResponse, ServiceError> {
        let auth = request.authorization();
        if !request
            .signature
            .verify(&request.caller_address, &self.domain, &auth)
        {
            return Err(ServiceError::BadSignature);
        }
        let now = self.clock.now_secs();
        if !auth.is_valid_at(now) {
            return Err(ServiceError::OutsideWindow { now });
        }
        if !auth.covers(&request.contract_address) {
            return Err(ServiceError::ContractNotAuthorized);
        }
        let recipient =
            point_from_bytes(&request.public_key).map_err(|_| ServiceError::BadPublicKey)?;

        let value = {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            if !store.is_allowed(&request.handle, &request.caller_address) {
                return Err(ServiceError::NotAllowed("user"));
            }
            if !store.is_allowed(&request.handle, &request.contract_address) {
                return Err(ServiceError::NotAllowed("contract"));
            }
            evaluate(&*store, &self.key, &request.handle)?
        };

        let r = random_scalar(&mut rand::rng());
        let sealed = seal(&recipient, REENCRYPT_MASK, value, &r);
        tracing::debug!(handle = %hex::encode(request.handle), "re-encrypted for session");

        let mut results = BTreeMap::new();
        results.insert(hex::encode(request.handle), sealed.into());
        Ok(UserDecryptResponse { results })
    }
}

impl<S: CiphertextStore + Send + Sync, C: Clock> DecryptionService for LocalDecryptionService<S, C> {
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<UserDecryptResponse, ServiceError> {
        self.answer(&request)
    }
}
