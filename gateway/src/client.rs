use std::future::Future;

use confidential_assets_primitives::SwapDirection;
use fhe_primitives::{Handle, ZERO_HANDLE};
use rand::RngCore;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::GatewayConfig,
    encrypt::{EncryptedInput, SubmissionInput, encrypt_for_submission},
    error::GatewayError,
    inflight::InFlight,
    keys::NetworkPublicKey,
    service::DecryptionService,
    session::DecryptionSession,
    typed_data::Signer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// The handle was never initialized; nothing to decrypt.
    NotAvailable,
    Revealed { handle: Handle, value: u64 },
}

impl DecryptOutcome {
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::NotAvailable => None,
            Self::Revealed { value, .. } => Some(*value),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<SubmitError> for GatewayError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Transport(msg) => Self::Transport(msg),
            SubmitError::Rejected(msg) => Self::OnChain(msg),
        }
    }
}

/// Sends a signed swap to the chain and reports the output handle.
pub trait SwapSubmitter {
    /// Account the swap engine runs as; inputs are bound to it.
    fn engine_account(&self) -> Vec<u8>;

    fn submit(
        &self,
        user: &[u8],
        direction: SwapDirection,
        input: EncryptedInput,
    ) -> impl Future<Output = Result<Handle, SubmitError>>;
}

pub struct Gateway<S, C = SystemClock> {
    config: GatewayConfig,
    network_key: NetworkPublicKey,
    service: S,
    clock: C,
    inflight: InFlight,
}

impl<S: DecryptionService, C: Clock> Gateway<S, C> {
    pub fn new(config: GatewayConfig, service: S, clock: C) -> Result<Self, GatewayError> {
        config.validate()?;
        let network_key = NetworkPublicKey::from_bytes(&config.network_key)?;
        Ok(Self {
            config,
            network_key,
            service,
            clock,
            inflight: InFlight::default(),
        })
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn is_busy(&self, account: &[u8], contract: &[u8]) -> bool {
        self.inflight.is_busy(account, contract)
    }

    /// Encrypt `amount` for submission by `user` to `contract`.
    pub fn encrypt(&self, contract: &[u8], user: &[u8], amount: u64) -> EncryptedInput {
        let mut rng_seed = [0u8; 32];
        rand::rng().fill_bytes(&mut rng_seed);
        self.encrypt_with_seed(contract, user, amount, rng_seed)
    }

    pub fn encrypt_with_seed(
        &self,
        contract: &[u8],
        user: &[u8],
        amount: u64,
        rng_seed: [u8; 32],
    ) -> EncryptedInput {
        encrypt_for_submission(&SubmissionInput {
            chain_id: self.config.chain_id,
            network_key: &self.network_key,
            contract,
            user,
            amount,
            rng_seed,
        })
    }

    /// Reveal `handle` to the signer's account.
    ///
    /// `contract` is the account that computed the handle (for balances, the
    /// ledger account of the asset). Both it and the signer must be on the
    /// handle's access list.
    pub async fn user_decrypt(
        &self,
        signer: &dyn Signer,
        contract: &[u8],
        handle: Handle,
    ) -> Result<DecryptOutcome, GatewayError> {
        if handle == ZERO_HANDLE {
            debug!("zero handle, skipping decryption");
            return Ok(DecryptOutcome::NotAvailable);
        }

        let caller = signer.address();
        let _guard = self.inflight.try_acquire(&caller, contract)?;

        let mut session = DecryptionSession::new(
            &mut rand::rng(),
            handle,
            contract.to_vec(),
            self.clock.now_secs(),
            self.config.validity_days,
        );
        session.sign(signer, &self.config.domain())?;
        // signing can wait on the user for a long time
        if session.is_expired(self.clock.now_secs()) {
            return Err(GatewayError::SessionExpired);
        }
        let request = session.request(caller)?;

        let timeout = self.config.request_timeout();
        let response = match tokio::time::timeout(timeout, self.service.user_decrypt(request)).await
        {
            Ok(response) => response?,
            Err(_) => {
                warn!(handle = %hex::encode(handle), ?timeout, "decryption timed out");
                return Err(GatewayError::Timeout(timeout));
            }
        };

        let value = session.open(&response, self.clock.now_secs())?;
        info!(handle = %hex::encode(handle), "handle decrypted");
        Ok(DecryptOutcome::Revealed { handle, value })
    }

    /// Encrypt `amount` and submit a swap through `submitter`.
    pub async fn swap<T: SwapSubmitter>(
        &self,
        submitter: &T,
        user: &[u8],
        direction: SwapDirection,
        amount: u64,
    ) -> Result<Handle, GatewayError> {
        let input = self.encrypt(&submitter.engine_account(), user, amount);
        debug!(?direction, handle = %hex::encode(input.handle), "submitting swap");
        Ok(submitter.submit(user, direction, input).await?)
    }
}
