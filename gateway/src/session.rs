use fhe_primitives::Handle;
use rand::RngCore;

use crate::{
    error::GatewayError,
    keys::SessionKeypair,
    service::{UserDecryptRequest, UserDecryptResponse},
    typed_data::{DecryptAuthorization, Domain, Signer, TypedSignature},
};

/// One user-decryption attempt for one handle.
///
/// Consumed by [`DecryptionSession::open`]; the session key is zeroized when
/// the session drops, whatever the outcome.
#[derive(Debug)]
pub struct DecryptionSession {
    keypair: SessionKeypair,
    handle: Handle,
    contract: Vec<u8>,
    authorization: DecryptAuthorization,
    signature: Option<TypedSignature>,
}

impl DecryptionSession {
    pub fn new<R: RngCore + ?Sized>(
        rng: &mut R,
        handle: Handle,
        contract: Vec<u8>,
        now: u64,
        duration_days: u64,
    ) -> Self {
        let keypair = SessionKeypair::generate(rng);
        let authorization = DecryptAuthorization {
            public_key: keypair.public_bytes(),
            contract_addresses: vec![contract.clone()],
            start_timestamp: now,
            duration_days,
        };
        Self {
            keypair,
            handle,
            contract,
            authorization,
            signature: None,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        !self.authorization.is_valid_at(now)
    }

    pub fn sign(&mut self, signer: &dyn Signer, domain: &Domain) -> Result<(), GatewayError> {
        self.signature = Some(signer.sign_typed(domain, &self.authorization)?);
        Ok(())
    }

    pub fn request(&self, caller: Vec<u8>) -> Result<UserDecryptRequest, GatewayError> {
        let signature = self
            .signature
            .ok_or_else(|| GatewayError::SignatureRejected("authorization not signed".into()))?;
        Ok(UserDecryptRequest {
            handle: self.handle,
            contract_address: self.contract.clone(),
            caller_address: caller,
            public_key: self.authorization.public_key,
            contract_addresses: self.authorization.contract_addresses.clone(),
            start_timestamp: self.authorization.start_timestamp,
            duration_days: self.authorization.duration_days,
            signature,
        })
    }

    pub fn open(self, response: &UserDecryptResponse, now: u64) -> Result<u64, GatewayError> {
        if self.is_expired(now) {
            return Err(GatewayError::SessionExpired);
        }
        let sealed = response
            .get(&self.handle)
            .ok_or(GatewayError::MalformedResponse("handle missing from results"))?;
        self.keypair.open(&(*sealed).into())
    }
}
