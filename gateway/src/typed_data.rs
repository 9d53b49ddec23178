//! Typed-data authorization for user decryption.
//!
//! The caller signs a structured [`DecryptAuthorization`] under a [`Domain`]
//! that pins the chain and the decryption service. Signatures are Schnorr over
//! Ristretto with a Merlin transcript of every typed field as the message, so
//! changing any field (or the domain) invalidates the signature.

use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT as G, scalar::Scalar};
use fhe_primitives::{append_point, challenge_scalar, point_from_bytes, scalar_from_bytes};
use merlin::Transcript;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{error::GatewayError, keys::random_scalar};

const SECONDS_PER_DAY: u64 = 86_400;

/// Hex-encoded list of byte strings.
pub(crate) mod hex_list {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(v: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(v.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(d)?
            .into_iter()
            .map(|s| hex::decode(s).map_err(D::Error::custom))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    /// Account of the decryption service verifier.
    #[serde(with = "hex::serde")]
    pub verifying_contract: Vec<u8>,
}

/// What the caller agrees to: session key, contracts in scope, validity window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptAuthorization {
    #[serde(with = "hex::serde")]
    pub public_key: [u8; 32],
    #[serde(with = "hex_list")]
    pub contract_addresses: Vec<Vec<u8>>,
    /// Unix seconds.
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl DecryptAuthorization {
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }

    /// `start <= now < start + duration`
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.start_timestamp <= now && now < self.expires_at()
    }

    pub fn covers(&self, contract: &[u8]) -> bool {
        self.contract_addresses.iter().any(|c| c == contract)
    }

    fn transcript(&self, domain: &Domain) -> Transcript {
        let mut t = Transcript::new(b"fhe-decrypt-authorization");
        t.append_message(b"domain.name", domain.name.as_bytes());
        t.append_message(b"domain.version", domain.version.as_bytes());
        t.append_u64(b"domain.chainId", domain.chain_id);
        t.append_message(b"domain.verifyingContract", &domain.verifying_contract);
        t.append_message(b"publicKey", &self.public_key);
        t.append_u64(b"contractAddresses.len", self.contract_addresses.len() as u64);
        for contract in &self.contract_addresses {
            t.append_message(b"contractAddresses", contract);
        }
        t.append_u64(b"startTimestamp", self.start_timestamp);
        t.append_u64(b"durationDays", self.duration_days);
        t
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSignature {
    #[serde(with = "hex::serde")]
    pub r: [u8; 32],
    #[serde(with = "hex::serde")]
    pub s: [u8; 32],
}

impl TypedSignature {
    /// `signer` is the 32-byte public key the account id is derived from.
    pub fn verify(&self, signer: &[u8], domain: &Domain, auth: &DecryptAuthorization) -> bool {
        let Ok(signer): Result<[u8; 32], _> = signer.try_into() else {
            return false;
        };
        let (Ok(x), Ok(r), Ok(s)) = (
            point_from_bytes(&signer),
            point_from_bytes(&self.r),
            scalar_from_bytes(&self.s),
        ) else {
            return false;
        };

        let mut t = auth.transcript(domain);
        append_point(&mut t, b"signer", &x);
        append_point(&mut t, b"R", &r);
        let c = challenge_scalar(&mut t, b"c");
        s * G == r + c * x
    }
}

/// Something that can sign typed data on behalf of an account, e.g. a wallet.
///
/// A user declining to sign is reported as [`GatewayError::SignatureRejected`].
pub trait Signer: Send + Sync {
    /// Account bytes, as the chain sees them.
    fn address(&self) -> Vec<u8>;

    fn sign_typed(
        &self,
        domain: &Domain,
        auth: &DecryptAuthorization,
    ) -> Result<TypedSignature, GatewayError>;
}

/// In-process signer whose account id is its public key.
pub struct LocalSigner {
    secret: Scalar,
    public: [u8; 32],
}

impl LocalSigner {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let secret = random_scalar(&mut ChaCha20Rng::from_seed(seed));
        Self {
            secret,
            public: (secret * G).compress().to_bytes(),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.public
    }
}

impl Drop for LocalSigner {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Vec<u8> {
        self.public.to_vec()
    }

    fn sign_typed(
        &self,
        domain: &Domain,
        auth: &DecryptAuthorization,
    ) -> Result<TypedSignature, GatewayError> {
        let x = point_from_bytes(&self.public)
            .map_err(|_| GatewayError::InvalidKey("signer public key"))?;
        let mut t = auth.transcript(domain);
        append_point(&mut t, b"signer", &x);

        // deterministic nonce from the message and the secret
        let mut nonce_t = t.clone();
        nonce_t.append_message(b"witness", self.secret.as_bytes());
        let mut k = challenge_scalar(&mut nonce_t, b"nonce");

        let r = k * G;
        append_point(&mut t, b"R", &r);
        let c = challenge_scalar(&mut t, b"c");
        let s = k + c * self.secret;
        k.zeroize();

        Ok(TypedSignature {
            r: r.compress().to_bytes(),
            s: s.to_bytes(),
        })
    }
}
