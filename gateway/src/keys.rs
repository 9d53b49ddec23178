//! Key material and the hashed-ElGamal seal used for inputs and re-encryption.

use core::fmt;

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
    traits::Identity,
};
use fhe_primitives::{InputCiphertext, point_from_bytes};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::error::GatewayError;

/// Keystream label for values encrypted to the network key.
pub const INPUT_MASK: &[u8] = b"fhe/input-mask/v1";
/// Keystream label for values re-encrypted to a session key.
pub const REENCRYPT_MASK: &[u8] = b"fhe/reencrypt-mask/v1";

pub(crate) fn random_scalar<R: RngCore + ?Sized>(rng: &mut R) -> Scalar {
    let mut wide = [0u8; 64];
    rng.fill_bytes(&mut wide);
    let s = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    s
}

fn keystream(label: &[u8], shared: &RistrettoPoint) -> [u8; 8] {
    let mut h = Sha512::new();
    h.update(label);
    h.update(shared.compress().as_bytes());
    let digest = h.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn xor(mut value: [u8; 8], mask: [u8; 8]) -> [u8; 8] {
    for (v, m) in value.iter_mut().zip(mask) {
        *v ^= m;
    }
    value
}

/// Encrypt `value` to `recipient` with ephemeral scalar `r`.
pub(crate) fn seal(
    recipient: &RistrettoPoint,
    label: &[u8],
    value: u64,
    r: &Scalar,
) -> InputCiphertext {
    let ephemeral = (r * G).compress().to_bytes();
    let masked = xor(value.to_le_bytes(), keystream(label, &(r * recipient)));
    InputCiphertext { ephemeral, masked }
}

fn open(secret: &Scalar, label: &[u8], ct: &InputCiphertext) -> Result<u64, GatewayError> {
    let ephemeral =
        point_from_bytes(&ct.ephemeral).map_err(|_| GatewayError::InvalidKey("ephemeral point"))?;
    let plain = xor(ct.masked, keystream(label, &(secret * ephemeral)));
    Ok(u64::from_le_bytes(plain))
}

/// Public half of the network key; everything submitted on-chain is encrypted to it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NetworkPublicKey(RistrettoPoint);

impl NetworkPublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, GatewayError> {
        let point =
            point_from_bytes(bytes).map_err(|_| GatewayError::InvalidKey("network public key"))?;
        if point == RistrettoPoint::identity() {
            return Err(GatewayError::InvalidKey("network public key is the identity"));
        }
        Ok(Self(point))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    pub(crate) fn point(&self) -> &RistrettoPoint {
        &self.0
    }
}

impl fmt::Debug for NetworkPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkPublicKey({})", hex::encode(self.to_bytes()))
    }
}

/// Secret half of the network key. Held by the decryption service only.
pub struct NetworkSecretKey(Scalar);

impl NetworkSecretKey {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(random_scalar(&mut ChaCha20Rng::from_seed(seed)))
    }

    pub fn public(&self) -> NetworkPublicKey {
        NetworkPublicKey(self.0 * G)
    }

    /// Decrypt a verified input ciphertext.
    pub fn open_input(&self, ct: &InputCiphertext) -> Result<u64, GatewayError> {
        open(&self.0, INPUT_MASK, ct)
    }
}

impl Drop for NetworkSecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for NetworkSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NetworkSecretKey").field(&"<redacted>").finish()
    }
}

/// Throwaway keypair for a single decryption request.
pub struct SessionKeypair {
    secret: Scalar,
    public: RistrettoPoint,
}

impl SessionKeypair {
    pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let secret = random_scalar(rng);
        Self {
            secret,
            public: secret * G,
        }
    }

    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.compress().to_bytes()
    }

    /// Decrypt a value the service re-encrypted to this session.
    pub fn open(&self, sealed: &InputCiphertext) -> Result<u64, GatewayError> {
        open(&self.secret, REENCRYPT_MASK, sealed)
    }
}

impl Drop for SessionKeypair {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for SessionKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeypair")
            .field("public", &hex::encode(self.public_bytes()))
            .field("secret", &"<redacted>")
            .finish()
    }
}
