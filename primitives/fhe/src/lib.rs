//! Primitives shared between the on-chain FHE executor and off-chain clients.
//!
//! On-chain code never holds a plaintext. It only moves 32-byte *handles*
//! around, and every handle names a computation record ([`FheOp`]) kept by the
//! executor. The decryption service evaluates those records off-chain.
//!
//! User-supplied values enter through an [`InputCiphertext`]: hashed ElGamal
//! over Ristretto, encrypted to the network key, together with a Schnorr proof
//! of knowledge of the encryption randomness. The proof transcript binds
//! `(chain_id, network_key, contract, user, ciphertext)` so an input cannot be
//! replayed against another contract or by another account.
//!
//! ## Input proof layout
//! ```text
//! ephemeral(32) || masked_le(8) || commitment(32) || response(32)
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use blake2::{digest::consts::U32, Blake2b, Digest};
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use merlin::Transcript;
use parity_scale_codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

#[cfg(test)]
mod tests;

type Blake2b256 = Blake2b<U32>;

/// Opaque reference to an encrypted unsigned 64-bit value.
pub type Handle = [u8; 32];

/// Reserved "uninitialized" handle. Evaluates to zero and is never decrypted.
pub const ZERO_HANDLE: Handle = [0u8; 32];

/// Serialized size of an [`InputCiphertext`].
pub const INPUT_CIPHERTEXT_LEN: usize = 40;

/// Serialized size of a full input proof (ciphertext + Schnorr proof).
pub const INPUT_PROOF_LEN: usize = INPUT_CIPHERTEXT_LEN + 64;

/// Transcript and hashing labels. Clients and the executor must agree on these.
pub mod labels {
    pub const PROTOCOL: &[u8] = b"fhe-input";
    pub const PROTOCOL_V: &[u8] = b"v1";
    pub const INPUT_HANDLE: &[u8] = b"fhe/input-handle/v1";
    pub const RESULT_HANDLE: &[u8] = b"fhe/result-handle/v1";
    pub const COMMITMENT: &[u8] = b"commitment";
    pub const CHALLENGE: &[u8] = b"challenge";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Wrong length or layout.
    Malformed,
    /// A 32-byte field is not a canonical Ristretto point.
    InvalidPoint,
    /// The response is not a canonical scalar.
    InvalidScalar,
    /// The Schnorr equation does not hold for this binding.
    BadProof,
}

/// Hashed ElGamal ciphertext of a `u64`: `R = r·G`, `masked = v ⊕ H(r·PK)`.
#[derive(
    Encode, Decode, DecodeWithMemTracking, Clone, Copy, PartialEq, Eq, Debug, TypeInfo, MaxEncodedLen,
)]
pub struct InputCiphertext {
    pub ephemeral: [u8; 32],
    pub masked: [u8; 8],
}

impl InputCiphertext {
    pub fn to_bytes(&self) -> [u8; INPUT_CIPHERTEXT_LEN] {
        let mut out = [0u8; INPUT_CIPHERTEXT_LEN];
        out[0..32].copy_from_slice(&self.ephemeral);
        out[32..40].copy_from_slice(&self.masked);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        if bytes.len() != INPUT_CIPHERTEXT_LEN {
            return Err(InputError::Malformed);
        }
        let mut ephemeral = [0u8; 32];
        ephemeral.copy_from_slice(&bytes[0..32]);
        let mut masked = [0u8; 8];
        masked.copy_from_slice(&bytes[32..40]);
        Ok(Self { ephemeral, masked })
    }
}

/// Computation record behind a handle.
///
/// Values are `u64` with wrapping arithmetic; booleans are `0`/`1`.
#[derive(
    Encode, Decode, DecodeWithMemTracking, Clone, Copy, PartialEq, Eq, Debug, TypeInfo, MaxEncodedLen,
)]
pub enum FheOp {
    /// Verified user input.
    Input(InputCiphertext),
    /// Publicly known value lifted into the encrypted domain.
    Trivial(u64),
    Add(Handle, Handle),
    Sub(Handle, Handle),
    /// `lhs <= rhs`
    Le(Handle, Handle),
    /// `cond ? if_true : if_false`
    Select(Handle, Handle, Handle),
    MulScalar(Handle, u64),
    /// Truncating division by a non-zero public constant.
    DivScalar(Handle, u64),
}

impl FheOp {
    /// Handles this operation reads.
    pub fn operands(&self) -> Vec<Handle> {
        match *self {
            FheOp::Input(_) | FheOp::Trivial(_) => Vec::new(),
            FheOp::Add(a, b) | FheOp::Sub(a, b) | FheOp::Le(a, b) => vec![a, b],
            FheOp::Select(c, a, b) => vec![c, a, b],
            FheOp::MulScalar(a, _) | FheOp::DivScalar(a, _) => vec![a],
        }
    }
}

fn hash_bound(hasher: &mut Blake2b256, bytes: &[u8]) {
    hasher.update((bytes.len() as u32).to_le_bytes());
    hasher.update(bytes);
}

fn finalize(hasher: Blake2b256) -> Handle {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Handle of a user input bound to `(chain_id, contract, user)`.
pub fn input_handle(
    chain_id: u64,
    contract: &[u8],
    user: &[u8],
    ciphertext: &InputCiphertext,
) -> Handle {
    let mut h = Blake2b256::new();
    h.update(labels::INPUT_HANDLE);
    h.update(chain_id.to_le_bytes());
    hash_bound(&mut h, contract);
    hash_bound(&mut h, user);
    h.update(ciphertext.to_bytes());
    finalize(h)
}

/// Handle of a computed value. `nonce` keeps equal computations unlinkable.
pub fn result_handle(chain_id: u64, op: &FheOp, nonce: u64) -> Handle {
    let mut h = Blake2b256::new();
    h.update(labels::RESULT_HANDLE);
    h.update(chain_id.to_le_bytes());
    h.update(nonce.to_le_bytes());
    h.update(op.encode());
    finalize(h)
}

/// Transcript binding an input ciphertext to its submission context.
pub fn input_transcript(
    chain_id: u64,
    network_key: &[u8; 32],
    contract: &[u8],
    user: &[u8],
    ciphertext: &InputCiphertext,
) -> Transcript {
    let mut t = Transcript::new(labels::PROTOCOL);
    t.append_message(b"proto", labels::PROTOCOL_V);
    t.append_u64(b"chain_id", chain_id);
    t.append_message(b"network_key", network_key);
    t.append_message(b"contract", contract);
    t.append_message(b"user", user);
    t.append_message(b"ephemeral", &ciphertext.ephemeral);
    t.append_message(b"masked", &ciphertext.masked);
    t
}

pub fn append_point(t: &mut Transcript, label: &'static [u8], p: &RistrettoPoint) {
    t.append_message(label, p.compress().as_bytes());
}

pub fn challenge_scalar(t: &mut Transcript, label: &'static [u8]) -> Scalar {
    let mut buf = [0u8; 64];
    t.challenge_bytes(label, &mut buf);
    Scalar::from_bytes_mod_order_wide(&buf)
}

pub fn point_from_bytes(bytes: &[u8; 32]) -> Result<RistrettoPoint, InputError> {
    CompressedRistretto(*bytes)
        .decompress()
        .ok_or(InputError::InvalidPoint)
}

pub fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<Scalar, InputError> {
    Option::<Scalar>::from(Scalar::from_canonical_bytes(*bytes)).ok_or(InputError::InvalidScalar)
}

/// Serialize `ciphertext || A || z`.
pub fn encode_input_proof(
    ciphertext: &InputCiphertext,
    commitment: &RistrettoPoint,
    response: &Scalar,
) -> [u8; INPUT_PROOF_LEN] {
    let mut out = [0u8; INPUT_PROOF_LEN];
    out[0..40].copy_from_slice(&ciphertext.to_bytes());
    out[40..72].copy_from_slice(commitment.compress().as_bytes());
    out[72..104].copy_from_slice(&response.to_bytes());
    out
}

/// Check the proof of knowledge of `r` in `R = r·G` under the given binding.
///
/// Returns the ciphertext on success. The caller is expected to compare the
/// claimed handle against [`input_handle`] and to reject reuse.
pub fn verify_input_proof(
    proof: &[u8],
    chain_id: u64,
    network_key: &[u8; 32],
    contract: &[u8],
    user: &[u8],
) -> Result<InputCiphertext, InputError> {
    if proof.len() != INPUT_PROOF_LEN {
        return Err(InputError::Malformed);
    }
    let ciphertext = InputCiphertext::from_bytes(&proof[0..INPUT_CIPHERTEXT_LEN])?;
    let ephemeral = point_from_bytes(&ciphertext.ephemeral)?;

    let mut a_bytes = [0u8; 32];
    a_bytes.copy_from_slice(&proof[40..72]);
    let a = point_from_bytes(&a_bytes)?;

    let mut z_bytes = [0u8; 32];
    z_bytes.copy_from_slice(&proof[72..104]);
    let z = scalar_from_bytes(&z_bytes)?;

    let mut t = input_transcript(chain_id, network_key, contract, user, &ciphertext);
    append_point(&mut t, labels::COMMITMENT, &a);
    let c = challenge_scalar(&mut t, labels::CHALLENGE);

    if z * G == a + c * ephemeral {
        Ok(ciphertext)
    } else {
        Err(InputError::BadProof)
    }
}
