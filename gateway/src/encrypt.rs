//! Encrypt-for-submission: a plaintext amount becomes `(handle, proof)` bound
//! to one contract and one submitting account.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT as G;
use fhe_primitives::{
    Handle, append_point, challenge_scalar, encode_input_proof, input_handle, input_transcript,
    labels,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

use crate::keys::{INPUT_MASK, NetworkPublicKey, random_scalar, seal};

/// Inputs for one submission. `contract` and `user` are the SCALE encodings
/// of the on-chain account ids.
pub struct SubmissionInput<'a> {
    pub chain_id: u64,
    pub network_key: &'a NetworkPublicKey,
    pub contract: &'a [u8],
    pub user: &'a [u8],
    pub amount: u64,
    pub rng_seed: [u8; 32],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: Handle,
    /// `ciphertext || commitment || response`
    pub proof: Vec<u8>,
}

pub fn encrypt_for_submission(input: &SubmissionInput<'_>) -> EncryptedInput {
    let mut rng = ChaCha20Rng::from_seed(input.rng_seed);
    let mut r = random_scalar(&mut rng);
    let mut k = random_scalar(&mut rng);

    let ciphertext = seal(input.network_key.point(), INPUT_MASK, input.amount, &r);
    let commitment = k * G;

    let network_key = input.network_key.to_bytes();
    let mut t = input_transcript(
        input.chain_id,
        &network_key,
        input.contract,
        input.user,
        &ciphertext,
    );
    append_point(&mut t, labels::COMMITMENT, &commitment);
    let c = challenge_scalar(&mut t, labels::CHALLENGE);
    let response = k + c * r;

    r.zeroize();
    k.zeroize();

    EncryptedInput {
        handle: input_handle(input.chain_id, input.contract, input.user, &ciphertext),
        proof: encode_input_proof(&ciphertext, &commitment, &response).to_vec(),
    }
}
