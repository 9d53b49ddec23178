use super::*;

const CHAIN: u64 = 42;
const CONTRACT: &[u8] = b"swap-engine-account";
const USER: &[u8] = b"alice";

fn network_key() -> [u8; 32] {
    (Scalar::from(7u64) * G).compress().to_bytes()
}

fn prove(r: Scalar, k: Scalar, contract: &[u8], user: &[u8]) -> [u8; INPUT_PROOF_LEN] {
    let ct = InputCiphertext {
        ephemeral: (r * G).compress().to_bytes(),
        masked: 5u64.to_le_bytes(),
    };
    let a = k * G;
    let mut t = input_transcript(CHAIN, &network_key(), contract, user, &ct);
    append_point(&mut t, labels::COMMITMENT, &a);
    let c = challenge_scalar(&mut t, labels::CHALLENGE);
    encode_input_proof(&ct, &a, &(k + c * r))
}

#[test]
fn valid_proof_verifies() {
    let proof = prove(Scalar::from(11u64), Scalar::from(13u64), CONTRACT, USER);
    let ct = verify_input_proof(&proof, CHAIN, &network_key(), CONTRACT, USER)
        .expect("proof should verify");
    assert_eq!(ct.to_bytes(), proof[..INPUT_CIPHERTEXT_LEN]);
}

#[test]
fn proof_is_bound_to_contract_and_user() {
    let proof = prove(Scalar::from(11u64), Scalar::from(13u64), CONTRACT, USER);
    assert_eq!(
        verify_input_proof(&proof, CHAIN, &network_key(), b"other", USER),
        Err(InputError::BadProof)
    );
    assert_eq!(
        verify_input_proof(&proof, CHAIN, &network_key(), CONTRACT, b"bob"),
        Err(InputError::BadProof)
    );
    assert_eq!(
        verify_input_proof(&proof, CHAIN + 1, &network_key(), CONTRACT, USER),
        Err(InputError::BadProof)
    );
}

#[test]
fn tampered_masked_value_is_rejected() {
    let mut proof = prove(Scalar::from(11u64), Scalar::from(13u64), CONTRACT, USER);
    proof[32] ^= 1;
    assert_eq!(
        verify_input_proof(&proof, CHAIN, &network_key(), CONTRACT, USER),
        Err(InputError::BadProof)
    );
}

#[test]
fn malformed_proofs_are_rejected() {
    let proof = prove(Scalar::from(11u64), Scalar::from(13u64), CONTRACT, USER);
    assert_eq!(
        verify_input_proof(&proof[..INPUT_PROOF_LEN - 1], CHAIN, &network_key(), CONTRACT, USER),
        Err(InputError::Malformed)
    );

    let mut bad_response = proof;
    bad_response[72..104].copy_from_slice(&[0xff; 32]);
    assert_eq!(
        verify_input_proof(&bad_response, CHAIN, &network_key(), CONTRACT, USER),
        Err(InputError::InvalidScalar)
    );
}

#[test]
fn handles_depend_on_binding() {
    let ct = InputCiphertext { ephemeral: [1u8; 32], masked: [2u8; 8] };
    let h = input_handle(CHAIN, CONTRACT, USER, &ct);
    assert_ne!(h, input_handle(CHAIN, CONTRACT, b"bob", &ct));
    assert_ne!(h, input_handle(CHAIN, b"x", USER, &ct));
    assert_ne!(h, ZERO_HANDLE);
}

#[test]
fn result_handles_are_unique_per_nonce() {
    let op = FheOp::Trivial(0);
    assert_ne!(result_handle(CHAIN, &op, 0), result_handle(CHAIN, &op, 1));
    assert_eq!(result_handle(CHAIN, &op, 3), result_handle(CHAIN, &op, 3));
}

#[test]
fn operands_follow_op_shape() {
    let (a, b, c) = ([1u8; 32], [2u8; 32], [3u8; 32]);
    assert!(FheOp::Trivial(9).operands().is_empty());
    assert_eq!(FheOp::Sub(a, b).operands(), vec![a, b]);
    assert_eq!(FheOp::Select(c, a, b).operands(), vec![c, a, b]);
    assert_eq!(FheOp::DivScalar(a, 3100).operands(), vec![a]);
}
