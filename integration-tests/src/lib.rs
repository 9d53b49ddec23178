//! End-to-end tests for the confidential swap
//!
//! Everything a user touches, wired together in one process:
//!
//! - a runtime with the executor, operator registry, ledger and swap engine
//!   (AccountId32 accounts, so sub-accounts and signer keys line up with a
//!   real chain),
//! - the client gateway encrypting inputs and submitting swaps,
//! - a local decryption service reading a snapshot of executor storage.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p integration-tests
//!
//! # Run with logging
//! RUST_LOG=debug cargo test -p integration-tests -- --nocapture
//! ```

pub mod helpers;
pub mod runtime;

use fhe_gateway::typed_data::LocalSigner;
use sp_runtime::AccountId32;

/// A test user: a typed-data signer whose public key is the account id.
pub struct User {
    pub signer: LocalSigner,
    pub account: AccountId32,
}

impl User {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signer = LocalSigner::from_seed(seed);
        let account = AccountId32::new(signer.public_key());
        Self { signer, account }
    }
}

/// Test accounts with known keys for reproducible testing
pub mod test_accounts {
    use super::User;

    pub fn alice() -> User {
        User::from_seed([1u8; 32])
    }

    pub fn bob() -> User {
        User::from_seed([2u8; 32])
    }
}
