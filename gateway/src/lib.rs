//! # fhe-gateway — client side of the confidential swap
//!
//! Two protocols, both off-chain:
//!
//! **Encrypt-for-submission.** [`encrypt::encrypt_for_submission`] turns a
//! plaintext amount into `(handle, proof)` bound to one contract account and
//! one submitting account. The executor pallet rejects it anywhere else and
//! accepts it only once.
//!
//! **Authorized user decryption.** [`client::Gateway::user_decrypt`] runs the
//! four-step handshake:
//!
//! 1. generate a throwaway session keypair,
//! 2. build a [`typed_data::DecryptAuthorization`] scoped to the contract and a
//!    validity window,
//! 3. have the caller sign it as typed data ([`typed_data::Signer`]),
//! 4. send the request to a [`service::DecryptionService`], which answers with
//!    the value re-encrypted under the session key.
//!
//! The session private key never leaves the process and is zeroized when the
//! session is dropped, including on timeout.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fhe_gateway::{client::Gateway, config::GatewayConfig, clock::SystemClock};
//!
//! let config = GatewayConfig::from_json(include_str!("gateway.json"))?;
//! let gateway = Gateway::new(config, service, SystemClock)?;
//!
//! // swap input, bound to the engine and the user
//! let input = gateway.encrypt(&engine_account, &user_account, 1);
//!
//! // later: reveal a balance handle read from the ledger
//! let outcome = gateway.user_decrypt(&signer, &ledger_account, handle).await?;
//! ```
//!
//! ## Sealed value layout
//! ```text
//! ephemeral R = r·G (32) || masked_le = v ⊕ Sha512(label || r·PK)[..8] (8)
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod encrypt;
pub mod error;
pub mod eval;
pub mod inflight;
pub mod keys;
pub mod service;
pub mod session;
pub mod typed_data;

pub use client::{DecryptOutcome, Gateway, SubmitError, SwapSubmitter};
pub use error::GatewayError;
