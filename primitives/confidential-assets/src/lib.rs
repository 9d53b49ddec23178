//! Types and traits for confidential assets crates
#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::{pallet_prelude::*, BoundedVec};
use parity_scale_codec::DecodeWithMemTracking;

pub use fhe_primitives::{Handle, ZERO_HANDLE};

pub mod rate;


/// Ciphertext handle of an encrypted `u64` amount.
pub type EncryptedAmount = Handle;

/// Serialized input proof accepted by the executor.
pub type MaxProofLen = ConstU32<{ fhe_primitives::INPUT_PROOF_LEN as u32 }>;
pub type InputProof = BoundedVec<u8, MaxProofLen>;

/// Executor of operations over encrypted values.
///
/// Every operation takes `who`, the account performing it. `who` must be
/// allowed on each operand (the zero handle is public) and is allowed on the
/// result.
pub trait FheExecutor<AccountId> {
    /// Ingest an external input that `user` submitted to `contract`.
    /// On success `contract` is allowed on the returned handle.
    fn verify_input(
        contract: &AccountId,
        user: &AccountId,
        handle: Handle,
        proof: &[u8],
    ) -> Result<Handle, DispatchError>;

    fn trivial_encrypt(who: &AccountId, value: u64) -> Result<Handle, DispatchError>;

    fn add(who: &AccountId, lhs: Handle, rhs: Handle) -> Result<Handle, DispatchError>;

    /// Wrapping subtraction.
    fn sub(who: &AccountId, lhs: Handle, rhs: Handle) -> Result<Handle, DispatchError>;

    /// Encrypted boolean `lhs <= rhs`.
    fn le(who: &AccountId, lhs: Handle, rhs: Handle) -> Result<Handle, DispatchError>;

    fn select(
        who: &AccountId,
        cond: Handle,
        if_true: Handle,
        if_false: Handle,
    ) -> Result<Handle, DispatchError>;

    fn mul_scalar(who: &AccountId, lhs: Handle, rhs: u64) -> Result<Handle, DispatchError>;

    /// Truncating division by a public, non-zero constant.
    fn div_scalar(who: &AccountId, lhs: Handle, rhs: u64) -> Result<Handle, DispatchError>;

    /// Let `account` use or decrypt `handle`. `who` must already be allowed.
    fn allow(who: &AccountId, handle: Handle, account: &AccountId) -> DispatchResult;

    fn is_allowed(handle: &Handle, account: &AccountId) -> bool;
}

// Operator

pub trait OperatorRegistry<AccountId, AssetId, Moment> {
    /// Return true if `operator` is currently authorized to operate for (`holder`, `asset`) at `now`.
    fn is_operator(holder: &AccountId, asset: &AssetId, operator: &AccountId, now: Moment) -> bool;
}

impl<AccountId, AssetId, Moment> OperatorRegistry<AccountId, AssetId, Moment> for () {
    fn is_operator(
        _holder: &AccountId,
        _asset: &AssetId,
        _operator: &AccountId,
        _now: Moment,
    ) -> bool {
        false
    }
}

/// Encrypted balances per (asset, account), moved without revealing amounts.
///
/// `amount` arguments are handles the caller is already allowed on. Both
/// transfers return the amount actually moved, which is `amount` when the
/// balance covers it and an encrypted zero otherwise.
pub trait ConfidentialLedger<AccountId, AssetId> {
    /// Account that represents the ledger of `asset` in the executor ACL.
    /// Inputs for the ledger's own extrinsics are bound to it.
    fn ledger_account(asset: &AssetId) -> AccountId;

    /// `ZERO_HANDLE` when `who` never held `asset`.
    fn balance_of(asset: &AssetId, who: &AccountId) -> EncryptedAmount;

    fn total_supply(asset: &AssetId) -> EncryptedAmount;

    /// True while `holder` has an unexpired grant naming `spender`.
    fn is_operator(asset: &AssetId, holder: &AccountId, spender: &AccountId) -> bool;

    fn confidential_transfer(
        asset: &AssetId,
        caller: &AccountId,
        to: &AccountId,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError>;

    /// Requires `caller == from` or `is_operator(asset, from, caller)`.
    fn confidential_transfer_from(
        asset: &AssetId,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError>;
}

/// Direction of a fixed-rate swap between the two configured assets.
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Encode, Decode, DecodeWithMemTracking, TypeInfo, MaxEncodedLen,
)]
pub enum SwapDirection {
    /// Asset A in, asset B out, amount multiplied by the rate.
    Forward,
    /// Asset B in, asset A out, amount divided by the rate.
    Reverse,
}

/// Trait so other pallets can run swaps without extrinsics.
pub trait ConfidentialSwap<AccountId> {
    /// Swap an input the engine is already allowed on. Returns the handle of
    /// the amount actually paid out to `who`.
    fn swap(
        who: &AccountId,
        direction: SwapDirection,
        amount_in: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError>;
}
