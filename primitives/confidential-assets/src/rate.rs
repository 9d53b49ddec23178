//! Fixed-rate conversion between the two swapped assets.
//!
//! Both directions run on ciphertext handles through the executor. `reverse`
//! truncates, so any input below [`RATE`] converts to zero.

use crate::{EncryptedAmount, FheExecutor, SwapDirection};
use frame_support::pallet_prelude::DispatchError;

/// Units of asset B per unit of asset A.
pub const RATE: u64 = 3100;

/// `amount * RATE`
pub fn forward<AccountId, E: FheExecutor<AccountId>>(
    who: &AccountId,
    amount: EncryptedAmount,
) -> Result<EncryptedAmount, DispatchError> {
    E::mul_scalar(who, amount, RATE)
}

/// `amount / RATE`, rounded down.
pub fn reverse<AccountId, E: FheExecutor<AccountId>>(
    who: &AccountId,
    amount: EncryptedAmount,
) -> Result<EncryptedAmount, DispatchError> {
    E::div_scalar(who, amount, RATE)
}

impl SwapDirection {
    pub fn convert<AccountId, E: FheExecutor<AccountId>>(
        self,
        who: &AccountId,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, DispatchError> {
        match self {
            SwapDirection::Forward => forward::<AccountId, E>(who, amount),
            SwapDirection::Reverse => reverse::<AccountId, E>(who, amount),
        }
    }
}
